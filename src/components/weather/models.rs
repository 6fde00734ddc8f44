use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::Deserialize;

/// One three-hourly forecast slot
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyForecast {
    pub time: NaiveDateTime,
    pub weather_code: i32,
    pub feels_like_temp: f64,
    pub precipitation_probability: Option<u8>,
}

/// One day of the daily forecast
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub time: NaiveDateTime,
    pub weather_code: i32,
    pub max_feels_like_temp: f64,
    pub min_feels_like_temp: f64,
    pub precipitation_probability: Option<u8>,
}

/// Everything the renderer needs about the weather
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    pub location_name: Option<String>,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
}

/// Met Office significant weather codes, grouped by the icon drawn for them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherIcon {
    NotAvailable,
    ClearNight,
    Sunny,
    PartlyCloudyNight,
    PartlyCloudyDay,
    Mist,
    Cloudy,
    Overcast,
    LightRain,
    HeavyRain,
    Sleet,
    LightSnow,
    HeavySnow,
    Thunder,
}

impl WeatherIcon {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => WeatherIcon::ClearNight,
            1 => WeatherIcon::Sunny,
            2 => WeatherIcon::PartlyCloudyNight,
            3 => WeatherIcon::PartlyCloudyDay,
            5 | 6 => WeatherIcon::Mist,
            7 => WeatherIcon::Cloudy,
            8 => WeatherIcon::Overcast,
            // -1 is "trace rain"
            -1 | 9..=12 => WeatherIcon::LightRain,
            13..=15 => WeatherIcon::HeavyRain,
            16..=21 => WeatherIcon::Sleet,
            22..=24 => WeatherIcon::LightSnow,
            25..=27 => WeatherIcon::HeavySnow,
            28..=30 => WeatherIcon::Thunder,
            _ => WeatherIcon::NotAvailable,
        }
    }
}

/// DataHub timestamps look like `2024-03-04T12:00Z`
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let utc = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
                .ok()
                .map(|naive| naive.and_utc())
        })?;
    Some(utc.with_timezone(&Local).naive_local())
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub features: Vec<ApiFeature>,
}

#[derive(Debug, Deserialize)]
pub struct ApiFeature {
    pub properties: ApiProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProperties {
    pub location: Option<ApiLocation>,
    #[serde(default)]
    pub time_series: Vec<ApiTimeStep>,
}

#[derive(Debug, Deserialize)]
pub struct ApiLocation {
    pub name: Option<String>,
}

/// Union of the fields used from the three-hourly and daily series
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTimeStep {
    pub time: String,
    pub significant_weather_code: Option<i32>,
    pub feels_like_temp: Option<f64>,
    pub prob_of_precipitation: Option<f64>,
    pub day_significant_weather_code: Option<i32>,
    pub day_max_feels_like_temp: Option<f64>,
    pub night_min_feels_like_temp: Option<f64>,
    pub day_probability_of_precipitation: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_lookup() {
        assert_eq!(WeatherIcon::from_code(0), WeatherIcon::ClearNight);
        assert_eq!(WeatherIcon::from_code(1), WeatherIcon::Sunny);
        assert_eq!(WeatherIcon::from_code(4), WeatherIcon::NotAvailable);
        assert_eq!(WeatherIcon::from_code(6), WeatherIcon::Mist);
        assert_eq!(WeatherIcon::from_code(12), WeatherIcon::LightRain);
        assert_eq!(WeatherIcon::from_code(15), WeatherIcon::HeavyRain);
        assert_eq!(WeatherIcon::from_code(21), WeatherIcon::Sleet);
        assert_eq!(WeatherIcon::from_code(27), WeatherIcon::HeavySnow);
        assert_eq!(WeatherIcon::from_code(30), WeatherIcon::Thunder);
        assert_eq!(WeatherIcon::from_code(31), WeatherIcon::NotAvailable);
    }

    #[test]
    fn test_parse_timestamp() {
        let short = parse_timestamp("2024-03-04T12:00Z").unwrap();
        let full = parse_timestamp("2024-03-04T12:00:00Z").unwrap();
        assert_eq!(short, full);
        assert!(parse_timestamp("yesterday").is_none());
    }
}

use super::models::{
    parse_timestamp, ApiResponse, ApiTimeStep, DailyForecast, Forecast, HourlyForecast,
};
use super::WeatherSource;
use crate::config::WeatherSettings;
use crate::error::{weather_error, InkResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

/// Met Office Weather DataHub site-specific forecast endpoint
pub const DATAHUB_BASE_URL: &str = "https://data.hub.api.metoffice.gov.uk/sitespecific/v0/point/";

/// Client for the DataHub site-specific API (360 calls per day on the free tier)
pub struct DataHubClient {
    client: Client,
    settings: WeatherSettings,
    base_url: String,
}

impl DataHubClient {
    pub fn new(settings: WeatherSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
            base_url: DATAHUB_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch(&self, endpoint: &str) -> InkResult<ApiResponse> {
        let mut url = Url::parse(&self.base_url)
            .and_then(|base| base.join(endpoint))
            .map_err(|e| weather_error(&format!("Failed to parse URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("latitude", &self.settings.latitude.to_string())
            .append_pair("longitude", &self.settings.longitude.to_string())
            .append_pair("includeLocationName", "true")
            .append_pair("excludeParameterMetadata", "false");

        debug!("Requesting {} forecast", endpoint);
        let response = self
            .client
            .get(url)
            .header("apikey", &self.settings.api_key)
            .send()
            .await
            .map_err(|e| weather_error(&format!("Failed to fetch forecast: {}", e)))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(weather_error(
                    "DataHub API key is invalid or expired. Check inkcal.toml and https://datahub.metoffice.gov.uk",
                ));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(weather_error(
                    "DataHub rate limit exceeded (360 requests/day). Try again later.",
                ));
            }
            status if !status.is_success() => {
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Could not read error response".to_string());
                return Err(weather_error(&format!("HTTP {} - {}", status, error_body)));
            }
            _ => {}
        }

        response
            .json()
            .await
            .map_err(|e| weather_error(&format!("Failed to parse forecast response: {}", e)))
    }
}

#[async_trait]
impl WeatherSource for DataHubClient {
    async fn fetch_forecast(&self) -> InkResult<Forecast> {
        let three_hourly = self.fetch("three-hourly").await?;
        let daily = self.fetch("daily").await?;

        let forecast = Forecast {
            location_name: location_name(&three_hourly),
            hourly: parse_three_hourly(&three_hourly)?,
            daily: parse_daily(&daily)?,
        };

        info!(
            "Weather forecast for {} fetched",
            forecast.location_name.as_deref().unwrap_or("unknown location")
        );
        Ok(forecast)
    }
}

fn location_name(response: &ApiResponse) -> Option<String> {
    response
        .features
        .first()
        .and_then(|f| f.properties.location.as_ref())
        .and_then(|l| l.name.clone())
}

fn time_series(response: &ApiResponse) -> InkResult<&[ApiTimeStep]> {
    response
        .features
        .first()
        .map(|f| f.properties.time_series.as_slice())
        .ok_or_else(|| weather_error("Forecast response has no features"))
}

fn timestamp(step: &ApiTimeStep) -> InkResult<chrono::NaiveDateTime> {
    parse_timestamp(&step.time)
        .ok_or_else(|| weather_error(&format!("Invalid forecast time '{}'", step.time)))
}

fn probability(value: Option<f64>) -> Option<u8> {
    value.map(|p| p.clamp(0.0, 100.0).round() as u8)
}

/// Parse the three-hourly series
pub fn parse_three_hourly(response: &ApiResponse) -> InkResult<Vec<HourlyForecast>> {
    time_series(response)?
        .iter()
        .map(|step| -> InkResult<HourlyForecast> {
            Ok(HourlyForecast {
                time: timestamp(step)?,
                weather_code: step
                    .significant_weather_code
                    .ok_or_else(|| weather_error("Missing significantWeatherCode"))?,
                feels_like_temp: step
                    .feels_like_temp
                    .ok_or_else(|| weather_error("Missing feelsLikeTemp"))?,
                precipitation_probability: probability(step.prob_of_precipitation),
            })
        })
        .collect()
}

/// Parse the daily series, skipping partial days (today once the daytime has passed)
pub fn parse_daily(response: &ApiResponse) -> InkResult<Vec<DailyForecast>> {
    time_series(response)?
        .iter()
        .filter_map(|step| step.day_significant_weather_code.map(|code| (step, code)))
        .map(|(step, weather_code)| -> InkResult<DailyForecast> {
            Ok(DailyForecast {
                time: timestamp(step)?,
                weather_code,
                max_feels_like_temp: step
                    .day_max_feels_like_temp
                    .ok_or_else(|| weather_error("Missing dayMaxFeelsLikeTemp"))?,
                min_feels_like_temp: step
                    .night_min_feels_like_temp
                    .ok_or_else(|| weather_error("Missing nightMinFeelsLikeTemp"))?,
                precipitation_probability: probability(step.day_probability_of_precipitation),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_HOURLY: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {
                "location": {"name": "Newcastle upon Tyne"},
                "timeSeries": [
                    {"time": "2024-03-04T12:00Z", "significantWeatherCode": 7,
                     "feelsLikeTemp": 5.25, "probOfPrecipitation": 12},
                    {"time": "2024-03-04T15:00Z", "significantWeatherCode": 12,
                     "feelsLikeTemp": 4.0}
                ]
            }
        }]
    }"#;

    const DAILY: &str = r#"{
        "features": [{
            "properties": {
                "timeSeries": [
                    {"time": "2024-03-04T00:00Z", "nightMinFeelsLikeTemp": 1.0},
                    {"time": "2024-03-05T00:00Z", "daySignificantWeatherCode": 3,
                     "dayMaxFeelsLikeTemp": 9.5, "nightMinFeelsLikeTemp": 2.5,
                     "dayProbabilityOfPrecipitation": 40}
                ]
            }
        }]
    }"#;

    #[test]
    fn test_parse_three_hourly() {
        let response: ApiResponse = serde_json::from_str(THREE_HOURLY).unwrap();
        let hourly = parse_three_hourly(&response).unwrap();

        assert_eq!(location_name(&response).as_deref(), Some("Newcastle upon Tyne"));
        assert_eq!(hourly.len(), 2);
        assert_eq!(hourly[0].weather_code, 7);
        assert_eq!(hourly[0].feels_like_temp, 5.25);
        assert_eq!(hourly[0].precipitation_probability, Some(12));
        assert_eq!(hourly[1].precipitation_probability, None);
    }

    #[test]
    fn test_parse_daily_skips_partial_days() {
        let response: ApiResponse = serde_json::from_str(DAILY).unwrap();
        let daily = parse_daily(&response).unwrap();

        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].weather_code, 3);
        assert_eq!(daily[0].max_feels_like_temp, 9.5);
        assert_eq!(daily[0].min_feels_like_temp, 2.5);
        assert_eq!(daily[0].precipitation_probability, Some(40));
    }

    #[test]
    fn test_empty_response_is_an_error() {
        let response: ApiResponse = serde_json::from_str(r#"{"features": []}"#).unwrap();
        assert!(parse_three_hourly(&response).is_err());
    }

    /// Serve a single canned response on a local port
    fn serve_once(status: u16, body: &'static str) -> String {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        std::thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let _ = request
                    .respond(tiny_http::Response::from_string(body).with_status_code(status));
            }
        });
        format!("http://127.0.0.1:{}/", port)
    }

    async fn fetch_with_status(status: u16, body: &'static str) -> crate::error::Error {
        let settings = WeatherSettings {
            latitude: 54.9,
            longitude: -1.6,
            api_key: "test-key".to_string(),
        };
        DataHubClient::new(settings)
            .with_base_url(serve_once(status, body))
            .fetch_forecast()
            .await
            .unwrap_err()
    }

    fn weather_message(err: crate::error::Error) -> String {
        match err {
            crate::error::Error::Weather(message) => message,
            other => panic!("expected a weather error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejected_api_key() {
        for status in [401, 403] {
            let message = weather_message(fetch_with_status(status, "denied").await);
            assert!(message.contains("invalid or expired"), "{}: {}", status, message);
        }
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let message = weather_message(fetch_with_status(429, "slow down").await);
        assert!(message.contains("rate limit"), "{}", message);
    }

    #[tokio::test]
    async fn test_other_status_includes_body() {
        let message = weather_message(fetch_with_status(500, "upstream broke").await);
        assert!(message.contains("HTTP 500"), "{}", message);
        assert!(message.contains("upstream broke"), "{}", message);
    }

    #[tokio::test]
    async fn test_success_with_bad_json_is_a_parse_error() {
        let message = weather_message(fetch_with_status(200, "not json").await);
        assert!(message.contains("Failed to parse forecast response"), "{}", message);
    }
}

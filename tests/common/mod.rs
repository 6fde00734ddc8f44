#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use inkcal::components::google_calendar::{CalendarEvent, EventWindow};
use inkcal::components::weather::{DailyForecast, Forecast, HourlyForecast};
use inkcal::components::{CalendarSource, WeatherSource};
use inkcal::error::{display_error, InkResult};
use inkcal::output::Panel;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Temp directory that is removed again when dropped
pub struct ScratchDir(PathBuf);

impl ScratchDir {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Deref for ScratchDir {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// Fresh scratch directory under the system temp dir
pub fn scratch_dir() -> ScratchDir {
    let dir = std::env::temp_dir().join(format!("inkcal-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    ScratchDir(dir)
}

/// Monday 4th March 2024, 08:00 local
pub fn now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()
}

pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn event(title: &str, start: NaiveDateTime) -> CalendarEvent {
    CalendarEvent {
        calendar: "primary".to_string(),
        title: title.to_string(),
        location: String::new(),
        start,
        end: start + chrono::Duration::hours(1),
        all_day: false,
    }
}

pub fn sample_events() -> Vec<CalendarEvent> {
    vec![
        event("Dentist", at(4, 10, 30)),
        event("Team standup", at(4, 14, 0)),
        CalendarEvent {
            all_day: true,
            end: at(6, 0, 0),
            ..event("Bin day", at(5, 0, 0))
        },
        event("Swimming", at(7, 18, 0)),
    ]
}

pub fn sample_forecast() -> Forecast {
    Forecast {
        location_name: Some("Newcastle upon Tyne".to_string()),
        hourly: (0..8)
            .map(|i| HourlyForecast {
                time: at(4, 6, 0) + chrono::Duration::hours(3 * i),
                weather_code: [1, 3, 7, 12, 15, 24, 30, 0][i as usize],
                feels_like_temp: 4.0 + i as f64,
                precipitation_probability: Some((i * 10) as u8),
            })
            .collect(),
        daily: (4..9)
            .map(|day| DailyForecast {
                time: at(day, 0, 0),
                weather_code: day as i32,
                max_feels_like_temp: 9.5,
                min_feels_like_temp: 1.2,
                precipitation_probability: Some(40),
            })
            .collect(),
    }
}

/// Calendar that hands back a fixed list, counting calls
pub struct MockCalendar {
    events: Vec<CalendarEvent>,
    pub requests: Mutex<Vec<Vec<String>>>,
}

impl MockCalendar {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CalendarSource for MockCalendar {
    async fn fetch_events(
        &self,
        names: &[String],
        _window: &EventWindow,
    ) -> InkResult<Vec<CalendarEvent>> {
        self.requests.lock().unwrap().push(names.to_vec());
        Ok(self.events.clone())
    }
}

pub struct MockWeather(pub Forecast);

#[async_trait]
impl WeatherSource for MockWeather {
    async fn fetch_forecast(&self) -> InkResult<Forecast> {
        Ok(self.0.clone())
    }
}

/// Panel that records what it was asked to do
#[derive(Default)]
pub struct MockPanel {
    pub calls: Vec<&'static str>,
    pub frames: Vec<(Vec<u8>, Vec<u8>)>,
    /// Fail the next `display` call, then behave again
    pub fail_next_display: bool,
}

impl MockPanel {
    pub fn failing_once() -> Self {
        Self {
            fail_next_display: true,
            ..Self::default()
        }
    }

    pub fn displays(&self) -> usize {
        self.frames.len()
    }
}

impl Panel for MockPanel {
    fn dimensions(&self) -> (u32, u32) {
        (880, 528)
    }

    fn init(&mut self) -> InkResult<()> {
        self.calls.push("init");
        Ok(())
    }

    fn clear(&mut self) -> InkResult<()> {
        self.calls.push("clear");
        Ok(())
    }

    fn display(&mut self, black: &[u8], red: &[u8]) -> InkResult<()> {
        self.calls.push("display");
        if std::mem::take(&mut self.fail_next_display) {
            return Err(display_error("SPI write failed"));
        }
        self.frames.push((black.to_vec(), red.to_vec()));
        Ok(())
    }

    fn sleep(&mut self) -> InkResult<()> {
        self.calls.push("sleep");
        Ok(())
    }
}

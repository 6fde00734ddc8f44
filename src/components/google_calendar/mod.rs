mod auth;
mod client;
pub mod models;
pub mod time;
pub mod token;

pub use client::{resolve_calendar_ids, GoogleCalendarClient, PRIMARY};
pub use models::{CalendarEvent, Day};

use crate::error::{google_calendar_error, InkResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// Maximum number of events requested per calendar
pub const MAX_RESULTS_PER_CALENDAR: u32 = 10;

/// Range of event start times to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub max_results: u32,
}

impl EventWindow {
    /// From `now` until the end of the day `days` days later
    pub fn looking_ahead(now: DateTime<Utc>, days: u32) -> InkResult<Self> {
        let end = now
            .checked_add_signed(Duration::days(i64::from(days) + 1))
            .ok_or_else(|| {
                google_calendar_error(&format!("Cannot look {} days ahead of {}", days, now))
            })?;
        Ok(Self {
            start: now,
            end,
            max_results: MAX_RESULTS_PER_CALENDAR,
        })
    }
}

/// Anything that can supply calendar events, the Google API in production
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Events of the named calendars inside `window`, sorted by start time
    async fn fetch_events(
        &self,
        names: &[String],
        window: &EventWindow,
    ) -> InkResult<Vec<CalendarEvent>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_covers_the_last_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        let window = EventWindow::looking_ahead(now, 7).unwrap();
        assert_eq!(window.start, now);
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 3, 12, 8, 0, 0).unwrap());
        assert_eq!(window.max_results, MAX_RESULTS_PER_CALENDAR);
    }

    #[test]
    fn test_window_past_the_end_of_time_is_an_error() {
        let err = EventWindow::looking_ahead(DateTime::<Utc>::MAX_UTC, 1).unwrap_err();
        assert!(matches!(err, crate::error::Error::GoogleCalendar(_)));
    }
}

use super::models::{ApiEvent, ApiEventTime, CalendarEvent, Day};
use crate::error::{google_calendar_error, InkResult};
use crate::utils::time::day_label;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Parse an event start or end into local wall-clock time.
///
/// Returns the time and whether the API gave a bare date (an all-day boundary).
pub fn parse_event_time(time: &ApiEventTime) -> InkResult<(NaiveDateTime, bool)> {
    if let Some(date_time) = &time.date_time {
        if let Ok(dt) = DateTime::parse_from_rfc3339(date_time) {
            return Ok((dt.with_timezone(&Local).naive_local(), false));
        }
        // Fall back to the wall-clock part when the offset is missing or malformed
        let wall = date_time.get(..19).unwrap_or(date_time);
        let dt = NaiveDateTime::parse_from_str(wall, "%Y-%m-%dT%H:%M:%S")
            .map_err(|e| google_calendar_error(&format!("Failed to parse datetime: {}", e)))?;
        Ok((dt, false))
    } else if let Some(date) = &time.date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| google_calendar_error(&format!("Failed to parse date: {}", e)))?;
        Ok((date.and_time(NaiveTime::MIN), true))
    } else {
        Err(google_calendar_error("Event has neither date nor dateTime"))
    }
}

/// Google has no all-day flag on timed events, they simply run from midnight to midnight
pub fn spans_whole_days(start: &NaiveDateTime, end: &NaiveDateTime) -> bool {
    start.time() == NaiveTime::MIN && end.time() == NaiveTime::MIN
}

/// Convert an API event into our representation
pub fn to_calendar_event(calendar: &str, event: &ApiEvent) -> InkResult<CalendarEvent> {
    let (start, start_is_date) = parse_event_time(&event.start)?;
    let (end, end_is_date) = parse_event_time(&event.end)?;

    Ok(CalendarEvent {
        calendar: calendar.to_string(),
        title: event
            .summary
            .clone()
            .unwrap_or_else(|| "No summary".to_string()),
        location: event.location.clone().unwrap_or_default(),
        start,
        end,
        all_day: (start_is_date && end_is_date) || spans_whole_days(&start, &end),
    })
}

/// Group events sorted by start time into days.
///
/// Stops at the first day that starts more than `days_ahead` days after `now`.
pub fn events_to_days(events: &[CalendarEvent], now: NaiveDateTime, days_ahead: i64) -> Vec<Day> {
    let mut days: Vec<Day> = Vec::new();

    for event in events {
        let date = event.start.date();
        match days.last_mut() {
            Some(day) if day.date == date => day.events.push(event.clone()),
            _ => {
                if (event.start - now).num_days() > days_ahead {
                    break;
                }
                days.push(Day {
                    date,
                    label: day_label(date, now.date()),
                    events: vec![event.clone()],
                });
            }
        }
    }

    days
}

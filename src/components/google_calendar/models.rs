use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A calendar event as the rest of inkcal sees it, times in local wall-clock time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Calendar name as given on the command line
    pub calendar: String,
    pub title: String,
    pub location: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
}

/// Events that start on the same date, with the label shown above them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Day {
    pub date: NaiveDate,
    pub label: String,
    pub events: Vec<CalendarEvent>,
}

/// Entry of `calendarList.list`
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarListEntry {
    pub id: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarList {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
}

/// Start or end of an event. All-day events carry `date`, timed events `dateTime`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date: Option<String>,
    pub date_time: Option<String>,
}

/// Entry of `events.list`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEvent {
    pub summary: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub start: ApiEventTime,
    #[serde(default)]
    pub end: ApiEventTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiEventList {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
}

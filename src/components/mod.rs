// Export components
pub mod cache;
pub mod google_calendar;
pub mod weather;

// Re-export the data source seams
pub use google_calendar::{CalendarSource, GoogleCalendarClient};
pub use weather::{DataHubClient, WeatherSource};

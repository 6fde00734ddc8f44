use super::models::{ApiEvent, ApiEventList, CalendarEvent, CalendarList, CalendarListEntry};
use super::time::to_calendar_event;
use super::token::Authenticator;
use super::{CalendarSource, EventWindow};
use crate::config::AppPaths;
use crate::error::{google_calendar_error, InkResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

const API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Calendar ID understood by the API as the user's main calendar
pub const PRIMARY: &str = "primary";

/// Map calendar names to IDs.
///
/// `primary` passes through untouched; other names are matched against the calendar
/// summaries. Unknown names are skipped with a warning.
pub fn resolve_calendar_ids(
    names: &[String],
    calendars: &[CalendarListEntry],
) -> Vec<(String, String)> {
    let mut resolved = Vec::new();

    for name in names {
        if name == PRIMARY {
            resolved.push((name.clone(), PRIMARY.to_string()));
            continue;
        }
        match calendars.iter().find(|c| &c.summary == name) {
            Some(entry) => resolved.push((name.clone(), entry.id.clone())),
            None => warn!("No calendar named '{}' in this account", name),
        }
    }

    resolved
}

/// Google Calendar REST client holding an authenticated access token
pub struct GoogleCalendarClient {
    client: Client,
    access_token: String,
    list_calendar_ids: bool,
}

impl GoogleCalendarClient {
    /// Authenticate, interactively if needed and possible, and build a client
    pub async fn connect(paths: &AppPaths) -> InkResult<Self> {
        let client = Client::new();
        let token = Authenticator::new(paths.clone(), client.clone())
            .authenticate()
            .await?;

        Ok(Self {
            client,
            access_token: token.access_token,
            list_calendar_ids: false,
        })
    }

    /// Log every calendar ID in the account while resolving names
    pub fn with_calendar_listing(mut self, enabled: bool) -> Self {
        self.list_calendar_ids = enabled;
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> InkResult<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse response: {}", e)))
    }

    async fn list_calendars(&self) -> InkResult<Vec<CalendarListEntry>> {
        let url = Url::parse(&format!("{}/users/me/calendarList", API_BASE))
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        let list: CalendarList = self.get_json(url).await?;
        Ok(list.items)
    }

    async fn list_events(&self, calendar_id: &str, window: &EventWindow) -> InkResult<Vec<ApiEvent>> {
        let mut url = Url::parse(API_BASE)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API URL cannot be a base"))?
            .extend(["calendars", calendar_id, "events"]);

        url.query_pairs_mut()
            .append_pair("timeMin", &window.start.to_rfc3339())
            .append_pair("timeMax", &window.end.to_rfc3339())
            .append_pair("maxResults", &window.max_results.to_string())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        let list: ApiEventList = self.get_json(url).await?;
        Ok(list.items)
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    async fn fetch_events(
        &self,
        names: &[String],
        window: &EventWindow,
    ) -> InkResult<Vec<CalendarEvent>> {
        let calendars = self.list_calendars().await?;
        if self.list_calendar_ids {
            info!("Calendar IDs in account:");
            for calendar in &calendars {
                info!("  {} ({})", calendar.id, calendar.summary);
            }
        }

        let mut events = Vec::new();
        for (name, id) in resolve_calendar_ids(names, &calendars) {
            let items = self.list_events(&id, window).await?;
            debug!("Fetched {} events from calendar '{}'", items.len(), name);
            for item in &items {
                events.push(to_calendar_event(&name, item)?);
            }
        }

        events.sort_by(|a, b| a.start.cmp(&b.start));
        Ok(events)
    }
}

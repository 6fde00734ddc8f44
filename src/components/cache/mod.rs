//! Change detection between runs.
//!
//! The fetched events are written to a snapshot file as a header line followed by sorted
//! JSON Lines, one per event. A run whose canonical form is byte-identical to the
//! previous snapshot reports `Unchanged`, which lets the caller skip refreshing the panel.

use crate::components::google_calendar::CalendarEvent;
use crate::error::InkResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// First line of every snapshot
const SNAPSHOT_HEADER: &str = "inkcal-snapshot v1";

/// Why a run counts as changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    NoSnapshot,
    Differs,
    Unreadable,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Changed(ChangeReason),
    Unchanged,
}

impl CacheStatus {
    pub fn is_changed(&self) -> bool {
        matches!(self, CacheStatus::Changed(_))
    }
}

/// One line of the snapshot. Field order here is the serialized field order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
struct SnapshotRecord {
    calendar: String,
    start: String,
    end: String,
    title: String,
    location: String,
    all_day: bool,
}

impl From<&CalendarEvent> for SnapshotRecord {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            calendar: event.calendar.clone(),
            start: event.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            end: event.end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            title: event.title.clone(),
            location: event.location.clone(),
            all_day: event.all_day,
        }
    }
}

/// Deterministic text form of an event set.
///
/// Records sort by calendar, then start, then the remaining fields, so any input
/// ordering of the same events yields the same bytes.
pub fn canonicalize(events: &[CalendarEvent]) -> InkResult<String> {
    let mut records: Vec<SnapshotRecord> = events.iter().map(SnapshotRecord::from).collect();
    records.sort();

    let mut out = format!("{}\n", SNAPSHOT_HEADER);
    for record in &records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Whether `content` is something `canonicalize` could have written
fn is_well_formed(content: &str) -> bool {
    let mut lines = content.lines();
    lines.next() == Some(SNAPSHOT_HEADER)
        && content.ends_with('\n')
        && lines.all(|line| serde_json::from_str::<SnapshotRecord>(line).is_ok())
}

/// Snapshot file plus the optional maximum age of a matching snapshot
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
    max_age: Option<Duration>,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_age: None,
        }
    }

    /// Report a matching snapshot as changed once it is older than `max_age`
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    /// Compare `events` with the previous snapshot without touching the file.
    ///
    /// Never fails because of the previous snapshot: a missing, unreadable or corrupt
    /// file counts as changed.
    pub fn check(&self, events: &[CalendarEvent]) -> InkResult<CacheStatus> {
        let current = canonicalize(events)?;

        let status = match fs::read_to_string(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No snapshot at {}", self.path.display());
                CacheStatus::Changed(ChangeReason::NoSnapshot)
            }
            Err(e) => {
                warn!("Error whilst reading cache {}: {}", self.path.display(), e);
                CacheStatus::Changed(ChangeReason::Unreadable)
            }
            Ok(previous) if previous == current => {
                if self.is_expired() {
                    CacheStatus::Changed(ChangeReason::Expired)
                } else {
                    CacheStatus::Unchanged
                }
            }
            Ok(previous) if !is_well_formed(&previous) => {
                warn!("Cache {} is corrupt, ignoring it", self.path.display());
                CacheStatus::Changed(ChangeReason::Unreadable)
            }
            Ok(_) => CacheStatus::Changed(ChangeReason::Differs),
        };

        match status {
            CacheStatus::Unchanged => info!("Fetched data is the same as cached data"),
            CacheStatus::Changed(reason) => info!("Fetched data changed ({:?})", reason),
        }
        Ok(status)
    }

    /// Store `events` as the new snapshot. A failed write is only logged.
    pub fn commit(&self, events: &[CalendarEvent]) -> InkResult<()> {
        let current = canonicalize(events)?;
        match self.write(&current) {
            Ok(()) => debug!("Updated cache {}", self.path.display()),
            Err(e) => warn!("Could not write cache {}: {}", self.path.display(), e),
        }
        Ok(())
    }

    /// `check`, then `commit` when the events changed
    pub fn check_and_update(&self, events: &[CalendarEvent]) -> InkResult<CacheStatus> {
        let status = self.check(events)?;
        if status.is_changed() {
            self.commit(events)?;
        }
        Ok(status)
    }

    fn is_expired(&self) -> bool {
        let Some(max_age) = self.max_age else {
            return false;
        };
        fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .map(|age| age > max_age)
            // Unknown age: refresh to be safe
            .unwrap_or(true)
    }

    fn write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, content)
    }
}

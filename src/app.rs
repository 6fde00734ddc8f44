use crate::cli::Args;
use crate::components::cache::{CacheStatus, SnapshotCache};
use crate::components::google_calendar::time::events_to_days;
use crate::components::google_calendar::{CalendarSource, EventWindow};
use crate::components::weather::WeatherSource;
use crate::error::InkResult;
use crate::output::OutputSink;
use crate::render::{render_frame, RenderSurface};
use chrono::{DateTime, Local, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// What a run has to fetch and how it decides whether to redraw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub calendars: Vec<String>,
    pub days: u32,
    pub cache: Option<PathBuf>,
    pub cache_max_age: Option<Duration>,
}

impl From<&Args> for RunOptions {
    fn from(args: &Args) -> Self {
        Self {
            calendars: args.calendars.clone(),
            days: args.days,
            cache: args.cache.clone(),
            cache_max_age: args.cache_max_age(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Presented,
    /// Events matched the snapshot so the panel was left alone
    Skipped,
}

/// Fetch, compare against the snapshot, render and present one frame
pub async fn run(
    options: &RunOptions,
    calendar: &dyn CalendarSource,
    weather: Option<&dyn WeatherSource>,
    sink: &mut dyn OutputSink,
    now: DateTime<Local>,
) -> InkResult<Outcome> {
    let window = EventWindow::looking_ahead(now.with_timezone(&Utc), options.days)?;
    let mut events = calendar.fetch_events(&options.calendars, &window).await?;
    events.sort_by(|a, b| a.start.cmp(&b.start));
    info!("Fetched {} events", events.len());

    let forecast = match weather {
        Some(source) => Some(source.fetch_forecast().await?),
        None => None,
    };

    let cache = options
        .cache
        .as_ref()
        .map(|path| SnapshotCache::new(path).with_max_age(options.cache_max_age));
    let status = match &cache {
        Some(cache) => Some(cache.check(&events)?),
        None => None,
    };
    match status {
        Some(CacheStatus::Unchanged) if sink.is_hardware() => {
            info!("Events unchanged since the last refresh, leaving the panel alone");
            return Ok(Outcome::Skipped);
        }
        Some(CacheStatus::Unchanged) => debug!("Events unchanged, writing files anyway"),
        Some(CacheStatus::Changed(reason)) => info!("Refreshing: {:?}", reason),
        None => {}
    }

    let today = now.naive_local();
    let days = events_to_days(&events, today, i64::from(options.days));
    let (width, height) = sink.dimensions();
    debug!("Rendering {} days at {}x{}", days.len(), width, height);
    let surface = render_frame(width, height, &days, forecast.as_ref(), today);

    sink.present(&surface)?;

    // Only a frame that actually reached the sink becomes the new baseline
    if let (Some(cache), Some(status)) = (&cache, status) {
        if status.is_changed() {
            cache.commit(&events)?;
        }
    }
    Ok(Outcome::Presented)
}

/// Present a pre-rendered pair of plane images
pub fn show_images(black: &Path, red: &Path, sink: &mut dyn OutputSink) -> InkResult<Outcome> {
    info!("Showing {} and {}", black.display(), red.display());
    let surface = RenderSurface::open(black, red)?;
    sink.present(&surface)?;
    Ok(Outcome::Presented)
}

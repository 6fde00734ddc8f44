use crate::components::google_calendar::PRIMARY;
use crate::render::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Longest agenda the calendar window is asked for
pub const MAX_DAYS_AHEAD: i64 = 366;
/// Ten years
pub const MAX_CACHE_HOURS: u64 = 24 * 366 * 10;

/// Draw upcoming calendar events and the weather onto a black/red e-ink panel
#[derive(Debug, Clone, Parser)]
#[command(name = "inkcal", version, about)]
pub struct Args {
    /// Calendars to show, comma separated. "primary" is the account's main calendar
    #[arg(short, long, value_delimiter = ',', default_value = PRIMARY)]
    pub calendars: Vec<String>,

    /// Write <OUTPUT>-b.png and <OUTPUT>-r.png instead of driving the panel
    #[arg(short, long, value_name = "PREFIX")]
    pub output: Option<String>,

    /// Skip the panel refresh when the events match this snapshot file
    #[arg(long, value_name = "PATH")]
    pub cache: Option<PathBuf>,

    /// Refresh anyway once the snapshot is older than this many hours
    #[arg(
        long,
        value_name = "HOURS",
        requires = "cache",
        value_parser = clap::value_parser!(u64).range(1..=MAX_CACHE_HOURS)
    )]
    pub cache_hours: Option<u64>,

    /// Don't blank the panel before drawing
    #[arg(long)]
    pub no_clear: bool,

    /// Leave the weather strip empty and don't call the forecast API
    #[arg(long)]
    pub no_weather: bool,

    /// Show this black plane image instead of rendering
    #[arg(short, long, value_name = "BLACK_PNG", requires = "red_input")]
    pub input: Option<PathBuf>,

    /// Red plane image to go with --input
    #[arg(short, long, value_name = "RED_PNG", requires = "input")]
    pub red_input: Option<PathBuf>,

    /// Debug logging and a dump of the account's calendar IDs
    #[arg(short, long)]
    pub verbose: bool,

    /// Frame width in file mode
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: u32,

    /// Frame height in file mode
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u32,

    /// How many days ahead to list events for
    #[arg(
        short,
        long,
        default_value_t = 7,
        value_parser = clap::value_parser!(u32).range(1..=MAX_DAYS_AHEAD)
    )]
    pub days: u32,
}

impl Args {
    pub fn cache_max_age(&self) -> Option<Duration> {
        self.cache_hours
            .map(|hours| Duration::from_secs(hours.saturating_mul(60 * 60)))
    }

    /// Both halves of a pre-rendered frame, when given
    pub fn input_images(&self) -> Option<(PathBuf, PathBuf)> {
        match (&self.input, &self.red_input) {
            (Some(black), Some(red)) => Some((black.clone(), red.clone())),
            _ => None,
        }
    }
}

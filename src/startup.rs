use crate::app::{self, Outcome, RunOptions};
use crate::cli::Args;
use crate::components::{DataHubClient, GoogleCalendarClient, WeatherSource};
use crate::config::{AppPaths, Config};
use crate::error::{Error, InkResult};
use crate::output::{FileSink, OutputSink};
use chrono::Local;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn";
const VERBOSE_FILTER: &str = "debug";

/// Initialize logging; RUST_LOG wins over the verbosity flag
pub fn init_logging(verbose: bool) -> miette::Result<()> {
    let fallback = if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the settings file, or skip it entirely when the weather is off
pub fn load_config(paths: AppPaths, with_weather: bool) -> miette::Result<Config> {
    if !with_weather {
        return Ok(Config::without_weather(paths));
    }
    match Config::load(paths) {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// File sink with `--output`, the panel otherwise
pub fn build_sink(args: &Args) -> InkResult<Box<dyn OutputSink>> {
    match &args.output {
        Some(prefix) => Ok(Box::new(FileSink::new(
            prefix.clone(),
            args.width,
            args.height,
        ))),
        None => panel_sink(args),
    }
}

#[cfg(feature = "epd")]
fn panel_sink(args: &Args) -> InkResult<Box<dyn OutputSink>> {
    use crate::output::epd::Epd7in5bHd;
    use crate::output::PanelSink;

    let sink = PanelSink::new(Epd7in5bHd::open()?);
    Ok(if args.no_clear {
        Box::new(sink.without_clear())
    } else {
        Box::new(sink)
    })
}

#[cfg(not(feature = "epd"))]
fn panel_sink(_args: &Args) -> InkResult<Box<dyn OutputSink>> {
    Err(crate::error::display_error(
        "This build has no e-ink driver. Pass --output to write PNG files, or rebuild with --features epd",
    ))
}

/// Everything after argument parsing and logging
pub async fn run(args: Args) -> miette::Result<()> {
    let mut sink = build_sink(&args)?;

    if let Some((black, red)) = args.input_images() {
        app::show_images(&black, &red, sink.as_mut())?;
        return Ok(());
    }

    let config = load_config(AppPaths::from_env(), !args.no_weather)?;

    let calendar = GoogleCalendarClient::connect(&config.paths)
        .await?
        .with_calendar_listing(args.verbose);
    let weather = config.weather.clone().map(DataHubClient::new);

    let outcome = app::run(
        &RunOptions::from(&args),
        &calendar,
        weather.as_ref().map(|w| w as &dyn WeatherSource),
        sink.as_mut(),
        Local::now(),
    )
    .await?;

    if outcome == Outcome::Skipped {
        info!("Nothing to do");
    }
    Ok(())
}

use clap::Parser;
use inkcal::cli::Args;
use inkcal::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let args = Args::parse();

    // Initialize logging
    startup::init_logging(args.verbose)?;

    info!("Starting inkcal");

    startup::run(args).await
}

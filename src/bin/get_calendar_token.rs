use inkcal::components::google_calendar::token::Authenticator;
use inkcal::config::AppPaths;
use inkcal::startup;

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging(false)?;

    let paths = AppPaths::from_env();
    println!(
        "Authorizing Google Calendar access with {}",
        paths.credentials_file().display()
    );
    println!("A browser window will open; approve the request to continue.");

    let token = Authenticator::new(paths.clone(), reqwest::Client::new())
        .interactive(true)
        .reauthorize()
        .await?;

    println!("Token saved to {}", paths.token_file().display());
    if token.refresh_token.is_none() {
        println!("Warning: Google did not return a refresh token, so this device will need to authorize again when it expires.");
    }

    Ok(())
}

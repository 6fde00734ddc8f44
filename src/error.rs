use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(inkcal::config),
        help("Edit inkcal.toml in the inkcal directory and run again")
    )]
    Config(String),

    #[error("Authentication error: {0}")]
    #[diagnostic(
        code(inkcal::auth),
        help("Run get_calendar_token on a machine with a browser, then copy token.json over")
    )]
    Auth(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(inkcal::google_calendar))]
    GoogleCalendar(String),

    #[error("Weather API error: {0}")]
    #[diagnostic(code(inkcal::weather))]
    Weather(String),

    #[error("Display error: {0}")]
    #[diagnostic(code(inkcal::display))]
    Display(String),

    #[error(transparent)]
    #[diagnostic(code(inkcal::io))]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    #[diagnostic(code(inkcal::image))]
    Image(#[from] image::ImageError),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(inkcal::http))]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(inkcal::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(inkcal::other))]
    Other(String),
}

// Implement From for TOML serialization errors
impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type InkResult<T> = Result<T, Error>;

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create weather errors
pub fn weather_error(message: &str) -> Error {
    Error::Weather(message.to_string())
}

/// Helper to create display errors
pub fn display_error(message: &str) -> Error {
    Error::Display(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}

use crate::error::{config_error, InkResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the settings file inside the inkcal directory
pub const CONFIG_FILE: &str = "inkcal.toml";
/// Google "installed application" client secret, downloaded from the Cloud console
pub const CREDENTIALS_FILE: &str = "credentials.json";
/// OAuth token written by the calendar client
pub const TOKEN_FILE: &str = "token.json";

/// API key written into a freshly created config file
pub const PLACEHOLDER_API_KEY: &str = "00000000-0000-0000-0000-000000000000";

/// Where inkcal keeps its long-lived files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub base_dir: PathBuf,
}

impl AppPaths {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolve the base directory from `INKCAL_DIR`, falling back to the working directory
    pub fn from_env() -> Self {
        // Load .env file if it exists
        dotenv().ok();

        let base_dir = env::var("INKCAL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        Self { base_dir }
    }

    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.base_dir.join(CREDENTIALS_FILE)
    }

    pub fn token_file(&self) -> PathBuf {
        self.base_dir.join(TOKEN_FILE)
    }
}

/// Location and key for the Met Office DataHub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSettings {
    pub latitude: f64,
    pub longitude: f64,
    pub api_key: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            latitude: 54.9755153,
            longitude: -1.6222127,
            api_key: PLACEHOLDER_API_KEY.to_string(),
        }
    }
}

impl WeatherSettings {
    /// Reject values that cannot be sent to the forecast API
    pub fn validate(&self) -> InkResult<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(config_error(&format!(
                "latitude {} is out of range",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(config_error(&format!(
                "longitude {} is out of range",
                self.longitude
            )));
        }
        let key = self.api_key.trim();
        if key.is_empty() || key == PLACEHOLDER_API_KEY {
            return Err(config_error(
                "weather.api_key is not set. Get a key from https://datahub.metoffice.gov.uk",
            ));
        }
        Ok(())
    }
}

/// On-disk layout of inkcal.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    weather: WeatherSettings,
}

/// Main configuration structure, read once at startup and handed to each component
#[derive(Debug, Clone)]
pub struct Config {
    pub paths: AppPaths,
    /// None when the weather forecast is disabled
    pub weather: Option<WeatherSettings>,
}

impl Config {
    /// Configuration for a run that does not draw the weather
    pub fn without_weather(paths: AppPaths) -> Self {
        Self {
            paths,
            weather: None,
        }
    }

    /// Load and validate the settings file, creating a placeholder if it is missing
    pub fn load(paths: AppPaths) -> InkResult<Self> {
        let path = paths.config_file();

        if !path.exists() {
            write_placeholder(&path)?;
            return Err(config_error(&format!(
                "{} created. Fill it in and retry.",
                path.display()
            )));
        }

        debug!("Reading configuration from {}", path.display());
        let content = fs::read_to_string(&path)?;
        let file: ConfigFile = toml::from_str(&content).map_err(|e| {
            config_error(&format!("{} is in an incorrect format: {}", path.display(), e))
        })?;

        file.weather.validate()?;

        Ok(Config {
            paths,
            weather: Some(file.weather),
        })
    }
}

/// Write the default settings so the user has something to edit
fn write_placeholder(path: &Path) -> InkResult<()> {
    // Create config directory if it doesn't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let toml_str = toml::to_string(&ConfigFile::default())?;
    fs::write(path, toml_str)?;
    info!("Wrote placeholder configuration to {}", path.display());

    Ok(())
}

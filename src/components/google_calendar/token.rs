use super::auth::run_interactive_flow;
use crate::config::AppPaths;
use crate::error::{auth_error, InkResult};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Read-only access to the user's calendars
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Seconds of validity an access token must have left to be used as-is
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth token persisted in token.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp after which the access token is no longer accepted
    pub expires_at: i64,
}

/// Client id and secret of the "installed application" from credentials.json
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn load(path: &Path) -> InkResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            auth_error(&format!(
                "Cannot read {}: {}. Download the OAuth client file from the Google Cloud console",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> InkResult<Self> {
        let file: ClientSecretsFile = serde_json::from_str(content)
            .map_err(|e| auth_error(&format!("credentials.json is malformed: {}", e)))?;
        file.installed
            .or(file.web)
            .ok_or_else(|| auth_error("credentials.json has no 'installed' or 'web' section"))
    }
}

/// Token endpoint response for both code exchange and refresh
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Turn a response into a stored token, keeping the old refresh token if none was issued
    pub fn into_stored(self, previous_refresh: Option<String>, now: i64) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: now + self.expires_in.unwrap_or(3600),
        }
    }
}

/// What a saved token is good for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Valid,
    Refreshable,
    Unusable,
}

impl StoredToken {
    pub fn status(&self, now: i64) -> TokenStatus {
        if self.expires_at > now + EXPIRY_MARGIN_SECS {
            TokenStatus::Valid
        } else if self.refresh_token.is_some() {
            TokenStatus::Refreshable
        } else {
            TokenStatus::Unusable
        }
    }
}

/// Reads and writes token.json
#[derive(Debug, Clone)]
pub struct TokenStore {
    paths: AppPaths,
}

impl TokenStore {
    pub fn new(paths: AppPaths) -> Self {
        Self { paths }
    }

    /// A missing or unparseable file is treated as "no token"
    pub fn load(&self) -> Option<StoredToken> {
        let path = self.paths.token_file();
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Ignoring unreadable token file {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, token: &StoredToken) -> InkResult<()> {
        let path = self.paths.token_file();
        fs::write(&path, serde_json::to_string_pretty(token)?)?;
        debug!("Saved OAuth token to {}", path.display());
        Ok(())
    }
}

/// Progress of authenticating against Google
#[derive(Debug, Clone)]
pub enum AuthState {
    Unauthenticated,
    InteractiveAuthRequired,
    Authenticated(StoredToken),
}

/// Drives `AuthState` from `Unauthenticated` to `Authenticated`
pub struct Authenticator {
    paths: AppPaths,
    store: TokenStore,
    client: Client,
    allow_interactive: bool,
}

impl Authenticator {
    pub fn new(paths: AppPaths, client: Client) -> Self {
        Self {
            store: TokenStore::new(paths.clone()),
            paths,
            client,
            allow_interactive: browser_available(),
        }
    }

    /// Override whether the browser step may run
    pub fn interactive(mut self, allow: bool) -> Self {
        self.allow_interactive = allow;
        self
    }

    /// Advance the state machine by one step
    pub async fn step(&self, state: AuthState) -> InkResult<AuthState> {
        match state {
            AuthState::Unauthenticated => {
                let Some(token) = self.store.load() else {
                    info!("No saved Google token");
                    return Ok(AuthState::InteractiveAuthRequired);
                };

                match token.status(Utc::now().timestamp()) {
                    TokenStatus::Valid => Ok(AuthState::Authenticated(token)),
                    TokenStatus::Refreshable => match self.refresh(&token).await {
                        Ok(token) => Ok(AuthState::Authenticated(token)),
                        Err(e) => {
                            warn!("Token refresh failed: {}", e);
                            Ok(AuthState::InteractiveAuthRequired)
                        }
                    },
                    TokenStatus::Unusable => Ok(AuthState::InteractiveAuthRequired),
                }
            }
            AuthState::InteractiveAuthRequired => {
                if !self.allow_interactive {
                    return Err(auth_error(
                        "No usable Google token and no browser available on this machine",
                    ));
                }
                let secrets = ClientSecrets::load(&self.paths.credentials_file())?;
                let token = run_interactive_flow(&secrets, &self.client).await?;
                self.store.save(&token)?;
                Ok(AuthState::Authenticated(token))
            }
            AuthState::Authenticated(token) => Ok(AuthState::Authenticated(token)),
        }
    }

    /// Run the state machine until a token is available
    pub async fn authenticate(&self) -> InkResult<StoredToken> {
        let mut state = AuthState::Unauthenticated;
        loop {
            state = match self.step(state).await? {
                AuthState::Authenticated(token) => return Ok(token),
                next => next,
            };
        }
    }

    /// Skip the saved token and go straight to the browser step
    pub async fn reauthorize(&self) -> InkResult<StoredToken> {
        match self.step(AuthState::InteractiveAuthRequired).await? {
            AuthState::Authenticated(token) => Ok(token),
            _ => Err(auth_error("Interactive authorization did not produce a token")),
        }
    }

    /// Refresh an expired token
    async fn refresh(&self, token: &StoredToken) -> InkResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or_else(|| auth_error("No refresh token in token data"))?;
        let secrets = ClientSecrets::load(&self.paths.credentials_file())?;

        info!("Refreshing Google access token");
        let params = [
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(&secrets.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let new_token: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        let stored = new_token.into_stored(Some(refresh_token), Utc::now().timestamp());
        self.store.save(&stored)?;
        Ok(stored)
    }
}

/// Whether a browser can plausibly be opened from this process
pub fn browser_available() -> bool {
    if cfg!(target_os = "linux") {
        env::var_os("DISPLAY").is_some() || env::var_os("WAYLAND_DISPLAY").is_some()
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_at: i64, refresh: Option<&str>) -> StoredToken {
        StoredToken {
            access_token: "access".to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_at,
        }
    }

    #[test]
    fn test_token_status() {
        let now = 1_700_000_000;
        assert_eq!(token(now + 3600, None).status(now), TokenStatus::Valid);
        assert_eq!(
            token(now - 10, Some("refresh")).status(now),
            TokenStatus::Refreshable
        );
        // About to expire counts as expired
        assert_eq!(
            token(now + 30, Some("refresh")).status(now),
            TokenStatus::Refreshable
        );
        assert_eq!(token(now - 10, None).status(now), TokenStatus::Unusable);
    }

    #[test]
    fn test_refresh_keeps_previous_refresh_token() {
        let response = TokenResponse {
            access_token: "new".to_string(),
            refresh_token: None,
            expires_in: Some(100),
        };
        let stored = response.into_stored(Some("old-refresh".to_string()), 1000);
        assert_eq!(stored.access_token, "new");
        assert_eq!(stored.refresh_token.as_deref(), Some("old-refresh"));
        assert_eq!(stored.expires_at, 1100);
    }

    #[test]
    fn test_client_secrets_parse() {
        let installed = r#"{"installed":{"client_id":"id","client_secret":"secret",
            "auth_uri":"https://accounts.google.com/o/oauth2/auth",
            "token_uri":"https://oauth2.googleapis.com/token"}}"#;
        let secrets = ClientSecrets::parse(installed).unwrap();
        assert_eq!(secrets.client_id, "id");

        let web = r#"{"web":{"client_id":"w","client_secret":"s"}}"#;
        let secrets = ClientSecrets::parse(web).unwrap();
        assert_eq!(secrets.token_uri, "https://oauth2.googleapis.com/token");

        assert!(ClientSecrets::parse(r#"{"other":{}}"#).is_err());
    }

    #[test]
    fn test_token_store_round_trip_and_corruption() {
        let dir = env::temp_dir().join(format!("inkcal-token-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let store = TokenStore::new(AppPaths::new(&dir));

        assert!(store.load().is_none());

        let saved = token(42, Some("refresh"));
        store.save(&saved).unwrap();
        assert_eq!(store.load(), Some(saved));

        fs::write(dir.join("token.json"), "not json").unwrap();
        assert!(store.load().is_none());

        fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn test_headless_without_token_fails() {
        let dir = env::temp_dir().join(format!("inkcal-auth-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let auth = Authenticator::new(AppPaths::new(&dir), Client::new()).interactive(false);

        let state = auth.step(AuthState::Unauthenticated).await.unwrap();
        assert!(matches!(state, AuthState::InteractiveAuthRequired));

        let err = auth.authenticate().await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Auth(_)));

        fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn test_valid_saved_token_is_used_silently() {
        let dir = env::temp_dir().join(format!("inkcal-auth-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let paths = AppPaths::new(&dir);
        let saved = token(Utc::now().timestamp() + 3600, Some("refresh"));
        TokenStore::new(paths.clone()).save(&saved).unwrap();

        let auth = Authenticator::new(paths, Client::new()).interactive(false);
        assert_eq!(auth.authenticate().await.unwrap(), saved);

        fs::remove_dir_all(dir).unwrap();
    }
}

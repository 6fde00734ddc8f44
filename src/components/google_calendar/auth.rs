use super::token::{ClientSecrets, StoredToken, TokenResponse, CALENDAR_SCOPE};
use crate::error::{auth_error, InkResult};
use chrono::Utc;
use reqwest::Client;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

const CALLBACK_PAGE: &str = "Authorization complete. You can close this window.";

/// Build the consent URL the user is sent to
pub fn authorization_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    state: &str,
) -> InkResult<Url> {
    let mut url = Url::parse(&secrets.auth_uri)
        .map_err(|e| auth_error(&format!("Invalid auth_uri in credentials.json: {}", e)))?;

    url.query_pairs_mut()
        .append_pair("client_id", &secrets.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("scope", CALENDAR_SCOPE)
        .append_pair("state", state);

    Ok(url)
}

/// Extract the authorization code from the redirect request path
pub fn parse_callback(request_path: &str, expected_state: &str) -> InkResult<String> {
    let url = Url::parse(&format!("http://127.0.0.1{}", request_path))
        .map_err(|e| auth_error(&format!("Malformed callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => {
                return Err(auth_error(&format!("Authorization was denied: {}", value)));
            }
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(auth_error("State parameter in callback does not match"));
    }
    code.ok_or_else(|| auth_error("No authorization code found in callback"))
}

/// Block until the browser is redirected back with a code or an error
fn wait_for_callback(server: tiny_http::Server) -> InkResult<String> {
    loop {
        let request = server.recv()?;
        let path = request.url().to_string();

        // Browsers also ask for /favicon.ico and the like
        if !path.contains("code=") && !path.contains("error=") {
            let _ = request.respond(tiny_http::Response::empty(tiny_http::StatusCode(404)));
            continue;
        }

        request.respond(tiny_http::Response::from_string(CALLBACK_PAGE))?;
        return Ok(path);
    }
}

/// Open the consent page and trade the returned code for a token
pub async fn run_interactive_flow(secrets: &ClientSecrets, client: &Client) -> InkResult<StoredToken> {
    // Loopback redirect on a free port
    let server = tiny_http::Server::http("127.0.0.1:0")
        .map_err(|e| auth_error(&format!("Failed to start callback listener: {}", e)))?;
    let port = server
        .server_addr()
        .to_ip()
        .map(|addr| addr.port())
        .ok_or_else(|| auth_error("Callback listener has no TCP address"))?;
    let redirect_uri = format!("http://127.0.0.1:{}", port);

    let state = Uuid::new_v4().to_string();
    let auth_url = authorization_url(secrets, &redirect_uri, &state)?;

    info!("Opening browser for Google Calendar authorization");
    info!("If no browser opens, visit: {}", auth_url);
    if let Err(e) = webbrowser::open(auth_url.as_str()) {
        warn!("Could not open a browser: {}", e);
    }

    info!("Waiting for authorization callback on port {}", port);
    let path = tokio::task::spawn_blocking(move || wait_for_callback(server))
        .await
        .map_err(|e| auth_error(&format!("Callback listener task failed: {}", e)))??;
    let code = parse_callback(&path, &state)?;

    let response = client
        .post(&secrets.token_uri)
        .form(&[
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("code", code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| auth_error(&format!("Failed to exchange authorization code: {}", e)))?;

    if !response.status().is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        return Err(auth_error(&format!("Failed to get token: {}", error_text)));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

    info!("Google Calendar authorization successful");
    Ok(token.into_stored(None, Utc::now().timestamp()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets() -> ClientSecrets {
        ClientSecrets::parse(r#"{"installed":{"client_id":"my-id","client_secret":"s"}}"#).unwrap()
    }

    #[test]
    fn test_authorization_url() {
        let url = authorization_url(&secrets(), "http://127.0.0.1:4242", "xyz").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("client_id".to_string(), "my-id".to_string())));
        assert!(pairs.contains(&("state".to_string(), "xyz".to_string())));
        assert!(pairs.contains(&("scope".to_string(), CALENDAR_SCOPE.to_string())));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "http://127.0.0.1:4242".to_string()
        )));
    }

    #[test]
    fn test_parse_callback() {
        assert_eq!(
            parse_callback("/?state=abc&code=4%2Fcode", "abc").unwrap(),
            "4/code"
        );
        assert!(parse_callback("/?state=other&code=x", "abc").is_err());
        assert!(parse_callback("/?state=abc", "abc").is_err());
        assert!(parse_callback("/?error=access_denied&state=abc", "abc").is_err());
    }
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use rand::Rng;
use url::Url;

use crate::config::SpotifyConfig;
use crate::spotify_rs::types::{CachedToken, SpotifyTokenResponse};

const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

pub const SPOTIFY_SCOPES: [&str; 6] = [
    "user-library-read",
    "playlist-read-private",
    "playlist-modify-private",
    "playlist-modify-public",
    "user-library-modify",
    "user-read-recently-played",
];

/// Generate a random state parameter for CSRF protection
fn generate_state() -> String {
    let mut rng = rand::rng();
    (0..16)
        .map(|_| {
            const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
            CHARSET[rng.random_range(0..CHARSET.len())] as char
        })
        .collect()
}

/// The URL the user opens to grant this application access
pub fn authorize_url(client_id: &str, redirect_uri: &str, state: &str) -> String {
    format!(
        "{}?client_id={}&response_type=code&redirect_uri={}&state={}&scope={}",
        SPOTIFY_AUTH_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(state),
        urlencoding::encode(&SPOTIFY_SCOPES.join(" "))
    )
}

#[derive(Debug, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub code: String,
    pub state: Option<String>,
}

/// Pull the authorization code and state out of the URL Spotify redirected the user to
pub fn parse_authorization_response(response_url: &str) -> Option<AuthorizationResponse> {
    let url = Url::parse(response_url).ok()?;
    let param = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    let code = param("code").filter(|code| !code.is_empty())?;
    Some(AuthorizationResponse {
        code,
        state: param("state"),
    })
}

fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", client_id, client_secret))
    )
}

#[derive(Debug, thiserror::Error)]
pub enum ExchangeCodeForTokenError {
    #[error("Invalid code: {reason}")]
    InvalidCode { reason: String },
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse response")]
    FailedToParseResponse(reqwest::Error),
}

/// Exchange authorization code for access token
/// https://developer.spotify.com/documentation/web-api/tutorials/code-flow
pub async fn exchange_code_for_token(
    credentials: &SpotifyConfig,
    code: &str,
) -> Result<SpotifyTokenResponse, ExchangeCodeForTokenError> {
    let client = reqwest::Client::new();

    let mut params = HashMap::new();
    params.insert("grant_type", "authorization_code");
    params.insert("code", code);
    params.insert("redirect_uri", credentials.redirect_uri.as_str());

    let response = client
        .post(SPOTIFY_TOKEN_URL)
        // Serializes to x-www-form-urlencoded, as Spotify requires
        .form(&params)
        .header(
            "Authorization",
            basic_auth_header(&credentials.client_id, &credentials.client_secret),
        )
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(ExchangeCodeForTokenError::FailedToSendRequest)?;

    if !response.status().is_success() {
        return Err(ExchangeCodeForTokenError::InvalidCode {
            reason: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    response
        .json()
        .await
        .map_err(ExchangeCodeForTokenError::FailedToParseResponse)
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshTokenError {
    #[error("Invalid refresh token: {reason}")]
    InvalidRefreshToken { reason: String },
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

/// Refresh an access token using a refresh token
pub async fn refresh_access_token(
    credentials: &SpotifyConfig,
    refresh_token: &str,
) -> Result<SpotifyTokenResponse, RefreshTokenError> {
    let client = reqwest::Client::new();

    let mut params = HashMap::new();
    params.insert("grant_type", "refresh_token");
    params.insert("refresh_token", refresh_token);

    let response = client
        .post(SPOTIFY_TOKEN_URL)
        .form(&params)
        .header(
            "Authorization",
            basic_auth_header(&credentials.client_id, &credentials.client_secret),
        )
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(RefreshTokenError::FailedToSendRequest)?;

    if !response.status().is_success() {
        return Err(RefreshTokenError::InvalidRefreshToken {
            reason: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    response
        .json()
        .await
        .map_err(RefreshTokenError::FailedToParseResponse)
}

/// The token file kept in the cache dir, plus the state of a pending authorization.
pub struct TokenCache {
    path: PathBuf,
    state_path: PathBuf,
}

impl TokenCache {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join("auth_token.json"),
            state_path: cache_dir.join("auth_state"),
        }
    }

    pub fn load_state(&self) -> Result<Option<String>> {
        if !self.state_path.is_file() {
            return Ok(None);
        }
        let state = std::fs::read_to_string(&self.state_path).wrap_err(format!(
            "Failed to read authorization state: {}",
            self.state_path.display()
        ))?;
        Ok(Some(state.trim().to_string()))
    }

    pub fn save_state(&self, state: &str) -> Result<()> {
        if let Some(parent) = self.state_path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err(format!("Failed to create cache dir: {}", parent.display()))?;
        }
        std::fs::write(&self.state_path, state).wrap_err(format!(
            "Failed to write authorization state: {}",
            self.state_path.display()
        ))
    }

    fn clear_state(&self) -> Result<()> {
        if self.state_path.is_file() {
            std::fs::remove_file(&self.state_path).wrap_err(format!(
                "Failed to remove authorization state: {}",
                self.state_path.display()
            ))?;
        }
        Ok(())
    }

    pub fn load(&self) -> Result<Option<CachedToken>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .wrap_err(format!("Failed to read token cache: {}", self.path.display()))?;
        let token = serde_json::from_str(&contents)
            .wrap_err(format!("Failed to parse token cache: {}", self.path.display()))?;
        Ok(Some(token))
    }

    pub fn save(&self, token: &CachedToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err(format!("Failed to create cache dir: {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(token)?;
        std::fs::write(&self.path, contents)
            .wrap_err(format!("Failed to write token cache: {}", self.path.display()))?;
        Ok(())
    }
}

pub enum LoginOutcome {
    Authenticated(CachedToken),
    /// No usable token; the user has to visit `url` and hand back the redirect URL.
    AuthorizationRequired { url: String },
}

/// Get an access token from the cache, a refresh, or the redirect URL Spotify sent the user to.
pub async fn login(
    credentials: &SpotifyConfig,
    cache: &TokenCache,
    response_url: Option<&str>,
) -> Result<LoginOutcome> {
    if let Some(token) = cache.load()? {
        if !token.is_expired() {
            tracing::info!("Using cached token for login");
            return Ok(LoginOutcome::Authenticated(token));
        }

        if let Some(refresh_token) = token.refresh_token.clone() {
            tracing::info!("Cached token expired. Refreshing...");
            match refresh_access_token(credentials, &refresh_token).await {
                Ok(response) => {
                    let token = CachedToken::from_response(response, Some(refresh_token));
                    cache.save(&token)?;
                    return Ok(LoginOutcome::Authenticated(token));
                }
                Err(error) => tracing::warn!("Failed to refresh cached token: {}", error),
            }
        }
    }

    if let Some(response) = response_url.and_then(parse_authorization_response) {
        let expected_state = cache.load_state()?;
        if expected_state.is_none() || response.state != expected_state {
            bail!(
                "The response URL does not belong to the last authorization request. \
                 Run `login` without a response URL to get a new one"
            );
        }

        tracing::info!("Found response URL. Getting an access token...");
        let token_response = exchange_code_for_token(credentials, &response.code)
            .await
            .wrap_err("Failed to exchange authorization code")?;
        let token = CachedToken::from_response(token_response, None);
        cache.save(&token)?;
        cache.clear_state()?;
        return Ok(LoginOutcome::Authenticated(token));
    }

    let state = generate_state();
    cache.save_state(&state)?;
    Ok(LoginOutcome::AuthorizationRequired {
        url: authorize_url(&credentials.client_id, &credentials.redirect_uri, &state),
    })
}

//! OAuth2 credentials for the Gmail API.
//!
//! Tokens are persisted as a JSON file with `0600` permissions and the
//! access token is refreshed automatically when it is within a minute of
//! expiry. The client secret is only ever read from the environment.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::default_home_path;
use crate::error::{ConfigError, GmailError};

/// Google OAuth2 endpoints.
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const CONSENT_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Scope required for label mutation and trash.
pub const GMAIL_MODIFY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify";

/// OAuth2 client credentials, read from the environment.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub token_path: PathBuf,
}

impl AuthConfig {
    /// Read credentials from `GMAIL_CLIENT_ID` / `GMAIL_CLIENT_SECRET`.
    ///
    /// `GMAIL_TOKEN_PATH` overrides the token file location.
    pub fn from_env() -> Result<Self, ConfigError> {
        let client_id = std::env::var("GMAIL_CLIENT_ID")
            .map_err(|_| ConfigError::MissingEnvVar("GMAIL_CLIENT_ID".into()))?;
        let client_secret = std::env::var("GMAIL_CLIENT_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("GMAIL_CLIENT_SECRET".into()))?;
        if client_secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "GMAIL_CLIENT_SECRET".into(),
                message: "value is empty".into(),
            });
        }

        let token_path = std::env::var("GMAIL_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_home_path(".config/gmail-triage/token.json"));

        Ok(Self {
            client_id,
            client_secret: SecretString::from(client_secret),
            token_path,
        })
    }

    /// The URL a user visits to grant mailbox access.
    pub fn consent_url(&self) -> String {
        format!(
            "{CONSENT_ENDPOINT}?client_id={}&redirect_uri=http://localhost\
             &response_type=code&scope={GMAIL_MODIFY_SCOPE}\
             &access_type=offline&prompt=consent",
            self.client_id
        )
    }
}

/// An OAuth2 token pair with expiry tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    pub refresh_token: String,
    /// `None` means unknown — treated as expired.
    pub expires_at: Option<DateTime<Utc>>,
}

impl OAuthToken {
    /// Whether the access token has expired, with a 60-second margin.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => Utc::now() >= exp - chrono::Duration::seconds(60),
            None => true,
        }
    }
}

/// Mask a token for log output: first 4 bytes, then `***`.
///
/// Fully masked when the token is short or byte 4 is not a character
/// boundary.
pub fn mask_token(token: &str) -> String {
    match token.get(..4) {
        Some(prefix) if token.len() > 4 => format!("{prefix}***"),
        _ => "***".to_string(),
    }
}

impl fmt::Display for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OAuthToken(access={}, expires_at={:?})",
            mask_token(&self.access_token),
            self.expires_at,
        )
    }
}

/// Persistent token storage backed by a `0600`-permission JSON file.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the stored token. `Ok(None)` when no token file exists yet.
    pub fn load(&self) -> Result<Option<OAuthToken>, GmailError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            GmailError::Token(format!("failed to read '{}': {e}", self.path.display()))
        })?;
        let token: OAuthToken = serde_json::from_str(&content).map_err(|e| {
            GmailError::Token(format!("failed to parse '{}': {e}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), expires_at = ?token.expires_at, "Loaded token");
        Ok(Some(token))
    }

    /// Save the token, creating parent directories as needed.
    pub fn save(&self, token: &OAuthToken) -> Result<(), GmailError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GmailError::Token(format!("failed to create '{}': {e}", parent.display()))
            })?;
        }

        let content = serde_json::to_string_pretty(token)
            .map_err(|e| GmailError::Token(format!("failed to serialize token: {e}")))?;
        std::fs::write(&self.path, &content).map_err(|e| {
            GmailError::Token(format!("failed to write '{}': {e}", self.path.display()))
        })?;
        set_file_permissions_0600(&self.path)?;

        debug!(path = %self.path.display(), "Saved token");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn set_file_permissions_0600(path: &Path) -> Result<(), GmailError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(|e| {
        GmailError::Token(format!(
            "failed to set permissions on '{}': {e}",
            path.display()
        ))
    })
}

#[cfg(not(unix))]
fn set_file_permissions_0600(_path: &Path) -> Result<(), GmailError> {
    Ok(())
}

/// Refresh an expired access token via the `refresh_token` grant.
pub async fn refresh_access_token(
    client: &Client,
    config: &AuthConfig,
    refresh_token: &str,
) -> Result<OAuthToken, GmailError> {
    debug!("Refreshing Gmail access token");
    let body = token_request(
        client,
        TOKEN_ENDPOINT,
        &[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.expose_secret()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ],
    )
    .await?;

    // Google may rotate the refresh token; fall back to the current one.
    let kept_refresh = body
        .get("refresh_token")
        .and_then(|v| v.as_str())
        .unwrap_or(refresh_token)
        .to_string();

    token_from_response(body, kept_refresh)
}

/// Exchange an authorization code for the initial token pair.
pub async fn exchange_authorization_code(
    client: &Client,
    config: &AuthConfig,
    code: &str,
) -> Result<OAuthToken, GmailError> {
    let body = token_request(
        client,
        TOKEN_ENDPOINT,
        &[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.expose_secret()),
            ("code", code.trim()),
            ("redirect_uri", "http://localhost"),
            ("grant_type", "authorization_code"),
        ],
    )
    .await?;

    let refresh_token = body
        .get("refresh_token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GmailError::Auth("missing refresh_token in exchange response".into()))?
        .to_string();

    token_from_response(body, refresh_token)
}

async fn token_request(
    client: &Client,
    endpoint: &str,
    form: &[(&str, &str)],
) -> Result<serde_json::Value, GmailError> {
    let resp = client.post(endpoint).form(form).send().await?;
    let status = resp.status();
    let body: serde_json::Value = resp.json().await?;

    if !status.is_success() {
        let message = body
            .get("error_description")
            .and_then(|v| v.as_str())
            .or_else(|| body.get("error").and_then(|v| v.as_str()))
            .unwrap_or("unknown error")
            .to_string();
        warn!(status = status.as_u16(), %message, "Token request failed");
        return Err(GmailError::Auth(message));
    }

    Ok(body)
}

fn token_from_response(
    body: serde_json::Value,
    refresh_token: String,
) -> Result<OAuthToken, GmailError> {
    let access_token = body
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GmailError::Auth("missing access_token in token response".into()))?
        .to_string();

    let expires_in = body
        .get("expires_in")
        .and_then(|v| v.as_i64())
        .unwrap_or(3600);

    Ok(OAuthToken {
        access_token,
        refresh_token,
        expires_at: Some(Utc::now() + chrono::Duration::seconds(expires_in)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_expired() {
        let token = OAuthToken {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
        };
        assert!(!token.is_expired());
    }

    #[test]
    fn unknown_expiry_counts_as_expired() {
        let token = OAuthToken {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: None,
        };
        assert!(token.is_expired());
    }

    #[test]
    fn expiry_margin_is_sixty_seconds() {
        let token = OAuthToken {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: Some(Utc::now() + chrono::Duration::seconds(30)),
        };
        assert!(token.is_expired());
    }

    #[test]
    fn tokens_are_masked_in_display() {
        let token = OAuthToken {
            access_token: "ya29.secret-value".into(),
            refresh_token: "1//refresh".into(),
            expires_at: None,
        };
        let shown = token.to_string();
        assert!(shown.contains("ya29***"));
        assert!(!shown.contains("secret-value"));
    }

    #[test]
    fn short_tokens_fully_masked() {
        assert_eq!(mask_token("abc"), "***");
    }

    #[test]
    fn masking_never_splits_a_multibyte_character() {
        // Byte 4 falls inside the euro sign; masking must not panic.
        assert_eq!(mask_token("aaa€token"), "***");
        assert_eq!(mask_token("héllo-token"), "hél***");
    }

    #[test]
    fn store_round_trips_with_0600() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested/token.json"));
        assert!(store.load().unwrap().is_none());

        let token = OAuthToken {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: None,
        };
        store.save(&token).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "a");
        assert_eq!(loaded.refresh_token, "r");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}

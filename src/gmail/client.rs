//! Gmail REST client behind the [`Mailbox`] capability trait.
//!
//! The poller only ever sees `dyn Mailbox`, so tests run against a
//! deterministic fake instead of the live API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::GmailError;
use crate::gmail::auth::{
    AuthConfig, TokenStore, exchange_authorization_code, refresh_access_token,
};
use crate::gmail::types::{Label, ListLabelsResponse, ListMessagesResponse, Message};

/// Gmail API base URL.
const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Capability interface over the external mailbox.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// IDs of all unread messages.
    async fn list_unread(&self) -> Result<Vec<String>, GmailError>;

    /// Fetch one full message.
    async fn fetch(&self, id: &str) -> Result<Message, GmailError>;

    /// Add/remove labels on a message.
    async fn modify(
        &self,
        id: &str,
        add_label_ids: &[String],
        remove_label_ids: &[String],
    ) -> Result<(), GmailError>;

    /// Move a message to the trash.
    async fn trash(&self, id: &str) -> Result<(), GmailError>;

    /// All labels in the mailbox.
    async fn list_labels(&self) -> Result<Vec<Label>, GmailError>;

    /// Create a new user label.
    async fn create_label(&self, name: &str) -> Result<Label, GmailError>;
}

/// Body for `POST /messages/{id}/modify`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifyRequest<'a> {
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    add_label_ids: &'a [String],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    remove_label_ids: &'a [String],
}

/// Body for `POST /labels`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateLabelRequest<'a> {
    name: &'a str,
    label_list_visibility: &'a str,
}

/// Live Gmail API client with automatic token refresh.
pub struct GmailClient {
    config: AuthConfig,
    token_store: TokenStore,
    http: Client,
    base_url: String,
}

impl GmailClient {
    pub fn new(config: AuthConfig) -> Result<Self, GmailError> {
        Self::with_base_url(config, GMAIL_API_BASE)
    }

    /// Custom base URL, for tests against a local server.
    pub fn with_base_url(config: AuthConfig, base_url: &str) -> Result<Self, GmailError> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        let token_store = TokenStore::new(config.token_path.clone());

        Ok(Self {
            config,
            token_store,
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Run the interactive consent flow and persist the resulting token.
    pub async fn authorize(&self) -> Result<(), GmailError> {
        println!("Open this URL in a browser and grant access:\n");
        println!("  {}\n", self.config.consent_url());
        println!("Paste the authorization code here and press Enter:");

        let mut code = String::new();
        std::io::stdin()
            .read_line(&mut code)
            .map_err(|e| GmailError::Auth(format!("failed to read code: {e}")))?;

        let token = exchange_authorization_code(&self.http, &self.config, &code).await?;
        self.token_store.save(&token)?;
        info!(path = %self.token_store.path().display(), "Stored OAuth token");
        Ok(())
    }

    /// Confirm a usable access token exists before any polling starts.
    /// An error here is fatal — no processing begins.
    pub async fn verify(&self) -> Result<(), GmailError> {
        self.access_token().await.map(|_| ())
    }

    /// Get a valid access token, refreshing and re-persisting if expired.
    async fn access_token(&self) -> Result<String, GmailError> {
        let token = self.token_store.load()?.ok_or_else(|| {
            GmailError::Auth("no OAuth token found — run the `auth` subcommand first".into())
        })?;

        if !token.is_expired() {
            return Ok(token.access_token);
        }

        let refreshed =
            refresh_access_token(&self.http, &self.config, &token.refresh_token).await?;
        self.token_store.save(&refreshed)?;
        Ok(refreshed.access_token)
    }

    /// Turn a non-success response into `GmailError::Api`.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, GmailError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body: serde_json::Value = resp.json().await.unwrap_or_default();
        let message = body
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
            .to_string();
        Err(GmailError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Mailbox for GmailClient {
    async fn list_unread(&self) -> Result<Vec<String>, GmailError> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .get(format!("{}/messages", self.base_url))
            .bearer_auth(&token)
            .query(&[("q", "is:unread")])
            .send()
            .await?;
        let body: ListMessagesResponse = Self::check(resp).await?.json().await?;

        let ids: Vec<String> = body
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|m| m.id)
            .collect();
        debug!(count = ids.len(), "Listed unread messages");
        Ok(ids)
    }

    async fn fetch(&self, id: &str) -> Result<Message, GmailError> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .get(format!("{}/messages/{id}", self.base_url))
            .bearer_auth(&token)
            .query(&[("format", "full")])
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn modify(
        &self,
        id: &str,
        add_label_ids: &[String],
        remove_label_ids: &[String],
    ) -> Result<(), GmailError> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .post(format!("{}/messages/{id}/modify", self.base_url))
            .bearer_auth(&token)
            .json(&ModifyRequest {
                add_label_ids,
                remove_label_ids,
            })
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn trash(&self, id: &str) -> Result<(), GmailError> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .post(format!("{}/messages/{id}/trash", self.base_url))
            .bearer_auth(&token)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn list_labels(&self) -> Result<Vec<Label>, GmailError> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .get(format!("{}/labels", self.base_url))
            .bearer_auth(&token)
            .send()
            .await?;
        let body: ListLabelsResponse = Self::check(resp).await?.json().await?;
        Ok(body.labels)
    }

    async fn create_label(&self, name: &str) -> Result<Label, GmailError> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .post(format!("{}/labels", self.base_url))
            .bearer_auth(&token)
            .json(&CreateLabelRequest {
                name,
                label_list_visibility: "labelShow",
            })
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }
}


/// Find a label by name (case-insensitive), creating it when absent.
pub async fn get_or_create_label(
    mailbox: &dyn Mailbox,
    name: &str,
) -> Result<Label, GmailError> {
    for label in mailbox.list_labels().await? {
        if label.name.eq_ignore_ascii_case(name) {
            return Ok(label);
        }
    }
    let created = mailbox.create_label(name).await?;
    info!(id = %created.id, name = %created.name, "Created label");
    Ok(created)
}

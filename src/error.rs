//! Error types for the triage poller.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gmail error: {0}")]
    Gmail(#[from] GmailError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Gmail API and OAuth errors.
#[derive(Debug, thiserror::Error)]
pub enum GmailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gmail API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Token storage error: {0}")]
    Token(String),
}

/// De-duplication store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open seen store: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),
}

/// Classification pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Sentiment scoring failed: {0}")]
    Scoring(String),

    #[error("Failed to load rules: {0}")]
    Rules(String),
}

/// Result type alias for the poller.
pub type Result<T> = std::result::Result<T, Error>;

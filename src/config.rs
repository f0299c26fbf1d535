//! Runtime configuration, built from environment variables.

use std::path::PathBuf;

/// Default sentiment threshold above which a message counts as positive.
pub const DEFAULT_SENTIMENT_THRESHOLD: f64 = 0.4;

/// Poller configuration.
///
/// Every field has a usable default, so `from_env` never fails — Gmail
/// OAuth credentials live separately in [`crate::gmail::auth::AuthConfig`]
/// because those ARE required.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Label attached to `necessary` messages, alongside the star.
    /// `None` means review labels are skipped.
    pub review_label_id: Option<String>,
    /// Seconds between unread sweeps in daemon mode.
    pub poll_interval_secs: u64,
    /// Total daemon runtime in seconds. The loop is time-bounded rather
    /// than unbounded; schedule restarts externally for continuous runs.
    pub daemon_run_secs: u64,
    /// Path to the de-duplication database.
    pub cache_path: PathBuf,
    /// Directory for markdown digest output.
    pub digest_dir: PathBuf,
    /// Directory for the analysis log file.
    pub log_dir: PathBuf,
    /// Polarity score above which a message is classified `important`.
    pub sentiment_threshold: f64,
}

impl TriageConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let review_label_id = std::env::var("LABEL_ID_REVIEW")
            .ok()
            .filter(|s| !s.is_empty());

        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let daemon_run_secs: u64 = std::env::var("DAEMON_RUN_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(600);

        let cache_path = std::env::var("TRIAGE_CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_home_path(".cache/gmail-triage/seen.db"));

        let digest_dir = std::env::var("TRIAGE_DIGEST_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("gmail_logs"));

        let log_dir = std::env::var("TRIAGE_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let sentiment_threshold: f64 = std::env::var("SENTIMENT_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SENTIMENT_THRESHOLD);

        Self {
            review_label_id,
            poll_interval_secs,
            daemon_run_secs,
            cache_path,
            digest_dir,
            log_dir,
            sentiment_threshold,
        }
    }
}

/// Resolve a path under `$HOME`, falling back to the working directory.
pub(crate) fn default_home_path(rel: &str) -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(rel)
}

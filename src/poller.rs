//! Poll loop — sweeps the unread list and applies triage mutations.
//!
//! One message is processed fully (fetch → extract → classify → mutate)
//! before the next begins. Per-message failures are logged and the batch
//! continues; only a failed unread listing aborts a sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::TriageConfig;
use crate::error::Error;
use crate::gmail::Mailbox;
use crate::pipeline::{Action, Classifier, Rules, TriagedMessage, extract};
use crate::store::SeenStore;

/// Everything a poll pass needs, bundled explicitly instead of living in
/// module globals so the loop is testable with fakes.
pub struct PollerDeps {
    pub mailbox: Arc<dyn Mailbox>,
    pub classifier: Classifier,
    pub seen: SeenStore,
    pub rules: Option<Rules>,
    pub config: TriageConfig,
    /// Classify and log, but never mutate (and never record seen ids).
    pub dry_run: bool,
}

/// Sweep the full unread list once. Returns the digest entries for every
/// message triaged this pass.
pub async fn poll_once(deps: &PollerDeps) -> Result<Vec<TriagedMessage>, Error> {
    let ids = deps.mailbox.list_unread().await?;
    info!(count = ids.len(), "Sweeping unread messages");

    let mut digest = Vec::new();
    for id in &ids {
        // De-duplication: skip ids a previous pass already acted on.
        match deps.seen.contains(id).await {
            Ok(true) => continue,
            Ok(false) => {}
            Err(e) => {
                error!(id, error = %e, "Seen lookup failed, skipping message");
                continue;
            }
        }

        match process_message(deps, id).await {
            Ok(entry) => {
                info!(id, category = entry.category.label(), "Triaged message");
                digest.push(entry);
            }
            Err(e) => {
                // Failure isolation: the message stays unread and will be
                // re-offered on the next sweep.
                error!(id, error = %e, "Processing failed");
            }
        }
    }

    Ok(digest)
}

/// Fetch, extract, classify, and mutate a single message.
async fn process_message(deps: &PollerDeps, id: &str) -> Result<TriagedMessage, Error> {
    let message = deps.mailbox.fetch(id).await?;

    let text = message
        .payload
        .as_ref()
        .map(extract)
        .unwrap_or_default();
    let sender = message.sender().to_string();
    let subject = message.subject().to_string();

    let category = deps
        .classifier
        .classify(&text, &sender, deps.rules.as_ref())?;

    let action = Action::for_category(category, deps.config.review_label_id.as_deref());

    if deps.dry_run {
        info!(id, category = category.label(), "[dry run] Skipping mutation");
    } else {
        match &action {
            Action::Modify { add_label_ids } => {
                deps.mailbox.modify(id, add_label_ids, &[]).await?;
            }
            Action::Trash => deps.mailbox.trash(id).await?,
        }
        // Recorded only after the mutation succeeded, so a failed message
        // is re-offered next sweep instead of silently dropped.
        deps.seen.record(id).await?;
    }

    Ok(TriagedMessage {
        id: id.to_string(),
        category,
        subject,
        sender,
    })
}

/// Run repeated sweeps for a bounded interval.
///
/// Ticks every `poll_interval_secs` until `daemon_run_secs` has elapsed.
/// A failed sweep is logged and the next tick proceeds.
pub async fn run_daemon(deps: &PollerDeps) {
    let deadline = Instant::now() + Duration::from_secs(deps.config.daemon_run_secs);
    let mut tick = tokio::time::interval(Duration::from_secs(deps.config.poll_interval_secs));

    info!(
        interval_secs = deps.config.poll_interval_secs,
        run_secs = deps.config.daemon_run_secs,
        "Daemon started"
    );

    loop {
        tick.tick().await;
        if Instant::now() >= deadline {
            break;
        }

        match poll_once(deps).await {
            Ok(digest) if !digest.is_empty() => {
                info!(triaged = digest.len(), "Sweep complete");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Sweep failed"),
        }
    }

    info!(
        run_secs = deps.config.daemon_run_secs,
        "Poller finished its scheduled run"
    );
}

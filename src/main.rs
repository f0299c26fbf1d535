use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use gmail_triage::config::TriageConfig;
use gmail_triage::digest::write_digest;
use gmail_triage::gmail::auth::AuthConfig;
use gmail_triage::gmail::{GmailClient, Mailbox, get_or_create_label};
use gmail_triage::pipeline::{Classifier, Rules, VaderScorer};
use gmail_triage::poller::{PollerDeps, poll_once, run_daemon};
use gmail_triage::store::SeenStore;

/// Autonomous Gmail triage poller.
#[derive(Parser)]
#[command(name = "gmail-triage", version, about)]
struct Cli {
    /// Classify and log without modifying the mailbox.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Path to a YAML rules file with sender whitelist/blacklist.
    #[arg(long, global = true, value_name = "PATH")]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the OAuth consent flow, store the token, and exit.
    Auth,
    /// Sweep the unread list once, write a digest, and exit.
    Once,
    /// Poll repeatedly for a bounded interval.
    Daemon,
    /// Print available labels as `name → id` pairs.
    Labels {
        /// Ensure a label with this name exists, creating it if needed.
        #[arg(long, value_name = "NAME")]
        ensure: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = TriageConfig::from_env();

    // Console output plus the analysis log file the tool has always kept.
    std::fs::create_dir_all(&config.log_dir)?;
    let file_appender = tracing_appender::rolling::never(&config.log_dir, "gmail_analysis.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();

    let auth = AuthConfig::from_env()?;
    let client = GmailClient::new(auth)?;

    if let Command::Auth = cli.command {
        client.authorize().await?;
        println!("Authentication complete.");
        return Ok(());
    }

    // Fatal on failure: no processing begins without valid credentials.
    client.verify().await?;
    let mailbox: Arc<dyn Mailbox> = Arc::new(client);

    if let Command::Labels { ensure } = &cli.command {
        for label in mailbox.list_labels().await? {
            println!("{} → {}", label.name, label.id);
        }
        if let Some(name) = ensure {
            let label = get_or_create_label(mailbox.as_ref(), name).await?;
            println!("\nReview label ready: {} → {}", label.name, label.id);
        }
        return Ok(());
    }

    if config.review_label_id.is_none() {
        warn!("LABEL_ID_REVIEW not set; review labels will be skipped");
    }

    let rules = match &cli.rules {
        Some(path) => match Rules::load(path) {
            Ok(rules) => Some(rules),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load rules, continuing without");
                None
            }
        },
        None => None,
    };

    let seen = SeenStore::open(&config.cache_path).await?;
    let classifier = Classifier::new(Arc::new(VaderScorer), config.sentiment_threshold);

    let deps = PollerDeps {
        mailbox,
        classifier,
        seen,
        rules,
        config: config.clone(),
        dry_run: cli.dry_run,
    };

    match cli.command {
        Command::Once => {
            let digest = poll_once(&deps).await?;
            match write_digest(&digest, &config.digest_dir) {
                Ok(Some(path)) => println!("✓ Digest written to {}", path.display()),
                Ok(None) => info!("Nothing triaged, no digest written"),
                Err(e) => warn!(error = %e, "Failed to write digest"),
            }
        }
        Command::Daemon => run_daemon(&deps).await,
        Command::Auth | Command::Labels { .. } => unreachable!("handled above"),
    }

    Ok(())
}

//! Run command - fetch, announce, and record

use anyhow::{Context, Result, bail};
use pr_announcer_adapters::{github::GitHubSource, ledger::XmlLedgerStore, twitter::TwitterAnnouncer};
use pr_announcer_domain::{
    ItemOutcome, LedgerOutcome, SystemClock,
    usecases::{AnnounceRun, AnnounceRunConfig},
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::RunArgs;
use crate::config::{AppConfig, GitHubConfig};
use crate::credentials::load_credentials;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    // Credentials are checked before any network I/O
    let credentials = load_credentials(&config.twitter)?;

    let dry_run = args.dry_run || config.general.dry_run;

    tracing::info!(
        dry_run = dry_run,
        owner = %config.github.owner,
        repo = %config.github.repo,
        ledger = %config.general.ledger_path.display(),
        "Starting pr-announcer run"
    );

    // Build dependencies
    let source = Arc::new(build_source(&config.github)?);
    let announcer = Arc::new(TwitterAnnouncer::with_endpoint(
        credentials,
        config.twitter.endpoint.clone(),
    ));
    let ledger_store = Arc::new(XmlLedgerStore::new(&config.general.ledger_path));
    let clock = Arc::new(SystemClock);

    let run = AnnounceRun::new(
        source,
        announcer,
        ledger_store,
        clock,
        AnnounceRunConfig { dry_run },
    );

    let report = run.run_once().await.context("Run aborted")?;

    for (item_id, outcome) in &report.outcomes {
        match outcome {
            ItemOutcome::Announced => tracing::debug!(item_id = %item_id, "Announced"),
            ItemOutcome::Failed { error } => {
                tracing::warn!(item_id = %item_id, error = %error, "Will retry next run")
            }
            ItemOutcome::DryRun { .. } => {}
        }
    }

    match &report.ledger {
        LedgerOutcome::Unchanged => tracing::info!("Ledger unchanged"),
        LedgerOutcome::Saved(ledger) => {
            tracing::info!(total = ledger.announced_ids.len(), "Ledger saved")
        }
        LedgerOutcome::SaveFailed(error) => tracing::error!(
            error = %error,
            "Ledger not saved; announced items may be repeated next run"
        ),
    }

    tracing::info!(
        candidates = report.candidates,
        announced = report.announced_ids().len(),
        failed = report.failed_count(),
        "pr-announcer run completed"
    );

    Ok(())
}

fn build_source(config: &GitHubConfig) -> Result<GitHubSource> {
    if config.owner.trim().is_empty() || config.repo.trim().is_empty() {
        bail!("github.owner and github.repo must be configured");
    }

    Ok(GitHubSource::with_base_url(
        config.api_base_url.clone(),
        config.owner.trim(),
        config.repo.trim(),
    )
    .with_per_page(config.per_page)
    .with_user_agent(config.user_agent.clone()))
}

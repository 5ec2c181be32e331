//! Announce run use case - orchestrates fetching, deduplicating, announcing, and recording

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::{
    model::{ItemOutcome, LedgerOutcome, RunReport},
    ports::{Announcer, Clock, LedgerStore, SourceFetcher},
    usecases::dedup::filter_new,
};

/// Configuration for an announce run
#[derive(Debug, Clone, Default)]
pub struct AnnounceRunConfig {
    /// Log what would be announced without posting or touching the ledger
    pub dry_run: bool,
}

/// Announce run orchestrator
#[derive(Clone)]
pub struct AnnounceRun<F, A, L, Cl>
where
    F: SourceFetcher + ?Sized,
    A: Announcer + ?Sized,
    L: LedgerStore + ?Sized,
    Cl: Clock + ?Sized,
{
    source: Arc<F>,
    announcer: Arc<A>,
    ledger_store: Arc<L>,
    clock: Arc<Cl>,
    config: AnnounceRunConfig,
}

impl<F, A, L, Cl> AnnounceRun<F, A, L, Cl>
where
    F: SourceFetcher + ?Sized,
    A: Announcer + ?Sized,
    L: LedgerStore + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(
        source: Arc<F>,
        announcer: Arc<A>,
        ledger_store: Arc<L>,
        clock: Arc<Cl>,
        config: AnnounceRunConfig,
    ) -> Self {
        Self {
            source,
            announcer,
            ledger_store,
            clock,
            config,
        }
    }

    /// Run the pipeline once
    ///
    /// Items are announced one at a time in the order the source returned
    /// them. The ledger is written only when at least one announcement went
    /// out, so `last_run_at` records the last run that made progress.
    pub async fn run_once(&self) -> Result<RunReport, RunError> {
        let ledger = self.ledger_store.load().await;

        tracing::info!(
            known = ledger.announced_ids.len(),
            last_run_at = %ledger.last_run_at,
            "Loaded ledger"
        );

        let candidates = self
            .source
            .fetch_items()
            .await
            .map_err(|e| RunError::Fetch(e.to_string()))?;
        let candidate_count = candidates.len();

        let new_items = filter_new(candidates, &ledger.announced_ids);

        tracing::info!(
            candidates = candidate_count,
            new = new_items.len(),
            "Fetched open items"
        );

        let mut outcomes = Vec::with_capacity(new_items.len());
        let mut announced_this_run = BTreeSet::new();

        for item in new_items {
            let text = item.announcement_text();

            if self.config.dry_run {
                tracing::info!(item_id = %item.id, text = %text, "[DRY RUN] Would announce");
                outcomes.push((item.id, ItemOutcome::DryRun { text }));
                continue;
            }

            match self.announcer.publish(&text).await {
                Ok(_) => {
                    tracing::info!(item_id = %item.id, url = %item.display_url, "Announced");
                    announced_this_run.insert(item.id.clone());
                    outcomes.push((item.id, ItemOutcome::Announced));
                }
                Err(e) => {
                    tracing::error!(item_id = %item.id, error = %e, "Failed to announce");
                    outcomes.push((
                        item.id,
                        ItemOutcome::Failed {
                            error: e.to_string(),
                        },
                    ));
                }
            }
        }

        let ledger_outcome = if announced_this_run.is_empty() {
            tracing::debug!("Nothing announced, ledger left unchanged");
            LedgerOutcome::Unchanged
        } else {
            match self
                .ledger_store
                .save(&ledger, &announced_this_run, self.clock.now())
                .await
            {
                Ok(saved) => {
                    tracing::info!(
                        added = announced_this_run.len(),
                        total = saved.announced_ids.len(),
                        "Ledger updated"
                    );
                    LedgerOutcome::Saved(saved)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Could not save updated ledger");
                    LedgerOutcome::SaveFailed(e.to_string())
                }
            }
        };

        Ok(RunReport {
            candidates: candidate_count,
            outcomes,
            ledger: ledger_outcome,
        })
    }
}

/// Errors that abort a run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Source fetch failed: {0}")]
    Fetch(String),
}

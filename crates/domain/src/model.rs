//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::{OffsetDateTime, UtcOffset};

/// An open pull request that may need announcing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementItem {
    /// Stable identifier (the PR number), used as the dedup key
    pub id: String,
    /// Link to the pull request
    pub display_url: String,
    /// Login of the PR author
    pub author_name: String,
}

impl AnnouncementItem {
    pub fn new(
        id: impl Into<String>,
        display_url: impl Into<String>,
        author_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_url: display_url.into(),
            author_name: author_name.into(),
        }
    }

    /// Text posted for this item
    pub fn announcement_text(&self) -> String {
        format!("New PR from {}: {}", self.author_name, self.display_url)
    }
}

/// Persisted record of everything announced so far
///
/// A ledger is a snapshot: merging new ids produces a new value and leaves
/// the original untouched. Ids are only ever added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Ids of items already announced
    pub announced_ids: BTreeSet<String>,
    /// When the last run that announced something finished
    #[serde(with = "time::serde::rfc3339")]
    pub last_run_at: OffsetDateTime,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            announced_ids: BTreeSet::new(),
            last_run_at: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

impl Ledger {
    pub fn new(announced_ids: BTreeSet<String>, last_run_at: OffsetDateTime) -> Self {
        Self {
            announced_ids,
            last_run_at: last_run_at.to_offset(UtcOffset::UTC),
        }
    }

    /// Union `new_ids` into a copy of this ledger and stamp it with `now`
    pub fn merged(&self, new_ids: &BTreeSet<String>, now: OffsetDateTime) -> Self {
        let mut announced_ids = self.announced_ids.clone();
        announced_ids.extend(new_ids.iter().cloned());
        Self::new(announced_ids, now)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.announced_ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.announced_ids.is_empty()
    }
}

/// Outcome of a single announcement attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Posted successfully
    Announced,
    /// Posting failed; the item stays eligible for the next run
    Failed { error: String },
    /// Dry run: the text that would have been posted
    DryRun { text: String },
}

/// What happened to the ledger at the end of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// Nothing was announced, the ledger was not written
    Unchanged,
    /// The merged ledger was written
    Saved(Ledger),
    /// Announcements went out but the ledger could not be written
    SaveFailed(String),
}

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Number of open items returned by the source
    pub candidates: usize,
    /// Per-item results, in announcement order
    pub outcomes: Vec<(String, ItemOutcome)>,
    pub ledger: LedgerOutcome,
}

impl RunReport {
    /// Ids that were successfully announced during the run
    pub fn announced_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ItemOutcome::Announced))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ItemOutcome::Failed { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn ids(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_announcement_text_format() {
        let item = AnnouncementItem::new("7", "https://github.com/o/r/pull/7", "octocat");
        assert_eq!(
            item.announcement_text(),
            "New PR from octocat: https://github.com/o/r/pull/7"
        );
    }

    #[test]
    fn test_default_ledger_is_empty_at_epoch() {
        let ledger = Ledger::default();
        assert!(ledger.is_empty());
        assert_eq!(ledger.last_run_at, datetime!(1970-01-01 0:00 UTC));
    }

    #[test]
    fn test_merged_unions_and_leaves_original_untouched() {
        let original = Ledger::new(ids(&["1", "2"]), datetime!(2024-01-01 0:00 UTC));
        let now = datetime!(2024-06-01 12:30 UTC);

        let merged = original.merged(&ids(&["2", "3"]), now);

        assert_eq!(merged.announced_ids, ids(&["1", "2", "3"]));
        assert_eq!(merged.last_run_at, now);
        assert_eq!(original.announced_ids, ids(&["1", "2"]));
    }

    #[test]
    fn test_merged_normalizes_to_utc() {
        let now = datetime!(2024-06-01 14:30 +02:00);
        let merged = Ledger::default().merged(&ids(&["1"]), now);

        assert_eq!(merged.last_run_at.offset(), UtcOffset::UTC);
        assert_eq!(merged.last_run_at, datetime!(2024-06-01 12:30 UTC));
    }
}

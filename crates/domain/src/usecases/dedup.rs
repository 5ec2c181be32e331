//! Deduplication of candidate items against the ledger

use std::collections::BTreeSet;

use crate::model::AnnouncementItem;

/// Keep the candidates whose id is not in `known`, preserving input order
pub fn filter_new(
    candidates: Vec<AnnouncementItem>,
    known: &BTreeSet<String>,
) -> Vec<AnnouncementItem> {
    candidates
        .into_iter()
        .filter(|item| !known.contains(&item.id))
        .collect()
}

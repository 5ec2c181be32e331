//! In-memory ledger store for testing and dry runs

use async_trait::async_trait;
use pr_announcer_domain::{Ledger, LedgerError, LedgerStore};
use std::collections::BTreeSet;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use time::OffsetDateTime;

/// In-memory ledger store implementation
pub struct InMemoryLedgerStore {
    ledger: RwLock<Ledger>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::with_ledger(Ledger::default())
    }

    /// Start from an existing ledger
    pub fn with_ledger(ledger: Ledger) -> Self {
        Self {
            ledger: RwLock::new(ledger),
            saves: AtomicUsize::new(0),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Make every subsequent save fail with an IO error
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of save calls, including failed ones
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Current stored ledger
    pub fn snapshot(&self) -> Ledger {
        match self.ledger.read() {
            Ok(ledger) => ledger.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn load(&self) -> Ledger {
        self.snapshot()
    }

    async fn save(
        &self,
        ledger: &Ledger,
        new_ids: &BTreeSet<String>,
        now: OffsetDateTime,
    ) -> Result<Ledger, LedgerError> {
        self.saves.fetch_add(1, Ordering::SeqCst);

        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(LedgerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "ledger location unavailable",
            )));
        }

        let merged = ledger.merged(new_ids, now);
        let mut stored = self
            .ledger
            .write()
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        *stored = merged.clone();
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[tokio::test]
    async fn test_save_roundtrip() {
        let store = InMemoryLedgerStore::new();
        let ids: BTreeSet<String> = ["7".to_string()].into();

        let saved = store
            .save(&store.load().await, &ids, datetime!(2024-01-01 0:00 UTC))
            .await
            .unwrap();

        assert_eq!(store.load().await, saved);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_ledger() {
        let store = InMemoryLedgerStore::new();
        store.set_fail_saves(true);
        let ids: BTreeSet<String> = ["7".to_string()].into();

        let result = store
            .save(&Ledger::default(), &ids, datetime!(2024-01-01 0:00 UTC))
            .await;

        assert!(matches!(result, Err(LedgerError::Io(_))));
        assert_eq!(store.load().await, Ledger::default());
        assert_eq!(store.save_count(), 1);
    }
}

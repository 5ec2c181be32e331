//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use std::collections::BTreeSet;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{AnnouncementItem, Ledger};

/// Error type for source fetcher operations
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    Parse(String),
}

/// Port for listing the currently open items upstream
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch the full list of open items
    async fn fetch_items(&self) -> Result<Vec<AnnouncementItem>, FetchError>;
}

/// Error type for announcer operations
#[derive(Debug, Error)]
pub enum AnnounceError {
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request signing failed: {0}")]
    Signing(String),
}

/// Port for publishing an announcement
#[async_trait]
pub trait Announcer: Send + Sync {
    /// Publish a message, returning the response body on success
    async fn publish(&self, message: &str) -> Result<String, AnnounceError>;
}

/// Error type for ledger persistence
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for the durable record of announced items
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Load the persisted ledger
    ///
    /// A missing or unreadable record is a cold start, not an error:
    /// implementations return `Ledger::default()` in that case.
    async fn load(&self) -> Ledger;

    /// Merge `new_ids` into `ledger`, stamp it with `now` and persist it,
    /// returning the snapshot that was written
    async fn save(
        &self,
        ledger: &Ledger,
        new_ids: &BTreeSet<String>,
        now: OffsetDateTime,
    ) -> Result<Ledger, LedgerError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

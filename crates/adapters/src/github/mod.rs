//! GitHub API adapters

mod read;

pub use read::{GITHUB_API_URL, GitHubSource};

use async_trait::async_trait;
use pr_announcer_domain::{AnnouncementItem, FetchError, SourceFetcher};

/// Stub source fetcher for testing
pub struct StubSource {
    items: Vec<AnnouncementItem>,
    fail_with: Option<u16>,
}

impl StubSource {
    /// Create an empty stub
    pub fn empty() -> Self {
        Self::with_items(vec![])
    }

    /// Create a stub with predefined items
    pub fn with_items(items: Vec<AnnouncementItem>) -> Self {
        Self {
            items,
            fail_with: None,
        }
    }

    /// Create a stub that answers every fetch with the given HTTP status
    pub fn failing(status: u16) -> Self {
        Self {
            items: vec![],
            fail_with: Some(status),
        }
    }
}

#[async_trait]
impl SourceFetcher for StubSource {
    async fn fetch_items(&self) -> Result<Vec<AnnouncementItem>, FetchError> {
        if let Some(status) = self.fail_with {
            return Err(FetchError::Api {
                status,
                body: "stub failure".to_string(),
            });
        }
        Ok(self.items.clone())
    }
}

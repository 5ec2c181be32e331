//! Twitter API adapters

pub mod oauth;
mod write;

pub use oauth::{OAuthCredentials, SigningContext};
pub use write::{TwitterAnnouncer, UPDATE_STATUS_URL};

use async_trait::async_trait;
use pr_announcer_domain::{AnnounceError, Announcer};
use std::collections::HashSet;

/// Stub announcer for testing
pub struct StubAnnouncer {
    failing: HashSet<String>,
    published: std::sync::Mutex<Vec<String>>,
}

impl StubAnnouncer {
    /// Announcer that accepts every message
    pub fn new() -> Self {
        Self {
            failing: HashSet::new(),
            published: std::sync::Mutex::new(vec![]),
        }
    }

    /// Announcer that rejects the given messages and accepts the rest
    pub fn failing_on(messages: impl IntoIterator<Item = String>) -> Self {
        Self {
            failing: messages.into_iter().collect(),
            published: std::sync::Mutex::new(vec![]),
        }
    }

    /// Get all messages that were published
    pub fn get_published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }
}

impl Default for StubAnnouncer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Announcer for StubAnnouncer {
    async fn publish(&self, message: &str) -> Result<String, AnnounceError> {
        if self.failing.contains(message) {
            return Err(AnnounceError::Api {
                status: 500,
                body: "stub failure".to_string(),
            });
        }

        self.published.lock().unwrap().push(message.to_string());
        Ok(format!("stub: {}", message))
    }
}

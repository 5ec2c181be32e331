//! XML file ledger store
//!
//! File format:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <PullRequests lastrun="2024-06-01T12:00:00Z">
//!   <PullRequest>1</PullRequest>
//!   <PullRequest>2</PullRequest>
//! </PullRequests>
//! ```
//!
//! Writes go to a sibling `.tmp` file which is then renamed over the ledger,
//! so a crash mid-write never leaves a truncated ledger behind.

use async_trait::async_trait;
use pr_announcer_domain::{Ledger, LedgerError, LedgerStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};
use tokio::fs;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Ledger persisted as a small XML document
#[derive(Debug, Clone)]
pub struct XmlLedgerStore {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "PullRequests")]
struct LedgerDocument {
    #[serde(rename = "@lastrun")]
    last_run: String,
    #[serde(rename = "PullRequest", default)]
    pull_requests: Vec<String>,
}

impl XmlLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn read_ledger(&self) -> Result<Ledger, LedgerError> {
        let text = fs::read_to_string(&self.path).await?;
        parse_ledger(&text)
    }
}

/// Parse a ledger document; the timestamp is normalised to UTC
pub fn parse_ledger(text: &str) -> Result<Ledger, LedgerError> {
    let document: LedgerDocument =
        quick_xml::de::from_str(text).map_err(|e| LedgerError::Serialization(e.to_string()))?;

    let last_run_at = OffsetDateTime::parse(document.last_run.trim(), &Rfc3339)
        .map_err(|e| LedgerError::Serialization(format!("Invalid lastrun: {}", e)))?;

    let announced_ids = document
        .pull_requests
        .into_iter()
        .map(|id| id.trim().to_string())
        .collect();

    Ok(Ledger::new(announced_ids, last_run_at))
}

/// Render a ledger as an XML document
pub fn render_ledger(ledger: &Ledger) -> Result<String, LedgerError> {
    let last_run = ledger
        .last_run_at
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| LedgerError::Serialization(e.to_string()))?;

    let document = LedgerDocument {
        last_run,
        pull_requests: ledger.announced_ids.iter().cloned().collect(),
    };

    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent(' ', 2);
    document
        .serialize(serializer)
        .map_err(|e| LedgerError::Serialization(e.to_string()))?;

    Ok(format!("{}\n{}\n", XML_DECLARATION, body))
}

#[async_trait]
impl LedgerStore for XmlLedgerStore {
    async fn load(&self) -> Ledger {
        match self.read_ledger().await {
            Ok(ledger) => {
                tracing::debug!(
                    path = %self.path.display(),
                    ids = ledger.announced_ids.len(),
                    "Loaded ledger"
                );
                ledger
            }
            Err(LedgerError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.path.display(),
                    "No previous runs detected, announcing all open pull requests"
                );
                Ledger::default()
            }
            Err(e) => {
                tracing::info!(
                    path = %self.path.display(),
                    error = %e,
                    "Ledger unreadable, starting from an empty ledger"
                );
                Ledger::default()
            }
        }
    }

    async fn save(
        &self,
        ledger: &Ledger,
        new_ids: &BTreeSet<String>,
        now: OffsetDateTime,
    ) -> Result<Ledger, LedgerError> {
        let merged = ledger.merged(new_ids, now);
        let content = render_ledger(&merged)?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, content.as_bytes()).await?;

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(
            path = %self.path.display(),
            ids = merged.announced_ids.len(),
            "Saved ledger"
        );

        Ok(merged)
    }
}

//! pr-announcer adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `github`: GitHub pull request source
//! - `twitter`: Twitter announcer and OAuth 1.0a signing
//! - `ledger`: XML file and in-memory ledger stores

mod ledger_memory;
mod ledger_xml;

pub mod github;
pub mod twitter;

/// Re-exports for ledger adapters
pub mod ledger {
    pub use crate::ledger_memory::InMemoryLedgerStore;
    pub use crate::ledger_xml::{XmlLedgerStore, parse_ledger, render_ledger};
}

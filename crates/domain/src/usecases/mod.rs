//! Application use cases / business logic

pub mod announce_run;
pub mod dedup;

pub use announce_run::{AnnounceRun, AnnounceRunConfig, RunError};
pub use dedup::filter_new;

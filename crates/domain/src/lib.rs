//! pr-announcer domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Deduplication and the announce-run orchestrator

pub mod model;
pub mod ports;
pub mod usecases;

pub use model::*;
pub use ports::*;

//! Casfolio Core - consolidated account statement ingestion.
//!
//! This crate decrypts statements, recovers holdings from their text and
//! reconciles them into a portfolio store. It is database-agnostic and
//! defines traits that are implemented by the `storage-sqlite` crate.

pub mod constants;
pub mod documents;
pub mod errors;
pub mod events;
pub mod holdings;
pub mod import;

// Re-export the types most callers need
pub use documents::{Credential, RawDocument};
pub use holdings::{CandidateHolding, Category, Holding};
pub use import::{CasImportPipeline, ImportReport, ImportRequest, PipelineConfig};

// Re-export error types
pub use errors::Error;
pub use errors::Result;

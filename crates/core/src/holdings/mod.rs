//! Holdings module - extraction, classification, models, and persistence traits.

mod category;
mod extractor;
mod holdings_model;
mod holdings_service;
mod holdings_traits;
mod line_classifier;
mod scheme_code;

// Re-export the public interface
pub use category::classify;
pub use extractor::{extract, HoldingExtractor};
pub use holdings_model::{
    CandidateHolding, Category, Holding, HoldingKey, HoldingUpsert, RejectionReason,
};
pub use holdings_service::HoldingService;
pub use holdings_traits::{HoldingRepositoryTrait, HoldingServiceTrait};
pub use line_classifier::{classify_line, parse_quantity, LineKind};
pub use scheme_code::synthesize_scheme_code;

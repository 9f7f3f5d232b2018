//! Import module - the statement import pipeline and its reconciler.

mod config;
mod import_errors;
mod import_model;
mod pipeline;
mod progress;
mod reconciler;


pub use config::PipelineConfig;
pub use import_errors::{ImportError, PipelineFailure, ReconcileError};
pub use import_model::{
    ImportOutcome, ImportReport, ImportRequest, ImportSummary, PortfolioTotals, Reconciliation,
    RowOutcome,
};
pub use pipeline::CasImportPipeline;
pub use progress::{
    MockProgressSink, NoOpProgressSink, PipelineStage, ProgressSink, ProgressUpdate,
};
pub use reconciler::ImportReconciler;

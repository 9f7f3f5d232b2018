use thiserror::Error;

use super::progress::PipelineStage;
use crate::documents::DecryptError;

/// Batch-level failures of the reconciler. Row-level problems are never errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("An authenticated owner is required to import holdings")]
    Unauthenticated,

    #[error("The import batch contains no holdings")]
    EmptyBatch,

    #[error("Portfolio store failure: {0}")]
    Storage(String),
}

impl ReconcileError {
    pub fn code(&self) -> &'static str {
        match self {
            ReconcileError::Unauthenticated => "UNAUTHENTICATED",
            ReconcileError::EmptyBatch => "EMPTY_BATCH",
            ReconcileError::Storage(_) => "STORAGE_FAILURE",
        }
    }
}

/// Every failure an import can end in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error(transparent)]
    Decrypt(#[from] DecryptError),

    #[error("No holdings could be recovered from the statement; check that it is a consolidated account statement")]
    NoHoldingsFound,

    #[error("An authenticated owner is required to import holdings")]
    Unauthenticated,

    #[error("Portfolio store failure: {0}")]
    Storage(String),
}

impl ImportError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::Decrypt(e) => e.code(),
            ImportError::NoHoldingsFound => "NO_HOLDINGS_FOUND",
            ImportError::Unauthenticated => "UNAUTHENTICATED",
            ImportError::Storage(_) => "STORAGE_FAILURE",
        }
    }

    /// Whether resubmitting with a different credential can succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ImportError::Decrypt(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

impl From<ReconcileError> for ImportError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Unauthenticated => ImportError::Unauthenticated,
            ReconcileError::EmptyBatch => ImportError::NoHoldingsFound,
            ReconcileError::Storage(msg) => ImportError::Storage(msg),
        }
    }
}

/// Terminal failure of one pipeline run, tagged with the stage it happened in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Import failed while {stage}: {error}")]
pub struct PipelineFailure {
    pub stage: PipelineStage,
    #[source]
    pub error: ImportError,
}

impl PipelineFailure {
    pub fn new(stage: PipelineStage, error: impl Into<ImportError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.error.code()
    }

    pub fn is_recoverable(&self) -> bool {
        self.error.is_recoverable()
    }
}

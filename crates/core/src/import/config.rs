use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MAX_DOCUMENT_BYTES;

/// Settings injected into the import pipeline at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Documents above this size are refused before parsing.
    pub max_document_bytes: usize,
    /// Refuse an empty credential up front instead of probing the document.
    pub require_credential: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            require_credential: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_max_document_bytes(mut self, max_document_bytes: usize) -> Self {
        self.max_document_bytes = max_document_bytes;
        self
    }

    pub fn with_require_credential(mut self, require_credential: bool) -> Self {
        self.require_credential = require_credential;
        self
    }
}

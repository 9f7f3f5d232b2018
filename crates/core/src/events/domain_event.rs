//! Domain event types.

use serde::{Deserialize, Serialize};

/// Domain events emitted by core services after successful mutations.
///
/// Runtime adapters translate them into platform-specific actions such as
/// refreshing a cached holdings view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A statement import persisted at least one holding.
    HoldingsImported {
        owner_id: String,
        scheme_codes: Vec<String>,
    },

    /// A holding was removed by its owner.
    HoldingDeleted { owner_id: String, holding_id: String },
}

impl DomainEvent {
    /// Creates a HoldingsImported event.
    pub fn holdings_imported(owner_id: impl Into<String>, scheme_codes: Vec<String>) -> Self {
        Self::HoldingsImported {
            owner_id: owner_id.into(),
            scheme_codes,
        }
    }

    /// Creates a HoldingDeleted event.
    pub fn holding_deleted(owner_id: impl Into<String>, holding_id: impl Into<String>) -> Self {
        Self::HoldingDeleted {
            owner_id: owner_id.into(),
            holding_id: holding_id.into(),
        }
    }

    pub fn owner_id(&self) -> &str {
        match self {
            Self::HoldingsImported { owner_id, .. } | Self::HoldingDeleted { owner_id, .. } => {
                owner_id
            }
        }
    }
}

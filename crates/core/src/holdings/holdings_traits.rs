//! Holding repository and service traits.
//!
//! These traits define the contract for holding persistence without any
//! database-specific types.

use async_trait::async_trait;

use super::holdings_model::{Holding, HoldingUpsert};
use crate::errors::Result;

/// Trait defining the contract for Holding repository operations.
#[async_trait]
pub trait HoldingRepositoryTrait: Send + Sync {
    /// Inserts the holding or, when `(owner_id, scheme_code, folio_number)`
    /// already exists, overwrites its quantitative fields in one atomic write.
    ///
    /// Returns the persisted row; its `id` and `created_at` survive updates.
    async fn upsert(&self, holding: HoldingUpsert) -> Result<Holding>;

    /// Lists an owner's holdings ordered by scheme name.
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Holding>>;

    /// Deletes one holding, scoped to its owner.
    ///
    /// Returns the number of deleted records.
    async fn delete(&self, owner_id: &str, holding_id: &str) -> Result<usize>;
}

/// Trait defining the contract for Holding service operations.
#[async_trait]
pub trait HoldingServiceTrait: Send + Sync {
    /// Lists the caller's holdings.
    fn list_holdings(&self, owner_id: Option<&str>) -> Result<Vec<Holding>>;

    /// Deletes one of the caller's holdings.
    async fn delete_holding(&self, owner_id: Option<&str>, holding_id: &str) -> Result<()>;
}

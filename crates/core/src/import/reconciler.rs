use log::{debug, error, info, warn};
use std::sync::Arc;

use super::import_errors::ReconcileError;
use super::import_model::{ImportOutcome, Reconciliation, RowOutcome};
use crate::holdings::{CandidateHolding, HoldingRepositoryTrait, HoldingUpsert};

/// Merges extracted candidates into the portfolio store.
///
/// Each valid candidate becomes one atomic upsert keyed by
/// `(owner_id, scheme_code, folio_number)`, so replaying a batch leaves the
/// store unchanged and concurrent imports of the same key cannot lose an update.
pub struct ImportReconciler {
    repository: Arc<dyn HoldingRepositoryTrait>,
}

impl ImportReconciler {
    pub fn new(repository: Arc<dyn HoldingRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Reconciles one batch for one owner.
    ///
    /// Invalid rows are rejected and counted without stopping the batch. An
    /// absent owner, an empty batch or a store failure is returned as an error.
    pub async fn reconcile<I>(
        &self,
        owner_id: Option<&str>,
        candidates: I,
    ) -> Result<Reconciliation, ReconcileError>
    where
        I: IntoIterator<Item = CandidateHolding>,
        I::IntoIter: Send,
    {
        let owner_id = match owner_id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => return Err(ReconcileError::Unauthenticated),
        };

        let mut candidates = candidates.into_iter().peekable();
        if candidates.peek().is_none() {
            return Err(ReconcileError::EmptyBatch);
        }

        let mut reconciliation = Reconciliation::default();
        for (index, candidate) in candidates.enumerate() {
            let scheme_code = candidate.scheme_code.clone();
            let folio_number = candidate.folio_number.clone();

            let outcome = match candidate.validate() {
                Err(reason) => {
                    warn!("Rejected candidate #{} ({}): {}", index, scheme_code, reason);
                    ImportOutcome::Rejected { reason }
                }
                Ok(()) => {
                    let upsert = HoldingUpsert::from_candidate(owner_id, candidate);
                    let holding = self.repository.upsert(upsert).await.map_err(|e| {
                        error!("Upsert failed for candidate #{}: {}", index, e);
                        ReconcileError::Storage(e.to_string())
                    })?;
                    debug!("Upserted candidate #{} as holding {}", index, holding.id);
                    ImportOutcome::Accepted {
                        holding_id: holding.id,
                    }
                }
            };

            reconciliation.record(RowOutcome {
                index,
                scheme_code,
                folio_number,
                outcome,
            });
        }

        info!(
            "Reconciled {} candidates: {} accepted, {} rejected",
            reconciliation.summary.total_candidates,
            reconciliation.summary.accepted_count,
            reconciliation.summary.rejected_count
        );
        Ok(reconciliation)
    }
}

//! Statement import orchestration.

use log::{debug, info, warn};
use std::sync::Arc;

use super::config::PipelineConfig;
use super::import_errors::{ImportError, PipelineFailure};
use super::import_model::{ImportReport, ImportRequest, PortfolioTotals};
use super::progress::{NoOpProgressSink, ProgressSink, StageTracker};
use super::reconciler::ImportReconciler;
use crate::documents::{DecryptError, DocumentDecryptor, DocumentDecryptorTrait};
use crate::events::{DomainEvent, DomainEventSink};
use crate::holdings::{extract, CandidateHolding, HoldingRepositoryTrait};

/// Runs one statement through decrypt, extract and reconcile.
///
/// Holds no per-run state: every call owns its document, text and candidates,
/// so one pipeline can serve concurrent imports. The store is the only shared
/// resource.
pub struct CasImportPipeline {
    config: PipelineConfig,
    decryptor: Arc<dyn DocumentDecryptorTrait>,
    reconciler: ImportReconciler,
    repository: Arc<dyn HoldingRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl CasImportPipeline {
    pub fn new(
        config: PipelineConfig,
        repository: Arc<dyn HoldingRepositoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        let decryptor = Arc::new(DocumentDecryptor::new(config.max_document_bytes));
        Self {
            config,
            decryptor,
            reconciler: ImportReconciler::new(repository.clone()),
            repository,
            event_sink,
        }
    }

    /// Replaces the default PDF/text decryptor.
    pub fn with_decryptor(mut self, decryptor: Arc<dyn DocumentDecryptorTrait>) -> Self {
        self.decryptor = decryptor;
        self
    }

    pub async fn run(&self, request: ImportRequest) -> Result<ImportReport, PipelineFailure> {
        self.run_with_progress(request, &NoOpProgressSink).await
    }

    /// Runs the import, reporting each stage transition to `progress`.
    pub async fn run_with_progress(
        &self,
        request: ImportRequest,
        progress: &dyn ProgressSink,
    ) -> Result<ImportReport, PipelineFailure> {
        let mut tracker = StageTracker::new(progress);
        let result = self.execute(request, &mut tracker).await;

        match &result {
            Ok(report) => info!(
                "Import finished: {} accepted, {} rejected",
                report.summary.accepted_count, report.summary.rejected_count
            ),
            Err(failure) => warn!(
                "Import failed while {} with {}",
                failure.stage,
                failure.code()
            ),
        }
        result
    }

    async fn execute(
        &self,
        request: ImportRequest,
        tracker: &mut StageTracker<'_>,
    ) -> Result<ImportReport, PipelineFailure> {
        let ImportRequest {
            document,
            credential,
            owner_id,
        } = request;

        tracker.advance();
        debug!("Decrypting {:?}", document);
        if self.config.require_credential && credential.is_empty() {
            return Err(fail(tracker, DecryptError::PasswordRequired));
        }
        let text = self
            .decryptor
            .decrypt(&document, &credential)
            .map_err(|e| fail(tracker, e))?;
        drop(document);

        tracker.advance();
        debug!("Extracting holdings from {} lines", text.line_count());
        let candidates: Vec<CandidateHolding> = extract(text).collect();
        if candidates.is_empty() {
            return Err(fail(tracker, ImportError::NoHoldingsFound));
        }
        info!("Extracted {} candidate holdings", candidates.len());

        tracker.advance();
        let reconciliation = self
            .reconciler
            .reconcile(owner_id.as_deref(), candidates)
            .await
            .map_err(|e| fail(tracker, e))?;

        let scheme_codes = reconciliation.accepted_scheme_codes();
        // owner_id is Some here: the reconciler rejects a missing owner.
        let owner_id = owner_id.unwrap_or_default();
        let holdings = self
            .repository
            .list_by_owner(owner_id.trim())
            .map_err(|e| fail(tracker, ImportError::Storage(e.to_string())))?;

        if !scheme_codes.is_empty() {
            self.event_sink
                .emit(DomainEvent::holdings_imported(owner_id.trim(), scheme_codes));
        }

        tracker.advance();
        Ok(ImportReport {
            summary: reconciliation.summary,
            outcomes: reconciliation.outcomes,
            totals: PortfolioTotals::from_holdings(&holdings),
            holdings,
        })
    }
}

fn fail(tracker: &mut StageTracker<'_>, error: impl Into<ImportError>) -> PipelineFailure {
    let stage = tracker.fail();
    PipelineFailure::new(stage, error)
}


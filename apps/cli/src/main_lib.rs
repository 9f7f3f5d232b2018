use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use serde_json::json;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use casfolio_core::constants::{PDF_MEDIA_TYPE, TEXT_MEDIA_TYPE};
use casfolio_core::events::{DomainEvent, DomainEventSink};
use casfolio_core::holdings::{HoldingRepositoryTrait, HoldingService};
use casfolio_core::import::{
    CasImportPipeline, ImportReport, PipelineFailure, ProgressSink, ProgressUpdate,
};
use casfolio_storage_sqlite::{db, HoldingRepository};

use crate::config::Config;

pub struct AppState {
    pub pipeline: CasImportPipeline,
    pub holding_service: HoldingService,
}

/// Text or JSON log lines, filtered by `RUST_LOG` (default `info`).
///
/// `log` records from the library crates are bridged into the subscriber.
pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let repository: Arc<dyn HoldingRepositoryTrait> =
        Arc::new(HoldingRepository::new(pool, writer));
    let event_sink: Arc<dyn DomainEventSink> = Arc::new(TracingDomainEventSink);

    let pipeline = CasImportPipeline::new(
        config.pipeline_config(),
        repository.clone(),
        event_sink.clone(),
    );
    let holding_service = HoldingService::new(repository, event_sink);

    Ok(AppState {
        pipeline,
        holding_service,
    })
}

/// Writes domain events to the log; the CLI has no caches to invalidate.
pub struct TracingDomainEventSink;

impl DomainEventSink for TracingDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        match &event {
            DomainEvent::HoldingsImported { scheme_codes, .. } => {
                tracing::info!(schemes = scheme_codes.len(), "holdings imported")
            }
            DomainEvent::HoldingDeleted { holding_id, .. } => {
                tracing::info!(holding_id = %holding_id, "holding deleted")
            }
        }
    }
}

pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn on_progress(&self, update: ProgressUpdate) {
        tracing::info!(stage = %update.stage, percent = update.percent, "import progress");
    }
}

/// What an import prints: the report on stdout, or a single failure body on stderr.
#[derive(Debug)]
pub enum ImportOutput {
    Report(String),
    Failure(String),
}

impl ImportOutput {
    pub fn render(result: &Result<ImportReport, PipelineFailure>) -> serde_json::Result<Self> {
        match result {
            Ok(report) => Ok(Self::Report(serde_json::to_string_pretty(report)?)),
            Err(failure) => {
                let body = json!({
                    "stage": failure.stage,
                    "code": failure.code(),
                    "message": failure.error.to_string(),
                    "recoverable": failure.is_recoverable(),
                });
                Ok(Self::Failure(serde_json::to_string_pretty(&body)?))
            }
        }
    }

    /// Prints the output and maps it to the process exit status.
    pub fn emit(self) -> ExitCode {
        match self {
            Self::Report(body) => {
                println!("{}", body);
                ExitCode::SUCCESS
            }
            Self::Failure(body) => {
                eprintln!("{}", body);
                ExitCode::FAILURE
            }
        }
    }
}

/// Media type from the file extension; anything unknown is passed through as
/// a generic binary type and rejected by the decryptor.
pub fn media_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => PDF_MEDIA_TYPE,
        Some("txt") | Some("text") => TEXT_MEDIA_TYPE,
        _ => "application/octet-stream",
    }
}

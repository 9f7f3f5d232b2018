//! Pipeline stages and the progress side channel.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Named stages of one import run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    Idle,
    Decrypting,
    Extracting,
    Reconciling,
    Done,
    Failed,
}

impl PipelineStage {
    /// Progress reported on entering the stage. `Failed` keeps the last value.
    pub fn percent(&self) -> Option<u8> {
        match self {
            PipelineStage::Idle => Some(0),
            PipelineStage::Decrypting => Some(15),
            PipelineStage::Extracting => Some(40),
            PipelineStage::Reconciling => Some(70),
            PipelineStage::Done => Some(100),
            PipelineStage::Failed => None,
        }
    }

    /// The only stage that may follow this one on success.
    pub fn successor(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Idle => Some(PipelineStage::Decrypting),
            PipelineStage::Decrypting => Some(PipelineStage::Extracting),
            PipelineStage::Extracting => Some(PipelineStage::Reconciling),
            PipelineStage::Reconciling => Some(PipelineStage::Done),
            PipelineStage::Done | PipelineStage::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Decrypting => "decrypting",
            PipelineStage::Extracting => "extracting",
            PipelineStage::Reconciling => "reconciling",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One stage-progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,
    pub percent: u8,
}

/// Observer for stage transitions. Purely observational: it cannot influence the run.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, update: ProgressUpdate);
}

/// Sink for callers that do not display progress.
#[derive(Clone, Default)]
pub struct NoOpProgressSink;

impl ProgressSink for NoOpProgressSink {
    fn on_progress(&self, _update: ProgressUpdate) {}
}

/// Records every notification; used by tests.
#[derive(Clone, Default)]
pub struct MockProgressSink {
    updates: Arc<Mutex<Vec<ProgressUpdate>>>,
}

impl MockProgressSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn stages(&self) -> Vec<PipelineStage> {
        self.updates().into_iter().map(|u| u.stage).collect()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_progress(&self, update: ProgressUpdate) {
        self.updates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(update);
    }
}

/// Per-run state machine. Only moves forward one stage at a time, so a stage
/// can neither be skipped nor revisited, and the percentage never decreases.
pub(crate) struct StageTracker<'a> {
    stage: PipelineStage,
    percent: u8,
    sink: &'a dyn ProgressSink,
}

impl<'a> StageTracker<'a> {
    pub(crate) fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            stage: PipelineStage::Idle,
            percent: 0,
            sink,
        }
    }

    pub(crate) fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Moves to the successor stage and notifies the sink. No-op once terminal.
    pub(crate) fn advance(&mut self) -> PipelineStage {
        if let Some(next) = self.stage.successor() {
            self.stage = next;
            self.percent = next.percent().unwrap_or(self.percent).max(self.percent);
            self.notify();
        }
        self.stage
    }

    /// Enters `Failed`, returning the stage that failed.
    pub(crate) fn fail(&mut self) -> PipelineStage {
        let failed_at = self.stage;
        if !self.stage.is_terminal() {
            self.stage = PipelineStage::Failed;
            self.notify();
        }
        failed_at
    }

    fn notify(&self) {
        self.sink.on_progress(ProgressUpdate {
            stage: self.stage,
            percent: self.percent,
        });
    }
}

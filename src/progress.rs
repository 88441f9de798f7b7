//! Stage-progress callback for the comparison pipeline.
//!
//! Inject an [`Arc<dyn CompareProgressCallback>`] via
//! [`crate::config::CompareConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves through its five fixed stages. The callback
//! approach keeps the library presentation-agnostic: the CLI forwards
//! events to a terminal spinner, a web front end could forward them to a
//! WebSocket, and the library never knows the difference.

use std::fmt;
use std::sync::Arc;

/// The five fixed stages of a comparison run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Extracting text from both PDFs.
    Extract,
    /// Assembling the comparison prompt.
    Prompt,
    /// Waiting on the completion endpoint.
    Completion,
    /// Removing duplicated report sections.
    Dedupe,
    /// Rendering the report PDF.
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extract => write!(f, "extracting text"),
            Stage::Prompt => write!(f, "building prompt"),
            Stage::Completion => write!(f, "analyzing documents"),
            Stage::Dedupe => write!(f, "cleaning report"),
            Stage::Render => write!(f, "rendering PDF"),
        }
    }
}

/// Called by the pipeline as it enters and leaves each stage.
///
/// Implementations must be `Send + Sync`; all methods have default no-op
/// implementations so callers only override what they care about.
pub trait CompareProgressCallback: Send + Sync {
    /// Called once before the first stage runs.
    fn on_compare_start(&self) {}

    /// Called when a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    fn on_stage_complete(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called once after the last stage, with the report's byte length.
    fn on_compare_complete(&self, report_len: usize) {
        let _ = report_len;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl CompareProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::CompareConfig`].
pub type ProgressCallback = Arc<dyn CompareProgressCallback>;

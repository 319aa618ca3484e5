//! Progress-sink trait for advisory batch status messages.
//!
//! The orchestrator emits one human-readable status string before each batch
//! begins ("Processing pages 4-5 of 5"). The sink is fire-and-forget: it is
//! called synchronously, carries no structured state, and plays no part in
//! error handling — treat it like a logging target, not control flow.
//!
//! Implementations must be `Send + Sync` so a sink can be shared with the
//! host application. Any `Fn(&str)` closure qualifies via the blanket impl:
//!
//! ```rust
//! use pdf2grid::{ExtractionConfig, ProgressSink};
//! use std::sync::Arc;
//!
//! let sink: Arc<dyn ProgressSink> = Arc::new(|msg: &str| eprintln!("{msg}"));
//! let config = ExtractionConfig::builder()
//!     .progress(sink)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Receives advisory status strings from the extraction pipeline.
pub trait ProgressSink: Send + Sync {
    /// Called once before each batch is sent to the extraction service.
    fn status(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn status(&self, message: &str) {
        self(message)
    }
}

/// A no-op sink for callers that don't need progress messages.
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn status(&self, _message: &str) {}
}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type Progress = Arc<dyn ProgressSink>;

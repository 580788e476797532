//! Operator-facing progress reporting.
//!
//! Commands and the bulk orchestrator never log directly; they receive a
//! [`Reporter`] through the application context so tests can observe the same
//! lines an operator would see.

/// Sink for progress and outcome lines.
pub(crate) trait Reporter: Send + Sync {
    /// Progress or informational line.
    fn info(&self, message: &str);

    /// Recoverable failure that does not end the command.
    fn warn(&self, message: &str);

    /// Failure that ends the command or an item of a sweep.
    fn error(&self, message: &str);
}

/// Reporter backed by the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

#[cfg(test)]
pub(crate) use recording::{RecordedLevel, RecordingReporter};

//! Progress reporting for long-running pipeline steps.
//!
//! Pipeline code reports through [`ProgressCallback`] and never touches a
//! terminal. The CLI supplies `indicatif` bars; tests and library callers
//! use [`null_progress`].

use std::sync::Arc;

/// Receives progress updates from a running step.
///
/// `Send + Sync` so one reporter can be shared by concurrent downloads.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of units expected, once known.
    fn set_total(&self, total: u64);

    fn inc(&self, delta: u64);

    fn set_message(&self, msg: String);

    /// Ends the step, leaving `msg` in place of the indicator.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

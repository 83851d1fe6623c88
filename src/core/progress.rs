// ─── Progress ───
// One `(status, progress, max)` surface shared by every install phase.
// Callers own the sink and pass it down explicitly.

use tracing::{debug, info};

/// Receiver for progress updates.
///
/// Implementations must be cheap: the pipeline calls them once per copied
/// override and once per finished download.
pub trait ProgressSink: Send + Sync {
    fn set_status(&self, status: &str);
    fn set_progress(&self, progress: u64);
    fn set_max(&self, max: u64);
}

/// Drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn set_status(&self, _status: &str) {}
    fn set_progress(&self, _progress: u64) {}
    fn set_max(&self, _max: u64) {}
}

/// Forwards updates to `tracing` for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn set_status(&self, status: &str) {
        info!("{}", status);
    }

    fn set_progress(&self, progress: u64) {
        debug!(progress, "progress");
    }

    fn set_max(&self, max: u64) {
        debug!(max, "progress max");
    }
}

/// Starts a new phase: status text, a fresh maximum and a zeroed counter.
pub fn begin_phase(sink: &dyn ProgressSink, status: &str, max: u64) {
    sink.set_status(status);
    sink.set_max(max);
    sink.set_progress(0);
}

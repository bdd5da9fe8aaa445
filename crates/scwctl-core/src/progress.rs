//! Progress events emitted while waiting on a resource
//!
//! Waiters report what they see through an optional callback so a CLI can
//! drive a spinner. Library callers usually pass `None`.

use std::time::Duration;

/// Progress events emitted during a wait
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Polling has started
    Started { resource: String, id: String },
    /// One poll returned a non-terminal status
    Polling {
        resource: String,
        id: String,
        status: String,
        attempt: u32,
        elapsed: Duration,
    },
    /// The resource reached a terminal status
    Completed {
        resource: String,
        id: String,
        status: String,
    },
    /// Polling gave up
    Failed {
        resource: String,
        id: String,
        error: String,
    },
}

/// Callback type for progress updates
///
/// CLI can use this to update spinners/progress bars.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Helper to emit progress events
pub(crate) fn emit(callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

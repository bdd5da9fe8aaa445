//! Wait-for-state polling
//!
//! Every `wait_for_*` method in [`crate::api`] is a thin layer over
//! [`poll_until`]: fetch the resource, classify its status, and either return,
//! sleep and poll again, or give up.
//!
//! The contract:
//! - a fetch error is returned immediately and is never retried;
//! - a terminal status (success or permanent error) returns the resource;
//! - a pending status sleeps for `interval` and polls again, at most
//!   `max_retries` times after the first fetch;
//! - a status the waiter does not recognise fails with
//!   [`ScwError::UnknownState`].

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::error::{Result, ScwError};
use crate::progress::{ProgressCallback, ProgressEvent, emit};

/// Default delay between two polls
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Default overall budget for a wait
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Polling cadence and budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Delay between two polls
    pub interval: Duration,
    /// Number of re-polls allowed after the first fetch
    pub max_retries: u32,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT, DEFAULT_INTERVAL)
    }
}

impl WaitOptions {
    pub fn new(interval: Duration, max_retries: u32) -> Self {
        Self {
            interval,
            max_retries,
        }
    }

    /// Budget expressed as wall-clock time instead of a retry count
    ///
    /// Saturates at `u32::MAX` retries.
    pub fn with_timeout(timeout: Duration, interval: Duration) -> Self {
        let max_retries = if interval.is_zero() {
            0
        } else {
            u32::try_from(timeout.as_nanos().div_ceil(interval.as_nanos())).unwrap_or(u32::MAX)
        };
        Self {
            interval,
            max_retries,
        }
    }

    /// Approximate upper bound of time spent sleeping
    pub fn budget(&self) -> Duration {
        self.interval * self.max_retries
    }
}

/// How a polled status should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No further transition expected; stop and return the resource
    Terminal,
    /// Still transitioning; poll again
    Pending,
    /// Not a status this waiter knows about
    Unknown,
}

/// A classified status, as returned by the `classify` closure of [`poll_until`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub state: PollState,
    pub status: String,
}

impl Observation {
    pub fn new(state: PollState, status: impl Into<String>) -> Self {
        Self {
            state,
            status: status.into(),
        }
    }
}

/// Poll `fetch` until `classify` reports a terminal state
///
/// `resource` and `id` only feed log lines, progress events and errors.
pub async fn poll_until<T, F, Fut, C>(
    resource: &str,
    id: &str,
    options: &WaitOptions,
    on_progress: Option<&ProgressCallback>,
    mut fetch: F,
    classify: C,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    C: Fn(&T) -> Observation,
{
    let start = Instant::now();
    debug!(
        resource,
        id,
        interval = ?options.interval,
        max_retries = options.max_retries,
        "waiting for terminal state"
    );
    emit(
        on_progress,
        ProgressEvent::Started {
            resource: resource.to_string(),
            id: id.to_string(),
        },
    );

    let fail = |err: ScwError| {
        emit(
            on_progress,
            ProgressEvent::Failed {
                resource: resource.to_string(),
                id: id.to_string(),
                error: err.to_string(),
            },
        );
        err
    };

    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let value = fetch().await.map_err(fail)?;
        let Observation { state, status } = classify(&value);
        trace!(resource, id, attempt, status = %status, ?state, "polled");

        match state {
            PollState::Terminal => {
                debug!(resource, id, status = %status, attempt, "terminal state reached");
                emit(
                    on_progress,
                    ProgressEvent::Completed {
                        resource: resource.to_string(),
                        id: id.to_string(),
                        status,
                    },
                );
                return Ok(value);
            }
            PollState::Unknown => {
                warn!(resource, id, status = %status, "unknown state");
                return Err(fail(ScwError::UnknownState {
                    resource: resource.to_string(),
                    id: id.to_string(),
                    state: status,
                }));
            }
            PollState::Pending => {
                if attempt > options.max_retries {
                    warn!(resource, id, attempt, "max retries exceeded");
                    return Err(fail(ScwError::MaxRetriesExceeded {
                        resource: resource.to_string(),
                        id: id.to_string(),
                        attempts: attempt,
                    }));
                }
                emit(
                    on_progress,
                    ProgressEvent::Polling {
                        resource: resource.to_string(),
                        id: id.to_string(),
                        status,
                        attempt,
                        elapsed: start.elapsed(),
                    },
                );
                tokio::time::sleep(options.interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    fn classify(s: &&'static str) -> Observation {
        let state = match *s {
            "available" | "syncing_error" => PollState::Terminal,
            "syncing" => PollState::Pending,
            _ => PollState::Unknown,
        };
        Observation::new(state, *s)
    }

    fn opts(max_retries: u32) -> WaitOptions {
        WaitOptions::new(Duration::from_millis(100), max_retries)
    }

    #[test]
    fn test_with_timeout_rounds_up() {
        let o = WaitOptions::with_timeout(Duration::from_secs(10), Duration::from_secs(3));
        assert_eq!(o.max_retries, 4);
        assert_eq!(WaitOptions::default().max_retries, 60);
        assert_eq!(
            WaitOptions::with_timeout(Duration::from_secs(1), Duration::ZERO).max_retries,
            0
        );
    }

    #[test]
    fn test_with_timeout_sub_millisecond_interval() {
        let o = WaitOptions::with_timeout(Duration::from_secs(1), Duration::from_micros(500));
        assert_eq!(o.max_retries, 2000);
    }

    #[test]
    fn test_with_timeout_saturates() {
        let o = WaitOptions::with_timeout(Duration::MAX, Duration::from_nanos(1));
        assert_eq!(o.max_retries, u32::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_on_terminal_state() {
        let calls = AtomicU32::new(0);
        let statuses = ["syncing", "syncing", "available"];
        let result = poll_until(
            "security group",
            "sg-1",
            &opts(10),
            None,
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) as usize;
                async move { Ok(statuses[n]) }
            },
            classify,
        )
        .await
        .unwrap();

        assert_eq!(result, "available");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_terminal_state_is_success() {
        let result = poll_until(
            "security group",
            "sg-1",
            &opts(10),
            None,
            || async { Ok("syncing_error") },
            classify,
        )
        .await
        .unwrap();
        assert_eq!(result, "syncing_error");
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_retries_exceeded() {
        let calls = AtomicU32::new(0);
        let err = poll_until(
            "security group",
            "sg-1",
            &opts(10),
            None,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok("syncing") }
            },
            classify,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ScwError::MaxRetriesExceeded { attempts: 11, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_polls_once() {
        let calls = AtomicU32::new(0);
        let err = poll_until(
            "volume",
            "v",
            &opts(0),
            None,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok("syncing") }
            },
            classify,
        )
        .await
        .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let err = poll_until::<&'static str, _, _, _>(
            "security group",
            "sg-1",
            &opts(10),
            None,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ScwError::NotFound {
                        message: "gone".to_string(),
                        kind: None,
                    })
                }
            },
            classify,
        )
        .await
        .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_state_fails() {
        let err = poll_until(
            "security group",
            "sg-1",
            &opts(10),
            None,
            || async { Ok("melting") },
            classify,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "unknown state for security group sg-1: melting");
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let callback: ProgressCallback = Box::new(move |event| {
            let tag = match event {
                ProgressEvent::Started { .. } => "started".to_string(),
                ProgressEvent::Polling { status, .. } => format!("polling:{status}"),
                ProgressEvent::Completed { status, .. } => format!("completed:{status}"),
                ProgressEvent::Failed { .. } => "failed".to_string(),
            };
            sink.lock().unwrap().push(tag);
        });

        let calls = AtomicU32::new(0);
        let statuses = ["syncing", "available"];
        poll_until(
            "security group",
            "sg-1",
            &opts(5),
            Some(&callback),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) as usize;
                async move { Ok(statuses[n]) }
            },
            classify,
        )
        .await
        .unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec!["started", "polling:syncing", "completed:available"]
        );
    }
}

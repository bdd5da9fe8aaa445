//! Polling configuration for waiters
//!
//! Profiles may carry a `[profiles.<name>.polling]` table that tunes how
//! long `wait_for_*` calls keep polling and how often.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::wait::WaitOptions;

/// Configuration for wait-for-state polling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Seconds between two polls
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Overall budget in seconds before a wait gives up
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PollingConfig {
    pub fn to_wait_options(&self) -> WaitOptions {
        WaitOptions::with_timeout(
            Duration::from_secs(self.timeout_secs),
            Duration::from_secs(self.interval_secs),
        )
    }
}

impl From<PollingConfig> for WaitOptions {
    fn from(config: PollingConfig) -> Self {
        config.to_wait_options()
    }
}

// Default value functions for serde
fn default_interval_secs() -> u64 {
    5
}

fn default_timeout_secs() -> u64 {
    300
}

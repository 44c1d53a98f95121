use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the transfer panel backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    #[serde(default = "default_connectivity_interval_ms")]
    pub connectivity_interval_ms: u64,

    #[serde(default = "default_device_status_interval_ms")]
    pub device_status_interval_ms: u64,

    #[serde(default = "default_receiver_revert_ms")]
    pub receiver_revert_ms: u64,

    #[serde(default = "default_event_wait_secs")]
    pub event_wait_secs: u64,

    /// Maximum number of retained log lines. Unbounded when absent.
    #[serde(default)]
    pub log_capacity: Option<usize>,

    /// Drop a poll tick while the previous request of the same poller is outstanding.
    #[serde(default)]
    pub skip_overlapping_polls: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            connectivity_interval_ms: default_connectivity_interval_ms(),
            device_status_interval_ms: default_device_status_interval_ms(),
            receiver_revert_ms: default_receiver_revert_ms(),
            event_wait_secs: default_event_wait_secs(),
            log_capacity: None,
            skip_overlapping_polls: false,
        }
    }
}

impl Config {
    pub fn connectivity_interval(&self) -> Duration {
        Duration::from_millis(self.connectivity_interval_ms.max(1))
    }

    pub fn device_status_interval(&self) -> Duration {
        Duration::from_millis(self.device_status_interval_ms.max(1))
    }

    pub fn receiver_revert_delay(&self) -> Duration {
        Duration::from_millis(self.receiver_revert_ms)
    }

    pub fn event_wait(&self) -> Duration {
        Duration::from_secs(self.event_wait_secs)
    }
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8765".to_string()
}

fn default_connectivity_interval_ms() -> u64 {
    10_000
}

fn default_device_status_interval_ms() -> u64 {
    11_000
}

fn default_receiver_revert_ms() -> u64 {
    3_000
}

fn default_event_wait_secs() -> u64 {
    30
}

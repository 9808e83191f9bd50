//! Client synchronization engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Cadence, credential, and cache settings for the client sync engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Poll interval while the inbox is changing, in seconds.
    #[serde(default = "default_fast")]
    pub fast_interval_seconds: u64,
    /// Poll interval after sustained inactivity, in seconds.
    #[serde(default = "default_slow")]
    pub slow_interval_seconds: u64,
    /// Consecutive no-change cycles before widening to the slow interval.
    #[serde(default = "default_widen_after")]
    pub widen_after_idle_cycles: u32,
    /// Refresh the credential when less than this many seconds remain.
    #[serde(default = "default_refresh_window")]
    pub refresh_window_seconds: u64,
    /// Number of records fetched and cached.
    #[serde(default = "default_cache_size")]
    pub cache_size: u32,
    /// Consecutive transport failures before an error is surfaced.
    #[serde(default = "default_max_failures")]
    pub max_consecutive_failures: u32,
    /// Session-storage key holding the last alerted notification id.
    #[serde(default = "default_sound_key")]
    pub last_sound_key: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fast_interval_seconds: default_fast(),
            slow_interval_seconds: default_slow(),
            widen_after_idle_cycles: default_widen_after(),
            refresh_window_seconds: default_refresh_window(),
            cache_size: default_cache_size(),
            max_consecutive_failures: default_max_failures(),
            last_sound_key: default_sound_key(),
        }
    }
}

impl SyncConfig {
    /// Fast poll interval.
    pub fn fast_interval(&self) -> Duration {
        Duration::from_secs(self.fast_interval_seconds)
    }

    /// Slow poll interval, never shorter than the fast one.
    pub fn slow_interval(&self) -> Duration {
        Duration::from_secs(self.slow_interval_seconds.max(self.fast_interval_seconds))
    }

    /// Proactive refresh window.
    pub fn refresh_window(&self) -> Duration {
        Duration::from_secs(self.refresh_window_seconds)
    }
}

fn default_fast() -> u64 {
    30
}

fn default_slow() -> u64 {
    120
}

fn default_widen_after() -> u32 {
    5
}

fn default_refresh_window() -> u64 {
    300
}

fn default_cache_size() -> u32 {
    20
}

fn default_max_failures() -> u32 {
    3
}

fn default_sound_key() -> String {
    "atelier.notifications.last_sound_id".to_string()
}

//! Adaptive polling interval.

use std::time::Duration;

use tracing::debug;

use atelier_core::config::SyncConfig;

/// Fast until the inbox goes quiet, then slow until something changes.
#[derive(Debug, Clone)]
pub struct Cadence {
    fast: Duration,
    slow: Duration,
    widen_after: u32,
    idle_cycles: u32,
    current: Duration,
}

impl Cadence {
    /// Start at the fast interval.
    pub fn new(fast: Duration, slow: Duration, widen_after: u32) -> Self {
        Self {
            fast,
            slow: slow.max(fast),
            widen_after: widen_after.max(1),
            idle_cycles: 0,
            current: fast,
        }
    }

    /// Cadence configured from the sync section.
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.fast_interval(),
            config.slow_interval(),
            config.widen_after_idle_cycles,
        )
    }

    /// Record a completed cycle and return the interval until the next one.
    pub fn record(&mut self, changed: bool) -> Duration {
        if changed {
            if self.current != self.fast {
                debug!(interval_secs = self.fast.as_secs(), "Change detected, polling fast again");
            }
            self.reset();
            return self.current;
        }

        self.idle_cycles = self.idle_cycles.saturating_add(1);
        if self.idle_cycles >= self.widen_after && self.current != self.slow {
            debug!(
                idle_cycles = self.idle_cycles,
                interval_secs = self.slow.as_secs(),
                "Inbox quiet, widening poll interval"
            );
            self.current = self.slow;
        }
        self.current
    }

    /// Back to the fast interval with a zero idle counter.
    pub fn reset(&mut self) {
        self.idle_cycles = 0;
        self.current = self.fast;
    }

    /// The interval until the next poll.
    pub fn interval(&self) -> Duration {
        self.current
    }

    /// Consecutive cycles without change.
    pub fn idle_cycles(&self) -> u32 {
        self.idle_cycles
    }

    /// Whether the slow interval is in effect.
    pub fn is_widened(&self) -> bool {
        self.current == self.slow && self.slow != self.fast
    }
}

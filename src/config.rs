//! Driver configuration.

use std::time::Duration;

use crate::commands::{
    DEFAULT_ANCHOR_TIMEOUT, DEFAULT_SETTLE_DELAY, DEFAULT_TAG_TIMEOUT, DEFAULT_TIMEOUT,
};
use crate::protocol::DEFAULT_LINE_CAPACITY;

/// Default read timeout used by [`Ryuw122::poll`](crate::Ryuw122::poll).
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(1000);

/// Default silence that ends the post-reset boot drain.
pub const DEFAULT_BOOT_QUIET_PERIOD: Duration = Duration::from_millis(200);

/// Default length of each reset phase.
pub const DEFAULT_RESET_PULSE: Duration = Duration::from_millis(5);

/// Default pause between tags in batch ranging.
pub const DEFAULT_BATCH_GAP: Duration = Duration::from_millis(100);

/// Timing and buffer settings for a [`Ryuw122`](crate::Ryuw122) client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleConfig {
    /// Wait for a command acknowledgement.
    pub command_timeout: Duration,
    /// Wait for an anchor-to-tag exchange.
    pub anchor_timeout: Duration,
    /// Wait for a tag send acknowledgement.
    pub tag_timeout: Duration,
    /// Read timeout when a notification line is partially received.
    pub poll_timeout: Duration,
    /// Silence that ends the boot drain after a reset pulse.
    pub boot_quiet_period: Duration,
    /// Length of each reset phase.
    pub reset_pulse: Duration,
    /// Pause after writes to an emulated transport.
    pub settle_delay: Duration,
    /// Pause between tags in batch ranging.
    pub batch_gap: Duration,
    /// Longest response line kept, in bytes.
    pub line_capacity: usize,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            command_timeout: DEFAULT_TIMEOUT,
            anchor_timeout: DEFAULT_ANCHOR_TIMEOUT,
            tag_timeout: DEFAULT_TAG_TIMEOUT,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            boot_quiet_period: DEFAULT_BOOT_QUIET_PERIOD,
            reset_pulse: DEFAULT_RESET_PULSE,
            settle_delay: DEFAULT_SETTLE_DELAY,
            batch_gap: DEFAULT_BATCH_GAP,
            line_capacity: DEFAULT_LINE_CAPACITY,
        }
    }
}

impl ModuleConfig {
    /// Sets the command timeout.
    #[must_use]
    pub const fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Sets the anchor exchange timeout.
    #[must_use]
    pub const fn anchor_timeout(mut self, timeout: Duration) -> Self {
        self.anchor_timeout = timeout;
        self
    }

    /// Sets the tag send timeout.
    #[must_use]
    pub const fn tag_timeout(mut self, timeout: Duration) -> Self {
        self.tag_timeout = timeout;
        self
    }

    /// Sets the poll read timeout.
    #[must_use]
    pub const fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Sets the boot quiet period.
    #[must_use]
    pub const fn boot_quiet_period(mut self, period: Duration) -> Self {
        self.boot_quiet_period = period;
        self
    }

    /// Sets the reset pulse length.
    #[must_use]
    pub const fn reset_pulse(mut self, pulse: Duration) -> Self {
        self.reset_pulse = pulse;
        self
    }

    /// Sets the emulated-transport settle delay.
    #[must_use]
    pub const fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets the batch ranging gap.
    #[must_use]
    pub const fn batch_gap(mut self, gap: Duration) -> Self {
        self.batch_gap = gap;
        self
    }

    /// Sets the line capacity.
    #[must_use]
    pub const fn line_capacity(mut self, capacity: usize) -> Self {
        self.line_capacity = capacity;
        self
    }
}

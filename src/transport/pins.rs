//! Optional control lines: the module's active-low reset input and its
//! ready (AUX-style) output.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::timing::{Deadline, settle};

/// Interval between ready-line samples.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Pause after the ready line goes high before the module accepts input.
pub const READY_SETTLE: Duration = Duration::from_millis(20);

/// A digital output driven by the host.
pub trait OutputPin: Send {
    /// Drives the line low.
    fn set_low(&mut self) -> Result<()>;

    /// Drives the line high.
    fn set_high(&mut self) -> Result<()>;
}

/// A digital input sampled by the host.
pub trait InputPin: Send {
    /// Returns true if the line reads high.
    fn is_high(&mut self) -> Result<bool>;
}

/// Pulses an active-low reset line: low for `pulse`, then high for `pulse`.
pub async fn pulse_reset(pin: &mut dyn OutputPin, pulse: Duration) -> Result<()> {
    pin.set_low()?;
    settle(pulse).await;
    pin.set_high()?;
    settle(pulse).await;
    Ok(())
}

/// Waits for `pin` to read high, then settles.
///
/// Without a pin the module's readiness cannot be observed, so this just
/// sleeps for `fallback`.
pub async fn wait_ready(
    pin: Option<&mut dyn InputPin>,
    timeout: Duration,
    fallback: Duration,
) -> Result<()> {
    let Some(pin) = pin else {
        settle(fallback).await;
        return Ok(());
    };

    let deadline = Deadline::after(timeout);
    while !pin.is_high()? {
        if deadline.is_expired() {
            tracing::debug!("ready line still low after {:?}", timeout);
            return Err(Error::timeout(timeout));
        }
        settle(READY_POLL_INTERVAL).await;
    }
    settle(READY_SETTLE).await;
    Ok(())
}

//! Command handlers for RYUW122 operations.
//!
//! [`CommandHandler`] owns the transport and runs one AT exchange at a
//! time: stale input is discarded, the command line is written, and
//! response lines are read until the expected one arrives, the module
//! reports `+ERR`, or the deadline passes. Unrelated lines seen while
//! waiting are skipped.

mod config;
mod data;

use std::time::Duration;

use crate::error::{Error, Result};
use crate::protocol::{Command, DEFAULT_LINE_CAPACITY, Line, LineDecoder, parse_module_error};
use crate::timing::{Deadline, settle};
use crate::transport::Transport;

pub use data::{DEFAULT_ANCHOR_TIMEOUT, DEFAULT_TAG_TIMEOUT};

/// Default command timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Default pause after each write to an emulated transport.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Bytes read from the transport per call.
const READ_CHUNK: usize = 64;

/// Command handler for RYUW122 operations.
pub struct CommandHandler<T> {
    transport: T,
    decoder: LineDecoder,
    timeout: Duration,
    settle_delay: Duration,
}

impl<T: Transport> CommandHandler<T> {
    /// Creates a new command handler.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            decoder: LineDecoder::new(DEFAULT_LINE_CAPACITY),
            timeout: DEFAULT_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Sets the maximum length kept for one response line.
    #[must_use]
    pub fn with_line_capacity(mut self, capacity: usize) -> Self {
        self.decoder = LineDecoder::new(capacity);
        self
    }

    /// Gets the command timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sets the command timeout.
    pub const fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Gets the pause applied after writes to an emulated transport.
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Sets the pause applied after writes to an emulated transport.
    pub const fn set_settle_delay(&mut self, delay: Duration) {
        self.settle_delay = delay;
    }

    /// Gets the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Gets the transport mutably.
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consumes the handler and returns the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Returns true if the transport is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    /// Opens the transport if it is not already open.
    pub async fn open(&mut self) -> Result<()> {
        if !self.transport.is_open() {
            self.transport.open().await?;
        }
        self.decoder.clear();
        Ok(())
    }

    /// Closes the transport.
    pub async fn close(&mut self) -> Result<()> {
        self.decoder.clear();
        self.transport.close().await
    }

    fn ensure_open(&self) -> Result<()> {
        if self.transport.is_open() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    /// Returns true if input is waiting, without blocking.
    pub fn available(&mut self) -> Result<bool> {
        self.ensure_open()?;
        if self.decoder.has_pending() {
            return Ok(true);
        }
        let mut buf = [0u8; READ_CHUNK];
        let n = self.transport.try_receive(&mut buf)?;
        self.decoder.feed(&buf[..n]);
        Ok(n > 0)
    }

    /// Drops all buffered and immediately readable input.
    ///
    /// Returns the number of bytes discarded.
    pub fn discard_input(&mut self) -> Result<usize> {
        self.ensure_open()?;
        let mut discarded = self.decoder.buffered();
        self.decoder.clear();

        let mut buf = [0u8; READ_CHUNK];
        loop {
            let n = self.transport.try_receive(&mut buf)?;
            if n == 0 {
                break;
            }
            discarded += n;
        }

        if discarded > 0 {
            tracing::debug!("discarded {} stale bytes", discarded);
        }
        Ok(discarded)
    }

    /// Reads and drops input until the line stays silent for `quiet`.
    ///
    /// Returns the number of bytes drained.
    pub async fn drain_until_quiet(&mut self, quiet: Duration) -> Result<usize> {
        self.ensure_open()?;
        let mut drained = self.decoder.buffered();
        self.decoder.clear();

        let mut buf = [0u8; READ_CHUNK];
        loop {
            match tokio::time::timeout(quiet, self.transport.receive(&mut buf)).await {
                Ok(Ok(n)) => drained += n,
                Ok(Err(e)) => return Err(e),
                Err(_) => break,
            }
        }

        if drained > 0 {
            tracing::debug!("drained {} bytes before the line went quiet", drained);
        }
        Ok(drained)
    }

    /// Writes a command line.
    ///
    /// Emulated transports get a short pause afterwards so the emulator
    /// can consume the line before the next read.
    pub async fn send_command(&mut self, command: &Command) -> Result<()> {
        self.ensure_open()?;
        tracing::trace!("AT> {}", command);
        self.transport.send(command.encode()).await?;
        if self.transport.kind().needs_settle() {
            settle(self.settle_delay).await;
        }
        Ok(())
    }

    /// Reads one line, waiting at most `timeout`.
    ///
    /// On timeout the partial line accumulated so far is returned with
    /// `complete == false`.
    pub async fn read_line(&mut self, timeout: Duration) -> Result<Line> {
        self.ensure_open()?;
        let deadline = Deadline::after(timeout);
        let mut buf = [0u8; READ_CHUNK];

        loop {
            if let Some(line) = self.decoder.decode() {
                if line.truncated {
                    tracing::debug!("line exceeded {} bytes and was cut", self.decoder.capacity());
                }
                tracing::trace!("AT< {}", line.text);
                return Ok(line);
            }

            match tokio::time::timeout_at(deadline.instant(), self.transport.receive(&mut buf)).await
            {
                Ok(Ok(n)) => self.decoder.feed(&buf[..n]),
                Ok(Err(e)) => return Err(e),
                Err(_) => return Ok(self.decoder.take_partial()),
            }
        }
    }

    /// Sends a command and waits for a line starting with `expected`.
    ///
    /// Uses the handler's timeout when `timeout` is `None`.
    pub async fn execute(
        &mut self,
        command: &Command,
        expected: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let timeout = timeout.unwrap_or(self.timeout);
        self.discard_input()?;
        self.send_command(command).await?;

        let deadline = Deadline::after(timeout);
        loop {
            let line = self.read_line(deadline.remaining()).await?;
            if !line.complete {
                tracing::debug!("{} got no {} within {:?}", command, expected, timeout);
                return Err(Error::timeout(timeout));
            }

            let text = line.text.trim();
            if text.starts_with(expected) {
                return Ok(());
            }
            if let Some(code) = parse_module_error(text) {
                tracing::debug!("{} rejected: {}", command, code);
                return Err(Error::Module(code));
            }
            if !text.is_empty() {
                tracing::debug!("ignoring {:?} while waiting for {}", text, expected);
            }
        }
    }

    /// Sends a query and returns the first non-empty response line.
    pub async fn query(&mut self, command: &Command, timeout: Option<Duration>) -> Result<String> {
        let timeout = timeout.unwrap_or(self.timeout);
        self.discard_input()?;
        self.send_command(command).await?;

        let deadline = Deadline::after(timeout);
        loop {
            let line = self.read_line(deadline.remaining()).await?;
            let text = line.text.trim();
            if !line.complete && text.is_empty() {
                tracing::debug!("{} got no response within {:?}", command, timeout);
                return Err(Error::timeout(timeout));
            }
            if text.is_empty() {
                continue;
            }
            if let Some(code) = parse_module_error(text) {
                return Err(Error::Module(code));
            }
            return Ok(text.to_owned());
        }
    }
}

//! Transport layer for the RYUW122 UART link.
//!
//! A [`Transport`] is a byte stream that can be opened, written, read with
//! a blocking future, and probed without blocking. Hardware serial ports and
//! arbitrary async streams (for example a PTY bridge to an emulator) are
//! supported.

#[cfg(test)]
pub(crate) mod mock;
pub mod pins;
pub mod serial;
pub mod stream;

use std::future::Future;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures::FutureExt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};

/// Boxed future returned by [`Transport`] methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// What sits on the other end of a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportKind {
    /// A physical UART.
    #[default]
    Hardware,
    /// A software emulator that needs a short pause after each write.
    Emulated,
    /// A caller-supplied stream.
    Stream,
}

impl TransportKind {
    /// Returns true if writes should be followed by a settle delay.
    #[must_use]
    pub const fn needs_settle(self) -> bool {
        matches!(self, Self::Emulated)
    }
}

/// Trait for transport implementations.
pub trait Transport: Send {
    /// Opens the underlying stream.
    fn open(&mut self) -> TransportFuture<'_, ()>;

    /// Closes the underlying stream.
    fn close(&mut self) -> TransportFuture<'_, ()>;

    /// Writes and flushes `data`.
    fn send(&mut self, data: Bytes) -> TransportFuture<'_, ()>;

    /// Reads at least one byte into `buf`, waiting until data arrives.
    fn receive<'a>(&'a mut self, buf: &'a mut [u8]) -> TransportFuture<'a, usize>;

    /// Reads whatever is immediately available; returns 0 if nothing is.
    fn try_receive(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Returns true if the stream is open.
    fn is_open(&self) -> bool;

    /// Returns what kind of peer this transport talks to.
    fn kind(&self) -> TransportKind;
}

pub use pins::{InputPin, OutputPin};
pub use serial::{SerialConfig, SerialTransport, list_ports};
pub use stream::StreamTransport;

pub(crate) async fn write_all<S>(stream: &mut S, data: &[u8]) -> Result<()>
where
    S: AsyncWrite + Unpin + ?Sized,
{
    stream.write_all(data).await?;
    stream.flush().await?;
    Ok(())
}

pub(crate) async fn read_some<S>(stream: &mut S, buf: &mut [u8]) -> Result<usize>
where
    S: AsyncRead + Unpin + ?Sized,
{
    match stream.read(buf).await? {
        0 if !buf.is_empty() => Err(Error::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "transport stream closed",
        ))),
        n => Ok(n),
    }
}

pub(crate) fn read_now<S>(stream: &mut S, buf: &mut [u8]) -> Result<usize>
where
    S: AsyncRead + Unpin + ?Sized,
{
    match stream.read(buf).now_or_never() {
        Some(result) => Ok(result?),
        None => Ok(0),
    }
}

//! Transport over any async byte stream.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportFuture, TransportKind, read_now, read_some, write_all};

/// Wraps an already-open stream, such as a PTY to an emulator or a
/// [`tokio::io::DuplexStream`] in tests.
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: Option<S>,
    kind: TransportKind,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wraps `stream`. The transport starts open.
    #[must_use]
    pub const fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
            kind: TransportKind::Stream,
        }
    }

    /// Overrides the reported transport kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: TransportKind) -> Self {
        self.kind = kind;
        self
    }

    /// Returns the inner stream, if still open.
    pub fn into_inner(self) -> Option<S> {
        self.stream
    }
}

impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn open(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.stream.is_some() {
                Ok(())
            } else {
                // A closed stream cannot be reopened.
                Err(Error::NotConnected)
            }
        })
    }

    fn close(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if let Some(mut stream) = self.stream.take() {
                stream.shutdown().await?;
            }
            Ok(())
        })
    }

    fn send(&mut self, data: Bytes) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
            write_all(stream, &data).await
        })
    }

    fn receive<'a>(&'a mut self, buf: &'a mut [u8]) -> TransportFuture<'a, usize> {
        Box::pin(async move {
            let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
            read_some(stream, buf).await
        })
    }

    fn try_receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        read_now(stream, buf)
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn kind(&self) -> TransportKind {
        self.kind
    }
}

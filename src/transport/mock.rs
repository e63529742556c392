//! Scripted in-memory transport for tests.

use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportFuture, TransportKind};

/// Replies to written command lines from a queue of expectations.
///
/// A write whose line matches the front expectation pops it and queues the
/// scripted reply for reading. Any other write gets no reply, so the
/// caller sees silence. Reads on an empty buffer never complete, which lets
/// paused-clock tests drive timeouts deterministically.
pub(crate) struct MockTransport {
    expectations: VecDeque<(String, Vec<u8>)>,
    rx: BytesMut,
    sent: Vec<String>,
    open: bool,
    fail_open: bool,
    kind: TransportKind,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            expectations: VecDeque::new(),
            rx: BytesMut::new(),
            sent: Vec::new(),
            open: true,
            fail_open: false,
            kind: TransportKind::Stream,
        }
    }

    pub(crate) fn closed() -> Self {
        Self {
            open: false,
            ..Self::new()
        }
    }

    pub(crate) fn with_kind(mut self, kind: TransportKind) -> Self {
        self.kind = kind;
        self
    }

    pub(crate) fn failing_open(mut self) -> Self {
        self.open = false;
        self.fail_open = true;
        self
    }

    /// Replies with `reply` when `request` (without terminator) is written.
    pub(crate) fn expect(mut self, request: &str, reply: &str) -> Self {
        self.expectations
            .push_back((request.to_owned(), reply.as_bytes().to_vec()));
        self
    }

    /// Makes `data` readable immediately.
    pub(crate) fn inject(&mut self, data: &str) {
        self.rx.extend_from_slice(data.as_bytes());
    }

    /// Lines written so far, without terminators.
    pub(crate) fn sent(&self) -> &[String] {
        &self.sent
    }

    pub(crate) fn pending_expectations(&self) -> usize {
        self.expectations.len()
    }

    fn take_available(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.rx.len());
        buf[..n].copy_from_slice(&self.rx.split_to(n));
        n
    }
}

impl Transport for MockTransport {
    fn open(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.fail_open {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such device",
                )));
            }
            self.open = true;
            Ok(())
        })
    }

    fn close(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.open = false;
            Ok(())
        })
    }

    fn send(&mut self, data: Bytes) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if !self.open {
                return Err(Error::NotConnected);
            }
            let text = String::from_utf8_lossy(&data);
            for line in text.split_terminator("\r\n") {
                self.sent.push(line.to_owned());
                let matched = self
                    .expectations
                    .front()
                    .is_some_and(|(request, _)| request == line);
                if matched {
                    let reply = self
                        .expectations
                        .pop_front()
                        .map(|(_, reply)| reply)
                        .unwrap_or_default();
                    self.rx.extend_from_slice(&reply);
                }
            }
            Ok(())
        })
    }

    fn receive<'a>(&'a mut self, buf: &'a mut [u8]) -> TransportFuture<'a, usize> {
        Box::pin(async move {
            if !self.open {
                return Err(Error::NotConnected);
            }
            if self.rx.is_empty() {
                std::future::pending::<()>().await;
            }
            Ok(self.take_available(buf))
        })
    }

    fn try_receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        if !self.open {
            return Err(Error::NotConnected);
        }
        Ok(self.take_available(buf))
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn kind(&self) -> TransportKind {
        self.kind
    }
}

/// Routes `tracing` output to the test harness; honours `RUST_LOG`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

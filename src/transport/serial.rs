//! Serial/USB transport implementation.

use bytes::Bytes;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportFuture, TransportKind, read_now, read_some, write_all};
use crate::types::BaudRate;

/// Configuration for serial transport.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Serial port path (e.g., "/dev/ttyUSB0" or "COM3").
    pub port: String,
    /// UART speed. Must match the module's `AT+IPR` setting.
    pub baud_rate: BaudRate,
    /// The port is backed by a software emulator.
    pub emulated: bool,
}

impl SerialConfig {
    /// Creates a new serial configuration at 115200 bps.
    #[must_use]
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: BaudRate::default(),
            emulated: false,
        }
    }

    /// Sets the baud rate.
    #[must_use]
    pub const fn baud_rate(mut self, rate: BaudRate) -> Self {
        self.baud_rate = rate;
        self
    }

    /// Marks the port as emulated.
    #[must_use]
    pub const fn emulated(mut self, emulated: bool) -> Self {
        self.emulated = emulated;
        self
    }
}

/// Serial transport for the module's UART.
pub struct SerialTransport {
    config: SerialConfig,
    stream: Option<SerialStream>,
}

impl SerialTransport {
    /// Creates a new serial transport with the given configuration.
    #[must_use]
    pub const fn new(config: SerialConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// Creates a new serial transport for the given port with default settings.
    #[must_use]
    pub fn with_port(port: impl Into<String>) -> Self {
        Self::new(SerialConfig::new(port))
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SerialConfig {
        &self.config
    }
}

impl Transport for SerialTransport {
    fn open(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.stream.is_some() {
                return Ok(());
            }

            let baud = self
                .config
                .baud_rate
                .value()
                .ok_or_else(|| Error::InvalidArgument {
                    parameter: "baud rate",
                    reason: "unknown baud rate".to_owned(),
                })?;

            tracing::info!("opening serial port {} at {} bps", self.config.port, baud);
            let stream = tokio_serial::new(&self.config.port, baud)
                .open_native_async()
                .map_err(Error::Serial)?;
            self.stream = Some(stream);
            Ok(())
        })
    }

    fn close(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.stream.take().is_some() {
                tracing::info!("closed serial port {}", self.config.port);
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
        if self.config.emulated {
            TransportKind::Emulated
        } else {
            TransportKind::Hardware
        }
    }
}

/// Lists available serial ports.
///
/// # Errors
///
/// Returns an error if the port list cannot be retrieved.
pub fn list_ports() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports().map_err(Error::Serial)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

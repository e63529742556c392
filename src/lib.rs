//! # ryuw122
//!
//! A Rust driver for REYAX RYUW122 UWB ranging modules.
//!
//! This library talks to the module's AT command set over a UART link.
//!
//! ## Features
//!
//! - Async/await based API using Tokio
//! - Typed configuration commands with validation before any I/O
//! - Synchronous anchor-to-tag ranging and data exchange
//! - Callback and subscription delivery of unsolicited notifications
//! - Serial ports or any async byte stream as transport
//!
//! ## Quick Start
//!
//! ```no_run
//! use ryuw122::{BaudRate, MeasureUnit, Mode, Ryuw122};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ryuw122::Error> {
//!     let mut module = Ryuw122::serial("/dev/ttyUSB0", BaudRate::B115200);
//!     module.begin().await?;
//!
//!     module.commands_mut().set_mode(Mode::Anchor).await?;
//!     module.commands_mut().set_network_id("REYAX123").await?;
//!
//!     let meters = module
//!         .get_distance_from("TAG00001", MeasureUnit::Meters, None)
//!         .await?;
//!     println!("TAG00001 is {meters:.2} m away");
//!
//!     module.on_message_received(|from, message, rssi| {
//!         println!("{from}: {message} ({rssi} dBm)");
//!     });
//!     loop {
//!         module.poll().await?;
//!         tokio::time::sleep(std::time::Duration::from_millis(10)).await;
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`protocol`] - Command formatting, line framing and response parsing
//! - [`types`] - Configuration values, notification payloads, distance units
//! - [`transport`] - Serial and stream transports, control lines
//! - [`event`] - Notification dispatch to handlers and subscribers
//! - [`commands`] - Command engine and module operations
//! - [`client`] - High-level [`Ryuw122`] client

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod event;
pub mod protocol;
pub mod timing;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{DISTANCE_UNAVAILABLE, MultiRanging, Ryuw122};
pub use commands::CommandHandler;
pub use config::ModuleConfig;
pub use error::{Error, ModuleErrorCode, Result};
pub use event::{EventDispatcher, Notification, Subscription};
pub use protocol::{Command, CommandKey};
pub use transport::{
    InputPin, OutputPin, SerialConfig, SerialTransport, StreamTransport, Transport, TransportKind,
    list_ports,
};
pub use types::{
    AnchorReceive, Bandwidth, BaudRate, MeasureUnit, Mode, RangingResponse, RfChannel, RfPower,
    RssiDisplay, TagDutyCycle, TagReceive,
};

//! Data types for RYUW122 entities.
//!
//! This module contains the core data structures used throughout the library:
//! - Module configuration values
//! - Notification and ranging payloads
//! - Distance units

pub mod config;
pub mod message;
pub mod unit;

pub use config::{BaudRate, Bandwidth, Mode, RfChannel, RfPower, RssiDisplay, TagDutyCycle};
pub use message::{
    ADDRESS_LENGTH, AnchorReceive, MAX_PAYLOAD_LENGTH, RangingResponse, TagReceive,
};
pub use unit::{MeasureUnit, convert as convert_distance, to_centimeters};

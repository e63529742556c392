//! AT command formatting for the RYUW122 protocol.
//!
//! Commands are single ASCII lines:
//! ```text
//! AT                  liveness test
//! AT+<KEY>=<args>     set
//! AT+<KEY>?           query
//! AT+<KEY>            action (FACTORY, RESET)
//! ```

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

/// Line terminator appended to every outbound command.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Command keys understood by the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKey {
    /// Operating mode (`MODE`).
    Mode,
    /// UART baud rate (`IPR`).
    BaudRate,
    /// RF channel (`CHANNEL`).
    Channel,
    /// Air data rate (`BANDWIDTH`).
    Bandwidth,
    /// Network identifier (`NETWORKID`).
    NetworkId,
    /// Device address (`ADDRESS`).
    Address,
    /// Read-only unique identifier (`UID`).
    Uid,
    /// AES-128 password (`CPIN`).
    Password,
    /// Tag RF duty cycle (`TAGD`).
    TagDutyCycle,
    /// RF output power (`CRFOP`).
    RfPower,
    /// Anchor send (`ANCHOR_SEND`).
    AnchorSend,
    /// Tag send (`TAG_SEND`).
    TagSend,
    /// RSSI display toggle (`RSSI`).
    Rssi,
    /// Distance calibration (`CAL`).
    Calibration,
    /// Firmware version (`VER`).
    Version,
    /// Factory reset (`FACTORY`).
    Factory,
    /// Soft reset (`RESET`).
    Reset,
}

impl CommandKey {
    /// The key as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mode => "MODE",
            Self::BaudRate => "IPR",
            Self::Channel => "CHANNEL",
            Self::Bandwidth => "BANDWIDTH",
            Self::NetworkId => "NETWORKID",
            Self::Address => "ADDRESS",
            Self::Uid => "UID",
            Self::Password => "CPIN",
            Self::TagDutyCycle => "TAGD",
            Self::RfPower => "CRFOP",
            Self::AnchorSend => "ANCHOR_SEND",
            Self::TagSend => "TAG_SEND",
            Self::Rssi => "RSSI",
            Self::Calibration => "CAL",
            Self::Version => "VER",
            Self::Factory => "FACTORY",
            Self::Reset => "RESET",
        }
    }

    /// Prefix of the module's echo for a query, e.g. `+MODE=`.
    #[must_use]
    pub fn response_prefix(self) -> String {
        format!("+{}=", self.as_str())
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A formatted outbound command line (without terminator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    line: String,
}

impl Command {
    /// `AT`: liveness test.
    #[must_use]
    pub fn test() -> Self {
        Self {
            line: "AT".to_owned(),
        }
    }

    /// `AT+<KEY>=<value>`.
    #[must_use]
    pub fn set(key: CommandKey, value: impl fmt::Display) -> Self {
        Self {
            line: format!("AT+{key}={value}"),
        }
    }

    /// `AT+<KEY>?`.
    #[must_use]
    pub fn query(key: CommandKey) -> Self {
        Self {
            line: format!("AT+{key}?"),
        }
    }

    /// `AT+<KEY>`.
    #[must_use]
    pub fn action(key: CommandKey) -> Self {
        Self {
            line: format!("AT+{key}"),
        }
    }

    /// `AT+ANCHOR_SEND=<address>,<length>,<data>`.
    #[must_use]
    pub fn anchor_send(tag_address: &str, payload_length: usize, data: &str) -> Self {
        Self::set(
            CommandKey::AnchorSend,
            format!("{tag_address},{payload_length},{data}"),
        )
    }

    /// `AT+TAG_SEND=<length>,<data>`.
    #[must_use]
    pub fn tag_send(payload_length: usize, data: &str) -> Self {
        Self::set(CommandKey::TagSend, format!("{payload_length},{data}"))
    }

    /// The command line without terminator.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.line
    }

    /// Encodes the line with its terminator.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.line.len() + LINE_TERMINATOR.len());
        buf.put_slice(self.line.as_bytes());
        buf.put_slice(LINE_TERMINATOR.as_bytes());
        buf.freeze()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

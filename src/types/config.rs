//! Module configuration values.
//!
//! Every enum carries an `Unknown` variant: getters return it when the
//! module's reply is missing, malformed or out of the documented range.

use std::fmt;

/// Operating mode of the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Mobile tag.
    Tag,
    /// Fixed anchor.
    Anchor,
    /// Sleep.
    Sleep,
    /// Reply could not be interpreted.
    #[default]
    Unknown,
}

impl Mode {
    /// Maps the numeric wire value.
    #[must_use]
    pub const fn from_value(value: i32) -> Self {
        match value {
            0 => Self::Tag,
            1 => Self::Anchor,
            2 => Self::Sleep,
            _ => Self::Unknown,
        }
    }

    /// Returns the numeric wire value, `None` for `Unknown`.
    #[must_use]
    pub const fn value(self) -> Option<u32> {
        match self {
            Self::Tag => Some(0),
            Self::Anchor => Some(1),
            Self::Sleep => Some(2),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tag => "TAG (mobile) mode",
            Self::Anchor => "ANCHOR (fixed) mode",
            Self::Sleep => "SLEEP mode",
            Self::Unknown => "unknown mode",
        })
    }
}

/// UART baud rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BaudRate {
    /// 9600 bps.
    B9600,
    /// 57600 bps.
    B57600,
    /// 115200 bps (factory default).
    #[default]
    B115200,
    /// Reply could not be interpreted.
    Unknown,
}

impl BaudRate {
    /// Maps a rate in bits per second.
    #[must_use]
    pub const fn from_value(value: i32) -> Self {
        match value {
            9600 => Self::B9600,
            57600 => Self::B57600,
            115_200 => Self::B115200,
            _ => Self::Unknown,
        }
    }

    /// Returns the rate in bits per second, `None` for `Unknown`.
    #[must_use]
    pub const fn value(self) -> Option<u32> {
        match self {
            Self::B9600 => Some(9600),
            Self::B57600 => Some(57600),
            Self::B115200 => Some(115_200),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(bps) => write!(f, "{bps} bps"),
            None => f.write_str("unknown baud rate"),
        }
    }
}

/// RF channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RfChannel {
    /// Channel 5, 6489.6 MHz.
    Ch5,
    /// Channel 9, 7987.2 MHz.
    Ch9,
    /// Reply could not be interpreted.
    #[default]
    Unknown,
}

impl RfChannel {
    /// Maps the channel number.
    #[must_use]
    pub const fn from_value(value: i32) -> Self {
        match value {
            5 => Self::Ch5,
            9 => Self::Ch9,
            _ => Self::Unknown,
        }
    }

    /// Returns the channel number, `None` for `Unknown`.
    #[must_use]
    pub const fn value(self) -> Option<u32> {
        match self {
            Self::Ch5 => Some(5),
            Self::Ch9 => Some(9),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for RfChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ch5 => "channel 5 (6489.6 MHz)",
            Self::Ch9 => "channel 9 (7987.2 MHz)",
            Self::Unknown => "unknown RF channel",
        })
    }
}

/// Air data rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Bandwidth {
    /// 850 Kbps.
    Kbps850,
    /// 6.8 Mbps.
    Mbps6_8,
    /// Reply could not be interpreted.
    #[default]
    Unknown,
}

impl Bandwidth {
    /// Maps the numeric wire value.
    #[must_use]
    pub const fn from_value(value: i32) -> Self {
        match value {
            0 => Self::Kbps850,
            1 => Self::Mbps6_8,
            _ => Self::Unknown,
        }
    }

    /// Returns the numeric wire value, `None` for `Unknown`.
    #[must_use]
    pub const fn value(self) -> Option<u32> {
        match self {
            Self::Kbps850 => Some(0),
            Self::Mbps6_8 => Some(1),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kbps850 => "850 Kbps",
            Self::Mbps6_8 => "6.8 Mbps",
            Self::Unknown => "unknown bandwidth",
        })
    }
}

/// RF output power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RfPower {
    /// -65 dBm.
    Minus65Dbm,
    /// -50 dBm.
    Minus50Dbm,
    /// -45 dBm.
    Minus45Dbm,
    /// -40 dBm.
    Minus40Dbm,
    /// -35 dBm.
    Minus35Dbm,
    /// -32 dBm.
    Minus32Dbm,
    /// Reply could not be interpreted.
    #[default]
    Unknown,
}

impl RfPower {
    /// Maps the numeric wire value.
    #[must_use]
    pub const fn from_value(value: i32) -> Self {
        match value {
            0 => Self::Minus65Dbm,
            1 => Self::Minus50Dbm,
            2 => Self::Minus45Dbm,
            3 => Self::Minus40Dbm,
            4 => Self::Minus35Dbm,
            5 => Self::Minus32Dbm,
            _ => Self::Unknown,
        }
    }

    /// Returns the numeric wire value, `None` for `Unknown`.
    #[must_use]
    pub const fn value(self) -> Option<u32> {
        match self {
            Self::Minus65Dbm => Some(0),
            Self::Minus50Dbm => Some(1),
            Self::Minus45Dbm => Some(2),
            Self::Minus40Dbm => Some(3),
            Self::Minus35Dbm => Some(4),
            Self::Minus32Dbm => Some(5),
            Self::Unknown => None,
        }
    }

    /// Output power in dBm.
    #[must_use]
    pub const fn dbm(self) -> Option<i8> {
        match self {
            Self::Minus65Dbm => Some(-65),
            Self::Minus50Dbm => Some(-50),
            Self::Minus45Dbm => Some(-45),
            Self::Minus40Dbm => Some(-40),
            Self::Minus35Dbm => Some(-35),
            Self::Minus32Dbm => Some(-32),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for RfPower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dbm() {
            Some(dbm) => write!(f, "{dbm} dBm"),
            None => f.write_str("unknown RF power"),
        }
    }
}

/// Whether the module appends RSSI to received notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RssiDisplay {
    /// RSSI not shown.
    Disabled,
    /// RSSI shown.
    Enabled,
    /// Reply could not be interpreted.
    #[default]
    Unknown,
}

impl RssiDisplay {
    /// Maps the numeric wire value.
    #[must_use]
    pub const fn from_value(value: i32) -> Self {
        match value {
            0 => Self::Disabled,
            1 => Self::Enabled,
            _ => Self::Unknown,
        }
    }

    /// Returns the numeric wire value, `None` for `Unknown`.
    #[must_use]
    pub const fn value(self) -> Option<u32> {
        match self {
            Self::Disabled => Some(0),
            Self::Enabled => Some(1),
            Self::Unknown => None,
        }
    }
}

impl From<bool> for RssiDisplay {
    fn from(enabled: bool) -> Self {
        if enabled { Self::Enabled } else { Self::Disabled }
    }
}

impl fmt::Display for RssiDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disabled => "RSSI display disabled",
            Self::Enabled => "RSSI display enabled",
            Self::Unknown => "unknown RSSI setting",
        })
    }
}

/// Tag RF duty cycle (`AT+TAGD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagDutyCycle {
    /// Time the radio stays enabled, in milliseconds.
    pub enable_ms: u32,
    /// Time the radio stays disabled, in milliseconds.
    pub disable_ms: u32,
}

impl TagDutyCycle {
    /// Accepted range for both phases.
    pub const RANGE_MS: std::ops::RangeInclusive<u32> = 10..=28_000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_values() {
        assert_eq!(Mode::from_value(0), Mode::Tag);
        assert_eq!(Mode::from_value(1), Mode::Anchor);
        assert_eq!(Mode::from_value(2), Mode::Sleep);
        assert_eq!(Mode::from_value(7), Mode::Unknown);
        assert_eq!(Mode::Anchor.value(), Some(1));
        assert_eq!(Mode::Unknown.value(), None);
    }

    #[test]
    fn test_baud_rate_values() {
        assert_eq!(BaudRate::from_value(57600), BaudRate::B57600);
        assert_eq!(BaudRate::from_value(1200), BaudRate::Unknown);
        assert_eq!(BaudRate::B115200.value(), Some(115_200));
        assert_eq!(BaudRate::default(), BaudRate::B115200);
    }

    #[test]
    fn test_channel_and_bandwidth_values() {
        assert_eq!(RfChannel::from_value(9), RfChannel::Ch9);
        assert_eq!(RfChannel::from_value(6), RfChannel::Unknown);
        assert_eq!(Bandwidth::from_value(1), Bandwidth::Mbps6_8);
        assert_eq!(Bandwidth::Kbps850.value(), Some(0));
    }

    #[test]
    fn test_rf_power_values() {
        assert_eq!(RfPower::from_value(0), RfPower::Minus65Dbm);
        assert_eq!(RfPower::from_value(5), RfPower::Minus32Dbm);
        assert_eq!(RfPower::from_value(6), RfPower::Unknown);
        assert_eq!(RfPower::Minus40Dbm.dbm(), Some(-40));
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(Mode::Tag.to_string(), "TAG (mobile) mode");
        assert_eq!(BaudRate::B9600.to_string(), "9600 bps");
        assert_eq!(RfChannel::Ch5.to_string(), "channel 5 (6489.6 MHz)");
        assert_eq!(Bandwidth::Mbps6_8.to_string(), "6.8 Mbps");
        assert_eq!(RfPower::Minus45Dbm.to_string(), "-45 dBm");
        assert_eq!(RssiDisplay::from(true).to_string(), "RSSI display enabled");
        assert_eq!(RfPower::Unknown.to_string(), "unknown RF power");
    }
}

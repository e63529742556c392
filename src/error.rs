//! Error types for the ryuw122 library.

use std::fmt;

use thiserror::Error;

/// The main error type for ryuw122 operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Serial port error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport stream has not been opened.
    #[error("not connected")]
    NotConnected,

    /// No matching response arrived before the deadline.
    #[error("command timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Tag address is not exactly 8 ASCII characters.
    #[error("invalid tag address {address:?}: must be exactly 8 ASCII characters")]
    InvalidAddress { address: String },

    /// Payload length or data rejected before sending.
    #[error("invalid payload: {reason}")]
    InvalidPayload { reason: String },

    /// A configuration argument is out of range.
    #[error("invalid {parameter}: {reason}")]
    InvalidArgument {
        parameter: &'static str,
        reason: String,
    },

    /// The module rejected the command with `+ERR=<n>`.
    #[error("module error: {0}")]
    Module(ModuleErrorCode),

    /// A control line (reset or ready pin) failed.
    #[error("control pin error: {message}")]
    Pin { message: String },
}

impl Error {
    /// Wraps a platform pin failure.
    pub fn pin(message: impl Into<String>) -> Self {
        Self::Pin {
            message: message.into(),
        }
    }

    pub(crate) fn timeout(timeout: std::time::Duration) -> Self {
        Self::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Error codes reported by the module as `+ERR=<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleErrorCode {
    /// Missing carriage return or line feed.
    MissingCarriageReturn,
    /// Command does not start with `AT`.
    InvalidCommandHeader,
    /// Parameter failure.
    ParameterFailure,
    /// Command failure.
    CommandFailure,
    /// Unknown command.
    UnknownCommand,
    /// A code outside the documented table.
    Unrecognized(i32),
}

impl ModuleErrorCode {
    /// Maps the numeric code from an `+ERR=` line.
    #[must_use]
    pub const fn from_value(value: i32) -> Self {
        match value {
            1 => Self::MissingCarriageReturn,
            2 => Self::InvalidCommandHeader,
            3 => Self::ParameterFailure,
            4 => Self::CommandFailure,
            5 => Self::UnknownCommand,
            other => Self::Unrecognized(other),
        }
    }

    /// Returns the numeric code as sent by the module.
    #[must_use]
    pub const fn value(self) -> i32 {
        match self {
            Self::MissingCarriageReturn => 1,
            Self::InvalidCommandHeader => 2,
            Self::ParameterFailure => 3,
            Self::CommandFailure => 4,
            Self::UnknownCommand => 5,
            Self::Unrecognized(value) => value,
        }
    }
}

impl fmt::Display for ModuleErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCarriageReturn => f.write_str("missing carriage return or line feed"),
            Self::InvalidCommandHeader => f.write_str("command does not start with 'AT'"),
            Self::ParameterFailure => f.write_str("parameter failure"),
            Self::CommandFailure => f.write_str("command failure"),
            Self::UnknownCommand => f.write_str("unknown command"),
            Self::Unrecognized(code) => write!(f, "unknown error code {code}"),
        }
    }
}

/// Result type alias for ryuw122 operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_error_code_mapping() {
        assert_eq!(
            ModuleErrorCode::from_value(1),
            ModuleErrorCode::MissingCarriageReturn
        );
        assert_eq!(
            ModuleErrorCode::from_value(5),
            ModuleErrorCode::UnknownCommand
        );
        assert_eq!(
            ModuleErrorCode::from_value(42),
            ModuleErrorCode::Unrecognized(42)
        );
        assert_eq!(ModuleErrorCode::ParameterFailure.value(), 3);
    }

    #[test]
    fn test_error_display() {
        let err = Error::Module(ModuleErrorCode::ParameterFailure);
        assert_eq!(err.to_string(), "module error: parameter failure");

        let err = Error::timeout(std::time::Duration::from_millis(1500));
        assert_eq!(err.to_string(), "command timed out after 1500ms");
    }
}

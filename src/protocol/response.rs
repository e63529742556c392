//! Response line classification.
//!
//! Lines read from the module are either acknowledgements of the last
//! command or unsolicited notifications.

/// Generic acknowledgement.
pub const OK: &str = "+OK";
/// Acknowledgement of `AT+FACTORY`.
pub const FACTORY: &str = "+FACTORY";
/// Acknowledgement of `AT+RESET`.
pub const RESET: &str = "+RESET";
/// Command rejected, followed by a numeric code.
pub const ERROR: &str = "+ERR=";
/// Unsolicited anchor-side ranging result.
pub const ANCHOR_RCV: &str = "+ANCHOR_RCV=";
/// Unsolicited tag-side delivery.
pub const TAG_RCV: &str = "+TAG_RCV=";

/// Kinds of line the module emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// `+OK`.
    Ok,
    /// `+FACTORY`.
    Factory,
    /// `+RESET`.
    Reset,
    /// `+ERR=<n>`.
    Error,
    /// `+ANCHOR_RCV=...`.
    AnchorReceive,
    /// `+TAG_RCV=...`.
    TagReceive,
    /// Echoed field such as `+MODE=1`.
    Value,
    /// Anything else (boot chatter, noise).
    Other,
}

impl ResponseKind {
    /// Classifies a trimmed line by prefix.
    #[must_use]
    pub fn classify(line: &str) -> Self {
        if line.starts_with(ANCHOR_RCV) {
            Self::AnchorReceive
        } else if line.starts_with(TAG_RCV) {
            Self::TagReceive
        } else if line.starts_with(ERROR) {
            Self::Error
        } else if line.starts_with(OK) {
            Self::Ok
        } else if line.starts_with(FACTORY) {
            Self::Factory
        } else if line.starts_with(RESET) {
            Self::Reset
        } else if line.starts_with('+') && line.contains('=') {
            Self::Value
        } else {
            Self::Other
        }
    }

    /// Returns true if this is an unsolicited notification.
    #[must_use]
    pub const fn is_notification(self) -> bool {
        matches!(self, Self::AnchorReceive | Self::TagReceive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(ResponseKind::classify("+OK"), ResponseKind::Ok);
        assert_eq!(ResponseKind::classify("+FACTORY"), ResponseKind::Factory);
        assert_eq!(ResponseKind::classify("+RESET"), ResponseKind::Reset);
        assert_eq!(ResponseKind::classify("+ERR=4"), ResponseKind::Error);
        assert_eq!(ResponseKind::classify("+MODE=1"), ResponseKind::Value);
        assert_eq!(
            ResponseKind::classify("+ANCHOR_RCV=TAG00001,0,,120,-60"),
            ResponseKind::AnchorReceive
        );
        assert_eq!(
            ResponseKind::classify("+TAG_RCV=3,abc,-42"),
            ResponseKind::TagReceive
        );
        assert_eq!(ResponseKind::classify("READY"), ResponseKind::Other);
    }

    #[test]
    fn test_is_notification() {
        assert!(ResponseKind::AnchorReceive.is_notification());
        assert!(ResponseKind::TagReceive.is_notification());
        assert!(!ResponseKind::Ok.is_notification());
        assert!(!ResponseKind::Value.is_notification());
    }
}

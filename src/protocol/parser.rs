//! Parsers for module response lines.
//!
//! All parsers are lenient. A notification with missing trailing fields
//! still parses, with the missing fields left at their defaults, and
//! numeric fields that do not parse fall back to a caller-chosen value.

use crate::error::ModuleErrorCode;
use crate::event::Notification;
use crate::protocol::command::CommandKey;
use crate::protocol::response::{ANCHOR_RCV, ERROR, TAG_RCV};
use crate::types::{AnchorReceive, TagReceive};

/// Parses a leading integer the way C's `atoi` does.
///
/// Leading whitespace and an optional sign are accepted; parsing stops at
/// the first non-digit, so `"120 cm"` yields 120. Returns `None` if no
/// digits are present. Out-of-range values saturate.
#[must_use]
pub fn parse_int(text: &str) -> Option<i32> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut seen = false;
    let mut value: i64 = 0;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        seen = true;
        value = (value * 10 + i64::from(byte - b'0')).min(i64::from(i32::MAX) + 1);
    }

    if !seen {
        return None;
    }
    let value = if negative { -value } else { value };
    Some(i32::try_from(value).unwrap_or(if negative { i32::MIN } else { i32::MAX }))
}

/// Like [`parse_int`], falling back to `default`.
#[must_use]
pub fn parse_int_or(text: &str, default: i32) -> i32 {
    parse_int(text).unwrap_or(default)
}

/// Finds `+<KEY>=` anywhere in `line` and returns the trimmed remainder.
#[must_use]
pub fn response_value(line: &str, key: CommandKey) -> Option<&str> {
    let prefix = key.response_prefix();
    line.find(&prefix)
        .map(|index| line[index + prefix.len()..].trim())
}

/// Parses a `+ERR=<n>` line.
#[must_use]
pub fn parse_module_error(line: &str) -> Option<ModuleErrorCode> {
    let code = line.trim().strip_prefix(ERROR)?;
    Some(ModuleErrorCode::from_value(parse_int_or(code, 0)))
}

/// Parses `+ANCHOR_RCV=<address>,<length>,<data>,<distance>,<rssi>`.
///
/// Returns `None` only if the prefix is absent.
#[must_use]
pub fn parse_anchor_receive(line: &str) -> Option<AnchorReceive> {
    let body = line.trim().strip_prefix(ANCHOR_RCV)?;
    let mut fields = Fields::new(body);

    let tag_address = fields.next_field().unwrap_or_default().to_owned();
    let payload_length = parse_int_or(fields.next_field().unwrap_or_default(), 0);
    let data = fields.next_sized(payload_length).unwrap_or_default().to_owned();
    let distance_cm = parse_int_or(fields.next_field().unwrap_or_default(), 0);
    let rssi = parse_int_or(fields.next_field().unwrap_or_default(), 0);

    Some(AnchorReceive {
        tag_address,
        payload_length,
        data,
        distance_cm,
        rssi,
    })
}

/// Parses `+TAG_RCV=<length>,<data>,<rssi>`.
///
/// Returns `None` only if the prefix is absent.
#[must_use]
pub fn parse_tag_receive(line: &str) -> Option<TagReceive> {
    let body = line.trim().strip_prefix(TAG_RCV)?;
    let mut fields = Fields::new(body);

    let payload_length = parse_int_or(fields.next_field().unwrap_or_default(), 0);
    let data = fields.next_sized(payload_length).unwrap_or_default().to_owned();
    let rssi = parse_int_or(fields.next_field().unwrap_or_default(), 0);

    Some(TagReceive {
        payload_length,
        data,
        rssi,
    })
}

/// Parses an unsolicited notification line.
#[must_use]
pub fn parse_notification(line: &str) -> Option<Notification> {
    let line = line.trim();
    if line.starts_with(ANCHOR_RCV) {
        parse_anchor_receive(line).map(Notification::AnchorReceive)
    } else if line.starts_with(TAG_RCV) {
        parse_tag_receive(line).map(Notification::TagReceive)
    } else {
        None
    }
}

/// Comma-separated field cursor that keeps empty fields.
struct Fields<'a> {
    rest: Option<&'a str>,
}

impl<'a> Fields<'a> {
    const fn new(body: &'a str) -> Self {
        Self { rest: Some(body) }
    }

    fn next_field(&mut self) -> Option<&'a str> {
        let rest = self.rest?;
        match rest.split_once(',') {
            Some((field, tail)) => {
                self.rest = Some(tail);
                Some(field)
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }

    /// Takes a data field of `declared` bytes if it fits, so payloads
    /// containing commas survive. Falls back to plain splitting.
    fn next_sized(&mut self, declared: i32) -> Option<&'a str> {
        let rest = self.rest?;
        let len = usize::try_from(declared).unwrap_or(0);
        if len > 0 && rest.len() >= len && rest.is_char_boundary(len) {
            let (data, tail) = rest.split_at(len);
            if tail.is_empty() {
                self.rest = None;
                return Some(data);
            }
            if let Some(tail) = tail.strip_prefix(',') {
                self.rest = Some(tail);
                return Some(data);
            }
        }
        self.next_field()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_or() {
        assert_eq!(parse_int_or("42", 0), 42);
        assert_eq!(parse_int_or("  -17", 0), -17);
        assert_eq!(parse_int_or("+5", 0), 5);
        assert_eq!(parse_int_or("120 cm", 0), 120);
        assert_eq!(parse_int_or("abc", -1), -1);
        assert_eq!(parse_int_or("", 7), 7);
        assert_eq!(parse_int_or("-", 3), 3);
        assert_eq!(parse_int_or("99999999999", 0), i32::MAX);
        assert_eq!(parse_int_or("-99999999999", 0), i32::MIN);
        assert_eq!(parse_int("-1"), Some(-1));
        assert_eq!(parse_int("x1"), None);
    }

    #[test]
    fn test_response_value() {
        assert_eq!(response_value("+MODE=1", CommandKey::Mode), Some("1"));
        assert_eq!(
            response_value("noise+ADDRESS=TAG00001 ", CommandKey::Address),
            Some("TAG00001")
        );
        assert_eq!(response_value("+OK", CommandKey::Mode), None);
        assert_eq!(response_value("+MODE=", CommandKey::Mode), Some(""));
    }

    #[test]
    fn test_parse_module_error() {
        assert_eq!(
            parse_module_error("+ERR=3"),
            Some(ModuleErrorCode::ParameterFailure)
        );
        assert_eq!(
            parse_module_error("+ERR=42"),
            Some(ModuleErrorCode::Unrecognized(42))
        );
        assert_eq!(parse_module_error("+OK"), None);
    }

    #[test]
    fn test_parse_anchor_receive_full() {
        let rcv = parse_anchor_receive("+ANCHOR_RCV=TAG00001,5,HELLO,120 cm,-60").unwrap();
        assert_eq!(rcv.tag_address, "TAG00001");
        assert_eq!(rcv.payload_length, 5);
        assert_eq!(rcv.data, "HELLO");
        assert_eq!(rcv.distance_cm, 120);
        assert_eq!(rcv.rssi, -60);
    }

    #[test]
    fn test_parse_anchor_receive_empty_data() {
        let rcv = parse_anchor_receive("+ANCHOR_RCV=TAG00001,0,,250,-71").unwrap();
        assert_eq!(rcv.data, "");
        assert_eq!(rcv.distance_cm, 250);
        assert_eq!(rcv.rssi, -71);
    }

    #[test]
    fn test_parse_anchor_receive_comma_in_data() {
        let rcv = parse_anchor_receive("+ANCHOR_RCV=TAG00001,3,a,b,88,-50").unwrap();
        assert_eq!(rcv.data, "a,b");
        assert_eq!(rcv.distance_cm, 88);
        assert_eq!(rcv.rssi, -50);
    }

    #[test]
    fn test_parse_anchor_receive_missing_fields() {
        let rcv = parse_anchor_receive("+ANCHOR_RCV=TAG00001,3").unwrap();
        assert_eq!(rcv.tag_address, "TAG00001");
        assert_eq!(rcv.payload_length, 3);
        assert_eq!(rcv.data, "");
        assert_eq!(rcv.distance_cm, 0);
        assert_eq!(rcv.rssi, 0);

        assert!(parse_anchor_receive("+TAG_RCV=3,abc,-42").is_none());
    }

    #[test]
    fn test_parse_tag_receive() {
        let rcv = parse_tag_receive("+TAG_RCV=3,abc,-42\r").unwrap();
        assert_eq!(rcv.payload_length, 3);
        assert_eq!(rcv.data, "abc");
        assert_eq!(rcv.rssi, -42);

        let short = parse_tag_receive("+TAG_RCV=").unwrap();
        assert_eq!(short, TagReceive::default());
    }

    #[test]
    fn test_parse_notification() {
        assert!(matches!(
            parse_notification("+TAG_RCV=3,abc,-42"),
            Some(Notification::TagReceive(_))
        ));
        assert!(matches!(
            parse_notification("  +ANCHOR_RCV=TAG00001,0,,10,-60"),
            Some(Notification::AnchorReceive(_))
        ));
        assert!(parse_notification("+OK").is_none());
    }
}

//! Protocol definitions for the RYUW122 AT command set.
//!
//! This module contains the line-level protocol pieces:
//! - Command formatting
//! - Line framing
//! - Response classification
//! - Response and notification parsing

pub mod command;
pub mod line;
pub mod parser;
pub mod response;

pub use command::{Command, CommandKey, LINE_TERMINATOR};
pub use line::{DEFAULT_LINE_CAPACITY, Line, LineDecoder};
pub use parser::{
    parse_anchor_receive, parse_int, parse_int_or, parse_module_error, parse_notification,
    parse_tag_receive, response_value,
};
pub use response::{ANCHOR_RCV, ERROR, FACTORY, OK, RESET, ResponseKind, TAG_RCV};

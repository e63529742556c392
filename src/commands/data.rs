//! Data exchange between anchors and tags.
//!
//! An anchor sends `AT+ANCHOR_SEND` and the module acknowledges with `+OK`;
//! when the addressed tag answers, an `+ANCHOR_RCV` line carries the tag's
//! queued data together with the measured distance. A tag queues data with
//! `AT+TAG_SEND` for the next anchor that polls it.

use std::time::Duration;

use super::CommandHandler;
use crate::error::{Error, Result};
use crate::protocol::{Command, OK, parse_anchor_receive, parse_module_error};
use crate::timing::Deadline;
use crate::transport::Transport;
use crate::types::{ADDRESS_LENGTH, MAX_PAYLOAD_LENGTH, RangingResponse};

/// Default wait for an anchor-to-tag exchange.
pub const DEFAULT_ANCHOR_TIMEOUT: Duration = Duration::from_millis(2000);

/// Default wait for a tag send to be acknowledged.
pub const DEFAULT_TAG_TIMEOUT: Duration = Duration::from_millis(1000);

fn validate_address(address: &str) -> Result<()> {
    if address.len() == ADDRESS_LENGTH && address.is_ascii() {
        Ok(())
    } else {
        Err(Error::InvalidAddress {
            address: address.to_owned(),
        })
    }
}

fn validate_payload(payload_length: usize, data: Option<&str>) -> Result<&str> {
    if payload_length > MAX_PAYLOAD_LENGTH {
        return Err(Error::InvalidPayload {
            reason: format!("length {payload_length} exceeds {MAX_PAYLOAD_LENGTH} bytes"),
        });
    }
    let data = match data {
        Some(data) => data,
        None if payload_length == 0 => "",
        None => {
            return Err(Error::InvalidPayload {
                reason: format!("length {payload_length} declared but no data given"),
            });
        }
    };
    if data.len() != payload_length {
        return Err(Error::InvalidPayload {
            reason: format!(
                "length {payload_length} declared but data is {} bytes",
                data.len()
            ),
        });
    }
    // Data is spliced into a single AT line.
    if !data.bytes().all(|b| b.is_ascii() && b != b'\r' && b != b'\n') {
        return Err(Error::InvalidPayload {
            reason: "data must be ASCII without line breaks".to_owned(),
        });
    }
    Ok(data)
}

impl<T: Transport> CommandHandler<T> {
    /// Sends data to a tag and returns once the module acknowledges.
    ///
    /// The tag's reply, if any, arrives later as an `+ANCHOR_RCV`
    /// notification.
    pub async fn anchor_send_data(
        &mut self,
        tag_address: &str,
        payload_length: usize,
        data: Option<&str>,
    ) -> Result<()> {
        validate_address(tag_address)?;
        let data = validate_payload(payload_length, data)?;
        self.execute(
            &Command::anchor_send(tag_address, payload_length, data),
            OK,
            None,
        )
        .await
    }

    /// Queues data for the next anchor poll and returns once the module
    /// acknowledges.
    pub async fn tag_send_data(&mut self, payload_length: usize, data: Option<&str>) -> Result<()> {
        let data = validate_payload(payload_length, data)?;
        self.execute(&Command::tag_send(payload_length, data), OK, None)
            .await
    }

    /// Sends data to a tag and waits for both the `+OK` acknowledgement and
    /// the tag's `+ANCHOR_RCV` reply, in either order.
    ///
    /// Replies from other tags are ignored. Arguments are validated before
    /// anything is written.
    pub async fn anchor_send_data_sync(
        &mut self,
        tag_address: &str,
        payload_length: usize,
        data: Option<&str>,
        timeout: Duration,
    ) -> Result<RangingResponse> {
        validate_address(tag_address)?;
        let data = validate_payload(payload_length, data)?;
        let command = Command::anchor_send(tag_address, payload_length, data);

        self.discard_input()?;
        self.send_command(&command).await?;

        let deadline = Deadline::after(timeout);
        let mut acknowledged = false;
        let mut reply: Option<RangingResponse> = None;

        while !acknowledged || reply.is_none() {
            let line = self.read_line(deadline.remaining()).await?;
            if !line.complete {
                tracing::debug!(
                    "exchange with {} timed out (acknowledged: {}, replied: {})",
                    tag_address,
                    acknowledged,
                    reply.is_some()
                );
                return Err(Error::timeout(timeout));
            }

            let text = line.text.trim();
            if text.starts_with(OK) {
                acknowledged = true;
            } else if let Some(rcv) = parse_anchor_receive(text) {
                if rcv.tag_address == tag_address {
                    reply = Some(rcv.into());
                } else {
                    tracing::debug!(
                        "ignoring reply from {} while waiting for {}",
                        rcv.tag_address,
                        tag_address
                    );
                }
            } else if let Some(code) = parse_module_error(text) {
                tracing::debug!("{} rejected: {}", command, code);
                return Err(Error::Module(code));
            } else if !text.is_empty() {
                tracing::debug!("ignoring {:?} during exchange", text);
            }
        }

        reply.ok_or_else(|| Error::timeout(timeout))
    }

    /// Queues data for the next anchor poll and waits for `+OK`.
    pub async fn tag_send_data_sync(
        &mut self,
        payload_length: usize,
        data: Option<&str>,
        timeout: Duration,
    ) -> Result<()> {
        let data = validate_payload(payload_length, data)?;
        self.execute(&Command::tag_send(payload_length, data), OK, Some(timeout))
            .await
    }
}

//! Payloads carried by ranging exchanges and unsolicited notifications.

/// Maximum payload carried by a single exchange, in bytes.
pub const MAX_PAYLOAD_LENGTH: usize = 12;

/// Length of a tag address, in ASCII characters.
pub const ADDRESS_LENGTH: usize = 8;

/// An `+ANCHOR_RCV=` notification: a tag answered this anchor.
///
/// Fields past a parse failure keep their default (empty or zero).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorReceive {
    /// Address of the answering tag.
    pub tag_address: String,
    /// Payload length as declared by the module.
    pub payload_length: i32,
    /// Data queued on the tag.
    pub data: String,
    /// Measured distance in centimeters.
    pub distance_cm: i32,
    /// Received signal strength.
    pub rssi: i32,
}

/// A `+TAG_RCV=` notification: the anchor delivered data to this tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagReceive {
    /// Payload length as declared by the module.
    pub payload_length: i32,
    /// Data sent by the anchor.
    pub data: String,
    /// Received signal strength.
    pub rssi: i32,
}

/// Result of a synchronous anchor-to-tag exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangingResponse {
    /// Data the tag had queued (at most 12 bytes).
    pub data: String,
    /// Measured distance in centimeters.
    pub distance_cm: i32,
    /// Received signal strength.
    pub rssi: i32,
}

impl From<AnchorReceive> for RangingResponse {
    fn from(rcv: AnchorReceive) -> Self {
        let mut data = rcv.data;
        if data.len() > MAX_PAYLOAD_LENGTH {
            let mut end = MAX_PAYLOAD_LENGTH;
            while !data.is_char_boundary(end) {
                end -= 1;
            }
            data.truncate(end);
        }
        Self {
            data,
            distance_cm: rcv.distance_cm,
            rssi: rcv.rssi,
        }
    }
}

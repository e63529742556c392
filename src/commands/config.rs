//! Module configuration commands.
//!
//! Setters wait for `+OK` and report failures as errors. Getters never
//! fail: a missing or malformed response yields `Unknown` or `None`.

use std::fmt;
use std::ops::RangeInclusive;

use super::CommandHandler;
use crate::error::{Error, Result};
use crate::protocol::{
    Command, CommandKey, FACTORY, OK, RESET, parse_int, parse_int_or, response_value,
};
use crate::transport::Transport;
use crate::types::{BaudRate, Bandwidth, Mode, RfChannel, RfPower, RssiDisplay, TagDutyCycle};

/// Longest network identifier or address.
const IDENTIFIER_MAX: usize = 8;
/// Length of the read-only unique identifier.
const UID_MAX: usize = 16;
/// Longest password, in hex digits.
const PASSWORD_MAX: usize = 32;
/// Longest firmware version string.
const VERSION_MAX: usize = 16;
/// Accepted distance calibration, in centimeters.
const CALIBRATION_RANGE: RangeInclusive<i32> = -100..=100;

fn known(parameter: &'static str, setting: impl fmt::Display, value: Option<u32>) -> Result<u32> {
    value.ok_or_else(|| Error::InvalidArgument {
        parameter,
        reason: format!("cannot send {setting}"),
    })
}

fn validate_identifier(parameter: &'static str, value: &str) -> Result<()> {
    let valid = (1..=IDENTIFIER_MAX).contains(&value.len())
        && value.bytes().all(|b| b.is_ascii_graphic() && b != b',');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidArgument {
            parameter,
            reason: format!(
                "{value:?} must be 1 to {IDENTIFIER_MAX} printable ASCII characters without commas"
            ),
        })
    }
}

fn truncated(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

impl<T: Transport> CommandHandler<T> {
    async fn set_value(&mut self, key: CommandKey, value: impl fmt::Display) -> Result<()> {
        self.execute(&Command::set(key, value), OK, None).await
    }

    async fn query_value(&mut self, key: CommandKey) -> Option<String> {
        match self.query(&Command::query(key), None).await {
            Ok(line) => {
                let value = response_value(&line, key).map(str::to_owned);
                if value.is_none() {
                    tracing::debug!("response {:?} carries no {} field", line, key);
                }
                value
            }
            Err(e) => {
                tracing::debug!("query {} failed: {}", key, e);
                None
            }
        }
    }

    async fn query_number(&mut self, key: CommandKey) -> Option<i32> {
        let value = self.query_value(key).await?;
        Some(parse_int_or(&value, -1))
    }

    // ==================== Basic Commands ====================

    /// Checks that the module answers `AT` with `+OK`.
    pub async fn test(&mut self) -> Result<()> {
        self.execute(&Command::test(), OK, None).await
    }

    /// Restores factory settings.
    pub async fn factory_reset(&mut self) -> Result<()> {
        self.execute(&Command::action(CommandKey::Factory), FACTORY, None)
            .await
    }

    /// Soft-resets the module.
    pub async fn reset(&mut self) -> Result<()> {
        self.execute(&Command::action(CommandKey::Reset), RESET, None)
            .await
    }

    /// Gets the firmware version.
    pub async fn get_firmware_version(&mut self) -> Option<String> {
        let value = self.query_value(CommandKey::Version).await?;
        Some(truncated(&value, VERSION_MAX))
    }

    /// Gets the read-only unique identifier.
    pub async fn get_uid(&mut self) -> Option<String> {
        let value = self.query_value(CommandKey::Uid).await?;
        Some(truncated(&value, UID_MAX))
    }

    // ==================== Radio Settings ====================

    /// Sets the operating mode.
    pub async fn set_mode(&mut self, mode: Mode) -> Result<()> {
        let value = known("mode", mode, mode.value())?;
        self.set_value(CommandKey::Mode, value).await
    }

    /// Gets the operating mode.
    pub async fn get_mode(&mut self) -> Mode {
        self.query_number(CommandKey::Mode)
            .await
            .map_or(Mode::Unknown, Mode::from_value)
    }

    /// Sets the UART baud rate.
    ///
    /// The module switches speed after acknowledging; the transport must
    /// be reopened at the new rate before the next command.
    pub async fn set_baud_rate(&mut self, rate: BaudRate) -> Result<()> {
        let value = known("baud rate", rate, rate.value())?;
        self.set_value(CommandKey::BaudRate, value).await
    }

    /// Gets the UART baud rate.
    pub async fn get_baud_rate(&mut self) -> BaudRate {
        self.query_number(CommandKey::BaudRate)
            .await
            .map_or(BaudRate::Unknown, BaudRate::from_value)
    }

    /// Sets the RF channel.
    pub async fn set_rf_channel(&mut self, channel: RfChannel) -> Result<()> {
        let value = known("RF channel", channel, channel.value())?;
        self.set_value(CommandKey::Channel, value).await
    }

    /// Gets the RF channel.
    pub async fn get_rf_channel(&mut self) -> RfChannel {
        self.query_number(CommandKey::Channel)
            .await
            .map_or(RfChannel::Unknown, RfChannel::from_value)
    }

    /// Sets the air data rate.
    pub async fn set_bandwidth(&mut self, bandwidth: Bandwidth) -> Result<()> {
        let value = known("bandwidth", bandwidth, bandwidth.value())?;
        self.set_value(CommandKey::Bandwidth, value).await
    }

    /// Gets the air data rate.
    pub async fn get_bandwidth(&mut self) -> Bandwidth {
        self.query_number(CommandKey::Bandwidth)
            .await
            .map_or(Bandwidth::Unknown, Bandwidth::from_value)
    }

    /// Sets the RF output power.
    pub async fn set_rf_power(&mut self, power: RfPower) -> Result<()> {
        let value = known("RF power", power, power.value())?;
        self.set_value(CommandKey::RfPower, value).await
    }

    /// Gets the RF output power.
    pub async fn get_rf_power(&mut self) -> RfPower {
        self.query_number(CommandKey::RfPower)
            .await
            .map_or(RfPower::Unknown, RfPower::from_value)
    }

    /// Enables or disables RSSI in notifications.
    pub async fn set_rssi_display(&mut self, display: RssiDisplay) -> Result<()> {
        let value = known("RSSI display", display, display.value())?;
        self.set_value(CommandKey::Rssi, value).await
    }

    /// Gets the RSSI display setting.
    pub async fn get_rssi_display(&mut self) -> RssiDisplay {
        self.query_number(CommandKey::Rssi)
            .await
            .map_or(RssiDisplay::Unknown, RssiDisplay::from_value)
    }

    // ==================== Identity ====================

    /// Sets the network identifier (1 to 8 printable characters).
    pub async fn set_network_id(&mut self, network_id: &str) -> Result<()> {
        validate_identifier("network id", network_id)?;
        self.set_value(CommandKey::NetworkId, network_id).await
    }

    /// Gets the network identifier.
    pub async fn get_network_id(&mut self) -> Option<String> {
        let value = self.query_value(CommandKey::NetworkId).await?;
        Some(truncated(&value, IDENTIFIER_MAX))
    }

    /// Sets the device address (1 to 8 printable characters).
    pub async fn set_address(&mut self, address: &str) -> Result<()> {
        validate_identifier("address", address)?;
        self.set_value(CommandKey::Address, address).await
    }

    /// Gets the device address.
    pub async fn get_address(&mut self) -> Option<String> {
        let value = self.query_value(CommandKey::Address).await?;
        Some(truncated(&value, IDENTIFIER_MAX))
    }

    /// Sets the AES-128 password as up to 32 hex digits.
    pub async fn set_password(&mut self, password: &str) -> Result<()> {
        let valid = (1..=PASSWORD_MAX).contains(&password.len())
            && password.bytes().all(|b| b.is_ascii_hexdigit());
        if !valid {
            return Err(Error::InvalidArgument {
                parameter: "password",
                reason: format!("must be 1 to {PASSWORD_MAX} hex digits"),
            });
        }
        self.set_value(CommandKey::Password, password).await
    }

    /// Sets the AES-128 password from raw key bytes.
    pub async fn set_password_key(&mut self, key: &[u8; 16]) -> Result<()> {
        self.set_value(CommandKey::Password, hex::encode_upper(key))
            .await
    }

    /// Gets the password.
    pub async fn get_password(&mut self) -> Option<String> {
        let value = self.query_value(CommandKey::Password).await?;
        Some(truncated(&value, PASSWORD_MAX))
    }

    // ==================== Ranging Settings ====================

    /// Sets the tag RF duty cycle. Both phases must be 10 to 28000 ms.
    pub async fn set_tag_rf_duty_cycle(&mut self, duty: TagDutyCycle) -> Result<()> {
        for (phase, ms) in [("enable", duty.enable_ms), ("disable", duty.disable_ms)] {
            if !TagDutyCycle::RANGE_MS.contains(&ms) {
                return Err(Error::InvalidArgument {
                    parameter: "tag duty cycle",
                    reason: format!(
                        "{phase} time {ms} ms is outside {}..={} ms",
                        TagDutyCycle::RANGE_MS.start(),
                        TagDutyCycle::RANGE_MS.end()
                    ),
                });
            }
        }
        self.set_value(
            CommandKey::TagDutyCycle,
            format!("{},{}", duty.enable_ms, duty.disable_ms),
        )
        .await
    }

    /// Gets the tag RF duty cycle.
    pub async fn get_tag_rf_duty_cycle(&mut self) -> Option<TagDutyCycle> {
        let value = self.query_value(CommandKey::TagDutyCycle).await?;
        let (enable, disable) = value.split_once(',')?;
        Some(TagDutyCycle {
            enable_ms: u32::try_from(parse_int(enable)?).ok()?,
            disable_ms: u32::try_from(parse_int(disable)?).ok()?,
        })
    }

    /// Sets the distance calibration offset (-100 to 100 cm).
    pub async fn set_distance_calibration(&mut self, calibration_cm: i32) -> Result<()> {
        if !CALIBRATION_RANGE.contains(&calibration_cm) {
            return Err(Error::InvalidArgument {
                parameter: "distance calibration",
                reason: format!("{calibration_cm} cm is outside -100..=100 cm"),
            });
        }
        self.set_value(CommandKey::Calibration, calibration_cm).await
    }

    /// Gets the distance calibration offset in centimeters.
    pub async fn get_distance_calibration(&mut self) -> Option<i32> {
        let value = self.query_value(CommandKey::Calibration).await?;
        parse_int(&value)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::transport::mock::{MockTransport, init_tracing};

    #[tokio::test(start_paused = true)]
    async fn test_get_mode_values() {
        init_tracing();
        let mock = MockTransport::new()
            .expect("AT+MODE?", "+MODE=0\r\n")
            .expect("AT+MODE?", "+MODE=1\r\n")
            .expect("AT+MODE?", "+MODE=2\r\n")
            .expect("AT+MODE?", "+OK\r\n");
        let mut handler = CommandHandler::new(mock);

        assert_eq!(handler.get_mode().await, Mode::Tag);
        assert_eq!(handler.get_mode().await, Mode::Anchor);
        assert_eq!(handler.get_mode().await, Mode::Sleep);
        // A response without the MODE token.
        assert_eq!(handler.get_mode().await, Mode::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_mode_timeout_is_unknown() {
        let mut handler = CommandHandler::new(MockTransport::new());

        let start = Instant::now();
        assert_eq!(handler.get_mode().await, Mode::Unknown);
        assert_eq!(start.elapsed(), crate::commands::DEFAULT_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_setter_is_idempotent() {
        let mock = MockTransport::new()
            .expect("AT+CHANNEL=9", "+OK\r\n")
            .expect("AT+CHANNEL=9", "+OK\r\n");
        let mut handler = CommandHandler::new(mock);

        handler.set_rf_channel(RfChannel::Ch9).await.unwrap();
        handler.set_rf_channel(RfChannel::Ch9).await.unwrap();
        assert_eq!(handler.transport().sent(), ["AT+CHANNEL=9", "AT+CHANNEL=9"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_values_rejected_before_io() {
        let mut handler = CommandHandler::new(MockTransport::new());

        assert!(matches!(
            handler.set_mode(Mode::Unknown).await,
            Err(Error::InvalidArgument { parameter: "mode", .. })
        ));
        assert!(handler.set_rf_power(RfPower::Unknown).await.is_err());
        assert!(handler.set_network_id("").await.is_err());
        assert!(handler.set_address("TOO_LONG_ID").await.is_err());
        assert!(handler.set_address("A,B").await.is_err());
        assert!(handler.set_password("XYZ").await.is_err());
        assert!(handler.set_distance_calibration(101).await.is_err());
        assert!(
            handler
                .set_tag_rf_duty_cycle(TagDutyCycle {
                    enable_ms: 5,
                    disable_ms: 100,
                })
                .await
                .is_err()
        );
        assert!(handler.transport().sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_string_setters_and_getters() {
        let mock = MockTransport::new()
            .expect("AT+NETWORKID=REYAX123", "+OK\r\n")
            .expect("AT+NETWORKID?", "+NETWORKID=REYAX123\r\n")
            .expect("AT+ADDRESS=TAG00001", "+OK\r\n")
            .expect("AT+ADDRESS?", "+ADDRESS=TAG00001\r\n")
            .expect("AT+UID?", "+UID=0123456789ABCDEF0123\r\n")
            .expect("AT+VER?", "+VER=RYUW122_V1.0.3\r\n");
        let mut handler = CommandHandler::new(mock);

        handler.set_network_id("REYAX123").await.unwrap();
        assert_eq!(handler.get_network_id().await.as_deref(), Some("REYAX123"));
        handler.set_address("TAG00001").await.unwrap();
        assert_eq!(handler.get_address().await.as_deref(), Some("TAG00001"));
        assert_eq!(
            handler.get_uid().await.as_deref(),
            Some("0123456789ABCDEF")
        );
        assert_eq!(
            handler.get_firmware_version().await.as_deref(),
            Some("RYUW122_V1.0.3")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_password_key_is_upper_hex() {
        let key = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ];
        let mock = MockTransport::new()
            .expect("AT+CPIN=00112233445566778899AABBCCDDEEFF", "+OK\r\n")
            .expect("AT+CPIN?", "+CPIN=00112233445566778899AABBCCDDEEFF\r\n");
        let mut handler = CommandHandler::new(mock);

        handler.set_password_key(&key).await.unwrap();
        assert_eq!(
            handler.get_password().await.as_deref(),
            Some("00112233445566778899AABBCCDDEEFF")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_duty_cycle_and_calibration() {
        let mock = MockTransport::new()
            .expect("AT+TAGD=100,2000", "+OK\r\n")
            .expect("AT+TAGD?", "+TAGD=100,2000\r\n")
            .expect("AT+CAL=-12", "+OK\r\n")
            .expect("AT+CAL?", "+CAL=-12\r\n");
        let mut handler = CommandHandler::new(mock);

        let duty = TagDutyCycle {
            enable_ms: 100,
            disable_ms: 2000,
        };
        handler.set_tag_rf_duty_cycle(duty).await.unwrap();
        assert_eq!(handler.get_tag_rf_duty_cycle().await, Some(duty));

        handler.set_distance_calibration(-12).await.unwrap();
        assert_eq!(handler.get_distance_calibration().await, Some(-12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_enum_getters() {
        let mock = MockTransport::new()
            .expect("AT+IPR?", "+IPR=57600\r\n")
            .expect("AT+BANDWIDTH?", "+BANDWIDTH=1\r\n")
            .expect("AT+CRFOP?", "+CRFOP=3\r\n")
            .expect("AT+RSSI?", "+RSSI=1\r\n")
            .expect("AT+CHANNEL?", "+CHANNEL=abc\r\n");
        let mut handler = CommandHandler::new(mock);

        assert_eq!(handler.get_baud_rate().await, BaudRate::B57600);
        assert_eq!(handler.get_bandwidth().await, Bandwidth::Mbps6_8);
        assert_eq!(handler.get_rf_power().await, RfPower::Minus40Dbm);
        assert_eq!(handler.get_rssi_display().await, RssiDisplay::Enabled);
        assert_eq!(handler.get_rf_channel().await, RfChannel::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_commands() {
        let mock = MockTransport::new()
            .expect("AT", "+OK\r\n")
            .expect("AT+FACTORY", "+FACTORY\r\n")
            .expect("AT+RESET", "+RESET\r\n+READY\r\n");
        let mut handler = CommandHandler::new(mock);

        handler.test().await.unwrap();
        handler.factory_reset().await.unwrap();
        handler.reset().await.unwrap();
        assert_eq!(handler.transport().pending_expectations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_factory_reset_needs_factory_ack() {
        let mock = MockTransport::new().expect("AT+FACTORY", "+OK\r\n");
        let mut handler = CommandHandler::new(mock);
        handler.set_timeout(Duration::from_millis(100));

        assert!(matches!(
            handler.factory_reset().await,
            Err(Error::Timeout { timeout_ms: 100 })
        ));
    }
}

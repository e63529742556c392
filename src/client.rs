//! Main [`Ryuw122`] client implementation.
//!
//! This module provides the high-level [`Ryuw122`] client that combines the
//! command engine, notification dispatch and the optional control lines
//! into a unified interface.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::commands::CommandHandler;
use crate::config::ModuleConfig;
use crate::error::{Error, Result};
use crate::event::{EventDispatcher, Notification, Subscription};
use crate::protocol::{ResponseKind, parse_notification};
use crate::timing::settle;
use crate::transport::pins::{self, InputPin, OutputPin};
use crate::transport::{SerialConfig, SerialTransport, StreamTransport, Transport};
use crate::types::{
    AnchorReceive, BaudRate, MAX_PAYLOAD_LENGTH, MeasureUnit, RangingResponse, TagReceive,
    convert_distance,
};

/// Distance reported for a tag that could not be ranged.
pub const DISTANCE_UNAVAILABLE: f64 = -1.0;

/// Outcome of [`Ryuw122::get_multiple_distances`].
#[derive(Debug, Clone, PartialEq)]
pub struct MultiRanging {
    /// Number of tags that answered.
    pub success_count: usize,
    /// One distance per requested tag, in request order.
    /// [`DISTANCE_UNAVAILABLE`] marks a failed tag.
    pub distances: Vec<f64>,
}

fn validate_message(message: &str) -> Result<()> {
    if message.len() > MAX_PAYLOAD_LENGTH {
        return Err(Error::InvalidPayload {
            reason: format!(
                "message of {} bytes exceeds {MAX_PAYLOAD_LENGTH} bytes",
                message.len()
            ),
        });
    }
    Ok(())
}

/// Client for a RYUW122 module.
///
/// All operations take `&mut self`, so at most one exchange is in flight
/// and [`poll`](Self::poll) never competes with a command for input.
pub struct Ryuw122<T> {
    commands: CommandHandler<T>,
    dispatcher: EventDispatcher,
    config: ModuleConfig,
    reset_pin: Option<Box<dyn OutputPin>>,
    ready_pin: Option<Box<dyn InputPin>>,
}

impl Ryuw122<SerialTransport> {
    /// Creates a new client for a serial port at the given speed.
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g., "/dev/ttyUSB0")
    /// * `baud_rate` - Must match the module's `AT+IPR` setting
    ///
    /// # Returns
    ///
    /// A new client (not yet open).
    #[must_use]
    pub fn serial(port: impl Into<String>, baud_rate: BaudRate) -> Self {
        Self::with_serial_config(SerialConfig::new(port).baud_rate(baud_rate))
    }

    /// Creates a new client with custom serial configuration.
    #[must_use]
    pub fn with_serial_config(config: SerialConfig) -> Self {
        Self::new(SerialTransport::new(config), ModuleConfig::default())
    }
}

impl<S> Ryuw122<StreamTransport<S>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Creates a new client over an already-open stream.
    #[must_use]
    pub fn from_stream(stream: S) -> Self {
        Self::new(StreamTransport::new(stream), ModuleConfig::default())
    }
}

impl<T: Transport> Ryuw122<T> {
    /// Creates a new client with the given transport and settings.
    #[must_use]
    pub fn new(transport: T, config: ModuleConfig) -> Self {
        let mut commands = CommandHandler::new(transport).with_line_capacity(config.line_capacity);
        commands.set_timeout(config.command_timeout);
        commands.set_settle_delay(config.settle_delay);

        Self {
            commands,
            dispatcher: EventDispatcher::default(),
            config,
            reset_pin: None,
            ready_pin: None,
        }
    }

    /// Attaches the module's active-low reset line.
    #[must_use]
    pub fn with_reset_pin(mut self, pin: impl OutputPin + 'static) -> Self {
        self.reset_pin = Some(Box::new(pin));
        self
    }

    /// Attaches the module's ready indicator line.
    #[must_use]
    pub fn with_ready_pin(mut self, pin: impl InputPin + 'static) -> Self {
        self.ready_pin = Some(Box::new(pin));
        self
    }

    /// Gets the settings this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// Gets the command handler.
    #[must_use]
    pub const fn commands(&self) -> &CommandHandler<T> {
        &self.commands
    }

    /// Gets the command handler mutably, for configuration commands.
    pub const fn commands_mut(&mut self) -> &mut CommandHandler<T> {
        &mut self.commands
    }

    /// Returns true if the transport is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.commands.is_open()
    }

    /// Gets the command timeout.
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        self.commands.timeout()
    }

    /// Sets the command timeout.
    pub const fn set_command_timeout(&mut self, timeout: Duration) {
        self.config.command_timeout = timeout;
        self.commands.set_timeout(timeout);
    }

    /// Opens the transport and brings the module to a known state.
    ///
    /// With a reset line attached, the module is pulsed low then high and
    /// its boot output is drained until the line stays quiet.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be opened or a control
    /// line fails.
    pub async fn begin(&mut self) -> Result<()> {
        self.commands.open().await?;
        tracing::info!(
            "transport open ({:?})",
            self.commands.transport().kind()
        );

        if let Some(pin) = self.ready_pin.as_deref_mut() {
            match pin.is_high() {
                Ok(high) => tracing::debug!("ready line is {}", if high { "high" } else { "low" }),
                Err(e) => tracing::warn!("ready line unreadable: {}", e),
            }
        }

        let Some(pin) = self.reset_pin.as_deref_mut() else {
            return Ok(());
        };

        tracing::info!("resetting module");
        if let Err(e) = pins::pulse_reset(pin, self.config.reset_pulse).await {
            tracing::warn!("reset line failed: {}", e);
            return Err(e);
        }
        let drained = self
            .commands
            .drain_until_quiet(self.config.boot_quiet_period)
            .await?;
        tracing::info!("module reset, discarded {} bytes of boot output", drained);
        Ok(())
    }

    /// Closes the transport.
    pub async fn end(&mut self) -> Result<()> {
        tracing::info!("closing transport");
        self.commands.close().await
    }

    /// Waits for the ready line to go high, then settles briefly.
    ///
    /// Without a ready line this sleeps for `fallback`.
    pub async fn wait_ready(&mut self, timeout: Duration, fallback: Duration) -> Result<()> {
        let pin = self
            .ready_pin
            .as_deref_mut()
            .map(|pin| pin as &mut dyn InputPin);
        let result = pins::wait_ready(pin, timeout, fallback).await;
        if let Err(Error::Pin { message }) = &result {
            tracing::warn!("ready line failed: {}", message);
        }
        result
    }

    // ==================== Notifications ====================

    /// Sets the raw anchor-receive handler.
    pub fn on_anchor_receive(&mut self, handler: impl FnMut(&AnchorReceive) + Send + 'static) {
        self.dispatcher.on_anchor_receive(handler);
    }

    /// Sets the raw tag-receive handler.
    pub fn on_tag_receive(&mut self, handler: impl FnMut(&TagReceive) + Send + 'static) {
        self.dispatcher.on_tag_receive(handler);
    }

    /// Sets the message handler, called as `(from, message, rssi)`.
    pub fn on_message_received(&mut self, handler: impl FnMut(&str, &str, i32) + Send + 'static) {
        self.dispatcher.on_message_received(handler);
    }

    /// Sets the distance handler, called as `(from, distance, unit, rssi)`
    /// with distances converted to `unit`.
    pub fn on_distance_measured(
        &mut self,
        handler: impl FnMut(&str, f64, MeasureUnit, i32) + Send + 'static,
        unit: MeasureUnit,
    ) {
        self.dispatcher.on_distance_measured(handler, unit);
    }

    /// Gets the unit used for the distance handler.
    #[must_use]
    pub const fn preferred_unit(&self) -> MeasureUnit {
        self.dispatcher.preferred_unit()
    }

    /// Sets the unit used for the distance handler.
    pub const fn set_preferred_unit(&mut self, unit: MeasureUnit) {
        self.dispatcher.set_preferred_unit(unit);
    }

    /// Subscribes to every notification returned by [`poll`](Self::poll).
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.dispatcher.subscribe()
    }

    /// Processes at most one unsolicited line.
    ///
    /// Returns immediately with `None` if no input is waiting. Otherwise one
    /// line is read (a partial line is used if the poll timeout passes),
    /// and if it is a notification the handlers are called and the parsed
    /// notification is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport is closed or fails.
    pub async fn poll(&mut self) -> Result<Option<Notification>> {
        if !self.commands.available()? {
            return Ok(None);
        }

        let line = self.commands.read_line(self.config.poll_timeout).await?;
        let text = line.text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if !ResponseKind::classify(text).is_notification() {
            tracing::debug!("ignoring unsolicited {:?}", text);
            return Ok(None);
        }

        let Some(notification) = parse_notification(text) else {
            return Ok(None);
        };
        self.dispatcher.dispatch(&notification);
        Ok(Some(notification))
    }

    /// Alias of [`poll`](Self::poll).
    pub async fn process_messages(&mut self) -> Result<Option<Notification>> {
        self.poll().await
    }

    // ==================== Ranging ====================

    /// Ranges one tag with an empty payload and returns the distance in
    /// `unit`. The distance handler is called on success.
    ///
    /// Uses the configured anchor timeout when `timeout` is `None`.
    pub async fn get_distance_from(
        &mut self,
        tag_address: &str,
        unit: MeasureUnit,
        timeout: Option<Duration>,
    ) -> Result<f64> {
        let timeout = timeout.unwrap_or(self.config.anchor_timeout);
        let response = self
            .commands
            .anchor_send_data_sync(tag_address, 0, None, timeout)
            .await?;
        self.dispatcher
            .notify_distance(tag_address, response.distance_cm, response.rssi);
        Ok(convert_distance(response.distance_cm, unit))
    }

    /// Sends a short message (at most 12 bytes) to a tag and returns its
    /// reply. The distance handler is called on success.
    pub async fn send_message_to_tag(
        &mut self,
        tag_address: &str,
        message: &str,
        timeout: Option<Duration>,
    ) -> Result<RangingResponse> {
        validate_message(message)?;
        let timeout = timeout.unwrap_or(self.config.anchor_timeout);
        let response = self
            .commands
            .anchor_send_data_sync(tag_address, message.len(), Some(message), timeout)
            .await?;
        self.dispatcher
            .notify_distance(tag_address, response.distance_cm, response.rssi);
        Ok(response)
    }

    /// Queues a short message (at most 12 bytes) for the next anchor poll.
    pub async fn send_message_from_tag(
        &mut self,
        message: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        validate_message(message)?;
        let timeout = timeout.unwrap_or(self.config.tag_timeout);
        self.commands
            .tag_send_data_sync(message.len(), Some(message), timeout)
            .await
    }

    /// Ranges each tag in turn, pausing between attempts.
    ///
    /// A tag that fails is reported as [`DISTANCE_UNAVAILABLE`]; the batch
    /// always runs to the end.
    pub async fn get_multiple_distances(
        &mut self,
        tag_addresses: &[&str],
        unit: MeasureUnit,
        timeout: Option<Duration>,
    ) -> MultiRanging {
        let mut distances = Vec::with_capacity(tag_addresses.len());
        let mut success_count = 0;

        for (index, tag_address) in tag_addresses.iter().enumerate() {
            if index > 0 {
                settle(self.config.batch_gap).await;
            }
            match self.get_distance_from(tag_address, unit, timeout).await {
                Ok(distance) => {
                    success_count += 1;
                    distances.push(distance);
                }
                Err(e) => {
                    tracing::debug!("ranging {} failed: {}", tag_address, e);
                    distances.push(DISTANCE_UNAVAILABLE);
                }
            }
        }

        MultiRanging {
            success_count,
            distances,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::time::Instant;

    use super::*;
    use crate::transport::mock::{MockTransport, init_tracing};

    fn client(mock: MockTransport) -> Ryuw122<MockTransport> {
        init_tracing();
        Ryuw122::new(mock, ModuleConfig::default())
    }

    #[derive(Clone, Default)]
    struct RecordingPin {
        levels: Arc<Mutex<Vec<bool>>>,
    }

    impl OutputPin for RecordingPin {
        fn set_low(&mut self) -> Result<()> {
            self.levels.lock().unwrap().push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<()> {
            self.levels.lock().unwrap().push(true);
            Ok(())
        }
    }

    struct ReadyPin;

    impl InputPin for ReadyPin {
        fn is_high(&mut self) -> Result<bool> {
            Ok(true)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_tag_receive() {
        let mut module = client(MockTransport::new());
        let raw = Arc::new(Mutex::new(None));
        let messages = Arc::new(Mutex::new(Vec::new()));

        let slot = Arc::clone(&raw);
        module.on_tag_receive(move |rcv| *slot.lock().unwrap() = Some(rcv.clone()));
        let log = Arc::clone(&messages);
        module.on_message_received(move |from, message, rssi| {
            log.lock()
                .unwrap()
                .push((from.to_owned(), message.to_owned(), rssi));
        });

        module.commands_mut().transport_mut().inject("+TAG_RCV=3,abc,-42\r\n");
        let notification = module.poll().await.unwrap();

        let expected = TagReceive {
            payload_length: 3,
            data: "abc".into(),
            rssi: -42,
        };
        assert_eq!(
            notification,
            Some(Notification::TagReceive(expected.clone()))
        );
        assert_eq!(*raw.lock().unwrap(), Some(expected));
        assert_eq!(
            *messages.lock().unwrap(),
            vec![("ANCHOR".to_owned(), "abc".to_owned(), -42)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_anchor_receive_converts_distance() {
        let mut module = client(MockTransport::new());
        let distances = Arc::new(Mutex::new(Vec::new()));
        let messages = Arc::new(Mutex::new(0));

        let log = Arc::clone(&distances);
        module.on_distance_measured(
            move |from, distance, unit, rssi| {
                log.lock()
                    .unwrap()
                    .push((from.to_owned(), distance, unit, rssi));
            },
            MeasureUnit::Meters,
        );
        let count = Arc::clone(&messages);
        module.on_message_received(move |_, _, _| *count.lock().unwrap() += 1);

        module
            .commands_mut()
            .transport_mut()
            .inject("+ANCHOR_RCV=TAG00001,0,,250 cm,-61\r\n");
        module.poll().await.unwrap();

        let distances = distances.lock().unwrap();
        assert_eq!(distances.len(), 1);
        let (from, distance, unit, rssi) = &distances[0];
        assert_eq!(from, "TAG00001");
        assert!((distance - 2.5).abs() < 1e-9);
        assert_eq!(*unit, MeasureUnit::Meters);
        assert_eq!(*rssi, -61);
        // No data, so no message.
        assert_eq!(*messages.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_without_input_returns_immediately() {
        let mut module = client(MockTransport::new());

        let start = Instant::now();
        assert_eq!(module.poll().await.unwrap(), None);
        assert_eq!(start.elapsed(), Duration::ZERO);

        module.commands_mut().transport_mut().inject("+OK\r\n\r\n");
        assert_eq!(module.process_messages().await.unwrap(), None);
        assert_eq!(module.process_messages().await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_uses_partial_line_after_timeout() {
        let mut module = client(MockTransport::new());
        module.commands_mut().transport_mut().inject("+TAG_RCV=2,hi");

        let start = Instant::now();
        let notification = module.poll().await.unwrap();

        assert_eq!(start.elapsed(), module.config().poll_timeout);
        assert_eq!(
            notification,
            Some(Notification::TagReceive(TagReceive {
                payload_length: 2,
                data: "hi".into(),
                rssi: 0,
            }))
        );
    }

    #[tokio::test]
    async fn test_poll_on_closed_transport() {
        let mut module = client(MockTransport::closed());
        assert!(matches!(module.poll().await, Err(Error::NotConnected)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscription_sees_polled_notifications() {
        let mut module = client(MockTransport::new());
        let mut subscription = module.subscribe();

        module.commands_mut().transport_mut().inject("+TAG_RCV=1,x,-30\r\n");
        let polled = module.poll().await.unwrap();

        assert_eq!(subscription.try_recv(), polled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_begin_pulses_reset_and_drains_boot_output() {
        let pin = RecordingPin::default();
        let levels = Arc::clone(&pin.levels);
        let mut mock = MockTransport::closed();
        mock.inject("+READY\r\nboot v1.0\r\n");
        let mut module = client(mock).with_reset_pin(pin);

        let start = Instant::now();
        module.begin().await.unwrap();

        assert!(module.is_open());
        assert_eq!(*levels.lock().unwrap(), vec![false, true]);
        assert_eq!(start.elapsed(), Duration::from_millis(5 + 5 + 200));
        assert_eq!(module.poll().await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_begin_without_reset_keeps_input() {
        let mut module = client(MockTransport::closed()).with_ready_pin(ReadyPin);

        let start = Instant::now();
        module.begin().await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);

        module.wait_ready(Duration::from_secs(1), Duration::ZERO).await.unwrap();
        assert_eq!(start.elapsed(), pins::READY_SETTLE);
    }

    #[tokio::test]
    async fn test_begin_fails_without_transport() {
        let mut module = client(MockTransport::new().failing_open());
        assert!(matches!(module.begin().await, Err(Error::Io(_))));
        assert!(!module.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_distance_from() {
        let mock = MockTransport::new().expect(
            "AT+ANCHOR_SEND=TAG00001,0,",
            "+OK\r\n+ANCHOR_RCV=TAG00001,0,,254,-50\r\n",
        );
        let mut module = client(mock);
        let reported = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&reported);
        module.on_distance_measured(
            move |_, distance, unit, _| *slot.lock().unwrap() = Some((distance, unit)),
            MeasureUnit::Centimeters,
        );

        let inches = module
            .get_distance_from("TAG00001", MeasureUnit::Inches, None)
            .await
            .unwrap();

        assert!((inches - 100.0).abs() < 1e-9);
        assert_eq!(
            *reported.lock().unwrap(),
            Some((254.0, MeasureUnit::Centimeters))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_multiple_distances_marks_failures() {
        let mock = MockTransport::new()
            .expect(
                "AT+ANCHOR_SEND=TAG00001,0,",
                "+OK\r\n+ANCHOR_RCV=TAG00001,0,,100,-50\r\n",
            )
            .expect(
                "AT+ANCHOR_SEND=TAG00003,0,",
                "+OK\r\n+ANCHOR_RCV=TAG00003,0,,300,-52\r\n",
            );
        let mut module = client(mock);

        let start = Instant::now();
        let result = module
            .get_multiple_distances(
                &["TAG00001", "TAG00002", "TAG00003"],
                MeasureUnit::Meters,
                None,
            )
            .await;

        assert_eq!(result.success_count, 2);
        assert_eq!(result.distances.len(), 3);
        assert!((result.distances[0] - 1.0).abs() < 1e-9);
        assert!((result.distances[1] - DISTANCE_UNAVAILABLE).abs() < f64::EPSILON);
        assert!((result.distances[2] - 3.0).abs() < 1e-9);
        // Two gaps plus one full anchor timeout for the silent tag.
        assert_eq!(start.elapsed(), Duration::from_millis(100 + 2000 + 100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_multiple_distances_empty() {
        let mut module = client(MockTransport::new());
        let result = module
            .get_multiple_distances(&[], MeasureUnit::Centimeters, None)
            .await;
        assert_eq!(result.success_count, 0);
        assert!(result.distances.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_messages() {
        let mock = MockTransport::new()
            .expect(
                "AT+ANCHOR_SEND=TAG00001,5,HELLO",
                "+OK\r\n+ANCHOR_RCV=TAG00001,2,OK,75,-49\r\n",
            )
            .expect("AT+TAG_SEND=4,PONG", "+OK\r\n");
        let mut module = client(mock);

        let reply = module
            .send_message_to_tag("TAG00001", "HELLO", None)
            .await
            .unwrap();
        assert_eq!(reply.data, "OK");
        assert_eq!(reply.distance_cm, 75);

        module.send_message_from_tag("PONG", None).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_message_rejected_before_io() {
        let mut module = client(MockTransport::new());

        assert!(matches!(
            module
                .send_message_to_tag("TAG00001", "THIRTEEN CHRS", None)
                .await,
            Err(Error::InvalidPayload { .. })
        ));
        assert!(matches!(
            module.send_message_from_tag("THIRTEEN CHRS", None).await,
            Err(Error::InvalidPayload { .. })
        ));
        assert!(matches!(
            module
                .send_message_to_tag("TAG00001", "hi\r\nAT+RESET", None)
                .await,
            Err(Error::InvalidPayload { .. })
        ));
        assert!(matches!(
            module.send_message_from_tag("a\nb", None).await,
            Err(Error::InvalidPayload { .. })
        ));
        assert!(module.commands().transport().sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_timeout_accessors() {
        let mut module = client(MockTransport::new());
        assert_eq!(module.command_timeout(), Duration::from_millis(1000));

        module.set_command_timeout(Duration::from_millis(250));
        assert_eq!(module.command_timeout(), Duration::from_millis(250));
        assert_eq!(module.config().command_timeout, Duration::from_millis(250));

        module.set_preferred_unit(MeasureUnit::Feet);
        assert_eq!(module.preferred_unit(), MeasureUnit::Feet);
    }
}

//! Notification dispatch.
//!
//! Unsolicited lines read by [`Ryuw122::poll`](crate::Ryuw122::poll) are
//! parsed into a [`Notification`] and handed to the [`EventDispatcher`],
//! which calls the registered handlers in order and then broadcasts the
//! notification to any [`Subscription`].

use std::fmt;

use tokio::sync::broadcast;

use crate::types::{AnchorReceive, MeasureUnit, TagReceive, convert_distance};

/// Sender reported to the message handler for tag-side deliveries.
pub const ANCHOR_SENDER: &str = "ANCHOR";

/// Default broadcast capacity for subscriptions.
pub const DEFAULT_SUBSCRIPTION_CAPACITY: usize = 32;

/// An unsolicited notification from the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// `+ANCHOR_RCV`: a tag answered this anchor.
    AnchorReceive(AnchorReceive),
    /// `+TAG_RCV`: an anchor delivered data to this tag.
    TagReceive(TagReceive),
}

/// Raw anchor-receive handler.
pub type AnchorReceiveHandler = Box<dyn FnMut(&AnchorReceive) + Send>;
/// Raw tag-receive handler.
pub type TagReceiveHandler = Box<dyn FnMut(&TagReceive) + Send>;
/// Message handler: `(from, message, rssi)`.
pub type MessageHandler = Box<dyn FnMut(&str, &str, i32) + Send>;
/// Distance handler: `(from, distance, unit, rssi)`.
pub type DistanceHandler = Box<dyn FnMut(&str, f64, MeasureUnit, i32) + Send>;

/// A subscription to dispatched notifications.
pub struct Subscription {
    receiver: broadcast::Receiver<Notification>,
}

impl Subscription {
    /// Receives the next notification, skipping any that lagged out.
    ///
    /// Returns `None` once the dispatcher is dropped.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("subscription lagged, skipped {} notifications", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next notification if one is already queued.
    pub fn try_recv(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.try_recv() {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => return None,
            }
        }
    }
}

/// Holds at most one handler per notification kind and routes
/// notifications to them. Registering a handler replaces the previous one.
pub struct EventDispatcher {
    anchor_receive: Option<AnchorReceiveHandler>,
    tag_receive: Option<TagReceiveHandler>,
    message: Option<MessageHandler>,
    distance: Option<DistanceHandler>,
    preferred_unit: MeasureUnit,
    sender: broadcast::Sender<Notification>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIPTION_CAPACITY)
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("anchor_receive", &self.anchor_receive.is_some())
            .field("tag_receive", &self.tag_receive.is_some())
            .field("message", &self.message.is_some())
            .field("distance", &self.distance.is_some())
            .field("preferred_unit", &self.preferred_unit)
            .finish_non_exhaustive()
    }
}

impl EventDispatcher {
    /// Creates a dispatcher whose subscriptions buffer `capacity` notifications.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            anchor_receive: None,
            tag_receive: None,
            message: None,
            distance: None,
            preferred_unit: MeasureUnit::default(),
            sender,
        }
    }

    /// Sets the raw anchor-receive handler.
    pub fn on_anchor_receive(&mut self, handler: impl FnMut(&AnchorReceive) + Send + 'static) {
        self.anchor_receive = Some(Box::new(handler));
    }

    /// Sets the raw tag-receive handler.
    pub fn on_tag_receive(&mut self, handler: impl FnMut(&TagReceive) + Send + 'static) {
        self.tag_receive = Some(Box::new(handler));
    }

    /// Sets the message handler.
    pub fn on_message_received(&mut self, handler: impl FnMut(&str, &str, i32) + Send + 'static) {
        self.message = Some(Box::new(handler));
    }

    /// Sets the distance handler and the unit it reports in.
    pub fn on_distance_measured(
        &mut self,
        handler: impl FnMut(&str, f64, MeasureUnit, i32) + Send + 'static,
        unit: MeasureUnit,
    ) {
        self.distance = Some(Box::new(handler));
        self.preferred_unit = unit;
    }

    /// Unit used for the distance handler.
    #[must_use]
    pub const fn preferred_unit(&self) -> MeasureUnit {
        self.preferred_unit
    }

    /// Sets the unit used for the distance handler.
    pub const fn set_preferred_unit(&mut self, unit: MeasureUnit) {
        self.preferred_unit = unit;
    }

    /// Removes all handlers.
    pub fn clear_handlers(&mut self) {
        self.anchor_receive = None;
        self.tag_receive = None;
        self.message = None;
        self.distance = None;
    }

    /// Subscribes to every notification dispatched from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Routes a notification to the registered handlers and subscribers.
    ///
    /// Anchor receipts go to the raw handler, then to the message handler
    /// if they carry data, then to the distance handler. Tag receipts go to
    /// the raw handler, then to the message handler with sender `"ANCHOR"`.
    pub fn dispatch(&mut self, notification: &Notification) {
        match notification {
            Notification::AnchorReceive(rcv) => {
                if let Some(handler) = self.anchor_receive.as_mut() {
                    handler(rcv);
                }
                if let Some(handler) = self.message.as_mut().filter(|_| !rcv.data.is_empty()) {
                    handler(&rcv.tag_address, &rcv.data, rcv.rssi);
                }
                self.notify_distance(&rcv.tag_address, rcv.distance_cm, rcv.rssi);
            }
            Notification::TagReceive(rcv) => {
                if let Some(handler) = self.tag_receive.as_mut() {
                    handler(rcv);
                }
                if let Some(handler) = self.message.as_mut() {
                    handler(ANCHOR_SENDER, &rcv.data, rcv.rssi);
                }
            }
        }

        // No subscribers is fine.
        let _ = self.sender.send(notification.clone());
    }

    /// Reports a distance measurement to the distance handler, converted
    /// to the preferred unit.
    pub fn notify_distance(&mut self, from: &str, distance_cm: i32, rssi: i32) {
        let unit = self.preferred_unit;
        if let Some(handler) = self.distance.as_mut() {
            handler(from, convert_distance(distance_cm, unit), unit, rssi);
        }
    }
}

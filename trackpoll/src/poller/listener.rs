//! Listener interface for poller notifications.
//!
//! Notifications are fire-and-forget: the poller never waits on a listener
//! and ignores whatever the listener does with the event.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::fix::PositionFix;
use crate::provider::ProviderError;

/// Receives poller notifications.
///
/// `on_position_restored` and `on_position_lost` are edge events and fire
/// only when the coarse poller state changes. The other hooks fire on every
/// matching completion.
pub trait PositionListener: Send + Sync {
    /// A complete fix arrived.
    fn on_position_updated(&self, fix: &PositionFix);

    /// A timestamp-only update arrived.
    fn on_position_partial_updated(&self, timestamp: DateTime<Utc>);

    /// A fix is available again.
    fn on_position_restored(&self);

    /// No fix is currently available.
    fn on_position_lost(&self);

    /// The poller stopped on an unrecoverable provider error.
    fn on_position_error(&self, error: &ProviderError);
}

/// Owned form of a listener notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PositionEvent {
    Updated { fix: PositionFix },
    PartialUpdated { timestamp: DateTime<Utc> },
    Restored,
    Lost,
    Error { error: ProviderError },
}

/// Listener forwarding every notification into an unbounded channel.
///
/// A dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<PositionEvent>,
}

impl ChannelListener {
    pub fn new(tx: mpsc::UnboundedSender<PositionEvent>) -> Self {
        Self { tx }
    }

    /// Create a listener and the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PositionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: PositionEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Position event receiver dropped");
        }
    }
}

impl PositionListener for ChannelListener {
    fn on_position_updated(&self, fix: &PositionFix) {
        self.send(PositionEvent::Updated { fix: *fix });
    }

    fn on_position_partial_updated(&self, timestamp: DateTime<Utc>) {
        self.send(PositionEvent::PartialUpdated { timestamp });
    }

    fn on_position_restored(&self) {
        self.send(PositionEvent::Restored);
    }

    fn on_position_lost(&self) {
        self.send(PositionEvent::Lost);
    }

    fn on_position_error(&self, error: &ProviderError) {
        self.send(PositionEvent::Error {
            error: error.clone(),
        });
    }
}

//! Cart change notification bus.
//!
//! A process-wide publish/subscribe channel that keeps independently
//! mounted UI surfaces (header badge, cart panel, checkout summary)
//! consistent without a shared global store. Delivery is in-process and
//! best-effort: there is no replay, so a subscriber that attaches after an
//! event was published must read the cart store directly for its initial
//! state.

use tokio::sync::broadcast;
use tracing::trace;

use redseam_core::UserId;

use super::item::CartSnapshot;

/// Buffered events per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 32;

/// A cart change notification.
#[derive(Debug, Clone, PartialEq)]
pub enum CartEvent {
    /// The cart contents changed; carries the full updated snapshot.
    Updated(CartSnapshot),
    /// The cart was emptied (checkout success, logout, identity switch).
    Cleared,
    /// A flow asked for the guest cart to be reset before a new identity
    /// is established (registration).
    ClearRequested,
    /// The current identity changed; `None` means anonymous.
    IdentityChanged(Option<UserId>),
}

/// Handle to the notification bus.
///
/// Cloning shares the same channel. Dropping a receiver unsubscribes it.
#[derive(Clone)]
pub struct CartEvents {
    sender: broadcast::Sender<CartEvent>,
}

impl CartEvents {
    /// Create a new bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to cart events from this point on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// Publishing with no subscribers is not an error; the event is simply
    /// dropped.
    pub fn publish(&self, event: CartEvent) {
        let receivers = self.sender.receiver_count();
        trace!(?event, receivers, "publishing cart event");
        let _ = self.sender.send(event);
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for CartEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let events = CartEvents::new();
        let mut a = events.subscribe();
        let mut b = events.subscribe();

        events.publish(CartEvent::Cleared);

        assert_eq!(a.recv().await.unwrap(), CartEvent::Cleared);
        assert_eq!(b.recv().await.unwrap(), CartEvent::Cleared);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_fine() {
        let events = CartEvents::new();
        events.publish(CartEvent::Cleared);
        assert_eq!(events.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_no_replay() {
        let events = CartEvents::new();
        events.publish(CartEvent::Cleared);

        let mut late = events.subscribe();
        assert!(matches!(
            late.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_dropped_receiver_unsubscribes() {
        let events = CartEvents::new();
        let receiver = events.subscribe();
        assert_eq!(events.subscriber_count(), 1);

        drop(receiver);
        assert_eq!(events.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_updated_carries_snapshot() {
        let events = CartEvents::new();
        let mut receiver = events.subscribe();

        events.publish(CartEvent::Updated(CartSnapshot::default()));

        match receiver.recv().await.unwrap() {
            CartEvent::Updated(snapshot) => assert!(snapshot.is_empty()),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}

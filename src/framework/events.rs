//! # Controller Events
//!
//! Every controller instance owns one [`EventBus`]. Consumers call
//! [`EventBus::subscribe`] and receive [`ControllerEvent`]s in emission order. There is no
//! global hub: two controllers never share a bus unless the caller wires them to.

use tokio::sync::broadcast;
use tracing::trace;

/// Notifications raised by the controllers. The variant names are the public contract UI
/// code binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    RecordChanged,
    ListChanged,
    FilterChanged,
    PageChanged(u32),
    OnDirty,
    OnClean,
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ControllerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.sender.subscribe()
    }

    /// Sends to current subscribers. With nobody listening the event is dropped.
    pub fn emit(&self, event: ControllerEvent) {
        let receivers = self.sender.send(event).unwrap_or(0);
        trace!(?event, receivers, "Event");
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.emit(ControllerEvent::RecordChanged);
        bus.emit(ControllerEvent::PageChanged(2));

        assert_eq!(rx.recv().await.unwrap(), ControllerEvent::RecordChanged);
        assert_eq!(rx.recv().await.unwrap(), ControllerEvent::PageChanged(2));
    }

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        bus.emit(ControllerEvent::ListChanged);
    }
}

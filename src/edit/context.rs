//! # Validation Contexts
//!
//! A [`ValidationContext`] is the externally owned host an edit projection reports to:
//! it receives the message sink, asks for validation, and is told when validation state
//! changes. The host can be swapped at any time, so projections bind to it through
//! subscription ids they can revoke.
//!
//! [`FormContext`] is the in-process implementation used by the demo and the tests.

use super::MessageSink;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

pub type ValidationHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub trait ValidationContext: Send + Sync {
    /// Identifies the context in context-changed notifications.
    fn id(&self) -> Uuid;

    fn attach(&self, sink: MessageSink);

    /// Stops reporting messages from `sink`.
    fn detach(&self, sink: &MessageSink);

    fn on_validation_requested(&self, handler: ValidationHandler) -> SubscriptionId;

    fn remove_validation_handler(&self, id: SubscriptionId);

    fn notify_validation_state_changed(&self);
}

/// In-process validation host standing in for a UI form.
pub struct FormContext {
    id: Uuid,
    sinks: Mutex<Vec<MessageSink>>,
    handlers: Mutex<Vec<(SubscriptionId, ValidationHandler)>>,
    next_subscription: AtomicU64,
    state_changes: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FormContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            sinks: Mutex::new(Vec::new()),
            handlers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
            state_changes: AtomicUsize::new(0),
        })
    }

    /// Asks every subscribed projection to validate, as a form submit would.
    pub fn request_validation(&self) {
        // handlers may subscribe or unsubscribe while running
        let handlers: Vec<ValidationHandler> =
            lock(&self.handlers).iter().map(|(_, h)| h.clone()).collect();
        debug!(form = %self.id, handlers = handlers.len(), "Validation requested");
        for handler in handlers {
            handler();
        }
    }

    /// Messages from every attached sink.
    pub fn messages(&self) -> Vec<String> {
        lock(&self.sinks).iter().flat_map(MessageSink::messages).collect()
    }

    pub fn messages_for(&self, field: &str) -> Vec<String> {
        lock(&self.sinks)
            .iter()
            .flat_map(|s| s.messages_for(field))
            .collect()
    }

    pub fn handler_count(&self) -> usize {
        lock(&self.handlers).len()
    }

    pub fn state_changes(&self) -> usize {
        self.state_changes.load(Ordering::SeqCst)
    }
}

impl ValidationContext for FormContext {
    fn id(&self) -> Uuid {
        self.id
    }

    fn attach(&self, sink: MessageSink) {
        let mut sinks = lock(&self.sinks);
        if !sinks.iter().any(|s| s.ptr_eq(&sink)) {
            sinks.push(sink);
        }
    }

    fn detach(&self, sink: &MessageSink) {
        lock(&self.sinks).retain(|s| !s.ptr_eq(sink));
    }

    fn on_validation_requested(&self, handler: ValidationHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        lock(&self.handlers).push((id, handler));
        id
    }

    fn remove_validation_handler(&self, id: SubscriptionId) {
        lock(&self.handlers).retain(|(sid, _)| *sid != id);
    }

    fn notify_validation_state_changed(&self) {
        self.state_changes.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handlers_subscribe_and_unsubscribe() {
        let form = FormContext::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let id = form.on_validation_requested(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        form.request_validation();
        form.remove_validation_handler(id);
        form.request_validation();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(form.handler_count(), 0);
    }

    #[test]
    fn test_attached_sinks_are_collected_once() {
        let form = FormContext::new();
        let sink = MessageSink::new();
        form.attach(sink.clone());
        form.attach(sink.clone());
        sink.add("Name", "required");
        assert_eq!(form.messages(), vec!["required".to_string()]);
        assert_eq!(form.messages_for("Name").len(), 1);

        form.detach(&sink);
        assert!(form.messages().is_empty());
    }
}

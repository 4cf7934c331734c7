use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Validation messages keyed by field name.
///
/// Clones share the same underlying map, so a sink handed to a validation context and
/// the copy kept by an edit projection always agree.
#[derive(Debug, Clone, Default)]
pub struct MessageSink {
    messages: Arc<Mutex<BTreeMap<String, Vec<String>>>>,
}

impl MessageSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Vec<String>>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, field: &str, message: impl Into<String>) {
        self.lock()
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn messages_for(&self, field: &str) -> Vec<String> {
        self.lock().get(field).cloned().unwrap_or_default()
    }

    /// All messages, ordered by field name.
    pub fn messages(&self) -> Vec<String> {
        self.lock().values().flatten().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().values().all(Vec::is_empty)
    }

    pub fn ptr_eq(&self, other: &MessageSink) -> bool {
        Arc::ptr_eq(&self.messages, &other.messages)
    }
}

//! # Field Value Store
//!
//! The mutable bag of named field values that both display and edit surfaces read from.
//! Each entry is a [`RecordValue`] holding the original value and the in-progress edit.
//!
//! # Architecture Note
//! The store is the only place edits live. The record controller builds it from the
//! current record, the edit projection writes into it, and `save` rebuilds a record from
//! it. Change detection is push-based: the store owns a single callback that receives the
//! aggregate dirty flag on every write to an existing field, so nobody needs to poll.
//!
//! Names are matched case-insensitively and exactly. A missing field reads as the type's
//! default value rather than an error.

use super::{FieldValue, FromFieldValue, RecordValue};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Receives the store's aggregate dirty flag after each field write.
pub type FieldChangedCallback = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Clone, Default)]
pub struct FieldValueStore {
    items: Vec<RecordValue>,
    on_change: Option<FieldChangedCallback>,
}

impl fmt::Debug for FieldValueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValueStore")
            .field("items", &self.items)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl FieldValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chained insert used when projecting a record into a store.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.add(name, value);
        self
    }

    /// Installs the change callback, replacing any previous one.
    pub fn set_on_change(&mut self, callback: FieldChangedCallback) {
        self.on_change = Some(callback);
    }

    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|v| v.has_name(name))
    }

    fn find(&self, name: &str) -> Option<&RecordValue> {
        self.items.iter().find(|v| v.has_name(name))
    }

    /// Original value of `name`, or `T::default()` when absent or of another type.
    pub fn get<T: FromFieldValue + Default>(&self, name: &str) -> T {
        self.try_get(name).unwrap_or_default()
    }

    /// Edited value of `name`, or `T::default()` when absent or of another type.
    pub fn get_edited<T: FromFieldValue + Default>(&self, name: &str) -> T {
        self.try_get_edited(name).unwrap_or_default()
    }

    pub fn try_get<T: FromFieldValue>(&self, name: &str) -> Option<T> {
        self.find(name).and_then(|v| v.original().get())
    }

    pub fn try_get_edited<T: FromFieldValue>(&self, name: &str) -> Option<T> {
        self.find(name).and_then(|v| v.edited().get())
    }

    pub fn value(&self, name: &str) -> Option<&RecordValue> {
        self.find(name)
    }

    /// Writes `value` as the edited value of `name`.
    ///
    /// An absent field is created clean (original and edited both `value`) without
    /// notifying. An existing field has its edited value replaced and the callback fires
    /// with the new aggregate dirty flag. Returns whether the field already existed.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> bool {
        let value = value.into();
        match self.position(name) {
            Some(index) => {
                self.items[index].set_edited(value);
                self.notify();
                true
            }
            None => {
                self.items.push(RecordValue::new(name, value));
                false
            }
        }
    }

    /// Inserts a fresh clean value, replacing any entry with the same name.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.add_value(RecordValue::new(name, value));
    }

    pub fn add_value(&mut self, value: RecordValue) {
        self.items.retain(|v| !v.has_name(value.name()));
        self.items.push(value);
    }

    /// The named entry, created with a null value if absent.
    pub fn get_record_value(&mut self, name: &str) -> &mut RecordValue {
        let index = match self.position(name) {
            Some(index) => index,
            None => {
                self.items.push(RecordValue::new(name, FieldValue::Null));
                self.items.len() - 1
            }
        };
        &mut self.items[index]
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|v| !v.has_name(name));
        self.items.len() != before
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Resets every edited value back to its original.
    pub fn reset_all(&mut self) {
        for item in &mut self.items {
            item.reset();
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Adds every entry of `other` with replace semantics, keeping edit state.
    pub fn merge(&mut self, other: &FieldValueStore) {
        for value in &other.items {
            self.add_value(value.clone());
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.items.iter().any(RecordValue::is_dirty)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordValue> {
        self.items.iter()
    }

    fn notify(&self) {
        if let Some(callback) = &self.on_change {
            callback(self.is_dirty());
        }
    }
}

/// A store shared by reference between a record controller and its edit projections.
///
/// Writes through any clone are visible to every other clone. The change callback runs
/// while the store is locked and must not touch the store again.
#[derive(Clone, Default, Debug)]
pub struct SharedFieldValues(Arc<Mutex<FieldValueStore>>);

impl SharedFieldValues {
    pub fn new(store: FieldValueStore) -> Self {
        Self(Arc::new(Mutex::new(store)))
    }

    fn lock(&self) -> MutexGuard<'_, FieldValueStore> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn read<F, U>(&self, f: F) -> U
    where
        F: FnOnce(&FieldValueStore) -> U,
    {
        f(&self.lock())
    }

    pub fn write<F, U>(&self, f: F) -> U
    where
        F: FnOnce(&mut FieldValueStore) -> U,
    {
        f(&mut self.lock())
    }

    /// Replaces the contents with `store`, keeping the installed callback.
    pub fn replace(&self, store: FieldValueStore) {
        let mut guard = self.lock();
        let callback = guard.on_change.take();
        *guard = store;
        guard.on_change = callback;
    }

    pub fn get<T: FromFieldValue + Default>(&self, name: &str) -> T {
        self.lock().get(name)
    }

    pub fn get_edited<T: FromFieldValue + Default>(&self, name: &str) -> T {
        self.lock().get_edited(name)
    }

    pub fn set(&self, name: &str, value: impl Into<FieldValue>) -> bool {
        self.lock().set(name, value)
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().is_dirty()
    }

    pub fn snapshot(&self) -> FieldValueStore {
        let mut copy = self.lock().clone();
        copy.clear_on_change();
        copy
    }

    pub fn ptr_eq(&self, other: &SharedFieldValues) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn station() -> FieldValueStore {
        FieldValueStore::new()
            .with("ID", 1i64)
            .with("Name", "Tiree")
            .with("Elevation", 28.0)
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let store = station();
        assert_eq!(store.get::<String>("name"), "Tiree");
        assert_eq!(store.get::<i64>("id"), 1);
        assert!(store.has_field("ELEVATION"));
    }

    #[test]
    fn test_lookup_folds_non_ascii_case() {
        let mut store = FieldValueStore::new().with("État", "x");
        assert_eq!(store.get::<String>("état"), "x");
        assert!(store.has_field("ÉTAT"));
        store.add("état", "y");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get::<String>("ÉTAT"), "y");
    }

    #[test]
    fn test_missing_field_reads_default() {
        let store = station();
        assert_eq!(store.get::<String>("Missing"), String::new());
        assert_eq!(store.get::<f64>("Missing"), 0.0);
        assert_eq!(store.try_get::<String>("Missing"), None);
        // wrong type also reads default
        assert_eq!(store.get::<i64>("Name"), 0);
    }

    #[test]
    fn test_add_replaces_same_name() {
        let mut store = station();
        store.add("NAME", "Ross-on-Wye");
        assert_eq!(store.len(), 3);
        assert_eq!(store.get::<String>("Name"), "Ross-on-Wye");
    }

    #[test]
    fn test_set_existing_fires_callback_with_aggregate_flag() {
        let mut store = station();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.set_on_change(Arc::new(move |dirty| sink.lock().unwrap().push(dirty)));

        store.set("Name", "Oban");
        store.set("Name", "Tiree");
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
        assert_eq!(store.get_edited::<String>("Name"), "Tiree");
    }

    #[test]
    fn test_set_absent_creates_clean_without_callback() {
        let mut store = station();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        store.set_on_change(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(!store.set("Country", "Scotland"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!store.is_dirty());
        assert_eq!(store.get::<String>("Country"), "Scotland");
    }

    #[test]
    fn test_reset_all_clears_dirty() {
        let mut store = station();
        store.set("Name", "Oban");
        store.set("Elevation", 3.0);
        assert!(store.is_dirty());
        store.reset_all();
        assert!(!store.is_dirty());
        assert_eq!(store.get_edited::<f64>("Elevation"), 28.0);
    }

    #[test]
    fn test_merge_remove_and_record_value() {
        let mut store = station();
        let mut other = FieldValueStore::new().with("Name", "Lerwick");
        other.set("Name", "Kirkwall");
        store.merge(&other);
        assert_eq!(store.get_edited::<String>("Name"), "Kirkwall");
        assert!(store.is_dirty());

        assert!(store.remove("elevation"));
        assert!(!store.remove("elevation"));

        store.get_record_value("Latitude").set_edited(54.2);
        assert_eq!(store.get_edited::<f64>("Latitude"), 54.2);
    }

    #[test]
    fn test_shared_values_are_seen_through_clones() {
        let shared = SharedFieldValues::new(station());
        let other = shared.clone();
        other.set("Name", "Oban");
        assert_eq!(shared.get_edited::<String>("Name"), "Oban");
        assert!(shared.is_dirty());
        assert!(shared.ptr_eq(&other));
    }

    #[test]
    fn test_replace_keeps_callback() {
        let shared = SharedFieldValues::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        shared.write(|s| {
            s.set_on_change(Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
        });
        shared.replace(station());
        shared.set("Name", "Oban");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

//! # Record Types
//!
//! This module defines [`DbRecord`], the contract every record type handled by the
//! controllers must satisfy, and [`ColumnMap`], the typed column accessors that stand in
//! for reflection when sorting, filtering or listing distinct values by column name.

use crate::values::{same_name, FieldValue, FieldValueStore};
use std::fmt::{self, Debug};
use std::sync::Arc;
use uuid::Uuid;

/// Id of the blank "no record" placeholder.
pub const NO_RECORD_ID: i64 = -1;

/// Id used to request a new, not yet persisted record.
pub const NEW_RECORD_ID: i64 = 0;

/// Naming metadata for a record type, used in task messages and logs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordInfo {
    pub record_name: String,
    pub record_description: String,
    pub record_list_name: String,
    pub record_list_description: String,
}

/// Trait that every record type managed by a controller must implement.
///
/// # Architecture Note
/// The controllers never look inside a record directly. Everything they need goes
/// through this trait: identity for load/save routing, `as_properties` /
/// `from_properties` for the round trip through the field value store, and `columns`
/// for anything addressed by column name.
///
/// `Default` must produce the blank record, whose id is [`NO_RECORD_ID`]. Any id
/// `<= NEW_RECORD_ID` means "not yet persisted" and routes a save to create.
pub trait DbRecord: Clone + Default + Send + Sync + Debug + 'static {
    fn id(&self) -> i64;

    fn guid(&self) -> Uuid {
        Uuid::nil()
    }

    fn display_name(&self) -> String;

    fn record_info() -> RecordInfo;

    /// Projects the record into a fresh, clean store.
    fn as_properties(&self) -> FieldValueStore;

    /// Rebuilds a record from the store's *edited* values.
    fn from_properties(values: &FieldValueStore) -> Self;

    /// Returns the record stamped with `id`.
    fn with_id(self, id: i64) -> Self;

    fn columns() -> ColumnMap<Self>;

    fn is_new(&self) -> bool {
        self.id() <= NEW_RECORD_ID
    }

    /// Short name used in log fields.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
            .split("::")
            .last()
            .unwrap_or("Unknown")
    }
}

pub type ColumnAccessor<R> = Arc<dyn Fn(&R) -> FieldValue + Send + Sync>;

/// Column name to extractor map, matched case-insensitively.
pub struct ColumnMap<R> {
    columns: Vec<(String, ColumnAccessor<R>)>,
}

impl<R> ColumnMap<R> {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    pub fn column<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> FieldValue + Send + Sync + 'static,
    {
        let name = name.into();
        self.columns.retain(|(n, _)| !same_name(n, &name));
        self.columns.push((name, Arc::new(accessor)));
        self
    }

    pub fn accessor(&self, name: &str) -> Option<ColumnAccessor<R>> {
        self.columns
            .iter()
            .find(|(n, _)| same_name(n, name))
            .map(|(_, f)| f.clone())
    }

    pub fn value(&self, record: &R, name: &str) -> Option<FieldValue> {
        self.accessor(name).map(|f| f(record))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| same_name(n, name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }
}

impl<R> Default for ColumnMap<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for ColumnMap<R> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
        }
    }
}

impl<R> Debug for ColumnMap<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i64,
        label: String,
    }

    #[test]
    fn test_column_lookup_is_case_insensitive() {
        let columns = ColumnMap::<Point>::new()
            .column("X", |p| p.x.into())
            .column("Label", |p| p.label.clone().into());
        let p = Point {
            x: 4,
            label: "north".into(),
        };

        assert_eq!(columns.value(&p, "x"), Some(FieldValue::Int(4)));
        assert_eq!(columns.value(&p, "LABEL"), Some(FieldValue::from("north")));
        assert_eq!(columns.value(&p, "missing"), None);
        assert!(columns.contains("label"));
        assert!(!columns.contains("y"));
    }

    #[test]
    fn test_column_lookup_folds_non_ascii_case() {
        let columns = ColumnMap::<Point>::new().column("Étiquette", |p| p.label.clone().into());
        let p = Point {
            x: 0,
            label: "sud".into(),
        };
        assert_eq!(columns.value(&p, "étiquette"), Some(FieldValue::from("sud")));
        assert!(columns.contains("ÉTIQUETTE"));
    }

    #[test]
    fn test_redefining_a_column_replaces_it() {
        let columns = ColumnMap::<Point>::new()
            .column("X", |p| p.x.into())
            .column("x", |p| (p.x * 2).into());
        let p = Point {
            x: 4,
            label: String::new(),
        };
        assert_eq!(columns.names().count(), 1);
        assert_eq!(columns.value(&p, "X"), Some(FieldValue::Int(8)));
    }
}

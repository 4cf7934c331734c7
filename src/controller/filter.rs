//! # Filter Collection
//!
//! An ordered set of field/value predicates, unique by field name. Order matters: the
//! list controller sends only the first entry to the data service and applies the rest in
//! memory, so callers should put the most selective filter first.

use crate::values::{FieldType, FieldValue, FromFieldValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterItem {
    pub field_name: String,
    pub value: FieldValue,
    pub value_type: FieldType,
}

impl FilterItem {
    pub fn new(field_name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        Self {
            field_name: field_name.into(),
            value_type: value.field_type(),
            value,
        }
    }
}

/// Whether a filter panel bound to this collection should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShowState {
    #[default]
    NotSet,
    Show,
    Hide,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterList {
    filters: Vec<FilterItem>,
    pub only_load_if_filters: bool,
    pub show_state: ShowState,
}

impl FilterList {
    pub fn new(only_load_if_filters: bool) -> Self {
        Self {
            only_load_if_filters,
            ..Self::default()
        }
    }

    /// False only when filters are required and none are set.
    pub fn should_load(&self) -> bool {
        !self.filters.is_empty() || !self.only_load_if_filters
    }

    pub fn show(&self) -> bool {
        self.show_state == ShowState::Show
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.filters.iter().position(|f| f.field_name == name)
    }

    /// Adds a filter, or replaces the existing one when `overwrite` is set.
    /// Returns whether the collection changed.
    pub fn set_filter(&mut self, name: &str, value: impl Into<FieldValue>, overwrite: bool) -> bool {
        match self.position(name) {
            None => {
                self.filters.push(FilterItem::new(name, value));
                true
            }
            Some(index) if overwrite => {
                self.filters[index] = FilterItem::new(name, value);
                true
            }
            Some(_) => false,
        }
    }

    pub fn try_get_filter(&self, name: &str) -> Option<&FieldValue> {
        self.position(name).map(|i| &self.filters[i].value)
    }

    pub fn get_filter<T: FromFieldValue>(&self, name: &str) -> Option<T> {
        self.try_get_filter(name).and_then(FieldValue::get)
    }

    pub fn clear_filter(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.filters.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterItem> {
        self.filters.iter()
    }

    /// Splits into the store query (first filter only, same load policy) and the
    /// filters left for in-memory refinement.
    pub fn split_first(&self) -> (FilterList, &[FilterItem]) {
        let (head, rest) = match self.filters.split_first() {
            Some((first, rest)) => (vec![first.clone()], rest),
            None => (Vec::new(), &self.filters[..]),
        };
        let query = FilterList {
            filters: head,
            only_load_if_filters: self.only_load_if_filters,
            show_state: self.show_state,
        };
        (query, rest)
    }
}

impl<'a> IntoIterator for &'a FilterList {
    type Item = &'a FilterItem;
    type IntoIter = std::slice::Iter<'a, FilterItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_load_policy() {
        let mut filters = FilterList::new(true);
        assert!(!filters.should_load());
        filters.set_filter("Status", "active", true);
        assert!(filters.should_load());

        let open = FilterList::new(false);
        assert!(open.should_load());
    }

    #[test]
    fn test_set_filter_respects_overwrite() {
        let mut filters = FilterList::default();
        assert!(filters.set_filter("Region", "west", true));
        assert!(!filters.set_filter("Region", "east", false));
        assert_eq!(filters.get_filter::<String>("Region").as_deref(), Some("west"));

        assert!(filters.set_filter("Region", 7i64, true));
        assert_eq!(filters.len(), 1);
        let item = filters.iter().next().unwrap();
        assert_eq!(item.value_type, FieldType::Int);
    }

    #[test]
    fn test_clear_filter() {
        let mut filters = FilterList::default();
        filters.set_filter("Region", "west", true);
        assert!(filters.clear_filter("Region"));
        assert!(!filters.clear_filter("Region"));
        assert!(filters.try_get_filter("Region").is_none());
    }

    #[test]
    fn test_split_first_keeps_order() {
        let mut filters = FilterList::new(true);
        filters.set_filter("Status", "active", true);
        filters.set_filter("Region", "west", true);

        let (query, rest) = filters.split_first();
        assert_eq!(query.len(), 1);
        assert_eq!(query.iter().next().unwrap().field_name, "Status");
        assert!(query.only_load_if_filters);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].field_name, "Region");
    }

    #[test]
    fn test_show_state() {
        let mut filters = FilterList::default();
        assert!(!filters.show());
        filters.show_state = ShowState::Show;
        assert!(filters.show());
    }
}

//! # Field Values
//!
//! [`FieldValue`] is the dynamically-typed slot that every record field is projected into
//! when it enters a [`FieldValueStore`](crate::values::FieldValueStore). Typed access goes
//! through [`FromFieldValue`], which returns `None` on a type mismatch instead of failing.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display};
use uuid::Uuid;

/// A single field value.
///
/// `Null` is the "no value" state. Two `Null`s compare equal; a `Null` never equals a
/// non-null value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Decimal(f64),
    Text(String),
    Date(NaiveDateTime),
    Guid(Uuid),
}

/// The type tag of a [`FieldValue`], recorded alongside filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Null,
    Bool,
    Int,
    Decimal,
    Text,
    Date,
    Guid,
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Null => FieldType::Null,
            FieldValue::Bool(_) => FieldType::Bool,
            FieldValue::Int(_) => FieldType::Int,
            FieldValue::Decimal(_) => FieldType::Decimal,
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::Date(_) => FieldType::Date,
            FieldValue::Guid(_) => FieldType::Guid,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Converts into `T`, or `None` when the stored type does not fit.
    pub fn get<T: FromFieldValue>(&self) -> Option<T> {
        T::from_field_value(self)
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Int(_) | FieldValue::Decimal(_) => 2,
            FieldValue::Text(_) => 3,
            FieldValue::Date(_) => 4,
            FieldValue::Guid(_) => 5,
        }
    }

    /// Filter equality: same kind and equal, with integers and decimals compared numerically.
    pub fn matches(&self, other: &FieldValue) -> bool {
        self.rank() == other.rank() && self.sort_cmp(other) == Ordering::Equal
    }

    /// Total ordering used for column sorting.
    ///
    /// Nulls sort first. Integers and decimals compare numerically; otherwise values of
    /// different kinds order by kind.
    pub fn sort_cmp(&self, other: &FieldValue) -> Ordering {
        use FieldValue::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Decimal(a), Decimal(b)) => a.total_cmp(b),
            (Int(a), Decimal(b)) => (*a as f64).total_cmp(b),
            (Decimal(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Text(a), Text(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Guid(a), Guid(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Decimal(v) => write!(f, "{}", v),
            FieldValue::Text(v) => f.write_str(v),
            FieldValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
            FieldValue::Guid(v) => write!(f, "{}", v),
        }
    }
}

/// Typed extraction from a [`FieldValue`].
///
/// Integers widen into `f64`; nothing else converts across kinds.
pub trait FromFieldValue: Sized {
    fn from_field_value(value: &FieldValue) -> Option<Self>;
}

impl FromFieldValue for FieldValue {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromFieldValue for bool {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromFieldValue for i64 {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromFieldValue for i32 {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Int(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl FromFieldValue for u32 {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Int(v) => u32::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl FromFieldValue for f64 {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Decimal(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl FromFieldValue for String {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromFieldValue for NaiveDateTime {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Date(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromFieldValue for Uuid {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Guid(v) => Some(*v),
            _ => None,
        }
    }
}

impl<T: FromFieldValue> FromFieldValue for Option<T> {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Null => Some(None),
            other => T::from_field_value(other).map(Some),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Decimal(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(v: NaiveDateTime) -> Self {
        FieldValue::Date(v)
    }
}

impl From<Uuid> for FieldValue {
    fn from(v: Uuid) -> Self {
        FieldValue::Guid(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_extraction_is_strict_except_numeric_widening() {
        let v = FieldValue::from(42i64);
        assert_eq!(v.get::<i64>(), Some(42));
        assert_eq!(v.get::<f64>(), Some(42.0));
        assert_eq!(v.get::<String>(), None);
        assert_eq!(FieldValue::from(1.5).get::<i64>(), None);
    }

    #[test]
    fn test_sort_cmp_orders_nulls_first_and_mixed_numbers() {
        let mut values = vec![
            FieldValue::from(3.5),
            FieldValue::Null,
            FieldValue::from(2i64),
            FieldValue::from(10i64),
        ];
        values.sort_by(|a, b| a.sort_cmp(b));
        assert_eq!(
            values,
            vec![
                FieldValue::Null,
                FieldValue::from(2i64),
                FieldValue::from(3.5),
                FieldValue::from(10i64),
            ]
        );
    }

    #[test]
    fn test_matches_compares_numbers_across_kinds() {
        assert!(FieldValue::from(2i64).matches(&FieldValue::from(2.0)));
        assert!(!FieldValue::from("2").matches(&FieldValue::from(2i64)));
        assert!(FieldValue::Null.matches(&FieldValue::Null));
        assert!(!FieldValue::from(true).matches(&FieldValue::Null));
    }

    #[test]
    fn test_option_conversions() {
        assert_eq!(FieldValue::from(None::<String>), FieldValue::Null);
        assert_eq!(FieldValue::Null.get::<Option<String>>(), Some(None));
        assert_eq!(
            FieldValue::from("x").get::<Option<String>>(),
            Some(Some("x".to_string()))
        );
    }
}

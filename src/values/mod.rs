//! Field-level edit state: typed values, per-field original/edited pairs, and the store.

mod field;
mod record_value;
mod store;

pub use field::{FieldType, FieldValue, FromFieldValue};
pub use record_value::RecordValue;
pub use store::{FieldChangedCallback, FieldValueStore, SharedFieldValues};

/// Case-insensitive name comparison covering non-ASCII letters.
pub fn same_name(a: &str, b: &str) -> bool {
    a == b
        || a.chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase))
}

use super::{same_name, FieldValue};

/// One named slot holding a record's original value and its in-progress edit.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
    name: String,
    original: FieldValue,
    edited: FieldValue,
}

impl RecordValue {
    /// Creates a clean value: the edited value starts equal to the original.
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        Self {
            name: name.into(),
            edited: value.clone(),
            original: value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn original(&self) -> &FieldValue {
        &self.original
    }

    pub fn edited(&self) -> &FieldValue {
        &self.edited
    }

    pub fn set_edited(&mut self, value: impl Into<FieldValue>) {
        self.edited = value.into();
    }

    /// Both null: clean. Exactly one null: dirty. Otherwise structural inequality.
    pub fn is_dirty(&self) -> bool {
        match (self.original.is_null(), self.edited.is_null()) {
            (true, true) => false,
            (false, false) => self.original != self.edited,
            _ => true,
        }
    }

    pub fn reset(&mut self) {
        self.edited = self.original.clone();
    }

    pub(crate) fn has_name(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }
}

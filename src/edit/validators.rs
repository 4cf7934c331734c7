//! # Fluent Validators
//!
//! Checks chain on a [`Validation`] and the chain ends with [`Validation::validate`],
//! which writes the collected messages into a sink:
//!
//! ```rust,ignore
//! name.validation(fields::NAME)
//!     .longer_than(6, Some("Name must be longer than 6 letters"))
//!     .validate(sink, None)
//! ```
//!
//! A failed check records its own message when given one. If a chain fails without any
//! recorded message, `validate` falls back to its argument or [`DEFAULT_MESSAGE`].

use super::MessageSink;
use chrono::NaiveDateTime;
use regex::Regex;

pub const DEFAULT_MESSAGE: &str = "The value failed validation";

#[derive(Debug, Clone)]
pub struct Validation<T> {
    value: T,
    field: String,
    messages: Vec<String>,
    trip: bool,
}

impl<T> Validation<T> {
    pub fn new(value: T, field: impl Into<String>) -> Self {
        Self {
            value,
            field: field.into(),
            messages: Vec::new(),
            trip: false,
        }
    }

    fn check(mut self, ok: bool, message: Option<&str>) -> Self {
        if !ok {
            self.trip = true;
            if let Some(message) = message.filter(|m| !m.trim().is_empty()) {
                self.messages.push(message.to_string());
            }
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        !self.trip
    }

    /// Writes messages for a failed chain into `sink` and returns validity.
    pub fn validate(self, sink: &MessageSink, message: Option<&str>) -> bool {
        if self.trip {
            if self.messages.is_empty() {
                sink.add(&self.field, message.unwrap_or(DEFAULT_MESSAGE));
            } else {
                for m in self.messages {
                    sink.add(&self.field, m);
                }
            }
        }
        !self.trip
    }
}

impl Validation<String> {
    pub fn not_empty(self, message: Option<&str>) -> Self {
        let ok = !self.value.trim().is_empty();
        self.check(ok, message)
    }

    pub fn longer_than(self, length: usize, message: Option<&str>) -> Self {
        let ok = self.value.chars().count() > length;
        self.check(ok, message)
    }

    pub fn shorter_than(self, length: usize, message: Option<&str>) -> Self {
        let ok = self.value.chars().count() < length;
        self.check(ok, message)
    }

    /// Fails when the value does not match, or when `pattern` is not a valid regex.
    pub fn matches(self, pattern: &str, message: Option<&str>) -> Self {
        let ok = Regex::new(pattern)
            .map(|re| re.is_match(&self.value))
            .unwrap_or(false);
        self.check(ok, message)
    }
}

macro_rules! numeric_checks {
    ($($t:ty),*) => {$(
        impl Validation<$t> {
            pub fn greater_than(self, min: $t, message: Option<&str>) -> Self {
                let ok = self.value > min;
                self.check(ok, message)
            }

            pub fn greater_than_or_equal_to(self, min: $t, message: Option<&str>) -> Self {
                let ok = self.value >= min;
                self.check(ok, message)
            }

            pub fn less_than(self, max: $t, message: Option<&str>) -> Self {
                let ok = self.value < max;
                self.check(ok, message)
            }

            pub fn less_than_or_equal_to(self, max: $t, message: Option<&str>) -> Self {
                let ok = self.value <= max;
                self.check(ok, message)
            }
        }
    )*};
}

numeric_checks!(i64, f64);

impl Validation<NaiveDateTime> {
    pub fn not_default(self, message: Option<&str>) -> Self {
        let ok = self.value != NaiveDateTime::default();
        self.check(ok, message)
    }

    pub fn less_than(self, date: NaiveDateTime, inclusive: bool, message: Option<&str>) -> Self {
        let ok = if inclusive {
            self.value <= date
        } else {
            self.value < date
        };
        self.check(ok, message)
    }

    pub fn greater_than(self, date: NaiveDateTime, inclusive: bool, message: Option<&str>) -> Self {
        let ok = if inclusive {
            self.value >= date
        } else {
            self.value > date
        };
        self.check(ok, message)
    }
}

/// Starts a validation chain on any value.
pub trait ValidationExt: Sized {
    fn validation(self, field: &str) -> Validation<Self> {
        Validation::new(self, field)
    }
}

impl<T> ValidationExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_string_checks_collect_messages() {
        let sink = MessageSink::new();
        let ok = "Tiree"
            .to_string()
            .validation("Name")
            .longer_than(6, Some("Name must be longer than 6 letters"))
            .matches("^[A-Z]", Some("Name must start with a capital"))
            .validate(&sink, None);

        assert!(!ok);
        assert_eq!(
            sink.messages_for("Name"),
            vec!["Name must be longer than 6 letters".to_string()]
        );
    }

    #[test]
    fn test_range_falls_back_to_chain_message() {
        let sink = MessageSink::new();
        let ok = 120.5f64
            .validation("Latitude")
            .greater_than_or_equal_to(-90.0, None)
            .less_than_or_equal_to(90.0, None)
            .validate(&sink, Some("Latitude should be in the range -90 to 90"));

        assert!(!ok);
        assert_eq!(
            sink.messages(),
            vec!["Latitude should be in the range -90 to 90".to_string()]
        );
    }

    #[test]
    fn test_default_message_when_nothing_given() {
        let sink = MessageSink::new();
        assert!(!5i64.validation("Count").greater_than(10, None).validate(&sink, None));
        assert_eq!(sink.messages(), vec![DEFAULT_MESSAGE.to_string()]);
    }

    #[test]
    fn test_passing_chain_writes_nothing() {
        let sink = MessageSink::new();
        assert!(String::from("Ross-on-Wye")
            .validation("Name")
            .not_empty(None)
            .shorter_than(40, None)
            .validate(&sink, None));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_invalid_pattern_fails() {
        let v = String::from("abc").validation("Code").matches("(", None);
        assert!(!v.is_valid());
    }

    #[test]
    fn test_date_checks() {
        let d = NaiveDate::from_ymd_opt(2020, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let sink = MessageSink::new();
        assert!(d
            .validation("Date")
            .not_default(None)
            .less_than(d, true, None)
            .greater_than(d, true, None)
            .validate(&sink, None));
        assert!(!d.validation("Date").less_than(d, false, None).is_valid());
        assert!(!NaiveDateTime::default()
            .validation("Date")
            .not_default(None)
            .is_valid());
    }
}

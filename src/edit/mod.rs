//! Edit projections, validation contexts, and the fluent validators rules are built from.

mod context;
mod projection;
mod sink;
mod validators;

pub use context::{FormContext, SubscriptionId, ValidationContext, ValidationHandler};
pub use projection::{
    ContextChange, ContextChangedHandler, EditProjection, FieldView, ValidationRule,
};
pub use sink::MessageSink;
pub use validators::{Validation, ValidationExt, DEFAULT_MESSAGE};

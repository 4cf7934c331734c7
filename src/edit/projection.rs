//! # Edit Projection
//!
//! A typed view over a shared [`SharedFieldValues`] store plus the validation pipeline
//! for one record's edit session.
//!
//! # Architecture Note
//! The projection never copies the store. Writes made through it are immediately visible
//! to the record controller that owns the store, and the other way round.
//!
//! Validation rules are registered once, at construction, by
//! [`FieldView::load_validation_rules`]. They run:
//! - when the attached validation context requests it,
//! - after every [`EditProjection::set`],
//! - on an explicit [`EditProjection::validate`].
//!
//! Every rule runs on every pass, so all applicable messages are collected. A pass that
//! starts while another is in progress (a rule's side effect re-triggering validation)
//! returns the current state unchanged.

use super::{MessageSink, SubscriptionId, ValidationContext};
use crate::framework::RecordError;
use crate::values::{FieldValue, SharedFieldValues};
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument};

/// One validation rule: inspects the typed view, writes messages, returns validity.
pub type ValidationRule<M> = Box<dyn Fn(&M, &MessageSink) -> bool + Send + Sync>;

/// Typed properties over a field value store.
pub trait FieldView: Send + Sync + Sized + 'static {
    fn from_values(values: SharedFieldValues) -> Self;

    fn values(&self) -> &SharedFieldValues;

    /// Registers this view's validation rules. Called once per projection.
    fn load_validation_rules(&self, _rules: &mut Vec<ValidationRule<Self>>) {}
}

/// Old and new validation context, raised after a context swap.
#[derive(Clone)]
pub struct ContextChange {
    pub previous: Option<Arc<dyn ValidationContext>>,
    pub current: Arc<dyn ValidationContext>,
}

pub type ContextChangedHandler = Arc<dyn Fn(&ContextChange) + Send + Sync>;

struct ContextBinding {
    context: Arc<dyn ValidationContext>,
    sink: MessageSink,
    subscription: SubscriptionId,
}

struct ProjectionInner<M: FieldView> {
    view: M,
    rules: Vec<ValidationRule<M>>,
    trip: AtomicBool,
    validating: AtomicBool,
    local_sink: MessageSink,
    binding: Mutex<Option<ContextBinding>>,
    context_listeners: Mutex<Vec<ContextChangedHandler>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the re-entrancy flag when a validation pass ends, even by panic.
struct ValidatingGuard<'a>(&'a AtomicBool);

impl Drop for ValidatingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<M: FieldView> ProjectionInner<M> {
    fn current_sink(&self) -> (MessageSink, Option<Arc<dyn ValidationContext>>) {
        match lock(&self.binding).as_ref() {
            Some(binding) => (binding.sink.clone(), Some(binding.context.clone())),
            None => (self.local_sink.clone(), None),
        }
    }

    fn is_valid(&self) -> bool {
        !self.trip.load(Ordering::SeqCst)
    }

    fn validate(&self) -> bool {
        if self.validating.swap(true, Ordering::SeqCst) {
            return self.is_valid();
        }
        let _guard = ValidatingGuard(&self.validating);

        let (sink, context) = self.current_sink();
        sink.clear();
        self.trip.store(false, Ordering::SeqCst);

        let mut failed = 0usize;
        for rule in &self.rules {
            if !rule(&self.view, &sink) {
                failed += 1;
            }
        }
        self.trip.store(failed > 0, Ordering::SeqCst);
        debug!(rules = self.rules.len(), failed, "Validated");

        if let Some(context) = context {
            context.notify_validation_state_changed();
        }
        failed == 0
    }
}

impl<M: FieldView> Drop for ProjectionInner<M> {
    fn drop(&mut self) {
        let binding = match self.binding.get_mut() {
            Ok(binding) => binding.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(binding) = binding {
            binding.context.remove_validation_handler(binding.subscription);
            binding.context.detach(&binding.sink);
        }
    }
}

/// Typed, validating façade over one record's field values.
///
/// Cloning is cheap and yields a handle to the same projection.
pub struct EditProjection<M: FieldView> {
    inner: Arc<ProjectionInner<M>>,
}

impl<M: FieldView> Clone for EditProjection<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M: FieldView> EditProjection<M> {
    /// Builds the projection and registers its rules.
    ///
    /// A projection without a store is unusable, so `None` is a configuration error.
    pub fn new(values: Option<SharedFieldValues>) -> Result<Self, RecordError> {
        let values = values.ok_or_else(|| {
            RecordError::Configuration("edit projection requires a field value store".into())
        })?;
        let view = M::from_values(values);
        let mut rules = Vec::new();
        view.load_validation_rules(&mut rules);
        Ok(Self {
            inner: Arc::new(ProjectionInner {
                view,
                rules,
                trip: AtomicBool::new(false),
                validating: AtomicBool::new(false),
                local_sink: MessageSink::new(),
                binding: Mutex::new(None),
                context_listeners: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn view(&self) -> &M {
        &self.inner.view
    }

    pub fn values(&self) -> &SharedFieldValues {
        self.inner.view.values()
    }

    /// Writes a field's edited value, then re-validates. Returns the new validity.
    pub fn set(&self, field: &str, value: impl Into<FieldValue>) -> bool {
        self.values().set(field, value);
        self.validate()
    }

    /// Runs every rule and reports the aggregate result.
    pub fn validate(&self) -> bool {
        self.inner.validate()
    }

    pub fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }

    pub fn is_dirty(&self) -> bool {
        self.values().is_dirty()
    }

    pub fn is_clean(&self) -> bool {
        !self.is_dirty()
    }

    pub fn rule_count(&self) -> usize {
        self.inner.rules.len()
    }

    /// Messages from the last validation pass.
    pub fn messages(&self) -> Vec<String> {
        self.inner.current_sink().0.messages()
    }

    pub fn messages_for(&self, field: &str) -> Vec<String> {
        self.inner.current_sink().0.messages_for(field)
    }

    pub fn validation_context(&self) -> Option<Arc<dyn ValidationContext>> {
        lock(&self.inner.binding).as_ref().map(|b| b.context.clone())
    }

    /// Subscribes to context swaps, so field listeners can be moved to the new context.
    pub fn on_context_changed(&self, handler: ContextChangedHandler) {
        lock(&self.inner.context_listeners).push(handler);
    }

    /// Binds to a new validation context.
    ///
    /// Unsubscribes from the previous context, hands the new context a fresh sink,
    /// subscribes to its validation requests, validates once, and then raises the
    /// context-changed notification with the old and new contexts.
    #[instrument(skip_all, fields(context = %context.id()))]
    pub fn attach_validation_context(&self, context: Arc<dyn ValidationContext>) {
        let previous = lock(&self.inner.binding).take();
        if let Some(old) = &previous {
            old.context.remove_validation_handler(old.subscription);
            old.context.detach(&old.sink);
        }

        let sink = MessageSink::new();
        context.attach(sink.clone());
        let weak = Arc::downgrade(&self.inner);
        let subscription = context.on_validation_requested(Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.validate();
            }
        }));
        *lock(&self.inner.binding) = Some(ContextBinding {
            context: context.clone(),
            sink,
            subscription,
        });
        debug!(replaced = previous.is_some(), "Validation context attached");

        self.validate();

        let change = ContextChange {
            previous: previous.map(|b| b.context),
            current: context,
        };
        let listeners = lock(&self.inner.context_listeners).clone();
        for listener in listeners {
            listener(&change);
        }
    }
}

impl<M: FieldView> Deref for EditProjection<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.inner.view
    }
}

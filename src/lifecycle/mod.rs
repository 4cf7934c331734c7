//! # System Lifecycle
//!
//! Starting, observing and stopping a hosted controller.
//!
//! ## The ControllerSystem Pattern
//!
//! [`ControllerSystem`] spawns a [`ControllerActor`](crate::framework::ControllerActor)
//! and keeps its join handle:
//!
//! ```rust,ignore
//! let (actor, client) = ControllerActor::new(service, config);
//! let events = actor.events().clone();
//! let handle = tokio::spawn(actor.run());
//! ```
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop the client** - Closes the sender side of the channel
//! 2. **Actor detects closure** - `receiver.recv()` returns `None` once queued requests
//!    are handled
//! 3. **Await completion** - A panicked actor task surfaces as
//!    [`RecordError::TaskFailed`](crate::framework::RecordError::TaskFailed)
//!
//! ## Observability
//!
//! [`setup_tracing`] installs the subscriber the binary uses. See the [`tracing`] module.

pub mod system;
pub mod tracing;

pub use self::system::ControllerSystem;
pub use self::tracing::setup_tracing;

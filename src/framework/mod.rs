//! Building blocks shared by every controller.
//!
//! # Main Components
//!
//! - [`DbRecord`] - Trait that record types implement to be managed by the controllers
//! - [`DataService`] - The persistence contract, with [`InMemoryDataService`] as a
//!   complete implementation
//! - [`ControllerActor`] / [`ControllerClient`] - Hosts a controller service in its own
//!   task behind a cloneable async handle
//! - [`EventBus`] - Per-controller change notifications
//! - [`RecordError`] / [`DataError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] module for a scripted data service that checks how the controllers call it.

mod actor;
mod client;
mod entity;
mod error;
mod events;
mod memory;
mod message;
pub mod mock;
mod service;

pub use actor::ControllerActor;
pub use client::ControllerClient;
pub use entity::{ColumnAccessor, ColumnMap, DbRecord, RecordInfo, NEW_RECORD_ID, NO_RECORD_ID};
pub use error::{DataError, RecordError};
pub use events::{ControllerEvent, EventBus};
pub use memory::InMemoryDataService;
pub use message::{ControllerRequest, Response};
pub use mock::MockDataService;
pub use service::{DataService, MessageKind, TaskResult};

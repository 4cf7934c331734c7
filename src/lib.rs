//! # Record Controller
//!
//! > **State controllers for record editing and paged record lists.**
//!
//! This crate holds the state a data-entry screen needs between the UI and a data store:
//! the current record and its edits, validation of those edits, a filtered and sorted
//! list of records, and the pager over that list.
//!
//! ## 🏗️ Design Philosophy
//!
//! - **Controllers own state, services own persistence.** Everything the controllers know
//!   about storage goes through the [`DataService`](framework::DataService) trait.
//! - **Edits are shared, not copied.** Edit projections write straight into the record
//!   controller's field store, so the dirty flag is always current.
//! - **Failures the user can fix are data.** A rejected save comes back as a
//!   [`TaskResult`](framework::TaskResult); only configuration and transport problems are
//!   `Err`.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. Field State ([`values`])
//! Typed field values and the original/edited store behind every edit session.
//! - **Key items**: [`FieldValue`](values::FieldValue),
//!   [`FieldValueStore`](values::FieldValueStore),
//!   [`SharedFieldValues`](values::SharedFieldValues).
//!
//! ### 2. Editing ([`edit`])
//! Typed, validating views over a store, and the host contexts they report to.
//! - **Key items**: [`EditProjection`](edit::EditProjection),
//!   [`FieldView`](edit::FieldView), [`Validation`](edit::Validation).
//!
//! ### 3. Controllers ([`controller`])
//! - **Role**: Record loading and saving, list filtering, sorting and pagination.
//! - **Key items**: [`RecordController`](controller::RecordController),
//!   [`ListController`](controller::ListController),
//!   [`ControllerService`](controller::ControllerService).
//!
//! ### 4. The Engine ([`framework`])
//! The record contract, the data service contract, events, errors, and an actor that
//! hosts a controller service behind a cloneable client.
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! Starts and stops a hosted controller and sets up tracing.
//! - **Key items**: [`ControllerSystem`](lifecycle::ControllerSystem).
//!
//! ### 6. A Record Type ([`weather`])
//! Weather stations with their validation rules, used by the demo and the tests.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo with info logs
//! RUST_LOG=info cargo run
//!
//! # Paging and validation detail
//! RUST_LOG=debug cargo run -- controller.toml
//! ```
//!
//! ## 🧪 Testing
//!
//! See the [`framework::mock`] module for a scripted data service that checks exactly how
//! the controllers call the store.

pub mod config;
pub mod controller;
pub mod edit;
pub mod framework;
pub mod lifecycle;
pub mod values;
pub mod weather;

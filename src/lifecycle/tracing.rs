//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate. The level
//! comes from `RUST_LOG`, and the compact format hides module paths: every controller log
//! line carries a `record_type` field instead.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle, saves and deletes
//! RUST_LOG=info cargo run
//!
//! # Every request, fetch and page move
//! RUST_LOG=debug cargo run
//!
//! # Also every emitted event
//! RUST_LOG=trace cargo run
//!
//! # Only the list controller
//! RUST_LOG=record_controller::controller=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: `Controller started`, `Shutdown`
//! - **Record operations**: `Saved id=3 created=true`, `Deleted`, not-found fallbacks
//! - **List operations**: fetch counts before and after in-memory filtering, page moves,
//!   sort changes
//! - **Validation**: rule counts and failures per pass, blocked saves
//!
//! With `RUST_LOG=debug` a save of a new station reads:
//!
//! ```text
//! DEBUG Save record=None
//! INFO save: Created record_type="WeatherStation" id=3 size=3
//! INFO save: Saved id=3 created=true
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // record_type replaces the module path
        .compact()
        .init();
}

//! Handler dispatch and change application.
//!
//! This module turns a computed change set into applied results: one
//! handler per operation, a dry-run short-circuit, and per-change outcome
//! aggregation.

mod engine;
mod handler;

pub use engine::ChangeExecutor;
pub use handler::{ChangeHandler, NoopChangeHandler};

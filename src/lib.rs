// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Converge
//!
//! A declarative change computation and execution engine for reconciling
//! desired and actual resource state across pluggable backends.
//!
//! ## Overview
//!
//! Converge is the control-loop core beneath an infrastructure-as-code tool:
//!
//! - Compute the minimal typed change set (create/update/delete/none) that
//!   converges observed state towards a desired configuration
//! - Apply those changes through one pluggable handler per operation
//! - Track per-change success and failure without letting one failure abort
//!   its siblings
//! - Preview everything first with a side-effect-free dry-run
//!
//! Resource loading, templating, scheduling and the concrete backend clients
//! are external collaborators; this crate is an in-process computation and
//! dispatch library.
//!
//! ## Architecture
//!
//! A reconciliation pass flows leaf to root:
//!
//! 1. **Diff**: a [`diff::ChangeComputer`] keys and compares both resource
//!    collections, emitting one [`change::ResourceChange`] per classified key
//! 2. **Filter**: [`change::ResourceChangeFilter`] narrows the set to the
//!    operations of interest
//! 3. **Execute**: the [`executor::ChangeExecutor`] dispatches each
//!    operation group to its handler and settles the asynchronous outcomes
//!    into [`change::ChangeResult`]s
//!
//! ## Modules
//!
//! - [`change`]: The typed change data model and execution outcomes
//! - [`diff`]: Generic collection and field-level diff engines
//! - [`executor`]: Handler dispatch, dry-run and outcome aggregation
//! - [`selector`]: Expression-based resource selection
//! - [`context`]: Per-run settings such as dry-run and orphan deletion
//! - [`error`]: The error hierarchy
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use converge::executor::{ChangeExecutor, ChangeHandler, NoopChangeHandler};
//!
//! # async fn demo() -> converge::Result<()> {
//! let handlers: Vec<Arc<dyn ChangeHandler>> = vec![Arc::new(NoopChangeHandler::new())];
//! let executor = ChangeExecutor::new(handlers)?;
//!
//! // Dry-run: no handler side effect runs.
//! let results = executor.apply_changes(Vec::new(), true).await?;
//! assert!(results.is_empty());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod change;
pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod selector;

// ============================================================================
// Re-exports
// ============================================================================

pub use change::{
    ChangeError, ChangeFilter, ChangeMetadata, ChangeResponse, ChangeResult, ChangeStatus,
    Operation, ResourceChange, ResourceChangeFilter, ResourceChangeSpec, ResourceMetadata,
    StateChange, StateChangeList, TextDescription,
};
pub use context::ReconciliationContext;
pub use diff::{ChangeComputer, ChangeFactory, DiffOptions, FieldDiffer};
pub use error::{ConvergeError, Result};
pub use executor::{ChangeExecutor, ChangeHandler, NoopChangeHandler};
pub use selector::{AggregateSelector, ExpressionSelector, Selector, SelectorStrategy};

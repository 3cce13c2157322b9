//! Resource selectors.
//!
//! Selectors narrow which resources participate in a reconciliation pass.
//! Callers apply them to both the actual and the expected collection before
//! handing the survivors to a change computer.

mod combine;
mod expression;
mod selectable;

pub use combine::{matching, AggregateSelector, SelectorStrategy};
pub use expression::{ExpressionOperator, ExpressionSelector};
pub use selectable::{Selectable, Selector};

//! The typed change data model.
//!
//! Immutable value types describing how resources and their fields move
//! from actual to expected state, plus the outcome types produced when those
//! changes are applied.

mod filter;
mod operation;
mod resource;
mod result;
mod state;

pub use filter::{ChangeFilter, ResourceChangeFilter};
pub use operation::Operation;
pub use resource::{ResourceChange, ResourceChangeSpec, ResourceMetadata};
pub use result::{
    ChangeError, ChangeMetadata, ChangeResponse, ChangeResult, ChangeStatus, TextDescription,
};
pub use state::{StateChange, StateChangeList};

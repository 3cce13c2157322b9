//! Diff engines for comparing desired and observed resource collections.
//!
//! This module computes the typed change set needed to converge the
//! observed state of a backend towards the desired configuration.

mod compare;
mod computer;
mod fields;

pub use compare::{SentinelComparator, StrictComparator, ValueComparator};
pub use computer::{
    ChangeComputer, ChangeFactory, DiffOptions, DELETE_ORPHANS_OPTION,
    DELETE_ORPHAN_FIELDS_OPTION,
};
pub use fields::FieldDiffer;

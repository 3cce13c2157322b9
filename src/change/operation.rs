//! The coarse change verdict for a resource or field.

use serde::{Deserialize, Serialize};

/// The kind of action needed to converge one resource or field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// The resource already matches its desired state.
    #[default]
    None,
    /// The resource needs to be created.
    Create,
    /// The resource needs to be deleted.
    Delete,
    /// The resource needs to be updated.
    Update,
}

impl Operation {
    /// Merges a collection of operations into a single verdict.
    ///
    /// An empty collection, or one holding only [`Operation::None`], merges
    /// to `None`. A collection where every operation is equal merges to that
    /// operation. Any mix of differing operations collapses to
    /// [`Operation::Update`]. This is how a resource-level operation is
    /// derived from its field-level operations.
    #[must_use]
    pub fn merge<I>(operations: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut merged: Option<Self> = None;
        for operation in operations {
            match merged {
                None => merged = Some(operation),
                Some(current) if current == operation => {}
                Some(_) => return Self::Update,
            }
        }
        merged.unwrap_or(Self::None)
    }

    /// Returns true if this operation requires no action.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::None => "NONE",
            Self::Create => "CREATE",
            Self::Delete => "DELETE",
            Self::Update => "UPDATE",
        };
        write!(f, "{s}")
    }
}

//! Predicates narrowing a change set to operations of interest.
//!
//! Used for plan previews and selective apply: a caller keeps only the
//! operations it cares about without losing the surrounding resources.

use std::collections::HashSet;

use super::operation::Operation;
use super::resource::ResourceChange;
use super::state::StateChangeList;

/// A predicate over operations.
///
/// An empty operation set matches everything; a non-empty set lets only the
/// listed operations pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeFilter {
    operations: HashSet<Operation>,
}

impl ChangeFilter {
    /// Creates a filter that keeps only the given operations.
    ///
    /// Passing no operations produces a filter that matches everything.
    #[must_use]
    pub fn keeping<I>(operations: I) -> Self
    where
        I: IntoIterator<Item = Operation>,
    {
        Self {
            operations: operations.into_iter().collect(),
        }
    }

    /// Returns true if the given operation passes the filter.
    #[must_use]
    pub fn matches(&self, operation: Operation) -> bool {
        self.operations.is_empty() || self.operations.contains(&operation)
    }
}

/// Narrows resource changes and their field-level change lists.
///
/// A resource passes when its effective operation passes the inner filter;
/// the kept resource is re-emitted with its [`StateChangeList`] narrowed to
/// the matching field-level changes, so a "changes of interest only" view
/// never discards the resource itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceChangeFilter {
    filter: ChangeFilter,
}

impl ResourceChangeFilter {
    /// Creates a resource filter from an operation predicate.
    #[must_use]
    pub const fn new(filter: ChangeFilter) -> Self {
        Self { filter }
    }

    /// Creates a resource filter keeping only the given operations.
    #[must_use]
    pub fn keeping<I>(operations: I) -> Self
    where
        I: IntoIterator<Item = Operation>,
    {
        Self::new(ChangeFilter::keeping(operations))
    }

    /// Returns a copy of the change with its field-level list narrowed to
    /// the operations of interest.
    #[must_use]
    pub fn narrow(&self, change: &ResourceChange) -> ResourceChange {
        let narrowed: StateChangeList = change
            .spec()
            .changes()
            .iter()
            .filter(|c| self.filter.matches(c.operation()))
            .cloned()
            .collect();
        change.with_spec_changes(narrowed)
    }

    /// Applies the filter to a whole change set.
    ///
    /// Resources whose effective operation does not pass are dropped; kept
    /// resources are narrowed via [`ResourceChangeFilter::narrow`].
    #[must_use]
    pub fn apply(&self, changes: &[ResourceChange]) -> Vec<ResourceChange> {
        changes
            .iter()
            .filter(|change| self.filter.matches(change.operation()))
            .map(|change| self.narrow(change))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{ResourceChangeSpec, ResourceMetadata, StateChange};
    use serde_json::json;

    fn update_change(name: &str) -> ResourceChange {
        let fields = vec![
            StateChange::computed("same", Some(json!(1)), Some(json!(1))),
            StateChange::computed("edited", Some(json!(1)), Some(json!(2))),
        ];
        ResourceChange::new(
            "core/v1",
            "Topic",
            ResourceMetadata::new(name),
            ResourceChangeSpec::new(fields.into()),
        )
    }

    fn none_change(name: &str) -> ResourceChange {
        ResourceChange::new(
            "core/v1",
            "Topic",
            ResourceMetadata::new(name),
            ResourceChangeSpec::new(StateChangeList::new()),
        )
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = ChangeFilter::keeping([]);
        assert!(filter.matches(Operation::None));
        assert!(filter.matches(Operation::Create));
        assert!(filter.matches(Operation::Delete));
        assert!(filter.matches(Operation::Update));
    }

    #[test]
    fn test_non_empty_filter_passes_only_listed_operations() {
        let filter = ChangeFilter::keeping([Operation::Create, Operation::Delete]);
        assert!(filter.matches(Operation::Create));
        assert!(filter.matches(Operation::Delete));
        assert!(!filter.matches(Operation::Update));
        assert!(!filter.matches(Operation::None));
    }

    #[test]
    fn test_narrow_keeps_resource_with_reduced_field_list() {
        let filter = ResourceChangeFilter::keeping([Operation::Update]);
        let change = update_change("orders");

        let narrowed = filter.narrow(&change);
        assert_eq!(narrowed.name(), "orders");
        assert_eq!(narrowed.spec().changes().len(), 1);
        assert!(narrowed.spec().changes().first_named("edited").is_some());
        assert!(narrowed.spec().changes().first_named("same").is_none());
    }

    #[test]
    fn test_apply_drops_non_matching_resources() {
        let filter = ResourceChangeFilter::keeping([Operation::Update]);
        let changes = vec![update_change("orders"), none_change("payments")];

        let kept = filter.apply(&changes);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name(), "orders");
    }
}

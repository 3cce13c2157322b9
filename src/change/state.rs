//! Field-level state transitions.
//!
//! A [`StateChange`] describes how one named field moves from its actual
//! value to its expected value. A [`StateChangeList`] is the ordered set of
//! such transitions carried by a single resource change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diff::ValueComparator;

use super::operation::Operation;

/// One named field transition from a `before` value to an `after` value.
///
/// Instances are immutable; renaming goes through [`StateChange::with_name`],
/// which produces a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    /// Field name, unique within its parent list by convention.
    name: String,
    /// The verdict for this field.
    operation: Operation,
    /// Observed value, absent when the field does not exist yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    before: Option<Value>,
    /// Desired value, absent when the field is being removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    after: Option<Value>,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl StateChange {
    /// Creates a state change with an explicit operation.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        operation: Operation,
        before: Option<Value>,
        after: Option<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            operation,
            before,
            after,
            description: None,
        }
    }

    /// Creates a state change whose operation is derived from its values.
    ///
    /// Both values absent, or both present and structurally equal, derive
    /// `NONE`. Both present and unequal derive `UPDATE`. Only `after` present
    /// derives `CREATE`; only `before` present derives `DELETE`.
    #[must_use]
    pub fn computed(name: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        let operation = Self::derive_operation(before.as_ref(), after.as_ref(), &|b, a| b == a);
        Self::new(name, operation, before, after)
    }

    /// Creates a state change whose operation is derived using a pluggable
    /// equality comparator.
    ///
    /// The comparator only decides the present-and-equal case; presence and
    /// absence follow the same rules as [`StateChange::computed`].
    #[must_use]
    pub fn computed_with(
        name: impl Into<String>,
        before: Option<Value>,
        after: Option<Value>,
        comparator: &dyn ValueComparator,
    ) -> Self {
        let operation = Self::derive_operation(before.as_ref(), after.as_ref(), &|b, a| {
            comparator.equals(b, a)
        });
        Self::new(name, operation, before, after)
    }

    fn derive_operation(
        before: Option<&Value>,
        after: Option<&Value>,
        equals: &dyn Fn(&Value, &Value) -> bool,
    ) -> Operation {
        match (before, after) {
            (None, None) => Operation::None,
            (Some(b), Some(a)) if equals(b, a) => Operation::None,
            (Some(_), Some(_)) => Operation::Update,
            (None, Some(_)) => Operation::Create,
            (Some(_), None) => Operation::Delete,
        }
    }

    /// Returns a copy of this change under a new name.
    #[must_use]
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Attaches a human-readable description, consuming self.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The verdict for this field.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// The observed value, if any.
    #[must_use]
    pub const fn before(&self) -> Option<&Value> {
        self.before.as_ref()
    }

    /// The desired value, if any.
    #[must_use]
    pub const fn after(&self) -> Option<&Value> {
        self.after.as_ref()
    }

    /// The human-readable description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl std::fmt::Display for StateChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.operation)
    }
}

/// An ordered, insertion-order-preserving sequence of [`StateChange`]s.
///
/// Built once per resource change; filters produce a new list rather than
/// mutating in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateChangeList {
    changes: Vec<StateChange>,
}

impl StateChangeList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { changes: Vec::new() }
    }

    /// Appends a change, preserving insertion order.
    pub fn push(&mut self, change: StateChange) {
        self.changes.push(change);
    }

    /// Returns the number of changes in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns true if the list holds no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Iterates over the changes in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, StateChange> {
        self.changes.iter()
    }

    /// Returns the first change with the given name.
    #[must_use]
    pub fn first_named(&self, name: &str) -> Option<&StateChange> {
        self.changes.iter().find(|c| c.name() == name)
    }

    /// Returns the last change with the given name.
    #[must_use]
    pub fn last_named(&self, name: &str) -> Option<&StateChange> {
        self.changes.iter().rev().find(|c| c.name() == name)
    }

    /// Returns a new list holding only changes whose name starts with the
    /// given prefix.
    ///
    /// When `strip` is set, the prefix is removed from the names of the
    /// returned changes.
    #[must_use]
    pub fn matching_prefix(&self, prefix: &str, strip: bool) -> Self {
        let changes = self
            .changes
            .iter()
            .filter_map(|change| {
                let rest = change.name().strip_prefix(prefix)?;
                if strip {
                    Some(change.with_name(rest))
                } else {
                    Some(change.clone())
                }
            })
            .collect();
        Self { changes }
    }

    /// Groups the changes by name, preserving insertion order within each
    /// group.
    #[must_use]
    pub fn group_by_name(&self) -> HashMap<&str, Vec<&StateChange>> {
        let mut groups: HashMap<&str, Vec<&StateChange>> = HashMap::new();
        for change in &self.changes {
            groups.entry(change.name()).or_default().push(change);
        }
        groups
    }

    /// Derives the resource-level operation from the field-level operations
    /// using the merge rule of [`Operation::merge`].
    #[must_use]
    pub fn merged_operation(&self) -> Operation {
        Operation::merge(self.changes.iter().map(StateChange::operation))
    }
}

impl From<Vec<StateChange>> for StateChangeList {
    fn from(changes: Vec<StateChange>) -> Self {
        Self { changes }
    }
}

impl FromIterator<StateChange> for StateChangeList {
    fn from_iter<I: IntoIterator<Item = StateChange>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for StateChangeList {
    type Item = StateChange;
    type IntoIter = std::vec::IntoIter<StateChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a StateChangeList {
    type Item = &'a StateChange;
    type IntoIter = std::slice::Iter<'a, StateChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derivation_both_absent_is_none() {
        let change = StateChange::computed("f", None, None);
        assert_eq!(change.operation(), Operation::None);
    }

    #[test]
    fn test_derivation_equal_values_is_none() {
        let change = StateChange::computed("f", Some(json!("x")), Some(json!("x")));
        assert_eq!(change.operation(), Operation::None);
    }

    #[test]
    fn test_derivation_unequal_values_is_update() {
        let change = StateChange::computed("f", Some(json!("x")), Some(json!("y")));
        assert_eq!(change.operation(), Operation::Update);
    }

    #[test]
    fn test_derivation_only_after_is_create() {
        let change = StateChange::computed("f", None, Some(json!("y")));
        assert_eq!(change.operation(), Operation::Create);
    }

    #[test]
    fn test_derivation_only_before_is_delete() {
        let change = StateChange::computed("f", Some(json!("x")), None);
        assert_eq!(change.operation(), Operation::Delete);
    }

    #[test]
    fn test_with_name_produces_copy() {
        let change = StateChange::computed("old", None, Some(json!(1)));
        let renamed = change.with_name("new");
        assert_eq!(change.name(), "old");
        assert_eq!(renamed.name(), "new");
        assert_eq!(renamed.operation(), change.operation());
    }

    #[test]
    fn test_first_and_last_named() {
        let list: StateChangeList = vec![
            StateChange::computed("a", None, Some(json!(1))),
            StateChange::computed("b", None, Some(json!(2))),
            StateChange::computed("a", Some(json!(1)), None),
        ]
        .into();

        assert_eq!(
            list.first_named("a").map(StateChange::operation),
            Some(Operation::Create)
        );
        assert_eq!(
            list.last_named("a").map(StateChange::operation),
            Some(Operation::Delete)
        );
        assert!(list.first_named("missing").is_none());
    }

    #[test]
    fn test_matching_prefix_strips_names() {
        let list: StateChangeList = vec![
            StateChange::computed("config.retention", None, Some(json!(100))),
            StateChange::computed("config.cleanup", None, Some(json!("compact"))),
            StateChange::computed("partitions", None, Some(json!(3))),
        ]
        .into();

        let stripped = list.matching_prefix("config.", true);
        assert_eq!(stripped.len(), 2);
        assert!(stripped.first_named("retention").is_some());
        assert!(stripped.first_named("cleanup").is_some());

        let kept = list.matching_prefix("config.", false);
        assert!(kept.first_named("config.retention").is_some());
    }

    #[test]
    fn test_group_by_name() {
        let list: StateChangeList = vec![
            StateChange::computed("a", None, Some(json!(1))),
            StateChange::computed("a", Some(json!(1)), None),
            StateChange::computed("b", None, None),
        ]
        .into();

        let groups = list.group_by_name();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["a"].len(), 2);
        assert_eq!(groups["b"].len(), 1);
    }

    #[test]
    fn test_merged_operation_over_fields() {
        let list: StateChangeList = vec![
            StateChange::computed("a", Some(json!(1)), Some(json!(1))),
            StateChange::computed("b", Some(json!(1)), Some(json!(2))),
        ]
        .into();
        assert_eq!(list.merged_operation(), Operation::Update);

        let empty = StateChangeList::new();
        assert_eq!(empty.merged_operation(), Operation::None);
    }
}

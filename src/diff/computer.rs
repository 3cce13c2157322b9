//! The generic two-collection diff algorithm.
//!
//! Every concrete resource kind instantiates the same pattern: map each
//! resource to an identity key and a comparable value, classify each key as
//! create/update/delete/none, and optionally treat unmatched observed-only
//! keys as deletable orphans.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use tracing::debug;

use crate::change::ResourceChange;
use crate::context::ReconciliationContext;
use crate::error::{ConfigError, Result};

/// Context option enabling deletion of orphaned resources.
pub const DELETE_ORPHANS_OPTION: &str = "delete-orphans";

/// Context option enabling deletion of orphaned fields inside a resource.
pub const DELETE_ORPHAN_FIELDS_OPTION: &str = "delete-orphan-fields";

/// Orphan-handling switches for one diff run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Whether observed resources absent from the desired set are deleted.
    pub delete_orphans: bool,
    /// Whether observed-only fields inside a resource are deleted.
    pub delete_orphan_fields: bool,
}

impl DiffOptions {
    /// Reads the orphan-handling options from a reconciliation context.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when an option is present but not a
    /// boolean.
    pub fn from_context(context: &ReconciliationContext) -> Result<Self> {
        Ok(Self {
            delete_orphans: read_bool(context, DELETE_ORPHANS_OPTION)?,
            delete_orphan_fields: read_bool(context, DELETE_ORPHAN_FIELDS_OPTION)?,
        })
    }

    /// Sets whether orphaned resources are deleted, consuming self.
    #[must_use]
    pub const fn with_delete_orphans(mut self, delete_orphans: bool) -> Self {
        self.delete_orphans = delete_orphans;
        self
    }

    /// Sets whether orphaned fields are deleted, consuming self.
    #[must_use]
    pub const fn with_delete_orphan_fields(mut self, delete_orphan_fields: bool) -> Self {
        self.delete_orphan_fields = delete_orphan_fields;
        self
    }
}

fn read_bool(context: &ReconciliationContext, key: &str) -> Result<bool> {
    match context.option(key) {
        None => Ok(false),
        Some(value) => value.as_bool().ok_or_else(|| {
            ConfigError::invalid_option(key, format!("expected a boolean, got {value}")).into()
        }),
    }
}

/// Builds concrete [`ResourceChange`]s for one resource kind.
///
/// The computer decides *which* of these to call for every key; the factory
/// decides what the resulting change looks like, typically running a
/// [`super::FieldDiffer`] for resources present on both sides.
pub trait ChangeFactory<K, V>: Send + Sync {
    /// Change for a resource present only in the desired collection.
    fn for_create(&self, key: &K, expected: &V) -> ResourceChange;

    /// Change for a resource that is being removed from the managed system.
    fn for_delete(&self, key: &K, actual: &V) -> ResourceChange;

    /// Change for a resource present on both sides.
    ///
    /// The returned change carries `Operation::Update` when any field
    /// differs and `Operation::None` otherwise; implementations set the
    /// operation explicitly rather than relying on the merge rule, since a
    /// list holding only field deletions still updates the parent resource.
    fn for_existing(&self, key: &K, actual: &V, expected: &V) -> ResourceChange;
}

/// Generic diff engine turning two resource collections into a change set.
///
/// `R` is the caller's resource representation, `K` the identity key, `V`
/// the comparable value handed to the [`ChangeFactory`].
pub struct ChangeComputer<R, K, V> {
    key_mapper: Box<dyn Fn(&R) -> K + Send + Sync>,
    value_mapper: Box<dyn Fn(&R) -> V + Send + Sync>,
    deletion_mark: Box<dyn Fn(&R) -> bool + Send + Sync>,
    factory: Box<dyn ChangeFactory<K, V>>,
    delete_orphans: bool,
}

impl<R, K, V> ChangeComputer<R, K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a computer from its key mapper, value mapper and factory.
    ///
    /// No resource is considered marked for deletion and orphan deletion is
    /// disabled until configured otherwise.
    #[must_use]
    pub fn new(
        key_mapper: impl Fn(&R) -> K + Send + Sync + 'static,
        value_mapper: impl Fn(&R) -> V + Send + Sync + 'static,
        factory: impl ChangeFactory<K, V> + 'static,
    ) -> Self {
        Self {
            key_mapper: Box::new(key_mapper),
            value_mapper: Box::new(value_mapper),
            deletion_mark: Box::new(|_| false),
            factory: Box::new(factory),
            delete_orphans: false,
        }
    }

    /// Sets the predicate recognizing desired resources marked for deletion.
    #[must_use]
    pub fn with_deletion_mark(
        mut self,
        deletion_mark: impl Fn(&R) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.deletion_mark = Box::new(deletion_mark);
        self
    }

    /// Sets whether observed resources absent from the desired collection
    /// are emitted as deletions.
    #[must_use]
    pub fn with_delete_orphans(mut self, delete_orphans: bool) -> Self {
        self.delete_orphans = delete_orphans;
        self
    }

    /// Computes the change set converging `actual` towards `expected`.
    ///
    /// Desired resources marked for deletion produce a DELETE when their
    /// observed counterpart exists and nothing at all when it does not;
    /// orphans are reported only when orphan deletion is enabled. A resource
    /// present in neither collection never appears.
    #[must_use]
    pub fn compute_changes(&self, actual: &[R], expected: &[R]) -> Vec<ResourceChange> {
        let actual_by_key: HashMap<K, V> = actual
            .iter()
            .map(|r| ((self.key_mapper)(r), (self.value_mapper)(r)))
            .collect();

        let mut seen: HashSet<K> = HashSet::with_capacity(expected.len());
        let mut changes = Vec::new();

        for resource in expected {
            let key = (self.key_mapper)(resource);

            if (self.deletion_mark)(resource) {
                if let Some(before) = actual_by_key.get(&key) {
                    changes.push(self.factory.for_delete(&key, before));
                }
                // deleting a resource that does not exist is a no-op
                seen.insert(key);
                continue;
            }

            let value = (self.value_mapper)(resource);
            match actual_by_key.get(&key) {
                Some(before) => changes.push(self.factory.for_existing(&key, before, &value)),
                None => changes.push(self.factory.for_create(&key, &value)),
            }
            seen.insert(key);
        }

        if self.delete_orphans {
            for resource in actual {
                let key = (self.key_mapper)(resource);
                if !seen.contains(&key) {
                    debug!("Deleting orphaned resource");
                    changes.push(self.factory.for_delete(&key, &(self.value_mapper)(resource)));
                }
            }
        }

        changes
    }
}

impl<R, K, V> std::fmt::Debug for ChangeComputer<R, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeComputer")
            .field("delete_orphans", &self.delete_orphans)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{
        Operation, ResourceChangeSpec, ResourceMetadata, StateChange, StateChangeList,
    };
    use crate::diff::FieldDiffer;
    use serde_json::{json, Map, Value};

    /// Minimal stand-in for a backend resource with structured fields.
    #[derive(Debug, Clone)]
    struct FakeResource {
        name: String,
        fields: Map<String, Value>,
        marked_for_deletion: bool,
    }

    impl FakeResource {
        fn new(name: &str, fields: &[(&str, Value)]) -> Self {
            Self {
                name: name.to_string(),
                fields: fields
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), v.clone()))
                    .collect(),
                marked_for_deletion: false,
            }
        }

        fn deleted(mut self) -> Self {
            self.marked_for_deletion = true;
            self
        }
    }

    struct FakeFactory {
        differ: FieldDiffer,
    }

    impl FakeFactory {
        fn new() -> Self {
            Self {
                differ: FieldDiffer::new(),
            }
        }

        fn metadata(key: &String) -> ResourceMetadata {
            ResourceMetadata::new(key.clone())
        }
    }

    impl ChangeFactory<String, Map<String, Value>> for FakeFactory {
        fn for_create(&self, key: &String, expected: &Map<String, Value>) -> ResourceChange {
            let changes: StateChangeList = expected
                .iter()
                .map(|(name, value)| StateChange::computed(name.clone(), None, Some(value.clone())))
                .collect();
            ResourceChange::new(
                "core/v1",
                "Fake",
                Self::metadata(key),
                ResourceChangeSpec::new(changes).with_operation(Operation::Create),
            )
        }

        fn for_delete(&self, key: &String, actual: &Map<String, Value>) -> ResourceChange {
            let changes: StateChangeList = actual
                .iter()
                .map(|(name, value)| StateChange::computed(name.clone(), Some(value.clone()), None))
                .collect();
            ResourceChange::new(
                "core/v1",
                "Fake",
                Self::metadata(key),
                ResourceChangeSpec::new(changes).with_operation(Operation::Delete),
            )
        }

        fn for_existing(
            &self,
            key: &String,
            actual: &Map<String, Value>,
            expected: &Map<String, Value>,
        ) -> ResourceChange {
            let changes = self.differ.diff(actual, expected);
            let operation = if changes.iter().any(|c| !c.operation().is_none()) {
                Operation::Update
            } else {
                Operation::None
            };
            ResourceChange::new(
                "core/v1",
                "Fake",
                Self::metadata(key),
                ResourceChangeSpec::new(changes).with_operation(operation),
            )
        }
    }

    fn computer() -> ChangeComputer<FakeResource, String, Map<String, Value>> {
        ChangeComputer::new(
            |r: &FakeResource| r.name.clone(),
            |r: &FakeResource| r.fields.clone(),
            FakeFactory::new(),
        )
        .with_deletion_mark(|r: &FakeResource| r.marked_for_deletion)
    }

    fn operations_by_name(changes: &[ResourceChange]) -> Vec<(String, Operation)> {
        changes
            .iter()
            .map(|c| (c.name().to_string(), c.operation()))
            .collect()
    }

    #[test]
    fn test_create_for_missing_resource() {
        let expected = vec![FakeResource::new("a", &[("p", json!(1))])];
        let changes = computer().compute_changes(&[], &expected);

        assert_eq!(
            operations_by_name(&changes),
            vec![(String::from("a"), Operation::Create)]
        );
    }

    #[test]
    fn test_orphan_dropped_when_deletion_disabled() {
        let actual = vec![
            FakeResource::new("a", &[("p", json!(1))]),
            FakeResource::new("b", &[("p", json!(2))]),
        ];
        let expected = vec![FakeResource::new("a", &[("p", json!(1))])];

        let changes = computer().compute_changes(&actual, &expected);
        assert_eq!(
            operations_by_name(&changes),
            vec![(String::from("a"), Operation::None)]
        );
    }

    #[test]
    fn test_orphan_deleted_when_deletion_enabled() {
        let actual = vec![
            FakeResource::new("a", &[("p", json!(1))]),
            FakeResource::new("b", &[("p", json!(2))]),
        ];
        let expected = vec![FakeResource::new("a", &[("p", json!(1))])];

        let changes = computer()
            .with_delete_orphans(true)
            .compute_changes(&actual, &expected);

        assert_eq!(
            operations_by_name(&changes),
            vec![
                (String::from("a"), Operation::None),
                (String::from("b"), Operation::Delete),
            ]
        );
    }

    #[test]
    fn test_update_for_differing_resource() {
        let actual = vec![FakeResource::new("a", &[("p", json!(1))])];
        let expected = vec![FakeResource::new("a", &[("p", json!(2))])];

        let changes = computer().compute_changes(&actual, &expected);
        assert_eq!(
            operations_by_name(&changes),
            vec![(String::from("a"), Operation::Update)]
        );
    }

    #[test]
    fn test_deletion_mark_with_existing_resource() {
        let actual = vec![FakeResource::new("a", &[("p", json!(1))])];
        let expected = vec![FakeResource::new("a", &[("p", json!(1))]).deleted()];

        let changes = computer().compute_changes(&actual, &expected);
        assert_eq!(
            operations_by_name(&changes),
            vec![(String::from("a"), Operation::Delete)]
        );
    }

    #[test]
    fn test_deletion_mark_without_existing_resource_is_silent() {
        let expected = vec![FakeResource::new("a", &[("p", json!(1))]).deleted()];
        let changes = computer().compute_changes(&[], &expected);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_marked_resource_not_double_deleted_as_orphan() {
        let actual = vec![FakeResource::new("a", &[("p", json!(1))])];
        let expected = vec![FakeResource::new("a", &[("p", json!(1))]).deleted()];

        let changes = computer()
            .with_delete_orphans(true)
            .compute_changes(&actual, &expected);
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn test_orphan_field_rolls_up_to_resource_operation() {
        let actual = vec![FakeResource::new("a", &[("p", json!("orphan"))])];
        let expected = vec![FakeResource::new("a", &[])];

        let disabled = computer().compute_changes(&actual, &expected);
        assert_eq!(
            operations_by_name(&disabled),
            vec![(String::from("a"), Operation::None)]
        );

        let enabled = ChangeComputer::new(
            |r: &FakeResource| r.name.clone(),
            |r: &FakeResource| r.fields.clone(),
            FakeFactory {
                differ: FieldDiffer::new().with_delete_orphans(true),
            },
        )
        .compute_changes(&actual, &expected);

        assert_eq!(
            operations_by_name(&enabled),
            vec![(String::from("a"), Operation::Update)]
        );
        let field = enabled[0].spec().changes().first_named("p").unwrap();
        assert_eq!(field.operation(), Operation::Delete);
        assert!(field.after().is_none());
    }

    #[test]
    fn test_options_from_context() {
        let context = ReconciliationContext::new(false)
            .with_option(DELETE_ORPHANS_OPTION, true)
            .with_option(DELETE_ORPHAN_FIELDS_OPTION, false);

        let options = DiffOptions::from_context(&context).unwrap();
        assert!(options.delete_orphans);
        assert!(!options.delete_orphan_fields);
    }

    #[test]
    fn test_options_reject_non_boolean_value() {
        let context =
            ReconciliationContext::new(false).with_option(DELETE_ORPHANS_OPTION, "always");

        let result = DiffOptions::from_context(&context);
        assert!(result.is_err());
    }
}

//! Resource-level change types.
//!
//! A [`ResourceChange`] is the unit that flows from the diff algorithm
//! through filtering into execution. It pairs a resource identity with a
//! [`ResourceChangeSpec`] describing what has to happen to converge it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::operation::Operation;
use super::state::StateChangeList;

/// Identity metadata for a changed resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    /// Resource name, unique per kind within one reconciliation.
    name: String,
    /// Free-form labels attached to the resource.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    labels: HashMap<String, String>,
    /// Free-form annotations attached to the resource.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    annotations: HashMap<String, String>,
}

impl ResourceMetadata {
    /// Creates metadata for a named resource.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: HashMap::new(),
            annotations: HashMap::new(),
        }
    }

    /// Attaches a label, consuming self.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Attaches an annotation, consuming self.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// The resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All labels.
    #[must_use]
    pub const fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }

    /// All annotations.
    #[must_use]
    pub const fn annotations(&self) -> &HashMap<String, String> {
        &self.annotations
    }

    /// Looks up a single label value.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Looks up a single annotation value.
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}

/// The change payload carried by one resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceChangeSpec {
    /// Explicit operation; when absent the operation is derived from the
    /// field-level changes via the merge rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operation: Option<Operation>,
    /// Opaque backend-specific payload a handler may need.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    /// Field-level changes.
    changes: StateChangeList,
}

impl ResourceChangeSpec {
    /// Creates a spec whose operation is derived from the given changes.
    #[must_use]
    pub fn new(changes: StateChangeList) -> Self {
        Self {
            operation: None,
            data: None,
            changes,
        }
    }

    /// Pins the operation explicitly, consuming self.
    #[must_use]
    pub const fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Attaches an opaque backend payload, consuming self.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// The effective operation: the explicit one when set, otherwise the
    /// merge-rule result over the field-level changes.
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
            .unwrap_or_else(|| self.changes.merged_operation())
    }

    /// The opaque backend payload, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// The field-level changes.
    #[must_use]
    pub const fn changes(&self) -> &StateChangeList {
        &self.changes
    }

    /// Returns a copy of this spec with a replaced change list.
    ///
    /// The explicit operation, when set, is preserved.
    #[must_use]
    pub fn with_changes(&self, changes: StateChangeList) -> Self {
        Self {
            operation: self.operation,
            data: self.data.clone(),
            changes,
        }
    }
}

/// A typed, directional description of how one resource should move from
/// actual to expected state.
///
/// Created by a change computer, consumed by the change executor. Instances
/// are never mutated after creation; a filter replaces the change list by
/// producing a copy through [`ResourceChange::with_spec_changes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceChange {
    /// API version of the resource definition.
    #[serde(rename = "apiVersion")]
    api_version: String,
    /// Resource kind (e.g. a topic, an ACL binding, a quota).
    kind: String,
    /// Identity metadata.
    metadata: ResourceMetadata,
    /// The change payload.
    spec: ResourceChangeSpec,
}

impl ResourceChange {
    /// Creates a new resource change.
    #[must_use]
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        metadata: ResourceMetadata,
        spec: ResourceChangeSpec,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            metadata,
            spec,
        }
    }

    /// The API version.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// The resource kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The identity metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    /// The resource name, shorthand for `metadata().name()`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    /// The change payload.
    #[must_use]
    pub const fn spec(&self) -> &ResourceChangeSpec {
        &self.spec
    }

    /// The effective operation of this change.
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.spec.operation()
    }

    /// Returns a copy of this change with a replaced field-level change list.
    #[must_use]
    pub fn with_spec_changes(&self, changes: StateChangeList) -> Self {
        Self {
            api_version: self.api_version.clone(),
            kind: self.kind.clone(),
            metadata: self.metadata.clone(),
            spec: self.spec.with_changes(changes),
        }
    }
}

impl std::fmt::Display for ResourceChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}/{}",
            self.operation(),
            self.kind,
            self.metadata.name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::StateChange;
    use serde_json::json;

    fn change_with_fields(fields: Vec<StateChange>) -> ResourceChange {
        ResourceChange::new(
            "core/v1",
            "Topic",
            ResourceMetadata::new("orders"),
            ResourceChangeSpec::new(fields.into()),
        )
    }

    #[test]
    fn test_operation_derived_from_field_changes() {
        let change = change_with_fields(vec![
            StateChange::computed("a", Some(json!(1)), Some(json!(1))),
            StateChange::computed("b", Some(json!(1)), Some(json!(2))),
        ]);
        assert_eq!(change.operation(), Operation::Update);
    }

    #[test]
    fn test_explicit_operation_wins_over_derived() {
        let spec = ResourceChangeSpec::new(StateChangeList::new()).with_operation(Operation::Delete);
        let change = ResourceChange::new("core/v1", "Topic", ResourceMetadata::new("orders"), spec);
        assert_eq!(change.operation(), Operation::Delete);
    }

    #[test]
    fn test_with_spec_changes_produces_copy() {
        let original = change_with_fields(vec![StateChange::computed(
            "a",
            Some(json!(1)),
            Some(json!(2)),
        )]);
        let narrowed = original.with_spec_changes(StateChangeList::new());

        assert_eq!(original.spec().changes().len(), 1);
        assert!(narrowed.spec().changes().is_empty());
        assert_eq!(narrowed.name(), original.name());
    }

    #[test]
    fn test_metadata_labels_and_annotations() {
        let metadata = ResourceMetadata::new("orders")
            .with_label("team", "payments")
            .with_annotation("managed", "true");

        assert_eq!(metadata.label("team"), Some("payments"));
        assert_eq!(metadata.annotation("managed"), Some("true"));
        assert!(metadata.label("missing").is_none());
    }

    #[test]
    fn test_serialization_round_trip() {
        let change = change_with_fields(vec![StateChange::computed("a", None, Some(json!(1)))]);
        let json = serde_json::to_string(&change).unwrap();
        let back: ResourceChange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, change);
    }
}

//! Field-level diffing for structured payloads.
//!
//! Computes the [`StateChangeList`] between two maps of named fields, such
//! as the configuration entries of a topic or the limits of a quota.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};
use tracing::debug;

use crate::change::{StateChange, StateChangeList};

use super::compare::{StrictComparator, ValueComparator};

/// Diff engine for maps of named fields.
///
/// Field names are visited in sorted order so the produced list is
/// deterministic. Fields present only on the observed side are reported as
/// deletions only when orphan deletion is enabled; otherwise they are
/// omitted entirely, leaving the resource untouched.
pub struct FieldDiffer {
    /// Whether observed-only fields become DELETE changes.
    delete_orphans: bool,
    /// Equality used when no per-field override applies.
    comparator: Box<dyn ValueComparator>,
    /// Per-field-name comparator overrides.
    overrides: HashMap<String, Box<dyn ValueComparator>>,
}

impl FieldDiffer {
    /// Creates a differ with strict equality and orphan deletion disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            delete_orphans: false,
            comparator: Box::new(StrictComparator),
            overrides: HashMap::new(),
        }
    }

    /// Sets whether observed-only fields become DELETE changes.
    #[must_use]
    pub fn with_delete_orphans(mut self, delete_orphans: bool) -> Self {
        self.delete_orphans = delete_orphans;
        self
    }

    /// Replaces the default comparator.
    #[must_use]
    pub fn with_comparator(mut self, comparator: impl ValueComparator + 'static) -> Self {
        self.comparator = Box::new(comparator);
        self
    }

    /// Overrides the comparator for one field name.
    #[must_use]
    pub fn with_field_comparator(
        mut self,
        name: impl Into<String>,
        comparator: impl ValueComparator + 'static,
    ) -> Self {
        self.overrides.insert(name.into(), Box::new(comparator));
        self
    }

    /// Computes the field-level changes between an observed and a desired
    /// field map.
    #[must_use]
    pub fn diff(&self, actual: &Map<String, Value>, expected: &Map<String, Value>) -> StateChangeList {
        let names: BTreeSet<&String> = actual.keys().chain(expected.keys()).collect();

        let mut changes = StateChangeList::new();
        for name in names {
            let before = actual.get(name.as_str()).cloned();
            let after = expected.get(name.as_str()).cloned();

            if after.is_none() && before.is_some() && !self.delete_orphans {
                debug!("Leaving orphaned field '{name}' untouched");
                continue;
            }

            changes.push(StateChange::computed_with(
                name.clone(),
                before,
                after,
                self.comparator_for(name),
            ));
        }
        changes
    }

    fn comparator_for(&self, name: &str) -> &dyn ValueComparator {
        match self.overrides.get(name) {
            Some(comparator) => &**comparator,
            None => &*self.comparator,
        }
    }
}

impl Default for FieldDiffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FieldDiffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDiffer")
            .field("delete_orphans", &self.delete_orphans)
            .field("overrides", &self.overrides.keys())
            .finish_non_exhaustive()
    }
}

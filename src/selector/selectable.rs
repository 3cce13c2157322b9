//! The seam between selectors and the resources they filter.

use crate::change::ResourceChange;

/// Anything a selector can read candidate field values from.
///
/// A key addresses zero or more string values; an absent key yields an
/// empty list, which is how EXISTS-style operators distinguish presence.
pub trait Selectable {
    /// Returns the candidate values for the given key, empty when absent.
    fn select_values(&self, key: &str) -> Vec<String>;
}

/// A predicate over selectable resources.
///
/// Callers apply selectors to both the actual and the expected collection
/// *before* diffing, so unselected resources never reach the change
/// computer.
pub trait Selector: Send + Sync {
    /// Returns true when the resource is of interest.
    fn apply(&self, resource: &dyn Selectable) -> bool;
}

impl Selectable for ResourceChange {
    /// Supports the keys `kind`, `apiVersion`, `metadata.name`,
    /// `metadata.labels.<name>` and `metadata.annotations.<name>`.
    fn select_values(&self, key: &str) -> Vec<String> {
        match key {
            "kind" => vec![self.kind().to_string()],
            "apiVersion" => vec![self.api_version().to_string()],
            "metadata.name" => vec![self.name().to_string()],
            _ => {
                if let Some(label) = key.strip_prefix("metadata.labels.") {
                    return self
                        .metadata()
                        .label(label)
                        .map(String::from)
                        .into_iter()
                        .collect();
                }
                if let Some(annotation) = key.strip_prefix("metadata.annotations.") {
                    return self
                        .metadata()
                        .annotation(annotation)
                        .map(String::from)
                        .into_iter()
                        .collect();
                }
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{ResourceChangeSpec, ResourceMetadata, StateChangeList};

    fn labelled_change() -> ResourceChange {
        ResourceChange::new(
            "core/v1",
            "Topic",
            ResourceMetadata::new("orders").with_label("team", "payments"),
            ResourceChangeSpec::new(StateChangeList::new()),
        )
    }

    #[test]
    fn test_identity_keys() {
        let change = labelled_change();
        assert_eq!(change.select_values("kind"), vec!["Topic"]);
        assert_eq!(change.select_values("apiVersion"), vec!["core/v1"]);
        assert_eq!(change.select_values("metadata.name"), vec!["orders"]);
    }

    #[test]
    fn test_label_keys() {
        let change = labelled_change();
        assert_eq!(change.select_values("metadata.labels.team"), vec!["payments"]);
        assert!(change.select_values("metadata.labels.missing").is_empty());
        assert!(change.select_values("unknown").is_empty());
    }
}

//! Pluggable value equality for field diffing.
//!
//! Some backends report defaulted fields with a well-known "unspecified"
//! sentinel (a partition count of `-1`, an empty replication factor). A
//! comparator decides when two values count as equal so such fields are
//! never diffed against their observed counterpart.

use serde_json::Value;

/// Decides whether an observed and a desired value count as equal.
pub trait ValueComparator: Send + Sync {
    /// Returns true when the two values should produce no change.
    fn equals(&self, before: &Value, after: &Value) -> bool;
}

/// Structural equality, the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrictComparator;

impl ValueComparator for StrictComparator {
    fn equals(&self, before: &Value, after: &Value) -> bool {
        before == after
    }
}

/// Equality that treats a desired value equal to a sentinel as unspecified.
///
/// When the `after` value equals the sentinel, the field counts as equal no
/// matter what was observed; otherwise comparison falls back to structural
/// equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelComparator {
    sentinel: Value,
}

impl SentinelComparator {
    /// Creates a comparator with the given sentinel value.
    #[must_use]
    pub const fn new(sentinel: Value) -> Self {
        Self { sentinel }
    }
}

impl ValueComparator for SentinelComparator {
    fn equals(&self, before: &Value, after: &Value) -> bool {
        after == &self.sentinel || before == after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_comparator() {
        let cmp = StrictComparator;
        assert!(cmp.equals(&json!(3), &json!(3)));
        assert!(!cmp.equals(&json!(3), &json!(4)));
        assert!(!cmp.equals(&json!(3), &json!("3")));
    }

    #[test]
    fn test_sentinel_counts_as_equal() {
        let cmp = SentinelComparator::new(json!(-1));
        assert!(cmp.equals(&json!(12), &json!(-1)));
        assert!(cmp.equals(&json!(12), &json!(12)));
        assert!(!cmp.equals(&json!(12), &json!(6)));
    }
}

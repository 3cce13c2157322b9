//! Aggregation of several selectors into one predicate.

use super::selectable::{Selectable, Selector};

/// How an [`AggregateSelector`] combines its member verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorStrategy {
    /// Every member must match.
    #[default]
    All,
    /// At least one member must match.
    Any,
    /// No member may match.
    None,
}

/// Combines a list of selectors under one strategy.
///
/// With no members, `All` and `None` match everything and `Any` matches
/// nothing, following the usual vacuous-truth rules.
pub struct AggregateSelector {
    strategy: SelectorStrategy,
    selectors: Vec<Box<dyn Selector>>,
}

impl AggregateSelector {
    /// Creates an aggregate with the given strategy and members.
    #[must_use]
    pub fn new(strategy: SelectorStrategy, selectors: Vec<Box<dyn Selector>>) -> Self {
        Self {
            strategy,
            selectors,
        }
    }

    /// The aggregation strategy.
    #[must_use]
    pub const fn strategy(&self) -> SelectorStrategy {
        self.strategy
    }

    /// The number of member selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Returns true if the aggregate has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl Selector for AggregateSelector {
    fn apply(&self, resource: &dyn Selectable) -> bool {
        match self.strategy {
            SelectorStrategy::All => self.selectors.iter().all(|s| s.apply(resource)),
            SelectorStrategy::Any => self.selectors.iter().any(|s| s.apply(resource)),
            SelectorStrategy::None => !self.selectors.iter().any(|s| s.apply(resource)),
        }
    }
}

impl std::fmt::Debug for AggregateSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateSelector")
            .field("strategy", &self.strategy)
            .field("selectors", &self.selectors.len())
            .finish()
    }
}

/// Keeps the resources a selector matches.
///
/// Convenience for applying one selector to a whole collection before
/// diffing.
pub fn matching<'a, R: Selectable>(selector: &dyn Selector, resources: &'a [R]) -> Vec<&'a R> {
    resources
        .iter()
        .filter(|resource| selector.apply(*resource))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{ResourceChange, ResourceChangeSpec, ResourceMetadata, StateChangeList};
    use crate::selector::ExpressionSelector;

    fn change(name: &str, env: &str) -> ResourceChange {
        ResourceChange::new(
            "core/v1",
            "Topic",
            ResourceMetadata::new(name).with_label("env", env),
            ResourceChangeSpec::new(StateChangeList::new()),
        )
    }

    fn members() -> Vec<Box<dyn Selector>> {
        vec![
            Box::new(ExpressionSelector::parse("metadata.labels.env IN (prod)").unwrap()),
            Box::new(ExpressionSelector::parse("metadata.name MATCHES (^orders)").unwrap()),
        ]
    }

    #[test]
    fn test_all_requires_every_member() {
        let selector = AggregateSelector::new(SelectorStrategy::All, members());
        assert!(selector.apply(&change("orders", "prod")));
        assert!(!selector.apply(&change("orders", "dev")));
        assert!(!selector.apply(&change("payments", "prod")));
    }

    #[test]
    fn test_any_requires_one_member() {
        let selector = AggregateSelector::new(SelectorStrategy::Any, members());
        assert!(selector.apply(&change("orders", "dev")));
        assert!(selector.apply(&change("payments", "prod")));
        assert!(!selector.apply(&change("payments", "dev")));
    }

    #[test]
    fn test_none_rejects_any_match() {
        let selector = AggregateSelector::new(SelectorStrategy::None, members());
        assert!(!selector.apply(&change("orders", "dev")));
        assert!(selector.apply(&change("payments", "dev")));
    }

    #[test]
    fn test_empty_aggregate_vacuous_truth() {
        let all = AggregateSelector::new(SelectorStrategy::All, vec![]);
        assert!(all.apply(&change("a", "dev")));

        let any = AggregateSelector::new(SelectorStrategy::Any, vec![]);
        assert!(!any.apply(&change("a", "dev")));
    }

    #[test]
    fn test_matching_filters_collection() {
        let selector = ExpressionSelector::parse("metadata.labels.env IN (prod)").unwrap();
        let resources = vec![change("a", "prod"), change("b", "dev"), change("c", "prod")];

        let kept = matching(&selector, &resources);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].name(), "a");
        assert_eq!(kept[1].name(), "c");
    }
}

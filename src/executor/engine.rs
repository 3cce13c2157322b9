//! Dispatch of computed changes to their handlers.
//!
//! The executor runs a single pass per call: associate one handler per
//! operation, drop unsupported changes, dispatch (dry-run or live), and
//! aggregate settled outcomes into terminal results.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::change::{ChangeMetadata, ChangeResult, Operation, ResourceChange};
use crate::context::ReconciliationContext;
use crate::error::{ConfigError, Result};

use super::handler::ChangeHandler;

/// Applies a fixed list of changes against a set of handlers.
///
/// Cross-resource, cross-operation sequencing is not provided: nothing
/// orders a DELETE for one resource relative to a CREATE for another. A
/// caller needing dependency ordering must issue separate reconciliation
/// passes.
pub struct ChangeExecutor {
    /// One handler per operation, validated at construction.
    handlers: HashMap<Operation, Arc<dyn ChangeHandler>>,
}

impl ChangeExecutor {
    /// Builds the dispatch table from the given handlers.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when two handlers claim the same
    /// operation. The check runs before any change is dispatched.
    pub fn new<I>(handlers: I) -> Result<Self>
    where
        I: IntoIterator<Item = Arc<dyn ChangeHandler>>,
    {
        let mut table: HashMap<Operation, Arc<dyn ChangeHandler>> = HashMap::new();
        for handler in handlers {
            for operation in handler.supported_operations() {
                if table.insert(operation, Arc::clone(&handler)).is_some() {
                    return Err(ConfigError::DuplicateHandler { operation }.into());
                }
            }
        }
        Ok(Self { handlers: table })
    }

    /// The operations this executor can dispatch.
    #[must_use]
    pub fn supported_operations(&self) -> Vec<Operation> {
        self.handlers.keys().copied().collect()
    }

    /// Applies the changes, reading the dry-run flag from the context.
    ///
    /// # Errors
    ///
    /// See [`ChangeExecutor::apply_changes`].
    pub async fn apply(
        &self,
        changes: Vec<ResourceChange>,
        context: &ReconciliationContext,
    ) -> Result<Vec<ChangeResult>> {
        self.apply_changes(changes, context.is_dry_run()).await
    }

    /// Applies the changes, producing one result per dispatched change.
    ///
    /// Changes whose operation has no registered handler are dropped with a
    /// warning and yield neither result nor error. In dry-run mode no
    /// handler side effect runs and each status derives purely from the
    /// operation. In live mode changes are grouped by operation, every
    /// group's handler call is issued before any outcome is awaited, and a
    /// failing outcome never aborts sibling changes; result ordering across
    /// groups is not guaranteed.
    ///
    /// # Errors
    ///
    /// Returns an error when a handler's `handle` call itself fails; such a
    /// fault aborts the remainder of the batch.
    pub async fn apply_changes(
        &self,
        changes: Vec<ResourceChange>,
        dry_run: bool,
    ) -> Result<Vec<ChangeResult>> {
        let supported: Vec<ResourceChange> = changes
            .into_iter()
            .filter(|change| {
                let operation = change.operation();
                if self.handlers.contains_key(&operation) {
                    true
                } else {
                    warn!(
                        "No handler registered for operation '{}', dropping change for {} '{}'",
                        operation,
                        change.kind(),
                        change.name()
                    );
                    false
                }
            })
            .collect();

        if dry_run {
            debug!("Dry-run: simulating {} changes", supported.len());
            return Ok(self.simulate(supported));
        }

        info!("Applying {} changes", supported.len());

        let mut groups: HashMap<Operation, Vec<ResourceChange>> = HashMap::new();
        for change in supported {
            groups.entry(change.operation()).or_default().push(change);
        }

        // Issue every group's handler call before settling any outcome, so
        // the underlying work of distinct groups overlaps.
        let mut pending = Vec::new();
        for (operation, group) in groups {
            let Some(handler) = self.handlers.get(&operation) else {
                continue;
            };
            debug!("Dispatching {} changes for operation '{operation}'", group.len());
            let responses = handler.handle(group).await?;
            for response in responses {
                pending.push((Arc::clone(handler), response));
            }
        }

        let mut results = Vec::with_capacity(pending.len());
        for (handler, response) in pending {
            let (change, outcomes) = response.settle().await;
            let description = handler.describe(&change);

            let result = if change.operation().is_none() {
                // no side effect was attempted, so no outcome can fail it
                ChangeResult::ok(change, description)
            } else {
                let errors: Vec<_> = outcomes
                    .into_iter()
                    .filter_map(ChangeMetadata::into_error)
                    .collect();
                if errors.is_empty() {
                    ChangeResult::changed(change, description)
                } else {
                    warn!(
                        "{} outcome(s) failed for {} '{}'",
                        errors.len(),
                        change.kind(),
                        change.name()
                    );
                    ChangeResult::failed(change, description, errors)
                }
            };
            results.push(result);
        }

        Ok(results)
    }

    /// Synthesizes results without invoking any handler side effect.
    fn simulate(&self, changes: Vec<ResourceChange>) -> Vec<ChangeResult> {
        changes
            .into_iter()
            .filter_map(|change| {
                let handler = self.handlers.get(&change.operation())?;
                let description = handler.describe(&change);
                Some(if change.operation().is_none() {
                    ChangeResult::ok(change, description)
                } else {
                    ChangeResult::changed(change, description)
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for ChangeExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeExecutor")
            .field("operations", &self.supported_operations())
            .finish_non_exhaustive()
    }
}

//! The pluggable unit performing side effects for a batch of changes.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::change::{
    ChangeMetadata, ChangeResponse, Operation, ResourceChange, TextDescription,
};
use crate::error::Result;

/// A capability servicing changes of particular operations against one
/// backend.
///
/// Implementations own any stateful backend client they need; its lifecycle
/// is scoped to one `handle` call. An `Err` from [`ChangeHandler::handle`]
/// is the synchronous failure channel: the executor does not catch it, so it
/// aborts the whole batch. Failures of individual remote calls must instead
/// be reported through the response's asynchronous outcomes.
#[async_trait]
pub trait ChangeHandler: Send + Sync {
    /// Declares which operations this handler services.
    ///
    /// Two handlers claiming the same operation within one executor is a
    /// configuration error.
    fn supported_operations(&self) -> HashSet<Operation>;

    /// Performs the side-effecting action for a batch of changes.
    ///
    /// Returns one response per input change, each carrying one or more
    /// pending asynchronous outcomes. The call should issue work and return
    /// promptly; outcome settling is the executor's job.
    ///
    /// # Errors
    ///
    /// Returns an error when the batch as a whole cannot be dispatched,
    /// e.g. the backend connection could not be opened.
    async fn handle(&self, changes: Vec<ResourceChange>) -> Result<Vec<ChangeResponse>>;

    /// Describes a change in human-readable text, without side effects.
    ///
    /// Used both for dry-run reporting and for composing the final result.
    fn describe(&self, change: &ResourceChange) -> TextDescription;
}

/// Handler for changes that require no action.
///
/// Performs nothing and immediately resolves every change with a successful
/// outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopChangeHandler;

impl NoopChangeHandler {
    /// Creates a new no-op handler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChangeHandler for NoopChangeHandler {
    fn supported_operations(&self) -> HashSet<Operation> {
        HashSet::from([Operation::None])
    }

    async fn handle(&self, changes: Vec<ResourceChange>) -> Result<Vec<ChangeResponse>> {
        Ok(changes
            .into_iter()
            .map(|change| {
                let outcome = tokio::spawn(async { ChangeMetadata::success() });
                ChangeResponse::single(change, outcome)
            })
            .collect())
    }

    fn describe(&self, change: &ResourceChange) -> TextDescription {
        TextDescription::new(format!(
            "Nothing to change for {} '{}'",
            change.kind(),
            change.name()
        ))
    }
}

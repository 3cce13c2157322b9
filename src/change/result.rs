//! Execution outcomes for resource changes.
//!
//! A handler answers each change with a [`ChangeResponse`] carrying pending
//! asynchronous outcomes. The executor settles those outcomes and folds them
//! into one terminal [`ChangeResult`] per change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::{JoinError, JoinHandle};

use super::resource::ResourceChange;

/// One failure cause reported by an asynchronous outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeError {
    /// Human-readable failure message.
    message: String,
    /// Optional protocol status code reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
}

impl ChangeError {
    /// Creates an error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Creates an error with a message and a backend status code.
    #[must_use]
    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The backend status code, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }
}

impl std::fmt::Display for ChangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {status})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// The outcome of one asynchronous backend call.
///
/// Absence of an error means the call succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMetadata {
    /// The failure cause, absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<ChangeError>,
}

impl ChangeMetadata {
    /// Creates a successful outcome.
    #[must_use]
    pub const fn success() -> Self {
        Self { error: None }
    }

    /// Creates a failed outcome carrying the given error.
    #[must_use]
    pub const fn failed(error: ChangeError) -> Self {
        Self { error: Some(error) }
    }

    /// Returns true if the call succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The failure cause, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&ChangeError> {
        self.error.as_ref()
    }

    /// Consumes the outcome, yielding its failure cause if any.
    #[must_use]
    pub fn into_error(self) -> Option<ChangeError> {
        self.error
    }
}

/// A resource change paired with its pending asynchronous outcomes.
///
/// A single resource change may require several underlying remote calls,
/// each reporting independently; every call contributes one outcome.
#[derive(Debug)]
pub struct ChangeResponse {
    /// The change being applied.
    change: ResourceChange,
    /// Pending outcomes, one per underlying remote call.
    outcomes: Vec<JoinHandle<ChangeMetadata>>,
}

impl ChangeResponse {
    /// Creates a response with several pending outcomes.
    #[must_use]
    pub fn new(change: ResourceChange, outcomes: Vec<JoinHandle<ChangeMetadata>>) -> Self {
        Self { change, outcomes }
    }

    /// Creates a response backed by a single pending outcome.
    #[must_use]
    pub fn single(change: ResourceChange, outcome: JoinHandle<ChangeMetadata>) -> Self {
        Self::new(change, vec![outcome])
    }

    /// The change being applied.
    #[must_use]
    pub const fn change(&self) -> &ResourceChange {
        &self.change
    }

    /// Awaits every pending outcome.
    ///
    /// A task that panicked or was cancelled settles as a failed outcome
    /// carrying the panic message, so one broken call can never take down
    /// the executor.
    pub async fn settle(self) -> (ResourceChange, Vec<ChangeMetadata>) {
        let mut settled = Vec::with_capacity(self.outcomes.len());
        for outcome in self.outcomes {
            let metadata = match outcome.await {
                Ok(metadata) => metadata,
                Err(err) => ChangeMetadata::failed(join_failure(err)),
            };
            settled.push(metadata);
        }
        (self.change, settled)
    }
}

/// Converts an aborted task into a reportable failure cause.
fn join_failure(err: JoinError) -> ChangeError {
    if err.is_panic() {
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_string()))
            .unwrap_or_else(|| String::from("unknown panic payload"));
        ChangeError::new(format!("panic: {message}"))
    } else {
        ChangeError::new("outcome task was cancelled")
    }
}

/// Terminal status of an applied change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeStatus {
    /// Nothing had to be done.
    Ok,
    /// The change was applied successfully.
    Changed,
    /// At least one underlying call failed.
    Failed,
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Ok => "OK",
            Self::Changed => "CHANGED",
            Self::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}

/// A side-effect-free human summary of a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct TextDescription(String);

impl TextDescription {
    /// Creates a description from the given text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The description text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TextDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TextDescription {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl From<String> for TextDescription {
    fn from(text: String) -> Self {
        Self(text)
    }
}

/// The terminal, immutable record of one applied change.
///
/// Constructed exactly once per change by the executor (or synthesized
/// directly in dry-run); serialized field order is stable: end time, status,
/// change, description, errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeResult {
    /// When the change finished settling.
    ended_at: DateTime<Utc>,
    /// Terminal status.
    status: ChangeStatus,
    /// The change this result refers to.
    change: ResourceChange,
    /// Human summary from the servicing handler.
    description: TextDescription,
    /// Captured failure causes, empty unless the status is `FAILED`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ChangeError>,
}

impl ChangeResult {
    /// Creates a result for a change that required no action.
    #[must_use]
    pub fn ok(change: ResourceChange, description: TextDescription) -> Self {
        Self {
            ended_at: Utc::now(),
            status: ChangeStatus::Ok,
            change,
            description,
            errors: vec![],
        }
    }

    /// Creates a result for a change that was applied successfully.
    #[must_use]
    pub fn changed(change: ResourceChange, description: TextDescription) -> Self {
        Self {
            ended_at: Utc::now(),
            status: ChangeStatus::Changed,
            change,
            description,
            errors: vec![],
        }
    }

    /// Creates a result for a change with at least one failed outcome.
    #[must_use]
    pub fn failed(
        change: ResourceChange,
        description: TextDescription,
        errors: Vec<ChangeError>,
    ) -> Self {
        Self {
            ended_at: Utc::now(),
            status: ChangeStatus::Failed,
            change,
            description,
            errors,
        }
    }

    /// When the change finished settling.
    #[must_use]
    pub const fn ended_at(&self) -> DateTime<Utc> {
        self.ended_at
    }

    /// Terminal status.
    #[must_use]
    pub const fn status(&self) -> ChangeStatus {
        self.status
    }

    /// The change this result refers to.
    #[must_use]
    pub const fn change(&self) -> &ResourceChange {
        &self.change
    }

    /// Human summary from the servicing handler.
    #[must_use]
    pub const fn description(&self) -> &TextDescription {
        &self.description
    }

    /// Captured failure causes.
    #[must_use]
    pub fn errors(&self) -> &[ChangeError] {
        &self.errors
    }

    /// Returns true if at least one underlying call failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == ChangeStatus::Failed
    }
}

impl std::fmt::Display for ChangeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}/{}: {}",
            self.status,
            self.change.kind(),
            self.change.name(),
            self.description
        )?;
        if !self.errors.is_empty() {
            write!(f, " (")?;
            for (i, error) in self.errors.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{error}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

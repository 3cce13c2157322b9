//! Reconciliation context shared across a run.
//!
//! Carries the dry-run flag and free-form options consulted by diff options
//! such as orphan deletion. The context is read-only once built; each
//! reconciliation pass owns its own instance.

use std::collections::HashMap;

use serde_json::Value;

/// Read-only settings for one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationContext {
    /// Whether side effects are suppressed.
    dry_run: bool,
    /// Free-form configuration keyed by option name.
    configuration: HashMap<String, Value>,
}

impl ReconciliationContext {
    /// Creates a context with the given dry-run flag and no options.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            configuration: HashMap::new(),
        }
    }

    /// Sets an option, consuming self.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.configuration.insert(key.into(), value.into());
        self
    }

    /// Returns true if side effects are suppressed for this pass.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Looks up a raw option value.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.configuration.get(key)
    }

    /// Looks up a boolean option.
    ///
    /// Returns `None` when the option is absent or not a boolean.
    #[must_use]
    pub fn bool_option(&self, key: &str) -> Option<bool> {
        self.configuration.get(key).and_then(Value::as_bool)
    }

    /// Looks up a boolean option, falling back to a default when absent.
    #[must_use]
    pub fn bool_option_or(&self, key: &str, default: bool) -> bool {
        self.bool_option(key).unwrap_or(default)
    }
}

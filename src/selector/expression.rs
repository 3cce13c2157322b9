//! The `<key> <operator> (<value>,...)` selector expression language.
//!
//! Expressions are parsed and their patterns compiled eagerly, so a
//! malformed selector fails the run before reconciliation starts.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Result, SelectorError};

use super::selectable::{Selectable, Selector};

static EXPRESSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?<key>[^\s()]+)\s+(?<operator>[A-Za-z]+)\s*(?:\(\s*(?<values>[^)]*)\)\s*)?$")
        .unwrap()
});

/// Operators supported by selector expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionOperator {
    /// At least one candidate value is in the listed values.
    In,
    /// No candidate value is in the listed values.
    NotIn,
    /// The key has at least one candidate value.
    Exists,
    /// The key has no candidate value.
    DoesNotExist,
    /// At least one candidate value matches one of the patterns.
    Matches,
    /// No candidate value matches any of the patterns.
    DoesNotMatch,
}

impl ExpressionOperator {
    /// The grammar token for this operator.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::NotIn => "NOTIN",
            Self::Exists => "EXISTS",
            Self::DoesNotExist => "DOESNOTEXISTS",
            Self::Matches => "MATCHES",
            Self::DoesNotMatch => "DOESNOTMATCH",
        }
    }

    const fn takes_values(self) -> bool {
        !matches!(self, Self::Exists | Self::DoesNotExist)
    }

    const fn takes_patterns(self) -> bool {
        matches!(self, Self::Matches | Self::DoesNotMatch)
    }
}

impl FromStr for ExpressionOperator {
    type Err = SelectorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN" => Ok(Self::In),
            "NOTIN" => Ok(Self::NotIn),
            "EXISTS" => Ok(Self::Exists),
            "DOESNOTEXISTS" => Ok(Self::DoesNotExist),
            "MATCHES" => Ok(Self::Matches),
            "DOESNOTMATCH" => Ok(Self::DoesNotMatch),
            other => Err(SelectorError::UnknownOperator {
                operator: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ExpressionOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// A single parsed selector expression.
#[derive(Debug)]
pub struct ExpressionSelector {
    key: String,
    operator: ExpressionOperator,
    values: Vec<String>,
    patterns: Vec<Regex>,
}

impl ExpressionSelector {
    /// Builds a selector from its parts, validating value arity and
    /// compiling patterns eagerly.
    ///
    /// # Errors
    ///
    /// Returns a selector error when the operator's value arity is violated
    /// or a pattern does not compile.
    pub fn new(
        key: impl Into<String>,
        operator: ExpressionOperator,
        values: Vec<String>,
    ) -> Result<Self> {
        if operator.takes_values() && values.is_empty() {
            return Err(SelectorError::MissingValues {
                operator: operator.token().to_string(),
            }
            .into());
        }
        if !operator.takes_values() && !values.is_empty() {
            return Err(SelectorError::UnexpectedValues {
                operator: operator.token().to_string(),
            }
            .into());
        }

        let mut patterns = Vec::new();
        if operator.takes_patterns() {
            for value in &values {
                let pattern = Regex::new(value).map_err(|err| SelectorError::InvalidPattern {
                    pattern: value.clone(),
                    message: err.to_string(),
                })?;
                patterns.push(pattern);
            }
        }

        Ok(Self {
            key: key.into(),
            operator,
            values,
            patterns,
        })
    }

    /// Parses an expression of the form `<key> <operator> (<value>,...)`.
    ///
    /// The operator token is case-insensitive; values are comma-separated
    /// and trimmed. EXISTS-style operators take no value list.
    ///
    /// # Errors
    ///
    /// Returns a selector error when the expression does not match the
    /// grammar, the operator is unknown, the value arity is violated, or a
    /// pattern does not compile.
    pub fn parse(expression: &str) -> Result<Self> {
        let captures =
            EXPRESSION_PATTERN
                .captures(expression)
                .ok_or_else(|| SelectorError::MalformedExpression {
                    expression: expression.to_string(),
                })?;

        let key = &captures["key"];
        let operator = ExpressionOperator::from_str(&captures["operator"])?;
        let values: Vec<String> = captures
            .name("values")
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        debug!("Parsed selector expression: {key} {operator} {values:?}");
        Self::new(key, operator, values)
    }

    /// The selected key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The operator.
    #[must_use]
    pub const fn operator(&self) -> ExpressionOperator {
        self.operator
    }

    /// The listed values or patterns, as written.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl Selector for ExpressionSelector {
    fn apply(&self, resource: &dyn Selectable) -> bool {
        let candidates = resource.select_values(&self.key);
        match self.operator {
            ExpressionOperator::In => candidates.iter().any(|v| self.values.contains(v)),
            ExpressionOperator::NotIn => !candidates.iter().any(|v| self.values.contains(v)),
            ExpressionOperator::Exists => !candidates.is_empty(),
            ExpressionOperator::DoesNotExist => candidates.is_empty(),
            ExpressionOperator::Matches => candidates
                .iter()
                .any(|v| self.patterns.iter().any(|p| p.is_match(v))),
            ExpressionOperator::DoesNotMatch => !candidates
                .iter()
                .any(|v| self.patterns.iter().any(|p| p.is_match(v))),
        }
    }
}

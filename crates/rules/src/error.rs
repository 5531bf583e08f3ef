use thiserror::Error;

use voyage_core::NonEmpty;

/// Failure to build or load a rule tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The configuration text is not a well-formed rule document.
    #[error("malformed rule configuration: {0}")]
    Malformed(String),

    /// The tree parsed but violates one or more structural constraints.
    #[error("invalid rule: {}", .0.as_slice().join("; "))]
    Invalid(NonEmpty<String>),
}

impl RuleError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(NonEmpty::one(msg.into()))
    }

    /// Every violation, in discovery order (empty for `Malformed`).
    pub fn violations(&self) -> &[String] {
        match self {
            RuleError::Malformed(_) => &[],
            RuleError::Invalid(violations) => violations.as_slice(),
        }
    }
}

impl From<serde_json::Error> for RuleError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value.to_string())
    }
}

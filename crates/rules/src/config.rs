//! Loading rule trees from JSON.
//!
//! Parsing is fail-fast (a syntax error has nothing useful to accumulate);
//! structural checks then run through `Validation` so every bad leaf is
//! reported at once.

use serde::{Deserialize, Serialize};

use voyage_core::{Validation, combine2, traverse};

use crate::error::RuleError;
use crate::rule::Rule;

/// Structural limits applied when validating a loaded tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleLimits {
    pub max_depth: usize,
}

impl Default for RuleLimits {
    fn default() -> Self {
        Self { max_depth: 32 }
    }
}

/// A rule with the name it was configured under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRule {
    pub name: String,
    pub rule: Rule,
}

/// Entry point for rule documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleConfig {
    limits: RuleLimits,
}

impl RuleConfig {
    pub fn new(limits: RuleLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> RuleLimits {
        self.limits
    }

    /// Parse and validate a single rule document.
    pub fn from_json(&self, json: &str) -> Result<Rule, RuleError> {
        let rule: Rule = serde_json::from_str(json)?;
        self.validate(&rule).to_result().map(|_| rule).map_err(RuleError::Invalid)
    }

    /// Parse and validate a JSON array of `{"name": .., "rule": ..}` entries.
    ///
    /// Violations from every entry are reported together, each prefixed
    /// with the rule's name.
    pub fn load_rules(&self, json: &str) -> Result<Vec<NamedRule>, RuleError> {
        let named: Vec<NamedRule> = serde_json::from_str(json)?;

        let checked = traverse(named, |entry| {
            self.validate(&entry.rule)
                .map_errors(|e| format!("{}: {e}", entry.name))
                .map(|_| entry)
        });

        match checked.to_result() {
            Ok(rules) => {
                tracing::info!(count = rules.len(), "promotion rules loaded");
                Ok(rules)
            }
            Err(violations) => {
                tracing::warn!(violations = violations.len(), "promotion rules rejected");
                Err(RuleError::Invalid(violations))
            }
        }
    }

    /// Every structural violation in `rule`, in tree order.
    pub fn validate(&self, rule: &Rule) -> Validation<(), String> {
        let depth = rule.depth();
        let depth_check = Validation::ensure(
            (),
            depth <= self.limits.max_depth,
            || format!("rule depth {depth} exceeds limit {}", self.limits.max_depth),
        );
        combine2(depth_check, validate_leaves(rule), |_, _| ())
    }
}

fn validate_leaves(rule: &Rule) -> Validation<(), String> {
    match rule {
        Rule::And { left, right } | Rule::Or { left, right } => {
            combine2(validate_leaves(left), validate_leaves(right), |_, _| ())
        }
        Rule::Not { rule } => validate_leaves(rule),
        Rule::DateInRange { start, end } => Validation::ensure(
            (),
            start <= end,
            || format!("date range {start}..{end} starts after it ends"),
        ),
        Rule::ItemCountAtLeast { count } => {
            Validation::ensure((), *count > 0, || "item count must be at least 1".to_string())
        }
        Rule::MembershipIs { .. }
        | Rule::MinimumAmount { .. }
        | Rule::ItemTypeIs { .. }
        | Rule::FirstBooking
        | Rule::Always
        | Rule::Never => Validation::valid(()),
    }
}

//! Promotion eligibility rules.
//!
//! Rules are plain data ([`Rule`]) interpreted against an
//! [`EvaluationContext`]. The engine is pure: no IO, no clock, no logging.
//! Configuration loading ([`RuleConfig`]) is the only place that logs.

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod rule;

pub use config::{NamedRule, RuleConfig, RuleLimits};
pub use context::EvaluationContext;
pub use engine::{EvaluationResult, evaluate, evaluate_with_details, simplify};
pub use error::RuleError;
pub use rule::{ItemKind, MembershipTier, Rule};

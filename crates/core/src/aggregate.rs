//! Aggregate root trait and optimistic concurrency support.

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};

/// Aggregate root: an entity that is loaded and saved as one unit.
///
/// Transitions never touch the version; the repository bumps it when a
/// snapshot is accepted.
pub trait AggregateRoot: Entity {
    /// Version of the persisted snapshot this value was derived from.
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for an aggregate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (useful for idempotent commands, migrations, etc.).
    Any,
    /// The aggregate must not exist yet.
    New,
    /// Require the aggregate to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    /// `actual` is `None` when nothing has been stored yet.
    pub fn matches(self, actual: Option<u64>) -> bool {
        match (self, actual) {
            (ExpectedVersion::Any, _) => true,
            (ExpectedVersion::New, None) => true,
            (ExpectedVersion::New, Some(_)) => false,
            (ExpectedVersion::Exact(_), None) => false,
            (ExpectedVersion::Exact(v), Some(actual)) => v == actual,
        }
    }

    pub fn check(self, actual: Option<u64>) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::invariant(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual:?})"
            )))
        }
    }
}

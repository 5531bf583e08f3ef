//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// A closed set of life phases for an entity.
pub trait Lifecycle {
    /// Field-less discriminant used in diagnostics (`InvalidStatus` errors, logs).
    type Phase: Copy + Eq + core::fmt::Debug + core::fmt::Display;

    fn phase(&self) -> Self::Phase;

    /// `true` when no further transition is accepted.
    fn is_final(&self) -> bool;
}

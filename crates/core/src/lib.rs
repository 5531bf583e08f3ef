//! `voyage-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! fail-fast [`ResultExt`] combinators, fail-slow [`Validation`], identifiers,
//! money, and the entity/lifecycle traits the domain crates build on.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod non_empty;
pub mod result;
pub mod validation;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use entity::{Entity, Lifecycle};
pub use error::{DomainError, DomainResult};
pub use id::{BookingId, CouponId, MemberId};
pub use non_empty::NonEmpty;
pub use result::ResultExt;
pub use validation::{Validation, combine2, combine3, combine4, traverse};
pub use value_object::{Currency, Money, ValueObject};

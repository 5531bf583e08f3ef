//! Booking lifecycle for the travel platform.
//!
//! A [`Booking`] moves through `Pending -> Confirmed -> Completed` (or
//! `Cancelled` / `NoShow`) only through guarded transitions that return a new
//! value or a [`BookingError`]. [`BookingService`] wires those transitions to
//! persistence, payment and stock collaborators.

pub mod booking;
pub mod calculations;
pub mod error;
pub mod in_memory;
pub mod item;
pub mod policy;
pub mod ports;
pub mod promotion;
pub mod request;
pub mod service;
pub mod status;

pub use booking::{Booking, BookingParts};
pub use error::{BookingError, GatewayError, RepositoryError, UpstreamError};
pub use in_memory::{InMemoryBookingRepository, InMemoryStock, RecordingGateway};
pub use item::{BookingItem, validate_items};
pub use policy::BookingPolicy;
pub use ports::{BookingRepository, PaymentGateway, PaymentMethod, RefundId, StockLevels, TransactionId};
pub use promotion::{Coupon, CouponDiscount, promotion_context};
pub use request::{BookingRequest, ValidBookingRequest};
pub use service::BookingService;
pub use status::{BookingAction, BookingPhase, BookingStatus, CancelledBy};

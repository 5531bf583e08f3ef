//! Collaborators the booking use cases talk to.
//!
//! Implementations live outside the domain (databases, PSP clients); the
//! crate ships in-memory versions for tests and local runs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use voyage_core::{BookingId, Money};

use crate::booking::Booking;
use crate::error::{BookingError, GatewayError, RepositoryError};

/// Gateway reference for a successful charge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub String);

/// Gateway reference for a successful refund.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefundId(pub String);

impl core::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::fmt::Display for RefundId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the member pays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMethod {
    Card { last_four: String },
    BankTransfer { bank_code: String },
    Points,
}

/// Booking persistence.
pub trait BookingRepository: Send + Sync {
    /// `Ok(None)` when no booking has that id.
    fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError>;

    /// Store `booking`, which must still be at the version it was loaded at.
    /// Returns the stored value with its new version.
    fn save(&self, booking: &Booking) -> Result<Booking, RepositoryError>;

    fn get(&self, id: BookingId) -> Result<Booking, BookingError> {
        self.find_by_id(id)?.ok_or(BookingError::NotFound(id))
    }
}

/// Payment service provider.
pub trait PaymentGateway: Send + Sync {
    fn charge(&self, amount: Money, method: &PaymentMethod) -> Result<TransactionId, GatewayError>;

    fn refund(&self, transaction_id: &TransactionId, amount: Money) -> Result<RefundId, GatewayError>;
}

/// Remaining inventory per product id.
pub trait StockLevels: Send + Sync {
    fn available(&self, product_id: &str) -> u32;
}

impl<S> BookingRepository for Arc<S>
where
    S: BookingRepository + ?Sized,
{
    fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn save(&self, booking: &Booking) -> Result<Booking, RepositoryError> {
        (**self).save(booking)
    }
}

impl<S> PaymentGateway for Arc<S>
where
    S: PaymentGateway + ?Sized,
{
    fn charge(&self, amount: Money, method: &PaymentMethod) -> Result<TransactionId, GatewayError> {
        (**self).charge(amount, method)
    }

    fn refund(&self, transaction_id: &TransactionId, amount: Money) -> Result<RefundId, GatewayError> {
        (**self).refund(transaction_id, amount)
    }
}

impl<S> StockLevels for Arc<S>
where
    S: StockLevels + ?Sized,
{
    fn available(&self, product_id: &str) -> u32 {
        (**self).available(product_id)
    }
}

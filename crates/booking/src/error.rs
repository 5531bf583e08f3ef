use chrono::{DateTime, Utc};
use thiserror::Error;

use voyage_core::{BookingId, DomainError, ExpectedVersion, Money, NonEmpty};

use crate::status::{BookingAction, BookingPhase};

/// Failure reported by a payment gateway.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("card declined: {reason}")]
    CardDeclined { reason: String },

    #[error("insufficient funds: {required} required")]
    InsufficientFunds { required: Money },

    #[error("invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    #[error("refund failed for {transaction_id}: {reason}")]
    RefundFailed {
        transaction_id: String,
        reason: String,
    },

    #[error("{gateway} error [{code}]: {message}")]
    Unavailable {
        gateway: String,
        code: String,
        message: String,
    },
}

impl GatewayError {
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::CardDeclined { .. } => "CARD_DECLINED",
            GatewayError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            GatewayError::InvalidPaymentMethod(_) => "INVALID_PAYMENT_METHOD",
            GatewayError::RefundFailed { .. } => "REFUND_FAILED",
            GatewayError::Unavailable { .. } => "GATEWAY_ERROR",
        }
    }
}

/// Failure reported by a booking repository.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("version conflict on booking {id}: expected {expected:?}, stored {actual:?}")]
    Conflict {
        id: BookingId,
        expected: ExpectedVersion,
        actual: Option<u64>,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn code(&self) -> &'static str {
        match self {
            RepositoryError::Conflict { .. } => "CONCURRENT_MODIFICATION",
            RepositoryError::Unavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }
}

/// A collaborator failed while a use case was running.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("payment gateway: {0}")]
    Gateway(#[from] GatewayError),

    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

/// Everything a booking operation can fail with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("booking not found: {0}")]
    NotFound(BookingId),

    #[error("cannot {attempted} a booking that is {current}")]
    InvalidStatus {
        current: BookingPhase,
        attempted: BookingAction,
    },

    #[error("validation failed: {}", .0.as_slice().join("; "))]
    ValidationFailed(NonEmpty<String>),

    #[error("payment of {amount} was required before {expires_at}")]
    PaymentRequired {
        amount: Money,
        expires_at: DateTime<Utc>,
    },

    #[error("cannot cancel: {reason}")]
    CannotCancel { reason: String },

    #[error("coupon not applicable: {reason}")]
    CouponNotApplicable { reason: String },

    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: u32,
        available: u32,
    },

    #[error("inconsistent amounts: total {total} - discount {discount} != final {final_amount}")]
    InvalidAmounts {
        total: Money,
        discount: Money,
        final_amount: Money,
    },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl BookingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(NonEmpty::one(msg.into()))
    }

    pub fn invalid_status(current: BookingPhase, attempted: BookingAction) -> Self {
        Self::InvalidStatus { current, attempted }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::NotFound(_) => "BOOKING_NOT_FOUND",
            BookingError::InvalidStatus { .. } => "INVALID_STATUS",
            BookingError::ValidationFailed(_) => "VALIDATION_FAILED",
            BookingError::PaymentRequired { .. } => "PAYMENT_REQUIRED",
            BookingError::CannotCancel { .. } => "CANNOT_CANCEL",
            BookingError::CouponNotApplicable { .. } => "COUPON_NOT_APPLICABLE",
            BookingError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            BookingError::InvalidAmounts { .. } => "INVALID_AMOUNTS",
            BookingError::Upstream(UpstreamError::Gateway(e)) => e.code(),
            BookingError::Upstream(UpstreamError::Repository(e)) => e.code(),
        }
    }
}

impl From<GatewayError> for BookingError {
    fn from(value: GatewayError) -> Self {
        Self::Upstream(UpstreamError::Gateway(value))
    }
}

impl From<RepositoryError> for BookingError {
    fn from(value: RepositoryError) -> Self {
        Self::Upstream(UpstreamError::Repository(value))
    }
}

/// Money arithmetic failures (currency mismatch, overflow) surface as validation errors.
impl From<DomainError> for BookingError {
    fn from(value: DomainError) -> Self {
        Self::validation(value.to_string())
    }
}

//! In-memory collaborators for tests and local development.

use std::collections::HashMap;
use std::sync::RwLock;

use voyage_core::{AggregateRoot, BookingId, ExpectedVersion, Money};

use crate::booking::Booking;
use crate::error::{GatewayError, RepositoryError};
use crate::ports::{BookingRepository, PaymentGateway, PaymentMethod, RefundId, StockLevels, TransactionId};

/// Booking store with an optimistic version check on save.
#[derive(Debug, Default)]
pub struct InMemoryBookingRepository {
    inner: RwLock<HashMap<BookingId, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored booking, in no particular order.
    pub fn list(&self) -> Result<Vec<Booking>, RepositoryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().cloned().collect())
    }
}

fn poisoned() -> RepositoryError {
    tracing::error!("booking store lock poisoned");
    RepositoryError::Unavailable("booking store lock poisoned".to_string())
}

impl BookingRepository for InMemoryBookingRepository {
    fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    fn save(&self, booking: &Booking) -> Result<Booking, RepositoryError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;

        let expected = match booking.version() {
            0 => ExpectedVersion::New,
            v => ExpectedVersion::Exact(v),
        };
        let actual = map.get(&booking.id()).map(|stored| stored.version());
        if !expected.matches(actual) {
            return Err(RepositoryError::Conflict {
                id: booking.id(),
                expected,
                actual,
            });
        }

        let stored = booking.with_version(booking.version() + 1);
        map.insert(stored.id(), stored.clone());
        Ok(stored)
    }
}

/// Fixed stock per product id; unknown products have none.
#[derive(Debug, Default)]
pub struct InMemoryStock {
    levels: RwLock<HashMap<String, u32>>,
}

impl InMemoryStock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(self, product_id: impl Into<String>, available: u32) -> Self {
        self.set(product_id, available);
        self
    }

    pub fn set(&self, product_id: impl Into<String>, available: u32) {
        if let Ok(mut map) = self.levels.write() {
            map.insert(product_id.into(), available);
        }
    }
}

impl StockLevels for InMemoryStock {
    fn available(&self, product_id: &str) -> u32 {
        self.levels
            .read()
            .ok()
            .and_then(|map| map.get(product_id).copied())
            .unwrap_or(0)
    }
}

/// Gateway that approves everything unless told to fail, and records calls.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    state: RwLock<GatewayState>,
}

#[derive(Debug, Default)]
struct GatewayState {
    charges: Vec<(TransactionId, Money)>,
    refunds: Vec<(TransactionId, Money)>,
    fail_next: Option<GatewayError>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call (charge or refund) fail with `error`.
    pub fn fail_next(&self, error: GatewayError) {
        if let Ok(mut state) = self.state.write() {
            state.fail_next = Some(error);
        }
    }

    pub fn charges(&self) -> Vec<(TransactionId, Money)> {
        self.state.read().map(|s| s.charges.clone()).unwrap_or_default()
    }

    pub fn refunds(&self) -> Vec<(TransactionId, Money)> {
        self.state.read().map(|s| s.refunds.clone()).unwrap_or_default()
    }

    fn unavailable() -> GatewayError {
        GatewayError::Unavailable {
            gateway: "recording".to_string(),
            code: "LOCK".to_string(),
            message: "gateway state lock poisoned".to_string(),
        }
    }
}

impl PaymentGateway for RecordingGateway {
    fn charge(&self, amount: Money, method: &PaymentMethod) -> Result<TransactionId, GatewayError> {
        let mut state = self.state.write().map_err(|_| Self::unavailable())?;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        if let PaymentMethod::Card { last_four } = method {
            if last_four.len() != 4 {
                return Err(GatewayError::InvalidPaymentMethod(format!(
                    "card suffix {last_four:?} is not four digits"
                )));
            }
        }
        let id = TransactionId(format!("tx-{}", state.charges.len() + 1));
        state.charges.push((id.clone(), amount));
        Ok(id)
    }

    fn refund(&self, transaction_id: &TransactionId, amount: Money) -> Result<RefundId, GatewayError> {
        let mut state = self.state.write().map_err(|_| Self::unavailable())?;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        let charged = state
            .charges
            .iter()
            .find(|(id, _)| id == transaction_id)
            .map(|(_, charged)| *charged);
        match charged {
            Some(charged) if amount.amount <= charged.amount && amount.currency == charged.currency => {
                state.refunds.push((transaction_id.clone(), amount));
                Ok(RefundId(format!("rf-{}", state.refunds.len())))
            }
            Some(_) => Err(GatewayError::RefundFailed {
                transaction_id: transaction_id.0.clone(),
                reason: format!("refund of {amount} exceeds the charged amount"),
            }),
            None => Err(GatewayError::RefundFailed {
                transaction_id: transaction_id.0.clone(),
                reason: "unknown transaction".to_string(),
            }),
        }
    }
}

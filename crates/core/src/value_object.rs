//! Value objects: equality by value, not identity.
//!
//! Value objects have **no identity**. Two values with the same attributes are
//! equal, and "modifying" one always produces a new value.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// ISO currency supported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Krw,
    Usd,
    Jpy,
}

impl Currency {
    /// Number of minor-unit digits (KRW/JPY have none, USD has cents).
    pub fn decimal_places(self) -> u32 {
        match self {
            Currency::Krw | Currency::Jpy => 0,
            Currency::Usd => 2,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Krw => "KRW",
            Currency::Usd => "USD",
            Currency::Jpy => "JPY",
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// Non-negative monetary amount in the smallest currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in minor units (e.g. cents for USD, won for KRW).
    pub amount: u64,
    pub currency: Currency,
}

impl ValueObject for Money {}

impl Money {
    pub const fn new(amount: u64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub const fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub const fn krw(amount: u64) -> Self {
        Self::new(amount, Currency::Krw)
    }

    /// `cents` in minor units.
    pub const fn usd(cents: u64) -> Self {
        Self::new(cents, Currency::Usd)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    fn same_currency(&self, other: &Money) -> DomainResult<()> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(DomainError::currency_mismatch(self.currency, other.currency))
        }
    }

    pub fn add(&self, other: &Money) -> DomainResult<Money> {
        self.same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| DomainError::out_of_range(format!("{self} + {other} overflows")))?;
        Ok(Money::new(amount, self.currency))
    }

    /// Fails when the result would be negative.
    pub fn subtract(&self, other: &Money) -> DomainResult<Money> {
        self.same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or_else(|| DomainError::out_of_range(format!("{self} - {other} is negative")))?;
        Ok(Money::new(amount, self.currency))
    }

    pub fn multiply(&self, factor: u64) -> DomainResult<Money> {
        let amount = self
            .amount
            .checked_mul(factor)
            .ok_or_else(|| DomainError::out_of_range(format!("{self} * {factor} overflows")))?;
        Ok(Money::new(amount, self.currency))
    }

    /// `percent`% of this amount, rounded half-up to the minor unit.
    pub fn percent(&self, percent: u32) -> Money {
        let scaled = (self.amount as u128 * percent as u128 + 50) / 100;
        Money::new(u64::try_from(scaled).unwrap_or(u64::MAX), self.currency)
    }

    pub fn is_greater_than(&self, other: &Money) -> DomainResult<bool> {
        self.same_currency(other)?;
        Ok(self.amount > other.amount)
    }

    pub fn is_at_least(&self, other: &Money) -> DomainResult<bool> {
        self.same_currency(other)?;
        Ok(self.amount >= other.amount)
    }

    /// Sum of `amounts`, all expected in `currency`.
    pub fn sum<'a, I>(currency: Currency, amounts: I) -> DomainResult<Money>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |acc, next| acc.add(next))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.currency.decimal_places() {
            0 => write!(f, "{} {}", self.amount, self.currency),
            places => {
                let divisor = 10u64.pow(places);
                write!(
                    f,
                    "{}.{:0width$} {}",
                    self.amount / divisor,
                    self.amount % divisor,
                    self.currency,
                    width = places as usize
                )
            }
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use voyage_core::{AggregateRoot, BookingId, CouponId, Entity, Lifecycle, MemberId, Money};

use crate::calculations;
use crate::error::BookingError;
use crate::item::{BookingItem, validate_items};
use crate::policy::BookingPolicy;
use crate::status::{BookingAction, BookingPhase, BookingStatus, CancelledBy};

/// Raw booking fields, before the amount invariant is checked.
///
/// Every `Booking` value is built from one of these through [`Booking::new`],
/// including the ones produced by transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingParts {
    pub id: BookingId,
    pub member_id: MemberId,
    pub items: Vec<BookingItem>,
    pub status: BookingStatus,
    pub total_amount: Money,
    pub discount_amount: Money,
    pub final_amount: Money,
    pub coupon_id: Option<CouponId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Version of the stored snapshot this value was derived from (0 = never stored).
    pub version: u64,
}

/// Aggregate root: Booking.
///
/// Immutable. Transitions borrow `self` and return a new value, so a
/// rejected transition leaves the caller's booking exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BookingParts", into = "BookingParts")]
pub struct Booking {
    parts: BookingParts,
}

impl Booking {
    /// Validate `parts`: at least one item, and `final = total - discount`
    /// in a single currency.
    pub fn new(parts: BookingParts) -> Result<Self, BookingError> {
        if parts.items.is_empty() {
            return Err(BookingError::validation("a booking needs at least one item"));
        }

        let consistent = calculations::final_amount(&parts.total_amount, &parts.discount_amount)
            .map(|expected| expected == parts.final_amount)
            .unwrap_or(false);
        if !consistent {
            return Err(BookingError::InvalidAmounts {
                total: parts.total_amount,
                discount: parts.discount_amount,
                final_amount: parts.final_amount,
            });
        }

        Ok(Self { parts })
    }

    /// Start a new booking in `Pending`, payable until `now + payment window`.
    pub fn create(
        member_id: MemberId,
        items: Vec<BookingItem>,
        now: DateTime<Utc>,
        policy: &BookingPolicy,
    ) -> Result<Self, BookingError> {
        let items = validate_items(items, policy.max_items)
            .to_result_with(BookingError::ValidationFailed)?;
        let total = calculations::total_amount(&items)?;

        Self::new(BookingParts {
            id: BookingId::new(),
            member_id,
            items,
            status: BookingStatus::Pending {
                created_at: now,
                expires_at: now + policy.payment_window(),
            },
            total_amount: total,
            discount_amount: Money::zero(total.currency),
            final_amount: total,
            coupon_id: None,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    pub fn id(&self) -> BookingId {
        self.parts.id
    }

    pub fn member_id(&self) -> MemberId {
        self.parts.member_id
    }

    pub fn items(&self) -> &[BookingItem] {
        &self.parts.items
    }

    pub fn status(&self) -> &BookingStatus {
        &self.parts.status
    }

    pub fn phase(&self) -> BookingPhase {
        self.parts.status.phase()
    }

    pub fn total_amount(&self) -> Money {
        self.parts.total_amount
    }

    pub fn discount_amount(&self) -> Money {
        self.parts.discount_amount
    }

    pub fn final_amount(&self) -> Money {
        self.parts.final_amount
    }

    pub fn coupon_id(&self) -> Option<CouponId> {
        self.parts.coupon_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.parts.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.parts.updated_at
    }

    /// Payment deadline while pending.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self.parts.status {
            BookingStatus::Pending { expires_at, .. } => Some(expires_at),
            BookingStatus::Confirmed { .. }
            | BookingStatus::Cancelled { .. }
            | BookingStatus::Completed { .. }
            | BookingStatus::NoShow { .. } => None,
        }
    }

    pub fn is_cancellable(&self) -> bool {
        self.phase().is_cancellable()
    }

    pub fn is_refundable(&self) -> bool {
        self.phase().is_refundable()
    }

    pub fn parts(&self) -> &BookingParts {
        &self.parts
    }

    pub fn into_parts(self) -> BookingParts {
        self.parts
    }

    /// Same booking as stored at `version`. Used by repositories after a save.
    pub fn with_version(&self, version: u64) -> Self {
        Self {
            parts: BookingParts {
                version,
                ..self.parts.clone()
            },
        }
    }

    fn rejected(&self, attempted: BookingAction) -> BookingError {
        BookingError::invalid_status(self.phase(), attempted)
    }

    fn with_status(&self, status: BookingStatus, now: DateTime<Utc>) -> Result<Self, BookingError> {
        Self::new(BookingParts {
            status,
            updated_at: now,
            ..self.parts.clone()
        })
    }

    /// Status and deadline guards of [`Booking::confirm`], without the payment.
    ///
    /// Lets callers refuse before charging anything.
    pub fn ensure_confirmable(&self, now: DateTime<Utc>) -> Result<(), BookingError> {
        let expires_at = match &self.parts.status {
            BookingStatus::Pending { expires_at, .. } => *expires_at,
            BookingStatus::Confirmed { .. }
            | BookingStatus::Cancelled { .. }
            | BookingStatus::Completed { .. }
            | BookingStatus::NoShow { .. } => return Err(self.rejected(BookingAction::Confirm)),
        };

        if now > expires_at {
            return Err(BookingError::PaymentRequired {
                amount: self.parts.final_amount,
                expires_at,
            });
        }
        Ok(())
    }

    /// Record payment. Only a pending booking whose payment window is still open.
    pub fn confirm(&self, payment_id: &str, now: DateTime<Utc>) -> Result<Self, BookingError> {
        self.ensure_confirmable(now)?;
        if payment_id.trim().is_empty() {
            return Err(BookingError::validation("payment id is required"));
        }

        self.with_status(
            BookingStatus::Confirmed {
                payment_id: payment_id.to_string(),
                confirmed_at: now,
            },
            now,
        )
    }

    /// Cancel a pending booking (nothing to refund) or a confirmed one still
    /// inside the cancellation window (full refund of the final amount).
    pub fn cancel(
        &self,
        reason: &str,
        cancelled_by: CancelledBy,
        now: DateTime<Utc>,
        policy: &BookingPolicy,
    ) -> Result<Self, BookingError> {
        let refund = match &self.parts.status {
            BookingStatus::Pending { .. } => None,
            BookingStatus::Confirmed { confirmed_at, .. } => {
                if now - *confirmed_at > policy.cancellation_window() {
                    return Err(BookingError::CannotCancel {
                        reason: format!(
                            "cancellation is only possible within {} hours of confirmation",
                            policy.cancellation_window_hours
                        ),
                    });
                }
                Some(self.parts.final_amount)
            }
            BookingStatus::Cancelled { .. }
            | BookingStatus::Completed { .. }
            | BookingStatus::NoShow { .. } => return Err(self.rejected(BookingAction::Cancel)),
        };

        if reason.trim().is_empty() {
            return Err(BookingError::validation("cancellation reason is required"));
        }

        self.with_status(
            BookingStatus::Cancelled {
                reason: reason.to_string(),
                cancelled_at: now,
                refund,
                cancelled_by,
            },
            now,
        )
    }

    pub fn complete(&self, now: DateTime<Utc>) -> Result<Self, BookingError> {
        match &self.parts.status {
            BookingStatus::Confirmed { .. } => {
                self.with_status(BookingStatus::Completed { completed_at: now }, now)
            }
            BookingStatus::Pending { .. }
            | BookingStatus::Cancelled { .. }
            | BookingStatus::Completed { .. }
            | BookingStatus::NoShow { .. } => Err(self.rejected(BookingAction::Complete)),
        }
    }

    /// The member did not show up; a share of the paid amount is kept as penalty.
    pub fn mark_no_show(&self, now: DateTime<Utc>, policy: &BookingPolicy) -> Result<Self, BookingError> {
        match &self.parts.status {
            BookingStatus::Confirmed { .. } => {
                let penalty =
                    calculations::no_show_penalty(&self.parts.final_amount, policy.no_show_penalty_percent);
                self.with_status(
                    BookingStatus::NoShow {
                        occurred_at: now,
                        penalty: Some(penalty).filter(|p| !p.is_zero()),
                    },
                    now,
                )
            }
            BookingStatus::Pending { .. }
            | BookingStatus::Cancelled { .. }
            | BookingStatus::Completed { .. }
            | BookingStatus::NoShow { .. } => Err(self.rejected(BookingAction::MarkNoShow)),
        }
    }

    /// Attach a coupon discount. One coupon per booking; the discount may
    /// not exceed the total.
    pub fn apply_discount(
        &self,
        discount: Money,
        coupon_id: CouponId,
        now: DateTime<Utc>,
    ) -> Result<Self, BookingError> {
        match &self.parts.status {
            BookingStatus::Pending { .. } => {}
            BookingStatus::Confirmed { .. }
            | BookingStatus::Cancelled { .. }
            | BookingStatus::Completed { .. }
            | BookingStatus::NoShow { .. } => return Err(self.rejected(BookingAction::ApplyDiscount)),
        }

        if let Some(existing) = self.parts.coupon_id {
            return Err(BookingError::CouponNotApplicable {
                reason: format!("coupon {existing} is already applied"),
            });
        }
        if discount.is_greater_than(&self.parts.total_amount)? {
            return Err(BookingError::CouponNotApplicable {
                reason: format!(
                    "discount {discount} exceeds booking total {}",
                    self.parts.total_amount
                ),
            });
        }

        let final_amount = calculations::final_amount(&self.parts.total_amount, &discount)?;
        Self::new(BookingParts {
            discount_amount: discount,
            final_amount,
            coupon_id: Some(coupon_id),
            updated_at: now,
            ..self.parts.clone()
        })
    }

    /// Add one more item to a pending booking; totals are recomputed.
    pub fn add_item(
        &self,
        item: BookingItem,
        now: DateTime<Utc>,
        policy: &BookingPolicy,
    ) -> Result<Self, BookingError> {
        match &self.parts.status {
            BookingStatus::Pending { .. } => {}
            BookingStatus::Confirmed { .. }
            | BookingStatus::Cancelled { .. }
            | BookingStatus::Completed { .. }
            | BookingStatus::NoShow { .. } => return Err(self.rejected(BookingAction::AddItem)),
        }

        let mut items = self.parts.items.clone();
        items.push(item);
        let items = validate_items(items, policy.max_items)
            .to_result_with(BookingError::ValidationFailed)?;

        let total = calculations::total_amount(&items)?;
        let final_amount = calculations::final_amount(&total, &self.parts.discount_amount)?;
        Self::new(BookingParts {
            items,
            total_amount: total,
            final_amount,
            updated_at: now,
            ..self.parts.clone()
        })
    }
}

impl TryFrom<BookingParts> for Booking {
    type Error = BookingError;

    fn try_from(parts: BookingParts) -> Result<Self, Self::Error> {
        Booking::new(parts)
    }
}

impl From<Booking> for BookingParts {
    fn from(booking: Booking) -> Self {
        booking.parts
    }
}

impl Entity for Booking {
    type Id = BookingId;

    fn id(&self) -> &Self::Id {
        &self.parts.id
    }
}

impl AggregateRoot for Booking {
    fn version(&self) -> u64 {
        self.parts.version
    }
}

impl Lifecycle for Booking {
    type Phase = BookingPhase;

    fn phase(&self) -> BookingPhase {
        self.parts.status.phase()
    }

    fn is_final(&self) -> bool {
        self.parts.status.phase().is_final()
    }
}

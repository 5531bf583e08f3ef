use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use voyage_core::Money;

/// Who asked for a cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelledBy {
    Member,
    Admin,
    System,
}

/// Booking status lifecycle.
///
/// Each variant carries only the data that exists in that phase: a pending
/// booking has a payment deadline, a confirmed one has a payment reference,
/// and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BookingStatus {
    Pending {
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    },
    Confirmed {
        payment_id: String,
        confirmed_at: DateTime<Utc>,
    },
    Cancelled {
        reason: String,
        cancelled_at: DateTime<Utc>,
        refund: Option<Money>,
        cancelled_by: CancelledBy,
    },
    Completed {
        completed_at: DateTime<Utc>,
    },
    NoShow {
        occurred_at: DateTime<Utc>,
        penalty: Option<Money>,
    },
}

impl BookingStatus {
    pub fn phase(&self) -> BookingPhase {
        match self {
            BookingStatus::Pending { .. } => BookingPhase::Pending,
            BookingStatus::Confirmed { .. } => BookingPhase::Confirmed,
            BookingStatus::Cancelled { .. } => BookingPhase::Cancelled,
            BookingStatus::Completed { .. } => BookingPhase::Completed,
            BookingStatus::NoShow { .. } => BookingPhase::NoShow,
        }
    }

    /// Refund recorded by a cancellation, if any.
    pub fn refund(&self) -> Option<Money> {
        match self {
            BookingStatus::Cancelled { refund, .. } => *refund,
            BookingStatus::Pending { .. }
            | BookingStatus::Confirmed { .. }
            | BookingStatus::Completed { .. }
            | BookingStatus::NoShow { .. } => None,
        }
    }

    /// Payment reference of a confirmed booking.
    pub fn payment_id(&self) -> Option<&str> {
        match self {
            BookingStatus::Confirmed { payment_id, .. } => Some(payment_id),
            BookingStatus::Pending { .. }
            | BookingStatus::Cancelled { .. }
            | BookingStatus::Completed { .. }
            | BookingStatus::NoShow { .. } => None,
        }
    }
}

/// Field-less discriminant of [`BookingStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingPhase {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl BookingPhase {
    pub const ALL: [BookingPhase; 5] = [
        BookingPhase::Pending,
        BookingPhase::Confirmed,
        BookingPhase::Cancelled,
        BookingPhase::Completed,
        BookingPhase::NoShow,
    ];

    pub fn is_final(self) -> bool {
        match self {
            BookingPhase::Pending | BookingPhase::Confirmed => false,
            BookingPhase::Cancelled | BookingPhase::Completed | BookingPhase::NoShow => true,
        }
    }

    pub fn is_cancellable(self) -> bool {
        matches!(self, BookingPhase::Pending | BookingPhase::Confirmed)
    }

    /// Cancelling in this phase returns money to the member.
    pub fn is_refundable(self) -> bool {
        matches!(self, BookingPhase::Confirmed)
    }

    /// Whether `action` is accepted in this phase at all (guards aside).
    pub fn allows(self, action: BookingAction) -> bool {
        match (self, action) {
            (BookingPhase::Pending, BookingAction::Confirm)
            | (BookingPhase::Pending, BookingAction::Cancel)
            | (BookingPhase::Pending, BookingAction::ApplyDiscount)
            | (BookingPhase::Pending, BookingAction::AddItem)
            | (BookingPhase::Confirmed, BookingAction::Cancel)
            | (BookingPhase::Confirmed, BookingAction::Complete)
            | (BookingPhase::Confirmed, BookingAction::MarkNoShow) => true,
            (BookingPhase::Pending, _)
            | (BookingPhase::Confirmed, _)
            | (BookingPhase::Cancelled, _)
            | (BookingPhase::Completed, _)
            | (BookingPhase::NoShow, _) => false,
        }
    }
}

impl core::fmt::Display for BookingPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            BookingPhase::Pending => "pending",
            BookingPhase::Confirmed => "confirmed",
            BookingPhase::Cancelled => "cancelled",
            BookingPhase::Completed => "completed",
            BookingPhase::NoShow => "no_show",
        };
        f.write_str(name)
    }
}

/// Transition names, used in `InvalidStatus` errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    Confirm,
    Cancel,
    Complete,
    MarkNoShow,
    ApplyDiscount,
    AddItem,
}

impl BookingAction {
    pub const ALL: [BookingAction; 6] = [
        BookingAction::Confirm,
        BookingAction::Cancel,
        BookingAction::Complete,
        BookingAction::MarkNoShow,
        BookingAction::ApplyDiscount,
        BookingAction::AddItem,
    ];
}

impl core::fmt::Display for BookingAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            BookingAction::Confirm => "confirm",
            BookingAction::Cancel => "cancel",
            BookingAction::Complete => "complete",
            BookingAction::MarkNoShow => "mark_no_show",
            BookingAction::ApplyDiscount => "apply_discount",
            BookingAction::AddItem => "add_item",
        };
        f.write_str(name)
    }
}

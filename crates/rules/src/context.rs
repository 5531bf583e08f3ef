use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use voyage_core::Money;

use crate::rule::{ItemKind, MembershipTier};

/// Everything a rule may look at, captured once before evaluation.
///
/// Derived facts that would need a lookup (e.g. "is this the member's first
/// booking?") are precomputed by the caller, so evaluation never does IO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub membership: MembershipTier,
    /// Final (post-discount) amount of the booking under evaluation.
    pub amount: Money,
    /// Kind of each booked item, one entry per item.
    pub items: Vec<ItemKind>,
    pub evaluation_date: NaiveDate,
    pub first_booking: bool,
}

impl EvaluationContext {
    pub fn new(
        membership: MembershipTier,
        amount: Money,
        items: Vec<ItemKind>,
        evaluation_date: NaiveDate,
        first_booking: bool,
    ) -> Self {
        Self {
            membership,
            amount,
            items,
            evaluation_date,
            first_booking,
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn has_item(&self, kind: ItemKind) -> bool {
        self.items.contains(&kind)
    }
}

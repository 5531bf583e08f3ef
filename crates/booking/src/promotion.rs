//! Coupons gated by eligibility rules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use voyage_core::{CouponId, DomainError, DomainResult, Money};
use voyage_rules::{EvaluationContext, EvaluationResult, MembershipTier, Rule, evaluate_with_details, simplify};

use crate::booking::Booking;
use crate::calculations;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CouponDiscount {
    Fixed(Money),
    /// 0..=100.
    Percent(u8),
}

/// A discount and the rule deciding who may use it.
///
/// The rule is simplified once when the coupon is built or deserialized and
/// kept in that form for every later evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CouponDefinition")]
pub struct Coupon {
    id: CouponId,
    code: String,
    rule: Rule,
    discount: CouponDiscount,
}

#[derive(Deserialize)]
struct CouponDefinition {
    id: CouponId,
    code: String,
    rule: Rule,
    discount: CouponDiscount,
}

impl From<CouponDefinition> for Coupon {
    fn from(definition: CouponDefinition) -> Self {
        Coupon::new(definition.id, definition.code, &definition.rule, definition.discount)
    }
}

impl Coupon {
    pub fn new(id: CouponId, code: impl Into<String>, rule: &Rule, discount: CouponDiscount) -> Self {
        Self {
            id,
            code: code.into(),
            rule: simplify(rule),
            discount,
        }
    }

    pub fn id(&self) -> CouponId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// The simplified eligibility rule.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn discount(&self) -> CouponDiscount {
        self.discount
    }

    /// Discount this coupon grants on `total`.
    pub fn discount_for(&self, total: &Money) -> DomainResult<Money> {
        match self.discount {
            CouponDiscount::Fixed(amount) if amount.currency != total.currency => {
                Err(DomainError::currency_mismatch(amount.currency, total.currency))
            }
            CouponDiscount::Fixed(amount) => Ok(amount),
            CouponDiscount::Percent(percent) => {
                Ok(calculations::percent_discount(total, u32::from(percent)))
            }
        }
    }

    /// Evaluate the rule against `context` and explain the outcome.
    pub fn check_eligibility(&self, context: &EvaluationContext) -> EvaluationResult {
        evaluate_with_details(&self.rule, context)
    }
}

/// Snapshot of `booking` and its member for rule evaluation.
pub fn promotion_context(
    booking: &Booking,
    tier: MembershipTier,
    today: NaiveDate,
    is_first_booking: bool,
) -> EvaluationContext {
    EvaluationContext::new(
        tier,
        booking.final_amount(),
        booking.items().iter().map(|item| item.kind()).collect(),
        today,
        is_first_booking,
    )
}

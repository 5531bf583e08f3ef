use serde::{Deserialize, Serialize};

use voyage_core::{MemberId, Validation, combine3};

use crate::error::BookingError;
use crate::item::{BookingItem, validate_items};
use crate::policy::BookingPolicy;

const MAX_COUPON_CODE_LEN: usize = 20;

/// Unchecked booking input, as received from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub member_id: String,
    pub items: Vec<BookingItem>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

/// A request whose fields passed every independent check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBookingRequest {
    pub member_id: MemberId,
    pub items: Vec<BookingItem>,
    /// Normalized to upper case.
    pub coupon_code: Option<String>,
}

impl BookingRequest {
    /// Run every field check and collect all failures.
    pub fn validate(self, policy: &BookingPolicy) -> Validation<ValidBookingRequest, String> {
        combine3(
            validate_member_id(&self.member_id),
            validate_items(self.items, policy.max_items),
            validate_coupon_code(self.coupon_code),
            |member_id, items, coupon_code| ValidBookingRequest {
                member_id,
                items,
                coupon_code,
            },
        )
    }

    pub fn into_valid(self, policy: &BookingPolicy) -> Result<ValidBookingRequest, BookingError> {
        self.validate(policy)
            .to_result_with(BookingError::ValidationFailed)
    }
}

fn validate_member_id(raw: &str) -> Validation<MemberId, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Validation::invalid("member id is required".to_string());
    }
    Validation::from_result(raw.parse::<MemberId>().map_err(|e| e.to_string()))
}

fn validate_coupon_code(code: Option<String>) -> Validation<Option<String>, String> {
    let Some(code) = code else {
        return Validation::valid(None);
    };
    let code = code.trim().to_ascii_uppercase();
    let well_formed = !code.is_empty()
        && code.len() <= MAX_COUPON_CODE_LEN
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    Validation::ensure(Some(code.clone()), well_formed, || {
        format!("coupon code {code:?} must be 1-{MAX_COUPON_CODE_LEN} letters, digits or '-'")
    })
}

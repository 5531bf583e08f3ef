//! Pricing, refund and revenue arithmetic. Pure functions only.

use voyage_core::{Currency, DomainResult, Money};

use crate::booking::Booking;
use crate::item::BookingItem;
use crate::status::BookingPhase;

/// Sum of base prices, in the first item's currency (`0 KRW` for no items).
pub fn total_amount(items: &[BookingItem]) -> DomainResult<Money> {
    let currency = items.first().map(BookingItem::currency).unwrap_or(Currency::Krw);
    items
        .iter()
        .try_fold(Money::zero(currency), |acc, item| acc.add(&item.base_price()?))
}

pub fn final_amount(total: &Money, discount: &Money) -> DomainResult<Money> {
    total.subtract(discount)
}

/// `percent`% of `total`; nothing at 0%, everything from 100% up.
pub fn percent_discount(total: &Money, percent: u32) -> Money {
    match percent {
        0 => Money::zero(total.currency),
        p if p >= 100 => *total,
        p => total.percent(p),
    }
}

/// The larger of a fixed discount and a percentage of `total`.
pub fn best_discount(total: &Money, fixed: &Money, percent: u32) -> DomainResult<Money> {
    let by_percent = percent_discount(total, percent);
    if fixed.is_greater_than(&by_percent)? {
        Ok(*fixed)
    } else {
        Ok(by_percent)
    }
}

/// Share of the paid amount returned when cancelling `days_before_use` days ahead.
pub fn refund_percent(days_before_use: i64) -> u32 {
    match days_before_use {
        d if d >= 7 => 100,
        d if d >= 3 => 70,
        d if d >= 1 => 50,
        _ => 0,
    }
}

pub fn refund_by_days_before_use(paid: &Money, days_before_use: i64) -> Money {
    paid.percent(refund_percent(days_before_use))
}

pub fn no_show_penalty(paid: &Money, penalty_percent: u32) -> Money {
    paid.percent(penalty_percent)
}

fn earns_revenue(booking: &Booking, currency: Currency) -> bool {
    matches!(booking.phase(), BookingPhase::Confirmed | BookingPhase::Completed)
        && booking.final_amount().currency == currency
}

/// Final amounts of confirmed and completed bookings priced in `currency`.
pub fn total_revenue(bookings: &[Booking], currency: Currency) -> DomainResult<Money> {
    bookings
        .iter()
        .filter(|b| earns_revenue(b, currency))
        .try_fold(Money::zero(currency), |acc, b| acc.add(&b.final_amount()))
}

/// Mean of the amounts counted by [`total_revenue`], rounded half-up.
pub fn average_booking_amount(bookings: &[Booking], currency: Currency) -> DomainResult<Money> {
    let count = bookings.iter().filter(|b| earns_revenue(b, currency)).count() as u64;
    if count == 0 {
        return Ok(Money::zero(currency));
    }
    let total = total_revenue(bookings, currency)?;
    Ok(Money::new(total.amount.saturating_add(count / 2) / count, currency))
}

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use voyage_booking::{
    Booking, BookingAction, BookingError, BookingItem, BookingPhase, BookingPolicy, BookingRequest,
    BookingService, BookingStatus, CancelledBy, Coupon, CouponDiscount, InMemoryBookingRepository,
    InMemoryStock, PaymentMethod, RecordingGateway,
};
use voyage_core::{CouponId, Lifecycle, MemberId, Money};
use voyage_rules::{MembershipTier, RuleConfig};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap()
}

fn stay(room_id: &str, nights: u32, nightly_rate: u64) -> BookingItem {
    BookingItem::Accommodation {
        room_id: room_id.to_string(),
        hotel_name: "Seaside Inn".to_string(),
        nights,
        nightly_rate: Money::krw(nightly_rate),
        guests: 2,
    }
}

fn new_booking() -> Booking {
    Booking::create(
        MemberId::new(),
        vec![stay("R-101", 3, 10_000)],
        now(),
        &BookingPolicy::default(),
    )
    .unwrap()
}

#[test]
fn confirming_twice_is_an_invalid_status() {
    let booking = new_booking();
    assert_eq!(booking.total_amount(), Money::krw(30_000));
    assert_eq!(booking.final_amount(), Money::krw(30_000));

    let confirmed = booking.confirm("PAY-001", now() + Duration::minutes(5)).unwrap();
    assert!(matches!(confirmed.status(), BookingStatus::Confirmed { .. }));

    match confirmed.confirm("PAY-002", now() + Duration::minutes(6)) {
        Err(BookingError::InvalidStatus { current, attempted }) => {
            assert_eq!(current, BookingPhase::Confirmed);
            assert_eq!(attempted, BookingAction::Confirm);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn cancellation_refund_depends_on_time_since_confirmation() {
    let policy = BookingPolicy::default();
    let confirmed = new_booking().confirm("PAY-001", now()).unwrap();

    let cancelled = confirmed
        .cancel("schedule change", CancelledBy::Member, now() + Duration::hours(12), &policy)
        .unwrap();
    match cancelled.status() {
        BookingStatus::Cancelled { refund, cancelled_by, .. } => {
            assert_eq!(*refund, Some(confirmed.final_amount()));
            assert_eq!(*cancelled_by, CancelledBy::Member);
        }
        other => panic!("unexpected status: {other:?}"),
    }

    let err = confirmed
        .cancel("schedule change", CancelledBy::Member, now() + Duration::hours(25), &policy)
        .unwrap_err();
    assert!(matches!(err, BookingError::CannotCancel { .. }));
}

#[test]
fn promotion_loaded_from_json_drives_coupon_use() {
    voyage_observability::init();

    let rule = RuleConfig::default()
        .from_json(
            r#"{
                "type": "and",
                "left": { "type": "first_booking" },
                "right": {
                    "type": "or",
                    "left": { "type": "never" },
                    "right": { "type": "minimum_amount", "amount": { "amount": 50000, "currency": "KRW" } }
                }
            }"#,
        )
        .unwrap();
    let coupon = Coupon::new(
        CouponId::new(),
        "WELCOME5",
        &rule,
        CouponDiscount::Fixed(Money::krw(5_000)),
    );

    let service = BookingService::new(
        InMemoryBookingRepository::new(),
        RecordingGateway::new(),
        InMemoryStock::new().with_level("R-101", 3),
        BookingPolicy::default(),
    );
    let request = BookingRequest {
        member_id: MemberId::new().to_string(),
        items: vec![stay("R-101", 2, 30_000)],
        coupon_code: Some("welcome5".to_string()),
    };

    let booking = service.place(request, now()).unwrap();

    let err = service
        .apply_coupon(booking.id(), &coupon, MembershipTier::Bronze, false, now())
        .unwrap_err();
    assert_eq!(err.code(), "COUPON_NOT_APPLICABLE");

    let discounted = service
        .apply_coupon(booking.id(), &coupon, MembershipTier::Bronze, true, now())
        .unwrap();
    assert_eq!(discounted.final_amount(), Money::krw(55_000));

    let method = PaymentMethod::Card {
        last_four: "1111".to_string(),
    };
    let confirmed = service
        .pay_and_confirm(booking.id(), &method, now() + Duration::minutes(1))
        .unwrap();
    assert_eq!(service.gateway().charges()[0].1, Money::krw(55_000));

    let completed = service.complete(confirmed.id(), now() + Duration::days(2)).unwrap();
    assert!(completed.is_final());
}

fn apply(booking: &Booking, action: BookingAction, at: DateTime<Utc>) -> Result<Booking, BookingError> {
    let policy = BookingPolicy::default();
    match action {
        BookingAction::Confirm => booking.confirm("PAY-X", at),
        BookingAction::Cancel => booking.cancel("reason", CancelledBy::System, at, &policy),
        BookingAction::Complete => booking.complete(at),
        BookingAction::MarkNoShow => booking.mark_no_show(at, &policy),
        BookingAction::ApplyDiscount => booking.apply_discount(Money::krw(100), CouponId::new(), at),
        BookingAction::AddItem => {
            let id = format!("R-{}", booking.items().len() + 200);
            booking.add_item(stay(&id, 1, 1_000), at, &policy)
        }
    }
}

fn action_strategy() -> impl Strategy<Value = BookingAction> {
    prop::sample::select(BookingAction::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// Random walks through the lifecycle never panic and never silently
    /// ignore a transition: each step either moves to a new value or is
    /// rejected with `InvalidStatus` when the phase does not allow it.
    #[test]
    fn random_walks_respect_the_transition_table(
        actions in prop::collection::vec(action_strategy(), 1..12),
    ) {
        let mut booking = new_booking();
        let at = now() + Duration::minutes(1);

        for action in actions {
            let phase = booking.phase();
            match apply(&booking, action, at) {
                Ok(next) => {
                    prop_assert!(phase.allows(action));
                    prop_assert_eq!(next.id(), booking.id());
                    booking = next;
                }
                Err(BookingError::InvalidStatus { current, attempted }) => {
                    prop_assert!(!phase.allows(action));
                    prop_assert_eq!(current, phase);
                    prop_assert_eq!(attempted, action);
                }
                Err(BookingError::CouponNotApplicable { .. }) => {
                    prop_assert_eq!(action, BookingAction::ApplyDiscount);
                    prop_assert!(booking.coupon_id().is_some());
                }
                Err(BookingError::ValidationFailed(_)) => {
                    prop_assert_eq!(action, BookingAction::AddItem);
                    prop_assert_eq!(booking.items().len(), BookingPolicy::default().max_items as usize);
                }
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
            prop_assert_eq!(booking.final_amount(), booking.total_amount().subtract(&booking.discount_amount()).unwrap());
        }
    }
}

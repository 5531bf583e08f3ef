//! Booking use cases: load, transition, persist, talk to the gateway.
//!
//! Every use case is the same pipeline over `Result`: the first failure
//! stops it, and collaborator errors are translated into `BookingError`
//! at the boundary.

use chrono::{DateTime, Utc};

use voyage_core::{AggregateRoot, BookingId, Money, ResultExt};
use voyage_rules::MembershipTier;

use crate::booking::Booking;
use crate::error::BookingError;
use crate::item::BookingItem;
use crate::policy::BookingPolicy;
use crate::ports::{BookingRepository, PaymentGateway, PaymentMethod, StockLevels, TransactionId};
use crate::promotion::{Coupon, promotion_context};
use crate::request::BookingRequest;
use crate::status::{BookingAction, CancelledBy};

pub struct BookingService<R, G, I> {
    repository: R,
    gateway: G,
    stock: I,
    policy: BookingPolicy,
}

impl<R, G, I> BookingService<R, G, I>
where
    R: BookingRepository,
    G: PaymentGateway,
    I: StockLevels,
{
    pub fn new(repository: R, gateway: G, stock: I, policy: BookingPolicy) -> Self {
        Self {
            repository,
            gateway,
            stock,
            policy,
        }
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Validate the request, check stock and store a new pending booking.
    pub fn place(&self, request: BookingRequest, now: DateTime<Utc>) -> Result<Booking, BookingError> {
        let placed = request
            .into_valid(&self.policy)
            .flat_map(|valid| {
                self.check_stock(&valid.items)?;
                Booking::create(valid.member_id, valid.items, now, &self.policy)
            })
            .flat_map(|booking| self.save(&booking));

        match &placed {
            Ok(booking) => tracing::info!(
                booking_id = %booking.id(),
                member_id = %booking.member_id(),
                total = %booking.total_amount(),
                "booking placed"
            ),
            Err(e) => tracing::warn!(code = e.code(), "booking rejected: {e}"),
        }
        placed
    }

    /// Charge the final amount and confirm the booking.
    ///
    /// Guards are checked before charging. If the charge cannot be turned
    /// into a stored confirmation it is refunded.
    pub fn pay_and_confirm(
        &self,
        id: BookingId,
        method: &PaymentMethod,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        let booking = self.repository.get(id)?;
        booking
            .ensure_confirmable(now)
            .inspect_err(|e| self.log_rejection(id, BookingAction::Confirm, e))?;

        let amount = booking.final_amount();
        let transaction = self
            .gateway
            .charge(amount, method)
            .map_error(BookingError::from)
            .inspect_err(|e| tracing::warn!(booking_id = %id, code = e.code(), "payment failed: {e}"))?;

        match booking
            .confirm(&transaction.0, now)
            .flat_map(|confirmed| self.save(&confirmed))
        {
            Ok(stored) => {
                tracing::info!(booking_id = %id, transaction_id = %transaction, amount = %amount, "booking confirmed");
                Ok(stored)
            }
            Err(e) => {
                self.reverse_charge(id, &transaction, amount, &e);
                Err(e)
            }
        }
    }

    /// Cancel and, for a confirmed booking, refund through the gateway.
    ///
    /// When the refund fails the booking is put back as it was, so the
    /// cancellation can be retried.
    pub fn cancel(
        &self,
        id: BookingId,
        reason: &str,
        cancelled_by: CancelledBy,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        let booking = self.repository.get(id)?;
        let payment = booking.status().payment_id().map(|p| TransactionId(p.to_string()));

        let cancelled = booking
            .cancel(reason, cancelled_by, now, &self.policy)
            .inspect_err(|e| self.log_rejection(id, BookingAction::Cancel, e))
            .flat_map(|cancelled| self.save(&cancelled))?;

        if let (Some(refund), Some(transaction)) = (cancelled.status().refund(), payment) {
            if !refund.is_zero() {
                match self.gateway.refund(&transaction, refund).map_error(BookingError::from) {
                    Ok(refund_id) => {
                        tracing::info!(booking_id = %id, refund_id = %refund_id, amount = %refund, "refund issued");
                    }
                    Err(e) => {
                        tracing::error!(booking_id = %id, code = e.code(), "refund failed: {e}");
                        self.restore(&booking, &cancelled);
                        return Err(e);
                    }
                }
            }
        }

        tracing::info!(booking_id = %id, cancelled_by = ?cancelled_by, "booking cancelled");
        Ok(cancelled)
    }

    pub fn complete(&self, id: BookingId, now: DateTime<Utc>) -> Result<Booking, BookingError> {
        self.transition(id, BookingAction::Complete, |b| b.complete(now))
    }

    pub fn mark_no_show(&self, id: BookingId, now: DateTime<Utc>) -> Result<Booking, BookingError> {
        self.transition(id, BookingAction::MarkNoShow, |b| b.mark_no_show(now, &self.policy))
    }

    /// Apply `coupon` if its rule admits this booking and member.
    pub fn apply_coupon(
        &self,
        id: BookingId,
        coupon: &Coupon,
        tier: MembershipTier,
        is_first_booking: bool,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        self.transition(id, BookingAction::ApplyDiscount, |booking| {
            let context = promotion_context(booking, tier, now.date_naive(), is_first_booking);
            let verdict = coupon.check_eligibility(&context);
            if !verdict.satisfied {
                return Err(BookingError::CouponNotApplicable {
                    reason: format!("{} ({}): {}", coupon.code(), verdict.rule_label, verdict.reason),
                });
            }
            let discount = coupon.discount_for(&booking.total_amount())?;
            booking.apply_discount(discount, coupon.id(), now)
        })
    }

    fn transition<F>(&self, id: BookingId, action: BookingAction, f: F) -> Result<Booking, BookingError>
    where
        F: FnOnce(&Booking) -> Result<Booking, BookingError>,
    {
        let stored = self
            .repository
            .get(id)
            .flat_map(|booking| f(&booking))
            .inspect_err(|e| self.log_rejection(id, action, e))
            .flat_map(|next| self.save(&next))?;

        tracing::info!(booking_id = %id, action = %action, status = %stored.phase(), "booking updated");
        Ok(stored)
    }

    fn check_stock(&self, items: &[BookingItem]) -> Result<(), BookingError> {
        for item in items {
            let available = self.stock.available(item.product_id());
            if available < item.units() {
                return Err(BookingError::InsufficientStock {
                    product_id: item.product_id().to_string(),
                    requested: item.units(),
                    available,
                });
            }
        }
        Ok(())
    }

    fn save(&self, booking: &Booking) -> Result<Booking, BookingError> {
        self.repository.save(booking).map_error(|e| {
            tracing::warn!(booking_id = %booking.id(), code = e.code(), "save failed: {e}");
            BookingError::from(e)
        })
    }

    fn reverse_charge(&self, id: BookingId, transaction: &TransactionId, amount: Money, cause: &BookingError) {
        match self.gateway.refund(transaction, amount) {
            Ok(refund_id) => tracing::warn!(
                booking_id = %id,
                transaction_id = %transaction,
                refund_id = %refund_id,
                code = cause.code(),
                "charge refunded after failed confirmation"
            ),
            Err(refund_error) => tracing::error!(
                booking_id = %id,
                transaction_id = %transaction,
                code = cause.code(),
                "failed to refund charge after failed confirmation: {refund_error}"
            ),
        }
    }

    /// Store `previous` again on top of `current`.
    fn restore(&self, previous: &Booking, current: &Booking) {
        if let Err(e) = self.save(&previous.with_version(current.version())) {
            tracing::error!(
                booking_id = %previous.id(),
                code = e.code(),
                "booking left cancelled without a refund: {e}"
            );
        }
    }

    fn log_rejection(&self, id: BookingId, action: BookingAction, error: &BookingError) {
        tracing::warn!(booking_id = %id, action = %action, code = error.code(), "transition rejected: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::fixtures::t0;
    use crate::error::GatewayError;
    use crate::in_memory::{InMemoryBookingRepository, InMemoryStock, RecordingGateway};
    use crate::item::fixtures::{flight, room};
    use crate::promotion::CouponDiscount;
    use crate::status::BookingPhase;
    use chrono::Duration;
    use crate::ports::RefundId;
    use std::sync::Mutex;
    use voyage_core::{CouponId, MemberId};
    use voyage_rules::Rule;

    type Service = BookingService<InMemoryBookingRepository, RecordingGateway, InMemoryStock>;

    fn service() -> Service {
        BookingService::new(
            InMemoryBookingRepository::new(),
            RecordingGateway::new(),
            InMemoryStock::new().with_level("R-1", 1).with_level("F-1", 4),
            BookingPolicy::default(),
        )
    }

    fn request() -> BookingRequest {
        BookingRequest {
            member_id: MemberId::new().to_string(),
            items: vec![room("R-1", 2, 50_000), flight("F-1", 100_000, 2)],
            coupon_code: None,
        }
    }

    fn card() -> PaymentMethod {
        PaymentMethod::Card {
            last_four: "4242".to_string(),
        }
    }

    #[test]
    fn place_stores_pending_booking() {
        let svc = service();
        let booking = svc.place(request(), t0()).unwrap();

        assert_eq!(booking.phase(), BookingPhase::Pending);
        assert_eq!(booking.total_amount(), Money::krw(300_000));
        assert_eq!(svc.repository().get(booking.id()).unwrap(), booking);
    }

    #[test]
    fn place_checks_stock_per_product() {
        let svc = service();
        let mut req = request();
        req.items[1] = flight("F-1", 100_000, 5);

        match svc.place(req, t0()) {
            Err(BookingError::InsufficientStock {
                product_id,
                requested,
                available,
            }) => {
                assert_eq!(product_id, "F-1");
                assert_eq!(requested, 5);
                assert_eq!(available, 4);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(svc.repository().list().unwrap().is_empty());
    }

    #[test]
    fn pay_and_confirm_charges_final_amount() {
        let svc = service();
        let booking = svc.place(request(), t0()).unwrap();

        let confirmed = svc
            .pay_and_confirm(booking.id(), &card(), t0() + Duration::minutes(10))
            .unwrap();

        assert_eq!(confirmed.phase(), BookingPhase::Confirmed);
        assert_eq!(confirmed.status().payment_id(), Some("tx-1"));
        assert_eq!(svc.gateway().charges().len(), 1);
        assert_eq!(svc.gateway().charges()[0].1, Money::krw(300_000));
    }

    #[test]
    fn expired_booking_is_never_charged() {
        let svc = service();
        let booking = svc.place(request(), t0()).unwrap();

        let err = svc
            .pay_and_confirm(booking.id(), &card(), t0() + Duration::minutes(31))
            .unwrap_err();
        assert_eq!(err.code(), "PAYMENT_REQUIRED");
        assert!(svc.gateway().charges().is_empty());
    }

    #[test]
    fn gateway_failure_becomes_upstream_error() {
        let svc = service();
        let booking = svc.place(request(), t0()).unwrap();
        svc.gateway().fail_next(GatewayError::CardDeclined {
            reason: "limit exceeded".to_string(),
        });

        let err = svc.pay_and_confirm(booking.id(), &card(), t0()).unwrap_err();
        assert!(matches!(err, BookingError::Upstream(_)));
        assert_eq!(err.code(), "CARD_DECLINED");
        assert_eq!(svc.repository().get(booking.id()).unwrap().phase(), BookingPhase::Pending);
    }

    #[test]
    fn cancel_confirmed_booking_refunds_payment() {
        let svc = service();
        let booking = svc.place(request(), t0()).unwrap();
        svc.pay_and_confirm(booking.id(), &card(), t0()).unwrap();

        let cancelled = svc
            .cancel(booking.id(), "trip postponed", CancelledBy::Member, t0() + Duration::hours(12))
            .unwrap();

        assert_eq!(cancelled.status().refund(), Some(Money::krw(300_000)));
        let refunds = svc.gateway().refunds();
        assert_eq!(refunds.len(), 1);
        assert_eq!(refunds[0].0, TransactionId("tx-1".to_string()));
    }

    #[test]
    fn failed_refund_leaves_booking_confirmed_for_retry() {
        let svc = service();
        let booking = svc.place(request(), t0()).unwrap();
        svc.pay_and_confirm(booking.id(), &card(), t0()).unwrap();
        svc.gateway().fail_next(GatewayError::Unavailable {
            gateway: "psp".to_string(),
            code: "503".to_string(),
            message: "maintenance".to_string(),
        });

        let err = svc
            .cancel(booking.id(), "trip postponed", CancelledBy::Member, t0() + Duration::hours(1))
            .unwrap_err();
        assert!(matches!(err, BookingError::Upstream(_)));
        assert!(svc.gateway().refunds().is_empty());

        let stored = svc.repository().get(booking.id()).unwrap();
        assert_eq!(stored.phase(), BookingPhase::Confirmed);
        assert_eq!(stored.status().refund(), None);

        let cancelled = svc
            .cancel(booking.id(), "trip postponed", CancelledBy::Member, t0() + Duration::hours(2))
            .unwrap();
        assert_eq!(cancelled.phase(), BookingPhase::Cancelled);
        assert_eq!(svc.gateway().refunds(), vec![(TransactionId("tx-1".to_string()), Money::krw(300_000))]);
    }

    /// Approves every charge with a blank reference.
    #[derive(Default)]
    struct BlankReferenceGateway {
        refunds: Mutex<Vec<(TransactionId, Money)>>,
    }

    impl PaymentGateway for BlankReferenceGateway {
        fn charge(&self, _amount: Money, _method: &PaymentMethod) -> Result<TransactionId, GatewayError> {
            Ok(TransactionId(" ".to_string()))
        }

        fn refund(&self, transaction_id: &TransactionId, amount: Money) -> Result<RefundId, GatewayError> {
            self.refunds.lock().unwrap().push((transaction_id.clone(), amount));
            Ok(RefundId("rf-1".to_string()))
        }
    }

    #[test]
    fn rejected_confirmation_refunds_the_charge() {
        let svc = BookingService::new(
            InMemoryBookingRepository::new(),
            BlankReferenceGateway::default(),
            InMemoryStock::new().with_level("R-1", 1).with_level("F-1", 4),
            BookingPolicy::default(),
        );
        let booking = svc.place(request(), t0()).unwrap();

        let err = svc.pay_and_confirm(booking.id(), &card(), t0()).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_FAILED");
        assert_eq!(
            *svc.gateway().refunds.lock().unwrap(),
            vec![(TransactionId(" ".to_string()), Money::krw(300_000))]
        );
        assert_eq!(svc.repository().get(booking.id()).unwrap().phase(), BookingPhase::Pending);
    }

    #[test]
    fn cancel_pending_booking_issues_no_refund() {
        let svc = service();
        let booking = svc.place(request(), t0()).unwrap();

        svc.cancel(booking.id(), "duplicate", CancelledBy::System, t0()).unwrap();
        assert!(svc.gateway().refunds().is_empty());
    }

    #[test]
    fn unknown_booking_is_not_found() {
        let svc = service();
        let err = svc.complete(BookingId::new(), t0()).unwrap_err();
        assert_eq!(err.code(), "BOOKING_NOT_FOUND");
    }

    #[test]
    fn complete_and_no_show_follow_confirmation() {
        let svc = service();
        let a = svc.place(request(), t0()).unwrap();
        assert_eq!(svc.complete(a.id(), t0()).unwrap_err().code(), "INVALID_STATUS");

        svc.pay_and_confirm(a.id(), &card(), t0()).unwrap();
        assert_eq!(svc.complete(a.id(), t0()).unwrap().phase(), BookingPhase::Completed);

        let svc = service();
        let b = svc.place(request(), t0()).unwrap();
        svc.pay_and_confirm(b.id(), &card(), t0()).unwrap();
        let no_show = svc.mark_no_show(b.id(), t0() + Duration::days(3)).unwrap();
        assert_eq!(no_show.phase(), BookingPhase::NoShow);
    }

    #[test]
    fn coupon_applies_when_rule_is_met() {
        let svc = service();
        let booking = svc.place(request(), t0()).unwrap();
        let coupon = Coupon::new(
            CouponId::new(),
            "GOLD10",
            &Rule::membership_is(MembershipTier::Gold)
                .or(Rule::membership_is(MembershipTier::Diamond))
                .and(Rule::item_type_is(voyage_rules::ItemKind::Flight)),
            CouponDiscount::Percent(10),
        );

        let err = svc
            .apply_coupon(booking.id(), &coupon, MembershipTier::Silver, false, t0())
            .unwrap_err();
        assert_eq!(err.code(), "COUPON_NOT_APPLICABLE");
        assert!(err.to_string().contains("GOLD10"));

        let discounted = svc
            .apply_coupon(booking.id(), &coupon, MembershipTier::Gold, false, t0())
            .unwrap();
        assert_eq!(discounted.final_amount(), Money::krw(270_000));
        assert_eq!(discounted.coupon_id(), Some(coupon.id()));
        assert_eq!(discounted.version(), 2);
    }
}

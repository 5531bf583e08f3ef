//! Rule interpreter and algebraic simplifier.
//!
//! All three entry points are plain recursive functions over an immutable
//! tree with exhaustive `match` dispatch.

use serde::Serialize;

use crate::context::EvaluationContext;
use crate::rule::Rule;

/// Outcome of [`evaluate_with_details`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    pub satisfied: bool,
    /// Label of the node that decided the outcome.
    pub rule_label: &'static str,
    /// Human-readable explanation.
    pub reason: String,
}

impl EvaluationResult {
    fn success(rule_label: &'static str) -> Self {
        Self {
            satisfied: true,
            rule_label,
            reason: "condition met".to_string(),
        }
    }

    fn failure(rule_label: &'static str, reason: impl Into<String>) -> Self {
        Self {
            satisfied: false,
            rule_label,
            reason: reason.into(),
        }
    }
}

/// Evaluate `rule` against `context`.
///
/// `And`/`Or` evaluate both children, left first.
pub fn evaluate(rule: &Rule, context: &EvaluationContext) -> bool {
    match rule {
        Rule::And { left, right } => {
            let left = evaluate(left, context);
            let right = evaluate(right, context);
            left && right
        }
        Rule::Or { left, right } => {
            let left = evaluate(left, context);
            let right = evaluate(right, context);
            left || right
        }
        Rule::Not { rule } => !evaluate(rule, context),
        Rule::MembershipIs { tier } => context.membership == *tier,
        Rule::MinimumAmount { amount } => context.amount.is_at_least(amount).unwrap_or(false),
        Rule::DateInRange { start, end } => {
            *start <= context.evaluation_date && context.evaluation_date <= *end
        }
        Rule::ItemTypeIs { kind } => context.has_item(*kind),
        Rule::ItemCountAtLeast { count } => context.item_count() >= *count as usize,
        Rule::FirstBooking => context.first_booking,
        Rule::Always => true,
        Rule::Never => false,
    }
}

/// Evaluate `rule` and explain which sub-condition decided the outcome.
///
/// `And` stops at the first unmet side and `Or` at the first met side; the
/// boolean always agrees with [`evaluate`].
pub fn evaluate_with_details(rule: &Rule, context: &EvaluationContext) -> EvaluationResult {
    match rule {
        Rule::And { left, right } => {
            let left = evaluate_with_details(left, context);
            if !left.satisfied {
                return EvaluationResult::failure("AND", format!("left side not met: {}", left.reason));
            }
            let right = evaluate_with_details(right, context);
            if !right.satisfied {
                return EvaluationResult::failure("AND", format!("right side not met: {}", right.reason));
            }
            EvaluationResult::success("AND")
        }
        Rule::Or { left, right } => {
            if evaluate_with_details(left, context).satisfied {
                return EvaluationResult::success("OR");
            }
            let right = evaluate_with_details(right, context);
            if right.satisfied {
                return EvaluationResult::success("OR");
            }
            EvaluationResult::failure("OR", format!("no side met (last: {})", right.reason))
        }
        Rule::Not { rule } => {
            let inner = evaluate_with_details(rule, context);
            if inner.satisfied {
                EvaluationResult::failure("NOT", format!("negated condition was met ({})", inner.rule_label))
            } else {
                EvaluationResult::success("NOT")
            }
        }
        Rule::MembershipIs { tier } => {
            if context.membership == *tier {
                EvaluationResult::success("membership tier")
            } else {
                EvaluationResult::failure(
                    "membership tier",
                    format!("required {tier}, actual {}", context.membership),
                )
            }
        }
        Rule::MinimumAmount { amount } => match context.amount.is_at_least(amount) {
            Ok(true) => EvaluationResult::success("minimum amount"),
            Ok(false) => EvaluationResult::failure(
                "minimum amount",
                format!("required {amount}, actual {}", context.amount),
            ),
            Err(e) => EvaluationResult::failure("minimum amount", e.to_string()),
        },
        Rule::DateInRange { start, end } => {
            let date = context.evaluation_date;
            if *start <= date && date <= *end {
                EvaluationResult::success("date range")
            } else {
                EvaluationResult::failure("date range", format!("period {start}..={end}, date {date}"))
            }
        }
        Rule::ItemTypeIs { kind } => {
            if context.has_item(*kind) {
                EvaluationResult::success("item type")
            } else {
                EvaluationResult::failure("item type", format!("no {kind} item booked"))
            }
        }
        Rule::ItemCountAtLeast { count } => {
            if context.item_count() >= *count as usize {
                EvaluationResult::success("item count")
            } else {
                EvaluationResult::failure(
                    "item count",
                    format!("required at least {count}, actual {}", context.item_count()),
                )
            }
        }
        Rule::FirstBooking => {
            if context.first_booking {
                EvaluationResult::success("first booking")
            } else {
                EvaluationResult::failure("first booking", "not the member's first booking")
            }
        }
        Rule::Always => EvaluationResult::success("always"),
        Rule::Never => EvaluationResult::failure("never", "this condition is never met"),
    }
}

/// Bottom-up rewrite using the identity, absorbing and double-negation laws.
///
/// Children are simplified first; every rewrite at the current node returns
/// an already simplified child or a leaf, so one pass reaches a fixed point.
pub fn simplify(rule: &Rule) -> Rule {
    match rule {
        Rule::And { left, right } => {
            let left = simplify(left);
            let right = simplify(right);
            match (left, right) {
                (Rule::Always, other) | (other, Rule::Always) => other,
                (Rule::Never, _) | (_, Rule::Never) => Rule::Never,
                (left, right) => left.and(right),
            }
        }
        Rule::Or { left, right } => {
            let left = simplify(left);
            let right = simplify(right);
            match (left, right) {
                (Rule::Always, _) | (_, Rule::Always) => Rule::Always,
                (Rule::Never, other) | (other, Rule::Never) => other,
                (left, right) => left.or(right),
            }
        }
        Rule::Not { rule } => match simplify(rule) {
            Rule::Not { rule } => *rule,
            Rule::Always => Rule::Never,
            Rule::Never => Rule::Always,
            other => other.not(),
        },
        Rule::MembershipIs { .. }
        | Rule::MinimumAmount { .. }
        | Rule::DateInRange { .. }
        | Rule::ItemTypeIs { .. }
        | Rule::ItemCountAtLeast { .. }
        | Rule::FirstBooking
        | Rule::Always
        | Rule::Never => rule.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{ItemKind, MembershipTier};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use voyage_core::{Currency, Money};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn gold_context() -> EvaluationContext {
        EvaluationContext::new(
            MembershipTier::Gold,
            Money::krw(150_000),
            vec![ItemKind::Accommodation, ItemKind::Flight],
            date(2026, 7, 15),
            false,
        )
    }

    fn min(amount: u64) -> Rule {
        Rule::minimum_amount(Money::krw(amount))
    }

    #[test]
    fn leaves_compare_against_context() {
        let ctx = gold_context();

        assert!(evaluate(&Rule::membership_is(MembershipTier::Gold), &ctx));
        assert!(!evaluate(&Rule::membership_is(MembershipTier::Diamond), &ctx));
        assert!(evaluate(&min(150_000), &ctx));
        assert!(!evaluate(&min(150_001), &ctx));
        assert!(evaluate(&Rule::date_in_range(date(2026, 7, 1), date(2026, 7, 15)).unwrap(), &ctx));
        assert!(!evaluate(&Rule::date_in_range(date(2026, 7, 16), date(2026, 8, 1)).unwrap(), &ctx));
        assert!(evaluate(&Rule::item_type_is(ItemKind::Flight), &ctx));
        assert!(!evaluate(&Rule::item_type_is(ItemKind::Package), &ctx));
        assert!(evaluate(&Rule::item_count_at_least(2).unwrap(), &ctx));
        assert!(!evaluate(&Rule::item_count_at_least(3).unwrap(), &ctx));
        assert!(!evaluate(&Rule::first_booking(), &ctx));
        assert!(evaluate(&Rule::always(), &ctx));
        assert!(!evaluate(&Rule::never(), &ctx));
    }

    #[test]
    fn minimum_amount_in_another_currency_is_not_met() {
        let rule = Rule::minimum_amount(Money::new(1, Currency::Usd));
        assert!(!evaluate(&rule, &gold_context()));
        let details = evaluate_with_details(&rule, &gold_context());
        assert!(!details.satisfied);
        assert!(details.reason.contains("currency mismatch"));
    }

    #[test]
    fn composite_rules_combine_children() {
        let ctx = gold_context();
        let vip_flight = Rule::membership_is(MembershipTier::Gold)
            .or(Rule::membership_is(MembershipTier::Diamond))
            .and(Rule::item_type_is(ItemKind::Flight));

        assert!(evaluate(&vip_flight, &ctx));
        assert!(!evaluate(&vip_flight.clone().not(), &ctx));
        assert!(evaluate(&vip_flight.and(Rule::first_booking().not()), &ctx));
    }

    #[test]
    fn details_report_the_deciding_side() {
        let ctx = gold_context();
        let rule = Rule::membership_is(MembershipTier::Gold).and(min(200_000));

        let result = evaluate_with_details(&rule, &ctx);
        assert!(!result.satisfied);
        assert_eq!(result.rule_label, "AND");
        assert!(result.reason.starts_with("right side not met"));
        assert!(result.reason.contains("required 200000 KRW"));

        let result = evaluate_with_details(&Rule::never().and(Rule::always()), &ctx);
        assert!(result.reason.starts_with("left side not met"));

        let result = evaluate_with_details(&Rule::first_booking().or(min(1)), &ctx);
        assert!(result.satisfied);
        assert_eq!(result.rule_label, "OR");
    }

    #[test]
    fn simplification_laws() {
        let r = min(1000);

        assert_eq!(simplify(&Rule::always().and(r.clone())), r);
        assert_eq!(simplify(&r.clone().and(Rule::always())), r);
        assert_eq!(simplify(&Rule::never().and(r.clone())), Rule::Never);
        assert_eq!(simplify(&r.clone().and(Rule::never())), Rule::Never);
        assert_eq!(simplify(&Rule::always().or(r.clone())), Rule::Always);
        assert_eq!(simplify(&r.clone().or(Rule::always())), Rule::Always);
        assert_eq!(simplify(&Rule::never().or(r.clone())), r);
        assert_eq!(simplify(&r.clone().or(Rule::never())), r);
        assert_eq!(simplify(&Rule::always().not()), Rule::Never);
        assert_eq!(simplify(&Rule::never().not()), Rule::Always);

        let gold = Rule::membership_is(MembershipTier::Gold);
        assert_eq!(simplify(&gold.clone().not().not()), gold);
    }

    #[test]
    fn simplification_recurses_before_rewriting() {
        // Not(Not(Always)) collapses to Always, which then absorbs the Or.
        let rule = Rule::first_booking().or(Rule::always().not().not());
        assert_eq!(simplify(&rule), Rule::Always);

        let rule = Rule::all_of(vec![Rule::always(), min(5), Rule::always().and(Rule::first_booking())]);
        assert_eq!(simplify(&rule), min(5).and(Rule::first_booking()));
    }

    #[test]
    fn leaves_are_returned_unchanged() {
        let leaf = Rule::date_in_range(date(2026, 1, 1), date(2026, 12, 31)).unwrap();
        assert_eq!(simplify(&leaf), leaf);
    }

    fn leaf_strategy() -> impl Strategy<Value = Rule> {
        let tier = prop_oneof![
            Just(MembershipTier::Bronze),
            Just(MembershipTier::Silver),
            Just(MembershipTier::Gold),
            Just(MembershipTier::Platinum),
            Just(MembershipTier::Diamond),
        ];
        let kind = prop_oneof![
            Just(ItemKind::Accommodation),
            Just(ItemKind::Flight),
            Just(ItemKind::Package),
        ];
        prop_oneof![
            tier.prop_map(Rule::membership_is),
            (0u64..300_000).prop_map(|a| Rule::minimum_amount(Money::krw(a))),
            (0i64..365, 0i64..60).prop_map(|(offset, len)| {
                let start = date(2026, 1, 1) + chrono::Duration::days(offset);
                Rule::DateInRange { start, end: start + chrono::Duration::days(len) }
            }),
            kind.prop_map(Rule::item_type_is),
            (1u32..5).prop_map(|count| Rule::ItemCountAtLeast { count }),
            Just(Rule::FirstBooking),
            Just(Rule::Always),
            Just(Rule::Never),
        ]
    }

    fn rule_strategy() -> impl Strategy<Value = Rule> {
        leaf_strategy().prop_recursive(6, 64, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(l, r)| l.and(r)),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| l.or(r)),
                inner.prop_map(Rule::not),
            ]
        })
    }

    fn context_strategy() -> impl Strategy<Value = EvaluationContext> {
        (
            prop_oneof![
                Just(MembershipTier::Bronze),
                Just(MembershipTier::Gold),
                Just(MembershipTier::Diamond),
            ],
            0u64..300_000,
            prop::collection::vec(
                prop_oneof![
                    Just(ItemKind::Accommodation),
                    Just(ItemKind::Flight),
                    Just(ItemKind::Package),
                ],
                0..5,
            ),
            0i64..400,
            any::<bool>(),
        )
            .prop_map(|(tier, amount, items, offset, first)| {
                EvaluationContext::new(
                    tier,
                    Money::krw(amount),
                    items,
                    date(2026, 1, 1) + chrono::Duration::days(offset),
                    first,
                )
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        #[test]
        fn simplify_preserves_semantics(rule in rule_strategy(), ctx in context_strategy()) {
            prop_assert_eq!(evaluate(&rule, &ctx), evaluate(&simplify(&rule), &ctx));
        }

        #[test]
        fn details_agree_with_plain_evaluation(rule in rule_strategy(), ctx in context_strategy()) {
            prop_assert_eq!(evaluate(&rule, &ctx), evaluate_with_details(&rule, &ctx).satisfied);
        }

        #[test]
        fn simplify_is_idempotent(rule in rule_strategy()) {
            let once = simplify(&rule);
            prop_assert_eq!(simplify(&once), once.clone());
            prop_assert!(once.size() <= rule.size());
        }

        #[test]
        fn or_never_is_simplified_operand(rule in rule_strategy()) {
            prop_assert_eq!(simplify(&Rule::never().or(rule.clone())), simplify(&rule));
        }
    }
}

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use voyage_core::Money;
use voyage_rules::{EvaluationContext, ItemKind, MembershipTier, Rule, evaluate, simplify};

fn sample_context() -> EvaluationContext {
    EvaluationContext::new(
        MembershipTier::Platinum,
        Money::krw(480_000),
        vec![ItemKind::Accommodation, ItemKind::Flight, ItemKind::Flight],
        NaiveDate::from_ymd_opt(2026, 8, 14).unwrap(),
        false,
    )
}

/// A realistic campaign rule padded with the identity/absorbing noise that
/// generated or hand-edited rule documents tend to accumulate.
fn noisy_rule(layers: usize) -> Rule {
    let core = Rule::membership_is(MembershipTier::Gold)
        .or(Rule::membership_is(MembershipTier::Platinum))
        .and(Rule::minimum_amount(Money::krw(300_000)))
        .and(Rule::item_type_is(ItemKind::Package).not());

    (0..layers).fold(core, |acc, i| {
        if i % 2 == 0 {
            Rule::always().and(acc.not().not())
        } else {
            acc.or(Rule::never())
        }
    })
}

fn bench_evaluate_raw_vs_simplified(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_raw_vs_simplified");
    let ctx = sample_context();

    for layers in [4usize, 16, 64].iter() {
        let raw = noisy_rule(*layers);
        let simplified = simplify(&raw);

        group.bench_with_input(BenchmarkId::new("raw", layers), &raw, |b, rule| {
            b.iter(|| black_box(evaluate(black_box(rule), &ctx)));
        });
        group.bench_with_input(
            BenchmarkId::new("simplified", layers),
            &simplified,
            |b, rule| {
                b.iter(|| black_box(evaluate(black_box(rule), &ctx)));
            },
        );
    }

    group.finish();
}

fn bench_simplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplify");

    for layers in [4usize, 16, 64].iter() {
        let raw = noisy_rule(*layers);
        group.bench_with_input(BenchmarkId::from_parameter(layers), &raw, |b, rule| {
            b.iter(|| black_box(simplify(black_box(rule))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate_raw_vs_simplified, bench_simplify);
criterion_main!(benches);

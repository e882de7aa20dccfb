//! Benchmarks for the recurrence solvers.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use asymptote_core::Expr;
use asymptote_recurrence::{BoundKind, Engine, Guess, Method, RecurrenceModel};

fn divide_model(a: i64, b: i64, d: i64) -> RecurrenceModel {
    RecurrenceModel::divide_and_conquer(a, b)
        .driving(Expr::powi(Expr::n(), d))
        .base_case(1, 1)
        .build()
        .expect("valid model")
}

fn linear_model(order: usize) -> RecurrenceModel {
    let mut builder = RecurrenceModel::linear_homogeneous(vec![1; order]);
    for n in 0..order {
        builder = builder.base_case(i64::try_from(n).expect("small order"), 1);
    }
    builder.build().expect("valid model")
}

fn bench_divide(c: &mut Criterion) {
    let engine = Engine::new();
    let mut group = c.benchmark_group("divide_and_conquer");

    for (a, b, d) in [(2, 2, 1), (3, 2, 1), (8, 2, 2), (1, 2, 1)] {
        let model = divide_model(a, b, d);
        let label = format!("{a}T(n/{b}) + n^{d}");
        for method in [Method::MasterTheorem, Method::Iteration] {
            group.bench_with_input(BenchmarkId::new(method.to_string(), &label), &model, |bench, m| {
                bench.iter(|| black_box(engine.solve(m, method, None)));
            });
        }
    }

    group.finish();
}

fn bench_characteristic(c: &mut Criterion) {
    let engine = Engine::new();
    let mut group = c.benchmark_group("characteristic");

    // order 2 has surd roots, higher orders go through numeric root finding
    for order in [2, 3, 5, 8] {
        let model = linear_model(order);
        group.bench_with_input(BenchmarkId::new("fibonacci_like", order), &model, |bench, m| {
            bench.iter(|| black_box(engine.solve(m, Method::CharacteristicEquation, None)));
        });
    }

    group.finish();
}

fn bench_substitution(c: &mut Criterion) {
    let engine = Engine::new();
    let model = divide_model(2, 2, 1);
    let guess = Guess::new(Expr::n() * Expr::log(2, Expr::n()), BoundKind::Theta);

    c.bench_function("substitution/merge_sort", |bench| {
        bench.iter(|| black_box(engine.solve(&model, Method::Substitution, Some(&guess))));
    });
}

fn bench_compare_methods(c: &mut Criterion) {
    let engine = Engine::new();
    let model = divide_model(2, 2, 1);

    c.bench_function("compare_methods/merge_sort", |bench| {
        bench.iter(|| black_box(engine.compare_methods(&model)));
    });
}

criterion_group!(
    benches,
    bench_divide,
    bench_characteristic,
    bench_substitution,
    bench_compare_methods
);
criterion_main!(benches);

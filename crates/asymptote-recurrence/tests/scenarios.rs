//! End-to-end solving scenarios through the public API.

use std::cmp::Ordering;

use asymptote_core::Expr;
use asymptote_growth::{GrowthOrder, Quantity};
use asymptote_recurrence::{
    classify, compare_growth, solve, solve_auto, BoundKind, Engine, Guess, Method, RecurrenceModel, SolveError,
    SolverOptions, StepKind, SubstitutionStep,
};

fn merge_sort() -> RecurrenceModel {
    RecurrenceModel::divide_and_conquer(2, 2)
        .driving(Expr::n())
        .base_case(1, 1)
        .build()
        .unwrap()
}

#[test]
fn merge_sort_master_case_two() {
    let s = solve(&merge_sort(), Method::MasterTheorem, None);
    assert_eq!(s.bound.unwrap().to_string(), "Θ(n log n)");
    assert!(s
        .steps
        .iter()
        .any(|st| st.kind == StepKind::CaseSelection && st.description.contains("case 2")));
    assert_eq!(s.steps.last().unwrap().kind, StepKind::Conclusion);
}

#[test]
fn arithmetic_series_by_iteration() {
    let m = RecurrenceModel::decrease_and_conquer(1)
        .driving(Expr::n())
        .base_case(0, 0)
        .build()
        .unwrap();
    let s = solve(&m, Method::Iteration, None);
    assert_eq!(s.closed_form.as_deref(), Some("T(n) = n(n + 1)/2"));
    assert_eq!(s.bound.unwrap().order, GrowthOrder::polynomial(2));
}

#[test]
fn fibonacci_by_characteristic_equation() {
    let m = RecurrenceModel::linear_homogeneous([1, 1])
        .base_case(0, 0)
        .base_case(1, 1)
        .build()
        .unwrap();
    let s = solve(&m, Method::CharacteristicEquation, None);
    let roots = s.steps.iter().find(|st| st.kind == StepKind::Roots).unwrap();
    assert_eq!(roots.description, "x = (1 + √5)/2, x = (1 - √5)/2");
    let bound = s.bound.unwrap();
    assert_eq!(bound.kind, BoundKind::Theta);
    assert_eq!(bound.order.to_string(), "((1 + √5)/2)^n");
}

#[test]
fn binary_search_and_halving_sum() {
    let search = RecurrenceModel::divide_and_conquer(1, 2)
        .driving(Expr::one())
        .base_case(1, 1)
        .build()
        .unwrap();
    let s = solve(&search, Method::MasterTheorem, None);
    assert_eq!(s.bound.unwrap().to_string(), "Θ(log n)");

    let halving = RecurrenceModel::divide_and_conquer(1, 2)
        .driving(Expr::n())
        .base_case(1, 1)
        .build()
        .unwrap();
    let s = solve(&halving, Method::MasterTheorem, None);
    assert_eq!(s.bound.unwrap().to_string(), "Θ(n)");
    assert!(s.steps.iter().any(|st| st.kind == StepKind::Regularity));
}

#[test]
fn complex_combination_classification() {
    let m = RecurrenceModel::complex_combination()
        .divide_term(3, 2)
        .divide_term(2, 3)
        .driving(Expr::powi(Expr::n(), 2))
        .base_case(1, 1)
        .build()
        .unwrap();
    let c = classify(&m);
    assert!(!c.is_eligible(Method::MasterTheorem));
    assert!(c.is_eligible(Method::Iteration));

    let s = solve(&m, Method::MasterTheorem, None);
    assert!(s.diagnostic.unwrap().is_structural());
    let s = solve(&m, Method::Iteration, None);
    assert_eq!(s.bound.unwrap().to_string(), "Θ(n^2)");
}

#[test]
fn substitution_accepts_true_class_and_rejects_smaller() {
    let m = merge_sort();
    let tight = Guess::new(Expr::n() * Expr::log(2, Expr::n()), BoundKind::Theta);
    assert!(solve(&m, Method::Substitution, Some(&tight)).is_solved());

    let small = Guess::new(Expr::n(), BoundKind::BigO);
    let s = solve(&m, Method::Substitution, Some(&small));
    assert!(matches!(
        s.diagnostic,
        Some(SolveError::GuessRejected {
            step: SubstitutionStep::InductiveStep,
            ..
        })
    ));
}

#[test]
fn auto_selection_prefers_characteristic_for_linear() {
    let m = RecurrenceModel::linear_homogeneous([2])
        .base_case(0, 1)
        .build()
        .unwrap();
    let s = solve_auto(&m);
    assert_eq!(s.method, Method::CharacteristicEquation);
    assert_eq!(s.bound.unwrap().to_string(), "Θ(2^n)");
}

#[test]
fn methods_compared_in_parallel() {
    let m = RecurrenceModel::linear_homogeneous([2])
        .base_case(0, 1)
        .build()
        .unwrap();
    let results = Engine::new().compare_methods(&m);
    let methods: Vec<Method> = results.iter().map(|s| s.method).collect();
    assert_eq!(methods, vec![Method::Iteration, Method::CharacteristicEquation]);
    let bounds: Vec<String> = results.iter().map(|s| s.bound.as_ref().unwrap().to_string()).collect();
    assert_eq!(bounds, vec!["Θ(2^n)", "Θ(2^n)"]);
}

#[test]
fn equal_inputs_give_equal_solutions() {
    let m = merge_sort();
    assert_eq!(solve_auto(&m), solve_auto(&m));
}

#[test]
fn non_terminating_recursion_is_reported() {
    let m = RecurrenceModel::decrease_and_conquer(2)
        .driving(Expr::one())
        .base_case(0, 1)
        .build()
        .unwrap();
    let s = solve(&m, Method::Iteration, None);
    assert!(matches!(s.diagnostic, Some(SolveError::NonTerminating(_))));
}

#[test]
fn growth_comparison() {
    let quadratic = GrowthOrder::polynomial(2);
    let cubic = GrowthOrder::polynomial(3);
    let exp = GrowthOrder::exponential(Quantity::int(2), Quantity::zero()).unwrap();
    assert_eq!(compare_growth(&quadratic, &cubic), Ok(Ordering::Less));
    assert_eq!(compare_growth(&exp, &cubic), Ok(Ordering::Greater));
}

#[test]
fn options_round_trip_through_json() {
    let options = SolverOptions {
        max_depth: 500,
        tolerance: 1e-6,
        ..SolverOptions::default()
    };
    let json = serde_json::to_string(&options).unwrap();
    let back: SolverOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, options);

    let partial: SolverOptions = serde_json::from_str(r#"{"probe_size": 8}"#).unwrap();
    assert_eq!(partial.probe_size, 8);
    assert_eq!(partial.max_depth, SolverOptions::default().max_depth);
}

#[test]
fn tight_depth_limit_stops_unrolling() {
    let engine = Engine::with_options(SolverOptions {
        max_depth: 10,
        ..SolverOptions::default()
    });
    let m = RecurrenceModel::decrease_and_conquer(1)
        .driving(Expr::n())
        .base_case(0, 0)
        .build()
        .unwrap();
    let s = engine.solve(&m, Method::Iteration, None);
    assert!(matches!(s.diagnostic, Some(SolveError::NonTerminating(_))));
}

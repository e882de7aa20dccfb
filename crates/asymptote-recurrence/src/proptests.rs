//! Property-based tests across solvers.

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use proptest::prelude::*;

    use asymptote_core::Expr;

    use crate::api::{solve, Engine};
    use crate::model::RecurrenceModel;
    use crate::solution::Method;

    fn divide_model(a: i64, b: i64, d: i64) -> RecurrenceModel {
        RecurrenceModel::divide_and_conquer(a, b)
            .driving(Expr::powi(Expr::n(), d))
            .base_case(1, 1)
            .build()
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn master_and_iteration_agree(a in 1i64..=8, b in 2i64..=4, d in 0i64..=3) {
            let model = divide_model(a, b, d);
            let master = solve(&model, Method::MasterTheorem, None);
            let iteration = solve(&model, Method::Iteration, None);
            let (Some(m), Some(i)) = (master.bound, iteration.bound) else {
                return Err(TestCaseError::fail(format!(
                    "unsolved: {:?} / {:?}",
                    master.diagnostic, iteration.diagnostic
                )));
            };
            prop_assert_eq!(m.kind, i.kind);
            prop_assert_eq!(m.order.compare(&i.order), Ok(Ordering::Equal));
        }

        #[test]
        fn solving_is_idempotent(a in 1i64..=8, b in 2i64..=4, d in 0i64..=3) {
            let model = divide_model(a, b, d);
            let engine = Engine::new();
            prop_assert_eq!(engine.solve_auto(&model), engine.solve_auto(&model));
        }

        #[test]
        fn arithmetic_series_is_linear(c in 1i64..=5, t0 in 0i64..=5) {
            // T(n) = T(n - 1) + c, T(0) = t0 has T(n) = c·n + t0
            let model = RecurrenceModel::decrease_and_conquer(1)
                .driving(Expr::int(c))
                .base_case(0, t0)
                .build()
                .unwrap();
            let solution = solve(&model, Method::Iteration, None);
            let evaluated = model.evaluate(20, 100).unwrap();
            #[allow(clippy::cast_precision_loss)]
            let expected = (20 * c + t0) as f64;
            prop_assert!((evaluated - expected).abs() < 1e-9);
            prop_assert!(solution.closed_form.is_some());
            prop_assert_eq!(solution.bound.unwrap().to_string(), "Θ(n)");
        }
    }
}

//! Master Theorem for T(n) = aT(n/b) + f(n).

use std::cmp::Ordering;

use tracing::{debug, trace};

use asymptote_growth::{GrowthOrder, Quantity};
use asymptote_numeric::Rational;

use super::{decide, driving_term, finish, fmt_num, Outcome};
use crate::cas::Algebra;
use crate::error::SolveError;
use crate::model::{Family, RecurrenceModel};
use crate::options::SolverOptions;
use crate::solution::{Bound, Method, Solution, StepKind, Trace};

/// Compares f(n) with n^(log_b a) and picks one of the three cases.
pub struct MasterTheoremSolver<'a, A: Algebra> {
    algebra: &'a A,
    options: &'a SolverOptions,
}

impl<'a, A: Algebra> MasterTheoremSolver<'a, A> {
    /// Creates a solver over the given backend.
    #[must_use]
    pub fn new(algebra: &'a A, options: &'a SolverOptions) -> Self {
        Self { algebra, options }
    }

    /// Solves `model`, reporting failure through the diagnostic.
    #[must_use]
    pub fn solve(&self, model: &RecurrenceModel) -> Solution {
        let mut trace = Trace::default();
        let result = self.run(model, &mut trace);
        finish(Method::MasterTheorem, trace, result)
    }

    fn run(&self, model: &RecurrenceModel, trace: &mut Trace) -> Result<Outcome, SolveError> {
        if model.family() != Family::DivideAndConquer {
            return Err(SolveError::inapplicable(format!(
                "the Master Theorem needs T(n) = aT(n/b) + f(n), not a {} recurrence",
                model.family()
            )));
        }
        let (Some(a), Some(b)) = (model.subproblem_count(), model.reduction_factor()) else {
            return Err(SolveError::inapplicable("the Master Theorem needs exactly one recursive term"));
        };
        let Some(a) = a.as_exact() else {
            return Err(SolveError::inapplicable(format!("a = {a} is symbolic")));
        };

        trace.push(StepKind::Setup, format!("{model} with a = {a}, b = {b}"));
        let critical = Quantity::log(a, b).ok_or_else(|| SolveError::invalid(format!("log_{b}({a}) is undefined")))?;
        trace.push(
            StepKind::CriticalExponent,
            format!("log_{}({a}) = {critical}, so n^(log_b a) = {}", b, GrowthOrder::polynomial(critical.clone())),
        );
        debug!(a = %a, b = %b, critical = %critical, "master theorem");

        let watershed = GrowthOrder::polynomial(critical.clone());
        let Some(f) = driving_term(self.algebra, model)? else {
            trace.push(StepKind::CaseSelection, "f(n) = 0 is O(n^(log_b a - ε)): case 1");
            return Ok(Outcome::bound(Bound::theta(watershed)));
        };
        let f_order = f.order;
        trace.push(
            StepKind::Comparison,
            format!("f(n) = {} = Θ({f_order}) against n^(log_b a) = {watershed}", model.driving_function()),
        );

        match f_order.poly_log_params() {
            Some((d, k)) => match decide(&d, &critical)? {
                Ordering::Less => {
                    let epsilon = critical.sub(&d);
                    trace.push(
                        StepKind::CaseSelection,
                        format!("f(n) = O(n^({critical} - ε)) with ε = {epsilon} > 0: case 1"),
                    );
                    trace!(case = 1, "f is polynomially smaller");
                    Ok(Outcome::bound(Bound::theta(watershed)))
                }
                Ordering::Equal => {
                    if k.signum().ok_or_else(|| super::incomparable(&k, 0))? == Ordering::Less {
                        return Err(SolveError::inapplicable(format!(
                            "f(n) = Θ({f_order}) has a negative log power and falls between cases 1 and 2"
                        )));
                    }
                    let result = GrowthOrder::poly_log(critical.clone(), k.add(&Quantity::one()));
                    trace.push(
                        StepKind::CaseSelection,
                        format!("f(n) = Θ(n^(log_b a) · log^k n) with k = {k} ≥ 0: case 2"),
                    );
                    trace!(case = 2, "f matches the watershed");
                    Ok(Outcome::bound(Bound::theta(result)))
                }
                Ordering::Greater => {
                    let epsilon = d.sub(&critical);
                    trace.push(
                        StepKind::CaseSelection,
                        format!("f(n) = Ω(n^({critical} + ε)) with ε = {epsilon} > 0: case 3"),
                    );
                    let limit = a.to_f64() / b.to_f64().powf(d.to_f64().unwrap_or(f64::NAN));
                    self.regularity(model, a, b, limit, trace)?;
                    trace!(case = 3, "f dominates");
                    Ok(Outcome::bound(Bound::theta(f_order)))
                }
            },
            None => match f_order {
                GrowthOrder::Exponential { .. } | GrowthOrder::Factorial => {
                    trace.push(
                        StepKind::CaseSelection,
                        format!("f(n) = Θ({f_order}) dominates every power of n: case 3"),
                    );
                    self.regularity(model, a, b, 0.0, trace)?;
                    Ok(Outcome::bound(Bound::theta(f_order)))
                }
                other => Err(SolveError::inapplicable(format!("cannot compare f(n) = Θ({other}) with n^(log_b a)"))),
            },
        }
    }

    /// Checks a·f(n/b) ≤ c·f(n) for some c < 1 at sample sizes n = 2^4,
    /// 2^5, ... and in the limit.
    fn regularity(
        &self,
        model: &RecurrenceModel,
        a: &Rational,
        b: &Rational,
        limit: f64,
        trace: &mut Trace,
    ) -> Result<(), SolveError> {
        let f = model.driving_function();
        let (a, b) = (a.to_f64(), b.to_f64());

        let ratios: Vec<f64> = (0..self.options.regularity_samples)
            .filter_map(|i| {
                let n = 2f64.powi(i32::try_from(i + 4).ok()?);
                let whole = f.eval(n)?;
                let part = f.eval(n / b)?;
                let ratio = a * part / whole;
                (whole > 0.0 && ratio.is_finite()).then_some(ratio)
            })
            .collect();

        let worst = ratios.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        debug!(samples = ratios.len(), worst, limit, "regularity check");

        if ratios.is_empty() || !limit.is_finite() || limit >= 1.0 || worst >= 1.0 {
            trace.push(
                StepKind::Regularity,
                format!(
                    "a·f(n/b)/f(n) tends to {} and reaches {} on the samples; no c < 1 bounds it",
                    fmt_num(limit),
                    fmt_num(worst)
                ),
            );
            return Err(SolveError::inapplicable("the regularity condition a·f(n/b) ≤ c·f(n), c < 1, fails"));
        }

        trace.push(
            StepKind::Regularity,
            format!(
                "a·f(n/b) ≤ c·f(n) holds with c = {} < 1 (the ratio tends to {})",
                fmt_num(worst),
                fmt_num(limit)
            ),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use asymptote_core::Expr;

    use super::*;
    use crate::cas::NativeAlgebra;

    fn solve(model: &RecurrenceModel) -> Solution {
        let options = SolverOptions::default();
        MasterTheoremSolver::new(&NativeAlgebra, &options).solve(model)
    }

    fn dc(a: i64, b: i64, f: Expr) -> RecurrenceModel {
        RecurrenceModel::divide_and_conquer(a, b)
            .driving(f)
            .base_case(1, 1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_case_1() {
        let s = solve(&dc(8, 2, Expr::powi(Expr::n(), 2)));
        assert_eq!(s.bound.unwrap().to_string(), "Θ(n^3)");
    }

    #[test]
    fn test_case_2_merge_sort() {
        let s = solve(&dc(2, 2, Expr::n()));
        assert_eq!(s.bound.unwrap().to_string(), "Θ(n log n)");
        assert!(s.steps.iter().any(|st| st.kind == StepKind::CaseSelection && st.description.contains("case 2")));
    }

    #[test]
    fn test_case_2_binary_search() {
        let s = solve(&dc(1, 2, Expr::one()));
        assert_eq!(s.bound.unwrap().to_string(), "Θ(log n)");
    }

    #[test]
    fn test_case_3_with_regularity() {
        let s = solve(&dc(1, 2, Expr::n()));
        assert_eq!(s.bound.unwrap().to_string(), "Θ(n)");
        assert!(s.steps.iter().any(|st| st.kind == StepKind::Regularity));
    }

    #[test]
    fn test_irrational_exponent() {
        let s = solve(&dc(3, 2, Expr::n()));
        assert_eq!(s.bound.unwrap().to_string(), "Θ(n^(log_2 3))");
    }

    #[test]
    fn test_gap_between_cases() {
        let f = Expr::n() / Expr::log(2, Expr::n());
        let s = solve(&dc(2, 2, f));
        assert!(matches!(s.diagnostic, Some(SolveError::MethodInapplicable(_))));
    }

    #[test]
    fn test_rejects_other_families() {
        let m = RecurrenceModel::decrease_and_conquer(1)
            .driving(Expr::n())
            .base_case(0, 0)
            .build()
            .unwrap();
        let s = solve(&m);
        assert!(!s.is_solved());
        assert!(s.diagnostic.unwrap().is_structural());
    }
}

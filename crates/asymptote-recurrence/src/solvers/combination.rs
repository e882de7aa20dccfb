//! Recurrences with several recursive terms.
//!
//! Divide-only combinations go through the Akra–Bazzi exponent p with
//! Σ aᵢ·bᵢ^(−p) = 1; decrease-only combinations through the dominant root
//! of their characteristic polynomial.

use std::cmp::Ordering;

use tracing::debug;

use asymptote_growth::{GrowthOrder, Quantity};
use asymptote_numeric::Rational;

use super::iteration::probe_termination;
use super::{
    characteristic_polynomial, decide, dominant, driving_term, exponential_with_driving, level_rule, root_magnitude,
    summed_growth, Outcome,
};
use crate::cas::Algebra;
use crate::error::SolveError;
use crate::model::{RecurrenceModel, Reduction};
use crate::options::SolverOptions;
use crate::solution::{Bound, StepKind, Trace};

const BISECTION_STEPS: usize = 200;
const MAX_EXPONENT_DENOMINATOR: i64 = 12;

pub(crate) fn solve<A: Algebra>(
    algebra: &A,
    options: &SolverOptions,
    model: &RecurrenceModel,
    trace: &mut Trace,
) -> Result<Outcome, SolveError> {
    if !model.is_concrete() {
        return Err(SolveError::inapplicable("several recursive terms with symbolic coefficients"));
    }
    let terms = model.terms();
    if terms.iter().all(|t| t.reduction.is_divide()) {
        divide_terms(algebra, options, model, trace)
    } else if terms.iter().all(|t| !t.reduction.is_divide()) {
        decrease_terms(algebra, options, model, trace)
    } else {
        Err(SolveError::inapplicable("cannot unroll a mix of n/b and n − d terms"))
    }
}

fn divide_terms<A: Algebra>(
    algebra: &A,
    options: &SolverOptions,
    model: &RecurrenceModel,
    trace: &mut Trace,
) -> Result<Outcome, SolveError> {
    let pairs: Vec<(Rational, Rational)> = model
        .terms()
        .iter()
        .filter_map(|t| match (&t.coefficient, &t.reduction) {
            (Quantity::Exact(a), Reduction::Divide(b)) => Some((a.clone(), b.clone())),
            _ => None,
        })
        .collect();

    let n0 = probe_termination(model, options)?;
    trace.push(
        StepKind::Unrolling,
        format!(
            "each node of the recursion tree splits into {} subproblems of different sizes",
            pairs.len()
        ),
    );
    trace.push(StepKind::Termination, format!("every branch reaches the base case T({n0})"));

    let p = akra_bazzi_exponent(&pairs)?;
    trace.push(StepKind::CriticalExponent, format!("Σ aᵢ·bᵢ^(-p) = 1 gives p = {p}"));
    debug!(p = %p, terms = pairs.len(), "akra-bazzi exponent");

    let Some(f) = driving_term(algebra, model)? else {
        return Ok(Outcome::bound(Bound::theta(GrowthOrder::polynomial(p))));
    };
    let order = level_rule(&p, &f.order)?;
    trace.push(
        StepKind::Summation,
        format!(
            "T(n) = Θ(n^p·(1 + ∫₁ⁿ f(u)/u^(p+1) du)) with f(n) = Θ({}) gives Θ({order})",
            f.order
        ),
    );
    Ok(Outcome::bound(Bound::theta(order)))
}

fn decrease_terms<A: Algebra>(
    algebra: &A,
    options: &SolverOptions,
    model: &RecurrenceModel,
    trace: &mut Trace,
) -> Result<Outcome, SolveError> {
    let coefficients = model
        .characteristic_coefficients()
        .ok_or_else(|| SolveError::inapplicable("decrease terms need rational coefficients"))?;
    let n0 = probe_termination(model, options)?;
    trace.push(StepKind::Termination, format!("every chain of calls reaches a base case at or below T({n0})"));

    let poly = characteristic_polynomial(&coefficients);
    trace.push(
        StepKind::CharacteristicPolynomial,
        format!("the homogeneous part has characteristic polynomial {}", poly.to_string_in("x")),
    );
    let roots = algebra.solve_polynomial(&poly, options.root_max_iterations);
    let top = roots
        .first()
        .ok_or_else(|| SolveError::invalid("the characteristic polynomial has no roots"))?;
    let r = root_magnitude(top);
    let m = top.multiplicity;
    trace.push(
        StepKind::Roots,
        format!("dominant root {top} with multiplicity {m}"),
    );

    let f = driving_term(algebra, model)?.map(|t| t.order);
    let result = match decide(&r, &Quantity::one())? {
        Ordering::Greater => Bound::theta(exponential_with_driving(&r, m, f.as_ref())?),
        Ordering::Equal => {
            let homogeneous = GrowthOrder::polynomial(i64::from(m) - 1);
            match f {
                Some(order) => {
                    let mut summed = order;
                    for _ in 0..m {
                        summed = summed_growth(&summed)?;
                    }
                    Bound::theta(dominant(summed, homogeneous)?)
                }
                None => Bound::theta(homogeneous),
            }
        }
        Ordering::Less => match f {
            Some(order) => Bound::theta(order),
            None => Bound::big_o(GrowthOrder::Constant),
        },
    };
    trace.push(StepKind::Summation, format!("the dominant root |x| = {r} gives {result}"));
    Ok(Outcome::bound(result))
}

/// Solves Σ aᵢ·bᵢ^(−p) = 1 for p.
///
/// The left side is strictly decreasing in p, so bisection converges; the
/// result is returned exactly when it is a rational with a small
/// denominator.
pub(crate) fn akra_bazzi_exponent(pairs: &[(Rational, Rational)]) -> Result<Quantity, SolveError> {
    if let [(a, b)] = pairs {
        return Quantity::log(a, b).ok_or_else(|| SolveError::invalid(format!("log_{b}({a}) is undefined")));
    }

    let weights: Vec<(f64, f64)> = pairs.iter().map(|(a, b)| (a.to_f64(), b.to_f64().ln())).collect();
    let g = |p: f64| weights.iter().map(|(a, ln_b)| a * (-p * ln_b).exp()).sum::<f64>() - 1.0;

    let mut lo = 0.0;
    let mut hi = 1.0;
    for _ in 0..64 {
        if g(lo) >= 0.0 {
            break;
        }
        lo -= 1.0;
    }
    for _ in 0..64 {
        if g(hi) <= 0.0 {
            break;
        }
        hi *= 2.0;
    }
    if g(lo) < 0.0 || g(hi) > 0.0 {
        return Err(SolveError::inapplicable("cannot bracket the Akra–Bazzi exponent"));
    }

    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        if g(mid) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let p = 0.5 * (lo + hi);

    for q in 1..=MAX_EXPONENT_DENOMINATOR {
        #[allow(clippy::cast_precision_loss)]
        let scaled = p * q as f64;
        let num = scaled.round();
        if (scaled - num).abs() > 1e-9 {
            continue;
        }
        #[allow(clippy::cast_possible_truncation)]
        let candidate = Rational::new(num as i64, q);
        if satisfies_exactly(pairs, &candidate) != Some(false) && g(candidate.to_f64()).abs() < 1e-12 {
            return Ok(Quantity::Exact(candidate));
        }
    }
    Ok(Quantity::real(p, format!("{p:.6}")))
}

/// Exact check of Σ aᵢ·bᵢ^(−p) = 1 for integer p; `None` otherwise.
fn satisfies_exactly(pairs: &[(Rational, Rational)], p: &Rational) -> Option<bool> {
    let p = p.to_i64()?;
    let mut total = Rational::zero();
    for (a, b) in pairs {
        total = &total + &(a * &b.powi(-p)?);
    }
    Some(total.is_one())
}

#[cfg(test)]
mod tests {
    use asymptote_core::Expr;

    use super::*;
    use crate::cas::NativeAlgebra;

    fn run(model: &RecurrenceModel) -> Result<Outcome, SolveError> {
        let mut trace = Trace::default();
        solve(&NativeAlgebra, &SolverOptions::default(), model, &mut trace)
    }

    #[test]
    fn test_exact_exponent() {
        let pairs = [
            (Rational::one(), Rational::from(3)),
            (Rational::one(), Rational::new(3, 2)),
        ];
        assert_eq!(akra_bazzi_exponent(&pairs).unwrap(), Quantity::one());
    }

    #[test]
    fn test_numeric_exponent() {
        let pairs = [(Rational::one(), Rational::from(2)), (Rational::one(), Rational::from(4))];
        let p = akra_bazzi_exponent(&pairs).unwrap().to_f64().unwrap();
        // 2^(-p) = 1/φ
        assert!((p - 0.694_241_913_63).abs() < 1e-9);
    }

    #[test]
    fn test_unbalanced_split() {
        let m = RecurrenceModel::complex_combination()
            .divide_term(1, 3)
            .divide_term(1, Rational::new(3, 2))
            .driving(Expr::n())
            .base_case(1, 1)
            .build()
            .unwrap();
        assert_eq!(run(&m).unwrap().bound.to_string(), "Θ(n log n)");
    }

    #[test]
    fn test_driving_dominates() {
        let m = RecurrenceModel::complex_combination()
            .divide_term(3, 2)
            .divide_term(2, 3)
            .driving(Expr::powi(Expr::n(), 2))
            .base_case(1, 1)
            .build()
            .unwrap();
        assert_eq!(run(&m).unwrap().bound.to_string(), "Θ(n^2)");
    }

    #[test]
    fn test_fibonacci_like() {
        let m = RecurrenceModel::complex_combination()
            .decrease_term(1, 1)
            .decrease_term(1, 2)
            .driving(Expr::one())
            .base_case(0, 1)
            .base_case(1, 1)
            .build()
            .unwrap();
        assert_eq!(run(&m).unwrap().bound.to_string(), "Θ(((1 + √5)/2)^n)");
    }

    #[test]
    fn test_mixed_terms() {
        let m = RecurrenceModel::complex_combination()
            .divide_term(1, 2)
            .decrease_term(1, 1)
            .base_case(0, 1)
            .base_case(1, 1)
            .build()
            .unwrap();
        assert!(run(&m).unwrap_err().is_structural());
    }
}

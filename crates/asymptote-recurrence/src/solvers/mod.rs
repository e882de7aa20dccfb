//! The four solving methods.
//!
//! Each solver borrows the [`Algebra`] backend and the shared
//! [`SolverOptions`], records a derivation while it runs and returns a
//! [`Solution`]. Failures never escape as `Err`: they end up in
//! [`Solution::diagnostic`] next to the steps completed so far.

mod characteristic;
mod combination;
mod iteration;
mod master;
mod substitution;

use std::cmp::Ordering;

use tracing::{debug, warn};

use asymptote_growth::{GrowthError, GrowthOrder, LeadingTerm, Quantity};
use asymptote_numeric::Rational;
use asymptote_poly::{DensePoly, Root};

pub use characteristic::CharacteristicSolver;
pub use iteration::IterationSolver;
pub use master::MasterTheoremSolver;
pub use substitution::SubstitutionSolver;

use crate::cas::Algebra;
use crate::error::SolveError;
use crate::model::RecurrenceModel;
use crate::solution::{Bound, Method, Solution, StepKind, Trace};

/// What a successful solver run produces besides its steps.
#[derive(Debug)]
pub(crate) struct Outcome {
    pub(crate) bound: Bound,
    pub(crate) closed_form: Option<String>,
}

impl Outcome {
    pub(crate) fn bound(bound: Bound) -> Self {
        Self {
            bound,
            closed_form: None,
        }
    }

    pub(crate) fn exact(bound: Bound, closed_form: String) -> Self {
        Self {
            bound,
            closed_form: Some(closed_form),
        }
    }
}

/// Closes a derivation: a conclusion step on success, a diagnostic on
/// failure.
pub(crate) fn finish(method: Method, mut trace: Trace, result: Result<Outcome, SolveError>) -> Solution {
    match result {
        Ok(Outcome { bound, closed_form }) => {
            debug!(method = %method, bound = %bound, exact = closed_form.is_some(), "solved");
            let conclusion = match &closed_form {
                Some(form) => format!("{form}, so T(n) = {bound}"),
                None => format!("T(n) = {bound}"),
            };
            trace.push(StepKind::Conclusion, conclusion);
            trace.solved(method, bound, closed_form)
        }
        Err(err) => {
            if err.is_structural() {
                debug!(method = %method, error = %err, "method not applicable");
            } else {
                warn!(method = %method, error = %err, "solver failed");
            }
            Solution::failed(method, trace.into_steps(), err)
        }
    }
}

/// Leading term of f(n), or `None` when f ≡ 0.
pub(crate) fn driving_term<A: Algebra>(algebra: &A, model: &RecurrenceModel) -> Result<Option<LeadingTerm>, SolveError> {
    let f = model.driving_function();
    if f.is_zero() {
        return Ok(None);
    }
    algebra.leading_term(f).map(Some).map_err(SolveError::from_growth)
}

pub(crate) fn incomparable(left: impl ToString, right: impl ToString) -> SolveError {
    SolveError::IncomparableGrowth(GrowthError::Incomparable {
        left: left.to_string(),
        right: right.to_string(),
    })
}

/// Orders two parameters, failing when they cannot be decided.
pub(crate) fn decide(a: &Quantity, b: &Quantity) -> Result<Ordering, SolveError> {
    a.compare(b).ok_or_else(|| incomparable(a, b))
}

/// Growth of Σ_{i=0}^{log_b n} a^i f(n/b^i) when n^e = a^(log_b n).
pub(crate) fn level_rule(exponent: &Quantity, f: &GrowthOrder) -> Result<GrowthOrder, SolveError> {
    let Some((d, k)) = f.poly_log_params() else {
        return match f {
            GrowthOrder::Symbolic(name) => Err(SolveError::inapplicable(format!("no growth rule for f(n) = Θ({name})"))),
            // exponential and factorial f dominate the root level
            _ => Ok(f.clone()),
        };
    };

    Ok(match decide(&d, exponent)? {
        Ordering::Less => GrowthOrder::polynomial(exponent.clone()),
        Ordering::Greater => f.clone(),
        Ordering::Equal => match decide(&k, &Quantity::int(-1))? {
            Ordering::Greater => GrowthOrder::poly_log(exponent.clone(), k.add(&Quantity::one())),
            Ordering::Equal if exponent.is_zero() => GrowthOrder::Symbolic("log log n".into()),
            Ordering::Equal => GrowthOrder::Symbolic(format!("{} log log n", GrowthOrder::polynomial(exponent.clone()))),
            Ordering::Less => GrowthOrder::polynomial(exponent.clone()),
        },
    })
}

/// Growth of Σ_{j ≤ n} f(j).
pub(crate) fn summed_growth(f: &GrowthOrder) -> Result<GrowthOrder, SolveError> {
    let Some((d, k)) = f.poly_log_params() else {
        return match f {
            GrowthOrder::Symbolic(name) => Err(SolveError::inapplicable(format!("cannot sum f(n) = Θ({name})"))),
            _ => Ok(f.clone()),
        };
    };

    let minus_one = Quantity::int(-1);
    Ok(match decide(&d, &minus_one)? {
        Ordering::Greater => GrowthOrder::poly_log(d.add(&Quantity::one()), k),
        Ordering::Less => GrowthOrder::Constant,
        Ordering::Equal => match decide(&k, &minus_one)? {
            Ordering::Greater => GrowthOrder::poly_log(Quantity::zero(), k.add(&Quantity::one())),
            Ordering::Equal => GrowthOrder::Symbolic("log log n".into()),
            Ordering::Less => GrowthOrder::Constant,
        },
    })
}

/// The larger of two growth classes.
pub(crate) fn dominant(a: GrowthOrder, b: GrowthOrder) -> Result<GrowthOrder, SolveError> {
    match a.compare(&b).map_err(SolveError::from_growth)? {
        Ordering::Less => Ok(b),
        _ => Ok(a),
    }
}

/// Growth of c^n-type homogeneous behavior, base `base` > 1 repeated
/// `multiplicity` times, once f(n) is added at every level.
pub(crate) fn exponential_with_driving(
    base: &Quantity,
    multiplicity: u32,
    f: Option<&GrowthOrder>,
) -> Result<GrowthOrder, SolveError> {
    let homogeneous = GrowthOrder::exponential(base.clone(), Quantity::int(i64::from(multiplicity) - 1))
        .map_err(SolveError::from_growth)?;
    match f {
        None => Ok(homogeneous),
        Some(GrowthOrder::Exponential { base: fb, degree }) => Ok(match decide(fb, base)? {
            Ordering::Less => homogeneous,
            Ordering::Greater => GrowthOrder::Exponential {
                base: fb.clone(),
                degree: degree.clone(),
            },
            Ordering::Equal => GrowthOrder::Exponential {
                base: base.clone(),
                degree: degree.add(&Quantity::from(i64::from(multiplicity))),
            },
        }),
        Some(GrowthOrder::Factorial) => Ok(GrowthOrder::Factorial),
        Some(GrowthOrder::Symbolic(name)) => Err(SolveError::inapplicable(format!("cannot sum f(n) = Θ({name})"))),
        Some(_) => Ok(homogeneous),
    }
}

/// x^k − c₁x^(k−1) − … − c_k.
pub(crate) fn characteristic_polynomial(coefficients: &[Rational]) -> DensePoly<Rational> {
    let k = coefficients.len();
    let mut coeffs = vec![Rational::zero(); k + 1];
    coeffs[k] = Rational::one();
    for (j, c) in coefficients.iter().enumerate() {
        coeffs[k - 1 - j] = -c;
    }
    DensePoly::new(coeffs)
}

/// |r| as a growth parameter, keeping the exact form when there is one.
pub(crate) fn root_magnitude(root: &Root) -> Quantity {
    if let Some(r) = root.as_rational() {
        return Quantity::Exact(r.abs());
    }
    if root.is_real() && root.value.re > 0.0 {
        Quantity::real(root.magnitude(), root.to_string())
    } else {
        Quantity::real(root.magnitude(), format!("|{root}|"))
    }
}

/// Short decimal form: integers without a fractional part, others to four
/// places.
pub(crate) fn fmt_num(x: f64) -> String {
    if (x - x.round()).abs() < 1e-9 {
        return format!("{:.0}", x.round());
    }
    let s = format!("{x:.4}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_rule() {
        let one = Quantity::one();
        assert_eq!(level_rule(&one, &GrowthOrder::Constant).unwrap(), GrowthOrder::polynomial(1));
        assert_eq!(
            level_rule(&one, &GrowthOrder::polynomial(1)).unwrap(),
            GrowthOrder::poly_log(Quantity::one(), Quantity::one())
        );
        assert_eq!(level_rule(&one, &GrowthOrder::polynomial(2)).unwrap(), GrowthOrder::polynomial(2));
        let zero = Quantity::zero();
        assert_eq!(level_rule(&zero, &GrowthOrder::Constant).unwrap(), GrowthOrder::Logarithmic);
    }

    #[test]
    fn test_level_rule_log_log() {
        let f = GrowthOrder::poly_log(Quantity::one(), Quantity::int(-1));
        assert_eq!(
            level_rule(&Quantity::one(), &f).unwrap(),
            GrowthOrder::Symbolic("n log log n".into())
        );
    }

    #[test]
    fn test_summed_growth() {
        assert_eq!(summed_growth(&GrowthOrder::polynomial(1)).unwrap(), GrowthOrder::polynomial(2));
        assert_eq!(summed_growth(&GrowthOrder::Constant).unwrap(), GrowthOrder::polynomial(1));
        assert_eq!(summed_growth(&GrowthOrder::polynomial(-1)).unwrap(), GrowthOrder::Logarithmic);
        assert_eq!(summed_growth(&GrowthOrder::polynomial(-2)).unwrap(), GrowthOrder::Constant);
        let harmonic_log = GrowthOrder::poly_log(Quantity::int(-1), Quantity::int(-1));
        assert_eq!(summed_growth(&harmonic_log).unwrap(), GrowthOrder::Symbolic("log log n".into()));
    }

    #[test]
    fn test_exponential_with_driving() {
        let two = Quantity::int(2);
        let hom = exponential_with_driving(&two, 1, Some(&GrowthOrder::polynomial(3))).unwrap();
        assert_eq!(hom.to_string(), "2^n");
        let same_base = GrowthOrder::exponential(Quantity::int(2), Quantity::zero()).unwrap();
        let resonant = exponential_with_driving(&two, 1, Some(&same_base)).unwrap();
        assert_eq!(resonant.to_string(), "n·2^n");
        let faster = GrowthOrder::exponential(Quantity::int(3), Quantity::zero()).unwrap();
        assert_eq!(exponential_with_driving(&two, 1, Some(&faster)).unwrap(), faster);
    }

    #[test]
    fn test_characteristic_polynomial() {
        let p = characteristic_polynomial(&[Rational::one(), Rational::one()]);
        assert_eq!(p.to_string_in("x"), "x^2 - x - 1");
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(2.0), "2");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(1.0 / 3.0), "0.3333");
    }
}

//! Leading-term analysis of expressions in `n`.
//!
//! [`analyze`] reduces an [`Expr`] to its dominant term `c · g(n)` where `g`
//! is a canonical [`GrowthOrder`]. Logarithms are normalized to the natural
//! logarithm, so `log_2(n)` has coefficient `1/ln 2` against the class
//! `log n`. This makes cancellation between logarithms of different bases
//! visible.

use std::cmp::Ordering;

use asymptote_core::Expr;
use asymptote_numeric::Rational;

use crate::order::{GrowthError, GrowthOrder};
use crate::quantity::Quantity;

/// Relative size below which a summed leading coefficient counts as zero.
const CANCELLATION_TOLERANCE: f64 = 1e-12;

/// The dominant term of an expression.
#[derive(Clone, Debug, PartialEq)]
pub struct LeadingTerm {
    /// Constant multiplier of the dominant term; `None` when it involves a
    /// named symbol or is not finite.
    pub coefficient: Option<f64>,
    /// Growth class of the dominant term.
    pub order: GrowthOrder,
}

impl LeadingTerm {
    fn new(coefficient: Option<f64>, order: GrowthOrder) -> Self {
        Self {
            coefficient: coefficient.filter(|c| c.is_finite()),
            order,
        }
    }

    /// Returns `Some(true)` if the leading coefficient is known to be
    /// negative.
    #[must_use]
    pub fn is_negative(&self) -> Option<bool> {
        self.coefficient.map(|c| c < 0.0)
    }
}

/// Growth class of the dominant term of `expr`.
pub fn growth_of(expr: &Expr) -> Result<GrowthOrder, GrowthError> {
    analyze(expr).map(|t| t.order)
}

/// Finds the dominant term of `expr` as `n → ∞`.
///
/// # Errors
///
/// - [`GrowthError::Cancellation`] when the leading terms of a sum cancel.
/// - [`GrowthError::Incomparable`] when two terms cannot be ordered.
/// - [`GrowthError::Unsupported`] for shapes outside the growth classes,
///   such as `n^n`, `2^(n^2)` or decaying exponentials.
pub fn analyze(expr: &Expr) -> Result<LeadingTerm, GrowthError> {
    if !expr.contains_n() {
        return Ok(LeadingTerm::new(expr.eval(1.0), GrowthOrder::Constant));
    }

    match expr {
        Expr::N => Ok(LeadingTerm::new(Some(1.0), GrowthOrder::polynomial(1))),
        Expr::Add(terms) => analyze_sum(expr, terms),
        Expr::Mul(factors) => factors.iter().try_fold(
            LeadingTerm::new(Some(1.0), GrowthOrder::Constant),
            |acc, factor| {
                let t = analyze(factor)?;
                let coefficient = acc.coefficient.zip(t.coefficient).map(|(a, b)| a * b);
                Ok(LeadingTerm::new(coefficient, acc.order.multiply(&t.order)))
            },
        ),
        Expr::Pow { base, exp } => analyze_pow(expr, base, exp),
        Expr::Log { base, arg } => analyze_log(expr, base.as_ref(), arg),
        Expr::Factorial(arg) => analyze_factorial(expr, arg),
        Expr::Const(_) | Expr::Symbol(_) => Ok(LeadingTerm::new(expr.eval(1.0), GrowthOrder::Constant)),
    }
}

fn analyze_sum(expr: &Expr, terms: &[Expr]) -> Result<LeadingTerm, GrowthError> {
    let mut leading: Vec<LeadingTerm> = Vec::new();

    for term in terms {
        let t = analyze(term)?;
        match leading.first() {
            None => leading.push(t),
            Some(best) => match t.order.compare(&best.order)? {
                Ordering::Greater => {
                    leading.clear();
                    leading.push(t);
                }
                Ordering::Equal => leading.push(t),
                Ordering::Less => {}
            },
        }
    }

    let Some(order) = leading.first().map(|t| t.order.clone()) else {
        return Ok(LeadingTerm::new(Some(0.0), GrowthOrder::Constant));
    };

    let coefficients: Option<Vec<f64>> = leading.iter().map(|t| t.coefficient).collect();
    let Some(coefficients) = coefficients else {
        return Ok(LeadingTerm::new(None, order));
    };

    let total: f64 = coefficients.iter().sum();
    let scale = coefficients.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    if coefficients.len() > 1 && total.abs() <= CANCELLATION_TOLERANCE * scale {
        return Err(GrowthError::Cancellation(expr.to_string()));
    }

    Ok(LeadingTerm::new(Some(total), order))
}

fn analyze_pow(expr: &Expr, base: &Expr, exp: &Expr) -> Result<LeadingTerm, GrowthError> {
    let unsupported = || GrowthError::Unsupported(expr.to_string());

    if let Some(e) = exp.as_const() {
        let inner = analyze(base)?;
        if e.is_negative() && matches!(inner.order, GrowthOrder::Exponential { .. } | GrowthOrder::Factorial) {
            return Err(unsupported());
        }
        let coefficient = inner.coefficient.and_then(|c| match e.to_i64().and_then(|k| i32::try_from(k).ok()) {
            Some(k) => Some(c.powi(k)),
            None if c > 0.0 => Some(c.powf(e.to_f64())),
            None => None,
        });
        return Ok(LeadingTerm::new(coefficient, inner.order.pow(&Quantity::exact(e.clone()))));
    }

    if let Expr::Symbol(name) = exp {
        let inner = analyze(base)?;
        let coefficient = inner.coefficient.filter(|c| (c - 1.0).abs() < f64::EPSILON);
        return Ok(LeadingTerm::new(coefficient, inner.order.pow(&Quantity::symbol(name.clone()))));
    }

    if base.contains_n() {
        return Err(unsupported());
    }

    // b^(αn + β) = b^β · (b^α)^n
    let linear = exp.to_polynomial().filter(|p| p.degree() == 1).ok_or_else(unsupported)?;
    let alpha = linear.coeff(1);
    let beta = linear.coeff(0);

    let growth_base = match base {
        Expr::Const(b) if b.is_positive() => exact_power(b, &alpha),
        Expr::Symbol(name) if alpha.is_one() => Quantity::symbol(name.clone()),
        _ => return Err(unsupported()),
    };
    let order = GrowthOrder::exponential(growth_base, Quantity::zero())?;
    let coefficient = base.eval(1.0).map(|b| b.powf(beta.to_f64()));

    Ok(LeadingTerm::new(coefficient, order))
}

/// b^α as a quantity, exact when b has a rational α-th power.
fn exact_power(b: &Rational, alpha: &Rational) -> Quantity {
    let exact = alpha.numer_i64().zip(alpha.denom_i64()).and_then(|(p, q)| {
        let q = u32::try_from(q).ok()?;
        let root = Rational::new(integer_root(b.numer_i64()?, q)?, integer_root(b.denom_i64()?, q)?);
        root.powi(p)
    });

    exact.map_or_else(
        || {
            let repr = format!("{}^({alpha})", Quantity::exact(b.clone()).wrapped());
            Quantity::real(b.to_f64().powf(alpha.to_f64()), repr)
        },
        Quantity::Exact,
    )
}

/// The exact k-th root of a non-negative integer, if there is one.
fn integer_root(x: i64, k: u32) -> Option<i64> {
    if x < 0 || k == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let guess = (x as f64).powf(1.0 / f64::from(k)).round() as i64;
    (guess.checked_pow(k)? == x).then_some(guess)
}

fn analyze_log(expr: &Expr, base: Option<&Rational>, arg: &Expr) -> Result<LeadingTerm, GrowthError> {
    let scale = base.map_or(1.0, |b| 1.0 / b.to_f64().ln());
    let inner = analyze(arg)?;

    let (coefficient, order) = match &inner.order {
        GrowthOrder::Exponential { base, .. } => {
            // log(B^n · n^d) = n ln B + O(log n)
            let ln_b = base.to_f64().map(f64::ln);
            (ln_b.map(|l| l * scale), GrowthOrder::polynomial(1))
        }
        GrowthOrder::Factorial => (Some(scale), GrowthOrder::poly_log(Quantity::one(), Quantity::one())),
        GrowthOrder::Symbolic(s) => return Err(GrowthError::Unsupported(format!("log of {s}"))),
        family => {
            let Some((degree, log_power)) = family.poly_log_params() else {
                return Err(GrowthError::Unsupported(expr.to_string()));
            };
            match degree.signum() {
                Some(Ordering::Greater) => (degree.to_f64().map(|d| d * scale), GrowthOrder::Logarithmic),
                Some(Ordering::Less) => return Err(GrowthError::Unsupported(expr.to_string())),
                Some(Ordering::Equal) if log_power.signum() == Some(Ordering::Greater) => {
                    (Some(scale), GrowthOrder::Symbolic("log log n".to_string()))
                }
                _ => return Err(GrowthError::Unsupported(expr.to_string())),
            }
        }
    };

    Ok(LeadingTerm::new(coefficient, order))
}

fn analyze_factorial(expr: &Expr, arg: &Expr) -> Result<LeadingTerm, GrowthError> {
    let is_n = arg
        .to_polynomial()
        .is_some_and(|p| p.degree() == 1 && p.coeff(1).is_one() && p.coeff(0).is_zero());
    if is_n {
        Ok(LeadingTerm::new(Some(1.0), GrowthOrder::Factorial))
    } else {
        Err(GrowthError::Unsupported(expr.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n() -> Expr {
        Expr::n()
    }

    #[test]
    fn test_polynomial_leading_term() {
        let e = Expr::int(3) * Expr::powi(n(), 2) + n() + 7;
        let t = analyze(&e).unwrap();
        assert_eq!(t.order, GrowthOrder::polynomial(2));
        assert_eq!(t.coefficient, Some(3.0));
    }

    #[test]
    fn test_constant() {
        let t = analyze(&Expr::int(5)).unwrap();
        assert_eq!(t.order, GrowthOrder::Constant);
        assert_eq!(t.coefficient, Some(5.0));
        assert_eq!(analyze(&Expr::symbol("c")).unwrap().coefficient, None);
    }

    #[test]
    fn test_n_log_n() {
        let e = n() * Expr::log(2, n()) + n();
        let t = analyze(&e).unwrap();
        assert_eq!(t.order, GrowthOrder::poly_log(Quantity::one(), Quantity::one()));
        assert!((t.coefficient.unwrap() - 1.0 / 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_log_of_polynomial() {
        let e = Expr::log(2, Expr::powi(n(), 3) + 1);
        assert_eq!(growth_of(&e).unwrap(), GrowthOrder::Logarithmic);
        let loglog = Expr::log(2, Expr::log(2, n()));
        assert_eq!(growth_of(&loglog).unwrap(), GrowthOrder::Symbolic("log log n".to_string()));
    }

    #[test]
    fn test_exponentials() {
        let e = Expr::pow(Expr::int(2), n()) + Expr::powi(n(), 10);
        let t = analyze(&e).unwrap();
        assert_eq!(t.order.to_string(), "2^n");

        let half = Expr::pow(Expr::int(4), n() / 2);
        assert_eq!(growth_of(&half).unwrap().to_string(), "2^n");

        let decaying = Expr::pow(Expr::frac(1, 2), n());
        assert!(matches!(analyze(&decaying), Err(GrowthError::Unsupported(_))));

        let nn = Expr::pow(n(), n());
        assert!(analyze(&nn).is_err());
    }

    #[test]
    fn test_log_of_exponential_and_factorial() {
        let e = Expr::log(2, Expr::pow(Expr::int(2), n()));
        let t = analyze(&e).unwrap();
        assert_eq!(t.order, GrowthOrder::polynomial(1));
        assert!((t.coefficient.unwrap() - 1.0).abs() < 1e-12);

        let lf = Expr::ln(Expr::factorial(n()));
        assert_eq!(growth_of(&lf).unwrap(), GrowthOrder::poly_log(Quantity::one(), Quantity::one()));
    }

    #[test]
    fn test_factorial() {
        assert_eq!(growth_of(&Expr::factorial(n())).unwrap(), GrowthOrder::Factorial);
        assert!(analyze(&Expr::factorial(n() - 1)).is_err());
    }

    #[test]
    fn test_reciprocals() {
        let e = n() / Expr::log(2, n());
        let order = growth_of(&e).unwrap();
        assert_eq!(order.to_string(), "n/log n");
        assert_eq!(growth_of(&(Expr::int(1) / n())).unwrap(), GrowthOrder::polynomial(-1));
    }

    #[test]
    fn test_cancellation() {
        let e = Expr::log(2, n()) - Expr::int(2) * Expr::log(4, n());
        assert!(matches!(analyze(&e), Err(GrowthError::Cancellation(_))));
    }

    #[test]
    fn test_incomparable_terms() {
        let k = Expr::symbol("k");
        let e = Expr::pow(n(), k) + Expr::powi(n(), 2);
        assert!(matches!(analyze(&e), Err(GrowthError::Incomparable { .. })));
    }

    #[test]
    fn test_negative_leading_coefficient() {
        let e = Expr::int(-2) * n() + 5;
        assert_eq!(analyze(&e).unwrap().is_negative(), Some(true));
    }
}

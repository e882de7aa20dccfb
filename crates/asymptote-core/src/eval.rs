//! Evaluation of expressions and conversion to polynomials.

use asymptote_numeric::Rational;
use asymptote_poly::DensePoly;

use crate::expr::Expr;

/// Largest argument for which n! is computed by direct multiplication.
const FACTORIAL_DIRECT_LIMIT: f64 = 170.0;

/// Largest integer exponent expanded when converting to a polynomial.
const MAX_POLY_EXPONENT: i64 = 64;

impl Expr {
    /// Evaluates at a concrete `n`.
    ///
    /// Returns `None` for expressions with named symbols, values outside a
    /// function's domain, or non-finite results.
    #[must_use]
    pub fn eval(&self, n: f64) -> Option<f64> {
        let value = match self {
            Expr::Const(c) => c.to_f64(),
            Expr::N => n,
            Expr::Symbol(_) => return None,
            Expr::Add(terms) => terms.iter().map(|t| t.eval(n)).sum::<Option<f64>>()?,
            Expr::Mul(factors) => factors.iter().map(|t| t.eval(n)).product::<Option<f64>>()?,
            Expr::Pow { base, exp } => {
                let b = base.eval(n)?;
                match exp.as_const().and_then(Rational::to_i64).and_then(|e| i32::try_from(e).ok()) {
                    Some(e) => b.powi(e),
                    None if b < 0.0 => return None,
                    None => b.powf(exp.eval(n)?),
                }
            }
            Expr::Log { base, arg } => {
                let a = arg.eval(n)?;
                if a <= 0.0 {
                    return None;
                }
                match base {
                    None => a.ln(),
                    Some(b) => {
                        let b = b.to_f64();
                        if b <= 0.0 || b == 1.0 {
                            return None;
                        }
                        a.ln() / b.ln()
                    }
                }
            }
            Expr::Factorial(arg) => factorial(arg.eval(n)?)?,
        };

        value.is_finite().then_some(value)
    }

    /// Evaluates exactly at a rational `n`.
    ///
    /// Supports constants, sums, products, integer powers and factorials of
    /// non-negative integers; everything else yields `None`.
    #[must_use]
    pub fn eval_exact(&self, n: &Rational) -> Option<Rational> {
        match self {
            Expr::Const(c) => Some(c.clone()),
            Expr::N => Some(n.clone()),
            Expr::Symbol(_) | Expr::Log { .. } => None,
            Expr::Add(terms) => terms
                .iter()
                .try_fold(Rational::zero(), |acc, t| Some(&acc + &t.eval_exact(n)?)),
            Expr::Mul(factors) => factors
                .iter()
                .try_fold(Rational::one(), |acc, t| Some(&acc * &t.eval_exact(n)?)),
            Expr::Pow { base, exp } => {
                let e = exp.eval_exact(n)?.to_i64()?;
                base.eval_exact(n)?.powi(e)
            }
            Expr::Factorial(arg) => {
                let k = arg.eval_exact(n)?.to_i64()?;
                if !(0..=1000).contains(&k) {
                    return None;
                }
                Some((1..=k).fold(Rational::one(), |acc, i| &acc * &Rational::from(i)))
            }
        }
    }

    /// Converts to a polynomial in `n` with rational coefficients.
    ///
    /// Returns `None` unless the expression is built from constants and `n`
    /// with sums, products and non-negative integer powers.
    #[must_use]
    pub fn to_polynomial(&self) -> Option<DensePoly<Rational>> {
        match self {
            Expr::Const(c) => Some(DensePoly::constant(c.clone())),
            Expr::N => Some(DensePoly::x()),
            Expr::Symbol(_) | Expr::Log { .. } | Expr::Factorial(_) => None,
            Expr::Add(terms) => terms
                .iter()
                .try_fold(DensePoly::zero(), |acc, t| Some(acc.add(&t.to_polynomial()?))),
            Expr::Mul(factors) => factors
                .iter()
                .try_fold(DensePoly::one(), |acc, t| Some(acc.mul(&t.to_polynomial()?))),
            Expr::Pow { base, exp } => {
                let e = exp.as_const()?.to_i64()?;
                if !(0..=MAX_POLY_EXPONENT).contains(&e) {
                    return None;
                }
                Some(base.to_polynomial()?.pow(u32::try_from(e).ok()?))
            }
        }
    }

    /// Builds `Σ cᵢ nⁱ`, highest degree first.
    #[must_use]
    pub fn from_polynomial(p: &DensePoly<Rational>) -> Expr {
        let terms = p
            .coeffs()
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, c)| !c.is_zero())
            .map(|(i, c)| {
                let power = Expr::powi(Expr::N, i64::try_from(i).unwrap_or(i64::MAX));
                Expr::product([Expr::Const(c.clone()), power])
            })
            .collect::<Vec<_>>();
        Expr::sum(terms)
    }
}

/// x! for real x ≥ 0, exact product for small integers and Stirling's series
/// otherwise.
fn factorial(x: f64) -> Option<f64> {
    if x < 0.0 {
        return None;
    }
    if x.fract() == 0.0 && x <= FACTORIAL_DIRECT_LIMIT {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let k = x as u32;
        return Some((1..=k).map(f64::from).product());
    }
    let y = x + 1.0;
    let ln_gamma = (y - 0.5) * y.ln() - y + 0.5 * std::f64::consts::TAU.ln() + 1.0 / (12.0 * y);
    Some(ln_gamma.exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval() {
        let e = Expr::powi(Expr::n(), 2) + Expr::log(2, Expr::n());
        assert!((e.eval(8.0).unwrap() - 67.0).abs() < 1e-12);
        assert_eq!(Expr::symbol("k").eval(1.0), None);
        assert_eq!(Expr::log(2, Expr::n()).eval(0.0), None);
        assert_eq!(Expr::factorial(Expr::n()).eval(5.0), Some(120.0));
    }

    #[test]
    fn test_eval_exact() {
        let e = Expr::frac(1, 2) * Expr::n() * (Expr::n() + 1);
        assert_eq!(e.eval_exact(&Rational::from(10)), Some(Rational::from(55)));
        assert_eq!(Expr::log(2, Expr::n()).eval_exact(&Rational::from(4)), None);
    }

    #[test]
    fn test_polynomial_round_trip() {
        let e = Expr::powi(Expr::n() + 1, 2);
        let p = e.to_polynomial().unwrap();
        assert_eq!(p.coeffs(), &[Rational::from(1), Rational::from(2), Rational::from(1)]);
        assert_eq!(Expr::from_polynomial(&p).to_string(), "n^2 + 2n + 1");
        assert!(Expr::log(2, Expr::n()).to_polynomial().is_none());
    }
}

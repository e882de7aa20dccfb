//! Growth classes and their dominance order.
//!
//! Every class is one of the canonical shapes below. The poly-log family
//! n^d · log^k n is ordered lexicographically by (d, k); any b^n with b > 1
//! dominates the whole family; exponentials are ordered by base and then by
//! the polynomial degree multiplying them; n! dominates every exponential.
//! Two classes compare equal only when their canonical forms coincide.

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

use crate::quantity::Quantity;

/// Errors from growth comparison and analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrowthError {
    /// The two classes cannot be ordered.
    #[error("cannot order {left} against {right}")]
    Incomparable {
        /// Left operand.
        left: String,
        /// Right operand.
        right: String,
    },

    /// The leading terms of a sum cancel.
    #[error("leading terms cancel in {0}")]
    Cancellation(String),

    /// The expression has no supported growth form.
    #[error("unsupported growth form: {0}")]
    Unsupported(String),
}

/// An asymptotic growth class.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GrowthOrder {
    /// Θ(1)
    Constant,
    /// Θ(log n)
    Logarithmic,
    /// Θ(log^k n), k ∉ {0, 1}
    Polylog(Quantity),
    /// Θ(n^d), d ≠ 0
    Polynomial(Quantity),
    /// Θ(n^d log^k n), d ≠ 0 and k ≠ 0
    PolynomialLog {
        /// Polynomial degree d.
        degree: Quantity,
        /// Power of the logarithm k.
        log_power: Quantity,
    },
    /// Θ(b^n n^d), b > 1
    Exponential {
        /// Base b.
        base: Quantity,
        /// Polynomial degree d multiplying the exponential.
        degree: Quantity,
    },
    /// Θ(n!)
    Factorial,
    /// A class outside the canonical shapes, kept by name.
    Symbolic(String),
}

impl GrowthOrder {
    /// Θ(n^d).
    #[must_use]
    pub fn polynomial(degree: impl Into<Quantity>) -> Self {
        Self::poly_log(degree.into(), Quantity::zero())
    }

    /// Θ(n^d log^k n) in canonical form.
    #[must_use]
    pub fn poly_log(degree: Quantity, log_power: Quantity) -> Self {
        match (degree.is_zero(), log_power.is_zero()) {
            (true, true) => GrowthOrder::Constant,
            (true, false) if log_power.is_one() => GrowthOrder::Logarithmic,
            (true, false) => GrowthOrder::Polylog(log_power),
            (false, true) => GrowthOrder::Polynomial(degree),
            (false, false) => GrowthOrder::PolynomialLog { degree, log_power },
        }
    }

    /// Θ(b^n n^d) in canonical form.
    ///
    /// A base of exactly 1 collapses to the poly-log family; a base known to
    /// be below 1 is rejected since b^n then decays.
    pub fn exponential(base: Quantity, degree: Quantity) -> Result<Self, GrowthError> {
        match base.compare(&Quantity::one()) {
            Some(Ordering::Equal) => Ok(Self::poly_log(degree, Quantity::zero())),
            Some(Ordering::Less) => Err(GrowthError::Unsupported(format!("decaying exponential {}^n", base.wrapped()))),
            // Greater, or a symbolic base assumed > 1
            _ => Ok(GrowthOrder::Exponential { base, degree }),
        }
    }

    /// Returns (d, k) for a member of the poly-log family.
    #[must_use]
    pub fn poly_log_params(&self) -> Option<(Quantity, Quantity)> {
        match self {
            GrowthOrder::Constant => Some((Quantity::zero(), Quantity::zero())),
            GrowthOrder::Logarithmic => Some((Quantity::zero(), Quantity::one())),
            GrowthOrder::Polylog(k) => Some((Quantity::zero(), k.clone())),
            GrowthOrder::Polynomial(d) => Some((d.clone(), Quantity::zero())),
            GrowthOrder::PolynomialLog { degree, log_power } => Some((degree.clone(), log_power.clone())),
            _ => None,
        }
    }

    /// Returns true for n^d log^k n shapes (including constants).
    #[must_use]
    pub fn is_poly_log(&self) -> bool {
        self.poly_log_params().is_some()
    }

    /// Compares growth: `Less` means `self` grows strictly slower.
    pub fn compare(&self, other: &Self) -> Result<Ordering, GrowthError> {
        let incomparable = || GrowthError::Incomparable {
            left: self.to_string(),
            right: other.to_string(),
        };

        match (self, other) {
            (GrowthOrder::Symbolic(a), GrowthOrder::Symbolic(b)) if a == b => Ok(Ordering::Equal),
            (GrowthOrder::Symbolic(_), _) | (_, GrowthOrder::Symbolic(_)) => Err(incomparable()),

            (GrowthOrder::Factorial, GrowthOrder::Factorial) => Ok(Ordering::Equal),
            (GrowthOrder::Factorial, _) => Ok(Ordering::Greater),
            (_, GrowthOrder::Factorial) => Ok(Ordering::Less),

            (
                GrowthOrder::Exponential { base: b1, degree: d1 },
                GrowthOrder::Exponential { base: b2, degree: d2 },
            ) => match b1.compare(b2).ok_or_else(incomparable)? {
                Ordering::Equal => d1.compare(d2).ok_or_else(incomparable),
                ord => Ok(ord),
            },
            (GrowthOrder::Exponential { .. }, _) => Ok(Ordering::Greater),
            (_, GrowthOrder::Exponential { .. }) => Ok(Ordering::Less),

            _ => {
                let (Some((d1, k1)), Some((d2, k2))) = (self.poly_log_params(), other.poly_log_params()) else {
                    return Err(incomparable());
                };
                match d1.compare(&d2).ok_or_else(incomparable)? {
                    Ordering::Equal => k1.compare(&k2).ok_or_else(incomparable),
                    ord => Ok(ord),
                }
            }
        }
    }

    /// Growth class of the product of two functions.
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        match (self, other) {
            (GrowthOrder::Constant, x) | (x, GrowthOrder::Constant) => x.clone(),
            (
                GrowthOrder::Exponential { base: b1, degree: d1 },
                GrowthOrder::Exponential { base: b2, degree: d2 },
            ) => GrowthOrder::Exponential {
                base: b1.mul(b2),
                degree: d1.add(d2),
            },
            (GrowthOrder::Exponential { base, degree }, p) | (p, GrowthOrder::Exponential { base, degree }) => {
                match p.poly_log_params() {
                    Some((d, k)) if k.is_zero() => GrowthOrder::Exponential {
                        base: base.clone(),
                        degree: degree.add(&d),
                    },
                    _ => GrowthOrder::Symbolic(format!("{self}·{other}")),
                }
            }
            _ => match (self.poly_log_params(), other.poly_log_params()) {
                (Some((d1, k1)), Some((d2, k2))) => Self::poly_log(d1.add(&d2), k1.add(&k2)),
                _ => GrowthOrder::Symbolic(format!("{self}·{other}")),
            },
        }
    }

    /// Raises the class to a power: (n^d log^k n)^e = n^(de) log^(ke) n.
    #[must_use]
    pub fn pow(&self, e: &Quantity) -> Self {
        if e.is_one() {
            return self.clone();
        }
        if e.is_zero() {
            return GrowthOrder::Constant;
        }
        match self {
            GrowthOrder::Exponential { base, degree } => {
                let base = match (base.as_exact(), e.as_exact().and_then(asymptote_numeric::Rational::to_i64)) {
                    (Some(b), Some(k)) => b.powi(k).map_or_else(|| base.mul(e), Quantity::Exact),
                    _ => match (base.to_f64(), e.to_f64()) {
                        (Some(b), Some(x)) => Quantity::real(b.powf(x), format!("{}^{}", base.wrapped(), e.wrapped())),
                        _ => Quantity::symbol(format!("{}^{}", base.wrapped(), e.wrapped())),
                    },
                };
                GrowthOrder::exponential(base, degree.mul(e)).unwrap_or_else(|_| GrowthOrder::Symbolic(format!("({self})^{e}")))
            }
            other => match other.poly_log_params() {
                Some((d, k)) => Self::poly_log(d.mul(e), k.mul(e)),
                None => GrowthOrder::Symbolic(format!("({self})^{}", e.wrapped())),
            },
        }
    }

    /// Display name with the Θ wrapper, e.g. `Θ(n log n)`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("Θ({self})")
    }
}

fn fmt_power(f: &mut fmt::Formatter<'_>, var: &str, power: &Quantity) -> fmt::Result {
    if power.is_one() {
        return write!(f, "{var}");
    }
    match power {
        Quantity::Exact(r) if r.is_integer() && !r.is_negative() => write!(f, "{var}^{r}"),
        _ => write!(f, "{var}^({power})"),
    }
}

fn fmt_log(f: &mut fmt::Formatter<'_>, power: &Quantity) -> fmt::Result {
    if power.is_one() {
        return write!(f, "log n");
    }
    match power {
        Quantity::Exact(r) if r.is_integer() && !r.is_negative() => write!(f, "log^{r} n"),
        _ => write!(f, "log^({power}) n"),
    }
}

fn is_negative(q: &Quantity) -> bool {
    q.signum() == Some(Ordering::Less)
}

impl fmt::Display for GrowthOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthOrder::Constant => write!(f, "1"),
            GrowthOrder::Logarithmic => write!(f, "log n"),
            GrowthOrder::Polylog(k) if is_negative(k) => {
                write!(f, "1/")?;
                fmt_log(f, &k.neg())
            }
            GrowthOrder::Polylog(k) => fmt_log(f, k),
            GrowthOrder::Polynomial(d) => fmt_power(f, "n", d),
            GrowthOrder::PolynomialLog { degree, log_power } if is_negative(log_power) => {
                fmt_power(f, "n", degree)?;
                write!(f, "/")?;
                fmt_log(f, &log_power.neg())
            }
            GrowthOrder::PolynomialLog { degree, log_power } => {
                fmt_power(f, "n", degree)?;
                write!(f, " ")?;
                fmt_log(f, log_power)
            }
            GrowthOrder::Exponential { base, degree } => {
                if !degree.is_zero() {
                    fmt_power(f, "n", degree)?;
                    write!(f, "·")?;
                }
                write!(f, "{}^n", base.wrapped())
            }
            GrowthOrder::Factorial => write!(f, "n!"),
            GrowthOrder::Symbolic(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asymptote_numeric::Rational;

    fn poly(d: i64) -> GrowthOrder {
        GrowthOrder::polynomial(d)
    }

    fn exp(b: i64) -> GrowthOrder {
        GrowthOrder::exponential(Quantity::int(b), Quantity::zero()).unwrap()
    }

    #[test]
    fn test_canonical_forms() {
        assert_eq!(GrowthOrder::poly_log(Quantity::zero(), Quantity::zero()), GrowthOrder::Constant);
        assert_eq!(GrowthOrder::poly_log(Quantity::zero(), Quantity::one()), GrowthOrder::Logarithmic);
        assert_eq!(poly(0), GrowthOrder::Constant);
        assert_eq!(
            GrowthOrder::exponential(Quantity::one(), Quantity::int(2)).unwrap(),
            poly(2)
        );
        assert!(GrowthOrder::exponential(Quantity::exact(Rational::new(1, 2)), Quantity::zero()).is_err());
    }

    #[test]
    fn test_standard_dominance() {
        let log = GrowthOrder::Logarithmic;
        let polylog = GrowthOrder::Polylog(Quantity::int(2));
        assert_eq!(GrowthOrder::Constant.compare(&log), Ok(Ordering::Less));
        assert_eq!(log.compare(&polylog), Ok(Ordering::Less));
        assert_eq!(polylog.compare(&poly(1)), Ok(Ordering::Less));
        assert_eq!(poly(2).compare(&poly(3)), Ok(Ordering::Less));
        assert_eq!(poly(100).compare(&exp(2)), Ok(Ordering::Less));
        assert_eq!(exp(2).compare(&exp(3)), Ok(Ordering::Less));
        assert_eq!(exp(3).compare(&GrowthOrder::Factorial), Ok(Ordering::Less));
    }

    #[test]
    fn test_n_log_n_between() {
        let nlogn = GrowthOrder::poly_log(Quantity::one(), Quantity::one());
        assert_eq!(poly(1).compare(&nlogn), Ok(Ordering::Less));
        assert_eq!(nlogn.compare(&poly(2)), Ok(Ordering::Less));
        assert_eq!(nlogn.compare(&nlogn.clone()), Ok(Ordering::Equal));
    }

    #[test]
    fn test_symbolic_degrees() {
        let k = GrowthOrder::polynomial(Quantity::symbol("k"));
        assert_eq!(k.compare(&k.clone()), Ok(Ordering::Equal));
        assert!(k.compare(&poly(2)).is_err());
        assert_eq!(k.compare(&exp(2)), Ok(Ordering::Less));

        let k1 = GrowthOrder::polynomial(Quantity::symbol("k").add(&Quantity::one()));
        assert_eq!(k1.to_string(), "n^(k + 1)");
        assert_eq!(k.compare(&k1), Ok(Ordering::Less));
        assert_eq!(k.multiply(&poly(1)).compare(&k1), Ok(Ordering::Equal));
    }

    #[test]
    fn test_multiply() {
        let n = poly(1);
        let log = GrowthOrder::Logarithmic;
        assert_eq!(n.multiply(&log), GrowthOrder::poly_log(Quantity::one(), Quantity::one()));
        assert_eq!(n.multiply(&exp(2)).to_string(), "n·2^n");
        assert_eq!(GrowthOrder::Constant.multiply(&log), log);
    }

    #[test]
    fn test_names() {
        assert_eq!(GrowthOrder::poly_log(Quantity::one(), Quantity::one()).name(), "Θ(n log n)");
        assert_eq!(poly(2).name(), "Θ(n^2)");
        assert_eq!(GrowthOrder::Constant.name(), "Θ(1)");
        assert_eq!(
            GrowthOrder::polynomial(Quantity::log(&Rational::from(3), &Rational::from(2)).unwrap()).to_string(),
            "n^(log_2 3)"
        );
        assert_eq!(GrowthOrder::Polylog(Quantity::int(-1)).to_string(), "1/log n");
        assert_eq!(exp(2).to_string(), "2^n");
        let phi = Quantity::real(1.618_033_988_749_895, "(1 + √5)/2");
        let fib = GrowthOrder::exponential(phi, Quantity::zero()).unwrap();
        assert_eq!(fib.name(), "Θ(((1 + √5)/2)^n)");
    }
}

//! Exponents, log powers and exponential bases of growth classes.
//!
//! The critical exponent log_b(a) of a divide-and-conquer recurrence is
//! rational only in special cases (log_2 4 = 2, log_8 4 = 2/3). Otherwise it
//! is kept symbolically as a [`Quantity::LogRatio`] and compared exactly:
//! log_b(a) < p/q  ⇔  a^q < b^p  (b > 1). Characteristic roots that are
//! neither rational nor logarithms are [`Quantity::Real`] values with a
//! display form such as `(1 + √5)/2`. A named constant carries a rational
//! offset, so k and k + 1 stay comparable.

use std::cmp::Ordering;
use std::fmt;

use asymptote_numeric::Rational;

/// Largest denominator tried when recognising log_b(a) as a rational.
const MAX_LOG_DENOMINATOR: i64 = 12;

/// Largest exponent magnitude used in exact power comparisons.
const MAX_EXACT_POWER: i64 = 64;

/// Relative distance below which two reals are considered indistinguishable.
const REAL_TOLERANCE: f64 = 1e-12;

/// A real-valued parameter of a growth class.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// An exact rational.
    Exact(Rational),
    /// log_base(arg), known to be irrational. `arg, base > 0`, `base ≠ 1`.
    LogRatio {
        /// The argument.
        arg: Rational,
        /// The base.
        base: Rational,
    },
    /// A real number with a display form.
    Real {
        /// `f64::to_bits` of the value.
        bits: u64,
        /// How the value is shown.
        repr: String,
    },
    /// A named positive constant shifted by a rational.
    Symbol {
        /// The name, or the display form of an opaque combination.
        name: String,
        /// Added to the named value.
        offset: Rational,
    },
}

impl Quantity {
    /// An exact integer.
    #[must_use]
    pub fn int(n: i64) -> Self {
        Quantity::Exact(Rational::from(n))
    }

    /// An exact rational.
    #[must_use]
    pub fn exact(r: Rational) -> Self {
        Quantity::Exact(r)
    }

    /// Zero.
    #[must_use]
    pub fn zero() -> Self {
        Quantity::Exact(Rational::zero())
    }

    /// One.
    #[must_use]
    pub fn one() -> Self {
        Quantity::Exact(Rational::one())
    }

    /// A real number shown as `repr`.
    #[must_use]
    pub fn real(value: f64, repr: impl Into<String>) -> Self {
        Quantity::Real {
            bits: value.to_bits(),
            repr: repr.into(),
        }
    }

    /// A named positive constant.
    #[must_use]
    pub fn symbol(name: impl Into<String>) -> Self {
        Quantity::Symbol {
            name: name.into(),
            offset: Rational::zero(),
        }
    }

    /// log_base(arg), exact when it is a rational with a small denominator.
    ///
    /// Returns `None` when `arg ≤ 0`, `base ≤ 0` or `base = 1`.
    #[must_use]
    pub fn log(arg: &Rational, base: &Rational) -> Option<Self> {
        if !arg.is_positive() || !base.is_positive() || base.is_one() {
            return None;
        }
        if arg.is_one() {
            return Some(Quantity::zero());
        }

        let approx = arg.to_f64().ln() / base.to_f64().ln();
        for q in 1..=MAX_LOG_DENOMINATOR {
            #[allow(clippy::cast_precision_loss)]
            let scaled = approx * q as f64;
            let p = scaled.round();
            if (scaled - p).abs() > 1e-6 || p.abs() > MAX_EXACT_POWER as f64 {
                continue;
            }
            #[allow(clippy::cast_possible_truncation)]
            let p = p as i64;
            if base.powi(p).as_ref() == arg.powi(q).as_ref() {
                return Some(Quantity::Exact(Rational::new(p, q)));
            }
        }

        Some(Quantity::LogRatio {
            arg: arg.clone(),
            base: base.clone(),
        })
    }

    /// Returns the exact value, if this is rational.
    #[must_use]
    pub fn as_exact(&self) -> Option<&Rational> {
        match self {
            Quantity::Exact(r) => Some(r),
            _ => None,
        }
    }

    /// Returns true if this is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        matches!(self, Quantity::Exact(r) if r.is_zero())
    }

    /// Returns true if this is exactly one.
    #[must_use]
    pub fn is_one(&self) -> bool {
        matches!(self, Quantity::Exact(r) if r.is_one())
    }

    /// Returns true if this involves a named symbol.
    #[must_use]
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Quantity::Symbol { .. })
    }

    /// Numeric value; `None` for symbols.
    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Quantity::Exact(r) => Some(r.to_f64()),
            Quantity::LogRatio { arg, base } => Some(arg.to_f64().ln() / base.to_f64().ln()),
            Quantity::Real { bits, .. } => Some(f64::from_bits(*bits)),
            Quantity::Symbol { .. } => None,
        }
    }

    /// Sign of the value; `None` when unknown.
    #[must_use]
    pub fn signum(&self) -> Option<Ordering> {
        self.compare(&Quantity::zero())
    }

    /// Compares two quantities.
    ///
    /// Values of the same symbol are ordered by their offsets. Returns `None`
    /// when the order cannot be decided: different symbols, or distinct
    /// values that are numerically indistinguishable.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Quantity::Exact(a), Quantity::Exact(b)) => Some(a.cmp(b)),
            (Quantity::LogRatio { arg, base }, Quantity::Exact(r)) => compare_log_with_rational(arg, base, r),
            (Quantity::Exact(r), Quantity::LogRatio { arg, base }) => {
                compare_log_with_rational(arg, base, r).map(Ordering::reverse)
            }
            (Quantity::LogRatio { arg: a1, base: b1 }, Quantity::LogRatio { arg: a2, base: b2 }) => {
                if a1 == a2 && b1 == b2 {
                    return Some(Ordering::Equal);
                }
                match compare_floats(self.to_f64()?, other.to_f64()?) {
                    Some(ord) => Some(ord),
                    None => logs_equal(a1, b1, a2, b2).then_some(Ordering::Equal),
                }
            }
            (Quantity::Symbol { name: a, offset: x }, Quantity::Symbol { name: b, offset: y }) => {
                (a == b).then(|| x.cmp(y))
            }
            (Quantity::Symbol { .. }, _) | (_, Quantity::Symbol { .. }) => None,
            (Quantity::Real { repr: r1, .. }, Quantity::Real { repr: r2, .. }) => {
                match compare_floats(self.to_f64()?, other.to_f64()?) {
                    Some(ord) => Some(ord),
                    None => (r1 == r2).then_some(Ordering::Equal),
                }
            }
            _ => compare_floats(self.to_f64()?, other.to_f64()?),
        }
    }

    /// Sum of two quantities.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Quantity::Exact(a), Quantity::Exact(b)) => Quantity::Exact(a + b),
            (q, z) | (z, q) if z.is_zero() => q.clone(),
            (Quantity::Symbol { name, offset }, Quantity::Exact(r)) | (Quantity::Exact(r), Quantity::Symbol { name, offset }) => {
                Quantity::Symbol {
                    name: name.clone(),
                    offset: offset + r,
                }
            }
            _ => self.combine(other, "+", |a, b| a + b),
        }
    }

    /// Difference of two quantities.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Product of two quantities.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        match (self, other) {
            (Quantity::Exact(a), Quantity::Exact(b)) => Quantity::Exact(a * b),
            (_, z) | (z, _) if z.is_zero() => Quantity::zero(),
            (q, one) | (one, q) if one.is_one() => q.clone(),
            _ => self.combine(other, "·", |a, b| a * b),
        }
    }

    /// Negation.
    #[must_use]
    pub fn neg(&self) -> Self {
        match self {
            Quantity::Exact(r) => Quantity::Exact(-r),
            Quantity::LogRatio { arg, base } => match arg.recip() {
                Some(inv) => Quantity::LogRatio { arg: inv, base: base.clone() },
                None => Quantity::real(f64::NAN, format!("-{self}")),
            },
            Quantity::Real { bits, repr } => Quantity::real(-f64::from_bits(*bits), format!("-({repr})")),
            Quantity::Symbol { name, offset } if offset.is_zero() => Quantity::symbol(format!("-{}", wrap_name(name))),
            Quantity::Symbol { .. } => Quantity::symbol(format!("-({self})")),
        }
    }

    fn combine(&self, other: &Self, op: &str, f: impl Fn(f64, f64) -> f64) -> Self {
        let repr = format!("{} {op} {}", self.wrapped(), other.wrapped());
        match (self.to_f64(), other.to_f64()) {
            (Some(a), Some(b)) => Quantity::real(f(a, b), repr),
            _ => Quantity::symbol(repr),
        }
    }


    /// Display form, parenthesized unless atomic.
    #[must_use]
    pub fn wrapped(&self) -> String {
        let s = self.to_string();
        let atomic = match self {
            Quantity::Exact(r) => r.is_integer() && !r.is_negative(),
            Quantity::Symbol { name, offset } => offset.is_zero() && !name.contains([' ', '/', '-']),
            Quantity::Real { repr, .. } => !repr.contains([' ', '/', '-', '·', '+']),
            Quantity::LogRatio { .. } => false,
        };
        if atomic {
            s
        } else {
            format!("({s})")
        }
    }
}

impl From<Rational> for Quantity {
    fn from(r: Rational) -> Self {
        Quantity::Exact(r)
    }
}

impl From<i64> for Quantity {
    fn from(n: i64) -> Self {
        Quantity::int(n)
    }
}

impl From<i32> for Quantity {
    fn from(n: i32) -> Self {
        Quantity::int(i64::from(n))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Exact(r) => write!(f, "{r}"),
            Quantity::LogRatio { arg, base } => write!(f, "log_{base} {arg}"),
            Quantity::Real { repr, .. } => write!(f, "{repr}"),
            Quantity::Symbol { name, offset } => match offset.cmp_i64(0) {
                Ordering::Equal => write!(f, "{name}"),
                Ordering::Greater => write!(f, "{name} + {offset}"),
                Ordering::Less => write!(f, "{name} - {}", -offset),
            },
        }
    }
}

fn wrap_name(name: &str) -> String {
    if name.contains([' ', '/', '-']) {
        format!("({name})")
    } else {
        name.to_string()
    }
}

fn compare_floats(a: f64, b: f64) -> Option<Ordering> {
    if a.is_nan() || b.is_nan() {
        return None;
    }
    if (a - b).abs() <= REAL_TOLERANCE * (1.0 + a.abs().max(b.abs())) {
        return None;
    }
    a.partial_cmp(&b)
}

/// Compares log_base(arg) with r = p/q exactly: q·log_b(a) vs p, i.e.
/// a^q vs b^p, flipped when b < 1.
fn compare_log_with_rational(arg: &Rational, base: &Rational, r: &Rational) -> Option<Ordering> {
    let exact = r
        .numer_i64()
        .zip(r.denom_i64())
        .filter(|(p, q)| p.abs() <= MAX_EXACT_POWER && *q <= MAX_EXACT_POWER)
        .and_then(|(p, q)| {
            let lhs = arg.powi(q)?;
            let rhs = base.powi(p)?;
            Some(lhs.cmp(&rhs))
        });

    let ord = match exact {
        Some(ord) => ord,
        None => {
            let value = arg.to_f64().ln() / base.to_f64().ln();
            return compare_floats(value, r.to_f64());
        }
    };

    if base.cmp_i64(1) == Ordering::Less {
        Some(ord.reverse())
    } else {
        Some(ord)
    }
}

/// Sufficient test for log_b1(a1) = log_b2(a2): a1^i = a2^j and b1^i = b2^j
/// for small i, j.
fn logs_equal(a1: &Rational, b1: &Rational, a2: &Rational, b2: &Rational) -> bool {
    (1..=MAX_LOG_DENOMINATOR).any(|i| {
        (1..=MAX_LOG_DENOMINATOR).any(|j| {
            a1.powi(i).is_some_and(|x| a2.powi(j).as_ref() == Some(&x))
                && b1.powi(i).is_some_and(|x| b2.powi(j).as_ref() == Some(&x))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64) -> Rational {
        Rational::from(n)
    }

    #[test]
    fn test_exact_logs() {
        assert_eq!(Quantity::log(&q(4), &q(2)), Some(Quantity::int(2)));
        assert_eq!(Quantity::log(&q(1), &q(2)), Some(Quantity::zero()));
        assert_eq!(Quantity::log(&q(2), &q(4)), Some(Quantity::exact(Rational::new(1, 2))));
        assert_eq!(Quantity::log(&q(4), &q(8)), Some(Quantity::exact(Rational::new(2, 3))));
        assert_eq!(Quantity::log(&q(1), &q(1)), None);
    }

    #[test]
    fn test_irrational_log() {
        let c = Quantity::log(&q(3), &q(2)).unwrap();
        assert!(matches!(c, Quantity::LogRatio { .. }));
        assert_eq!(c.to_string(), "log_2 3");
        // 1 < log_2 3 < 2 and log_2 3 < 8/5 since 3^5 = 243 < 256
        assert_eq!(c.compare(&Quantity::int(1)), Some(Ordering::Greater));
        assert_eq!(c.compare(&Quantity::int(2)), Some(Ordering::Less));
        assert_eq!(c.compare(&Quantity::exact(Rational::new(8, 5))), Some(Ordering::Less));
    }

    #[test]
    fn test_equal_log_ratios() {
        let a = Quantity::log(&q(9), &q(4)).unwrap();
        let b = Quantity::log(&q(3), &q(2)).unwrap();
        assert_eq!(a.compare(&b), Some(Ordering::Equal));
    }

    #[test]
    fn test_symbols() {
        let k = Quantity::symbol("k");
        assert_eq!(k.compare(&k.clone()), Some(Ordering::Equal));
        assert_eq!(k.compare(&Quantity::symbol("m")), None);
        assert_eq!(k.compare(&Quantity::int(2)), None);
    }

    #[test]
    fn test_symbol_offsets() {
        let k = Quantity::symbol("k");
        let k1 = k.add(&Quantity::one());
        assert_eq!(k1.to_string(), "k + 1");
        assert_eq!(k.compare(&k1), Some(Ordering::Less));
        assert_eq!(k1.sub(&Quantity::one()), k);
        assert_eq!(k.sub(&Quantity::exact(Rational::new(1, 2))).to_string(), "k - 1/2");
        assert_eq!(k1.wrapped(), "(k + 1)");
        assert_eq!(k1.compare(&Quantity::symbol("m").add(&Quantity::one())), None);
    }

    #[test]
    fn test_arithmetic() {
        let a = Quantity::exact(Rational::new(1, 2));
        assert_eq!(a.add(&a), Quantity::one());
        assert_eq!(a.mul(&Quantity::int(4)), Quantity::int(2));

        let c = Quantity::log(&q(3), &q(2)).unwrap();
        assert_eq!(c.add(&Quantity::zero()), c);
        let sum = c.add(&Quantity::one());
        assert!((sum.to_f64().unwrap() - (3f64.log2() + 1.0)).abs() < 1e-12);
    }
}

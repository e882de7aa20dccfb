//! Arbitrary precision rational numbers.
//!
//! Recurrence parameters (subproblem counts, reduction factors, base-case
//! values, characteristic coefficients) are kept exact so that the Master
//! Theorem comparisons and closed forms never depend on rounding.

use dashu::base::{Abs, Inverse, Signed as DashuSigned};
use dashu::integer::{IBig, UBig};
use dashu::rational::RBig;
use num_traits::{One, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// An arbitrary precision rational number.
///
/// Always stored in lowest terms with a positive denominator.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rational(RBig);

impl Rational {
    /// Creates `numerator / denominator`.
    ///
    /// # Panics
    ///
    /// Panics if the denominator is zero.
    #[must_use]
    pub fn new(numerator: i64, denominator: i64) -> Self {
        assert!(denominator != 0, "denominator cannot be zero");
        let sign = if denominator < 0 { -1 } else { 1 };
        let num = IBig::from(numerator) * IBig::from(sign);
        let den = UBig::from(denominator.unsigned_abs());
        Self(RBig::from_parts(num, den))
    }

    /// Creates an integral rational.
    #[must_use]
    pub fn from_integer(n: i64) -> Self {
        Self(RBig::from(IBig::from(n)))
    }

    /// The additive identity.
    #[must_use]
    pub fn zero() -> Self {
        Self(RBig::ZERO)
    }

    /// The multiplicative identity.
    #[must_use]
    pub fn one() -> Self {
        Self(RBig::ONE)
    }

    /// Returns true if this is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if this is one.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.0 == RBig::ONE
    }

    /// Returns true if the denominator is 1.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.0.denominator().is_one()
    }

    /// Returns the numerator if it fits in an `i64`.
    #[must_use]
    pub fn numer_i64(&self) -> Option<i64> {
        self.0.numerator().clone().try_into().ok()
    }

    /// Returns the denominator if it fits in an `i64`.
    #[must_use]
    pub fn denom_i64(&self) -> Option<i64> {
        IBig::from(self.0.denominator().clone()).try_into().ok()
    }

    /// Converts to an `i64` when this is an integer that fits.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        if self.is_integer() {
            self.numer_i64()
        } else {
            None
        }
    }

    /// Approximates the value as an `f64`.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        if let (Some(n), Some(d)) = (self.numer_i64(), self.denom_i64()) {
            #[allow(clippy::cast_precision_loss)]
            return n as f64 / d as f64;
        }
        let num: f64 = self.0.numerator().to_string().parse().unwrap_or(f64::NAN);
        let den: f64 = self.0.denominator().to_string().parse().unwrap_or(f64::NAN);
        num / den
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.clone().abs())
    }

    /// Returns the reciprocal, or `None` for zero.
    #[must_use]
    pub fn recip(&self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(Self(self.0.clone().inv()))
        }
    }

    /// Divides, returning `None` when `other` is zero.
    #[must_use]
    pub fn checked_div(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            None
        } else {
            Some(self / other)
        }
    }

    /// Returns the sign: -1, 0, or 1.
    #[must_use]
    pub fn signum(&self) -> i8 {
        if self.0.is_zero() {
            0
        } else if DashuSigned::is_positive(&self.0) {
            1
        } else {
            -1
        }
    }

    /// Returns true if strictly negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        DashuSigned::is_negative(&self.0)
    }

    /// Returns true if strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        DashuSigned::is_positive(&self.0)
    }

    /// Computes `self^exp` for a non-negative exponent.
    #[must_use]
    pub fn pow(&self, exp: u32) -> Self {
        Self(self.0.pow(exp as usize))
    }

    /// Computes `self^exp` for any integer exponent.
    ///
    /// Returns `None` for a negative power of zero.
    #[must_use]
    pub fn powi(&self, exp: i64) -> Option<Self> {
        let magnitude = u32::try_from(exp.unsigned_abs()).ok()?;
        let raised = self.pow(magnitude);
        if exp < 0 {
            raised.recip()
        } else {
            Some(raised)
        }
    }

    /// Returns the largest integer not greater than this value, if it fits.
    #[must_use]
    pub fn floor_i64(&self) -> Option<i64> {
        let n = self.numer_i64()?;
        let d = self.denom_i64()?;
        Some(n.div_euclid(d))
    }

    /// Compares with an integer without allocating a second rational.
    #[must_use]
    pub fn cmp_i64(&self, n: i64) -> Ordering {
        self.cmp(&Self::from_integer(n))
    }

    /// Returns the inner `dashu::RBig`.
    #[must_use]
    pub fn into_inner(self) -> RBig {
        self.0
    }
}

impl Zero for Rational {
    fn zero() -> Self {
        Self(RBig::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl One for Rational {
    fn one() -> Self {
        Self(RBig::ONE)
    }

    fn is_one(&self) -> bool {
        self.0 == RBig::ONE
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({self})")
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.0.numerator())
        } else {
            write!(f, "{}/{}", self.0.numerator(), self.0.denominator())
        }
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Add for &Rational {
    type Output = Rational;

    fn add(self, rhs: Self) -> Self::Output {
        Rational(&self.0 + &rhs.0)
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sub for &Rational {
    type Output = Rational;

    fn sub(self, rhs: Self) -> Self::Output {
        Rational(&self.0 - &rhs.0)
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Mul for &Rational {
    type Output = Rational;

    fn mul(self, rhs: Self) -> Self::Output {
        Rational(&self.0 * &rhs.0)
    }
}

impl Div for Rational {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self(self.0 / rhs.0)
    }
}

impl Div for &Rational {
    type Output = Rational;

    fn div(self, rhs: Self) -> Self::Output {
        Rational(&self.0 / &rhs.0)
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        Rational(-&self.0)
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_integer(n)
    }
}

impl From<i32> for Rational {
    fn from(n: i32) -> Self {
        Self::from_integer(i64::from(n))
    }
}

impl From<u32> for Rational {
    fn from(n: u32) -> Self {
        Self::from_integer(i64::from(n))
    }
}

impl From<u64> for Rational {
    fn from(n: u64) -> Self {
        Self(RBig::from(IBig::from(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_ops() {
        let a = Rational::new(1, 2);
        let b = Rational::new(1, 3);

        assert_eq!(&a + &b, Rational::new(5, 6));
        assert_eq!(&a * &b, Rational::new(1, 6));
        assert_eq!(&a / &b, Rational::new(3, 2));
    }

    #[test]
    fn test_reduction_and_sign() {
        let r = Rational::new(4, -6);
        assert_eq!(r.numer_i64(), Some(-2));
        assert_eq!(r.denom_i64(), Some(3));
        assert!(r.is_negative());
    }

    #[test]
    fn test_powi() {
        let half = Rational::new(1, 2);
        assert_eq!(half.powi(-3), Some(Rational::from(8)));
        assert_eq!(Rational::zero().powi(-1), None);
    }

    #[test]
    fn test_floor_and_f64() {
        assert_eq!(Rational::new(7, 2).floor_i64(), Some(3));
        assert_eq!(Rational::new(-7, 2).floor_i64(), Some(-4));
        assert!((Rational::new(1, 4).to_f64() - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_display() {
        assert_eq!(Rational::from(3).to_string(), "3");
        assert_eq!(Rational::new(2, 3).to_string(), "2/3");
    }
}

//! Field abstraction shared by polynomial and linear-algebra code.
//!
//! The characteristic-equation solver works over two fields: exact rationals
//! (characteristic polynomials, particular solutions) and complex floating
//! point numbers (general solutions built from numeric roots). Both are
//! expressed through this one trait.

use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

use num_complex::Complex64;

use crate::rational::Rational;

/// Magnitude below which a complex value is treated as zero.
pub const COMPLEX_ZERO_TOLERANCE: f64 = 1e-12;

/// A field: commutative ring in which every non-zero element is invertible.
///
/// # Laws
///
/// - Addition is associative and commutative with identity `zero()`
/// - Multiplication is associative and commutative with identity `one()`
/// - Every non-zero element has a multiplicative inverse (`inv`)
pub trait Field:
    Clone + Debug + PartialEq + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + Neg<Output = Self>
{
    /// The additive identity.
    fn zero() -> Self;

    /// The multiplicative identity.
    fn one() -> Self;

    /// Returns true if this is (numerically) the additive identity.
    fn is_zero(&self) -> bool;

    /// Returns the multiplicative inverse, or `None` for zero.
    fn inv(&self) -> Option<Self>;

    /// Embeds an integer.
    fn from_i64(n: i64) -> Self;

    /// Absolute size, used for pivot selection.
    fn magnitude(&self) -> f64;

    /// Returns true if this is the multiplicative identity.
    fn is_one(&self) -> bool {
        (self.clone() - Self::one()).is_zero()
    }

    /// Divides, returning `None` when `other` is zero.
    fn field_div(&self, other: &Self) -> Option<Self> {
        other.inv().map(|inv| self.clone() * inv)
    }

    /// Computes `self * n` for an integer `n`.
    fn mul_by_scalar(&self, n: i64) -> Self {
        self.clone() * Self::from_i64(n)
    }

    /// Computes `self^n` by repeated squaring.
    fn pow(&self, n: u32) -> Self {
        let mut result = Self::one();
        let mut base = self.clone();
        let mut exp = n;

        while exp > 0 {
            if exp & 1 == 1 {
                result = result * base.clone();
            }
            base = base.clone() * base;
            exp >>= 1;
        }

        result
    }
}

impl Field for Rational {
    fn zero() -> Self {
        Rational::zero()
    }

    fn one() -> Self {
        Rational::one()
    }

    fn is_zero(&self) -> bool {
        Rational::is_zero(self)
    }

    fn inv(&self) -> Option<Self> {
        self.recip()
    }

    fn from_i64(n: i64) -> Self {
        Rational::from_integer(n)
    }

    fn magnitude(&self) -> f64 {
        self.to_f64().abs()
    }

    fn is_one(&self) -> bool {
        Rational::is_one(self)
    }
}

impl Field for Complex64 {
    fn zero() -> Self {
        Complex64::new(0.0, 0.0)
    }

    fn one() -> Self {
        Complex64::new(1.0, 0.0)
    }

    fn is_zero(&self) -> bool {
        self.norm() < COMPLEX_ZERO_TOLERANCE
    }

    fn inv(&self) -> Option<Self> {
        if Field::is_zero(self) {
            None
        } else {
            Some(Complex64::new(1.0, 0.0) / *self)
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_i64(n: i64) -> Self {
        Complex64::new(n as f64, 0.0)
    }

    fn magnitude(&self) -> f64 {
        self.norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rational_field() {
        let a = Rational::new(3, 4);
        let inv = Field::inv(&a).unwrap();
        assert!(Field::is_one(&(a * inv)));
        assert_eq!(Field::inv(&Rational::zero()), None);
    }

    #[test]
    fn test_complex_field() {
        let z = Complex64::new(1.0, 1.0);
        let w = z.field_div(&z).unwrap();
        assert!(Field::is_one(&w));
        assert!(Field::is_zero(&Complex64::new(1e-14, 0.0)));
    }

    #[test]
    fn test_pow() {
        let two = <Rational as Field>::from_i64(2);
        assert_eq!(Field::pow(&two, 10), Rational::from(1024));
    }
}

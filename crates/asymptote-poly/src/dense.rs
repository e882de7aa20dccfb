//! Dense univariate polynomials.
//!
//! Characteristic polynomials and summation polynomials are small (degree
//! rarely above ten), so multiplication is schoolbook throughout.

use asymptote_numeric::Field;

/// A dense univariate polynomial.
///
/// Coefficients are stored in ascending degree order. The zero polynomial is
/// represented by a single zero coefficient.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DensePoly<F: Field> {
    /// Coefficients in ascending degree order.
    coeffs: Vec<F>,
}

impl<F: Field> DensePoly<F> {
    /// Creates a new polynomial from coefficients.
    #[must_use]
    pub fn new(mut coeffs: Vec<F>) -> Self {
        while coeffs.len() > 1 && coeffs.last().is_some_and(|c| c.is_zero()) {
            coeffs.pop();
        }

        if coeffs.is_empty() {
            coeffs.push(F::zero());
        }

        Self { coeffs }
    }

    /// Creates the zero polynomial.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            coeffs: vec![F::zero()],
        }
    }

    /// Creates the constant polynomial 1.
    #[must_use]
    pub fn one() -> Self {
        Self {
            coeffs: vec![F::one()],
        }
    }

    /// Creates a constant polynomial.
    #[must_use]
    pub fn constant(c: F) -> Self {
        Self::new(vec![c])
    }

    /// Creates the polynomial x.
    #[must_use]
    pub fn x() -> Self {
        Self::new(vec![F::zero(), F::one()])
    }

    /// Creates the monomial c * x^n.
    #[must_use]
    pub fn monomial(c: F, n: usize) -> Self {
        let mut coeffs = vec![F::zero(); n + 1];
        coeffs[n] = c;
        Self::new(coeffs)
    }

    /// Creates the linear polynomial `slope * x + intercept`.
    #[must_use]
    pub fn linear(slope: F, intercept: F) -> Self {
        Self::new(vec![intercept, slope])
    }

    /// Returns the degree of the polynomial (0 for constants, including zero).
    #[must_use]
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Returns true if this is the zero polynomial.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs[0].is_zero()
    }

    /// Returns the leading coefficient.
    #[must_use]
    pub fn leading_coeff(&self) -> &F {
        &self.coeffs[self.coeffs.len() - 1]
    }

    /// Returns the coefficient of x^i.
    #[must_use]
    pub fn coeff(&self, i: usize) -> F {
        self.coeffs.get(i).cloned().unwrap_or_else(F::zero)
    }

    /// Returns all coefficients.
    #[must_use]
    pub fn coeffs(&self) -> &[F] {
        &self.coeffs
    }

    /// Evaluates the polynomial at a point using Horner's method.
    #[must_use]
    pub fn eval(&self, x: &F) -> F {
        let mut result = F::zero();
        for c in self.coeffs.iter().rev() {
            result = result * x.clone() + c.clone();
        }
        result
    }

    /// Adds two polynomials.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let len = self.coeffs.len().max(other.coeffs.len());
        let result = (0..len).map(|i| self.coeff(i) + other.coeff(i)).collect();
        Self::new(result)
    }

    /// Negates a polynomial.
    #[must_use]
    pub fn neg(&self) -> Self {
        Self::new(self.coeffs.iter().map(|c| -c.clone()).collect())
    }

    /// Subtracts two polynomials.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Multiplies two polynomials.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }

        let n = self.coeffs.len();
        let m = other.coeffs.len();
        let mut result = vec![F::zero(); n + m - 1];

        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                result[i + j] = result[i + j].clone() + a.clone() * b.clone();
            }
        }

        Self::new(result)
    }

    /// Multiplies every coefficient by a scalar.
    #[must_use]
    pub fn scale(&self, c: &F) -> Self {
        Self::new(self.coeffs.iter().map(|x| x.clone() * c.clone()).collect())
    }

    /// Raises the polynomial to a non-negative power.
    #[must_use]
    pub fn pow(&self, mut exp: u32) -> Self {
        let mut result = Self::one();
        let mut base = self.clone();

        while exp > 0 {
            if exp & 1 == 1 {
                result = result.mul(&base);
            }
            base = base.mul(&base);
            exp >>= 1;
        }

        result
    }

    /// Computes the formal derivative.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn derivative(&self) -> Self {
        if self.coeffs.len() <= 1 {
            return Self::zero();
        }

        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| c.mul_by_scalar(i as i64))
            .collect();

        Self::new(coeffs)
    }

    /// Computes `self(inner(x))`.
    #[must_use]
    pub fn compose(&self, inner: &Self) -> Self {
        let mut result = Self::zero();
        for c in self.coeffs.iter().rev() {
            result = result.mul(inner).add(&Self::constant(c.clone()));
        }
        result
    }

    /// Maps every coefficient into another field.
    #[must_use]
    pub fn map<G: Field>(&self, f: impl Fn(&F) -> G) -> DensePoly<G> {
        DensePoly::new(self.coeffs.iter().map(f).collect())
    }
}

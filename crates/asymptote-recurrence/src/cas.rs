//! The computer-algebra capability used by the solvers.
//!
//! Solvers never call symbolic routines directly; they go through
//! [`Algebra`], so the engine can run on another backend by implementing
//! this trait.

use std::cmp::Ordering;

use asymptote_core::Expr;
use asymptote_growth::{analyze, GrowthError, GrowthOrder, LeadingTerm};
use asymptote_linalg::DenseMatrix;
use asymptote_numeric::{Field, Rational};
use asymptote_poly::{find_roots, DensePoly, Root};

/// Symbolic operations required by the solvers.
pub trait Algebra: Send + Sync {
    /// Rebuilds an expression in simplified form.
    fn simplify(&self, expr: &Expr) -> Expr;

    /// Compares two growth classes.
    fn compare_growth(&self, a: &GrowthOrder, b: &GrowthOrder) -> Result<Ordering, GrowthError>;

    /// Finds the dominant term of an expression in `n`.
    fn leading_term(&self, expr: &Expr) -> Result<LeadingTerm, GrowthError>;

    /// Finds all roots of a rational polynomial with multiplicities, sorted
    /// by decreasing magnitude.
    fn solve_polynomial(&self, p: &DensePoly<Rational>, max_iterations: usize) -> Vec<Root>;

    /// Solves a square linear system; `None` if it is singular.
    fn solve_linear_system<F: Field>(&self, matrix: &DenseMatrix<F>, rhs: &[F]) -> Option<Vec<F>>;

    /// Converts an expression to a polynomial in `n`, if it is one.
    fn polynomial_in_n(&self, expr: &Expr) -> Option<DensePoly<Rational>>;
}

/// [`Algebra`] backed by the workspace's own crates.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeAlgebra;

impl Algebra for NativeAlgebra {
    fn simplify(&self, expr: &Expr) -> Expr {
        expr.simplify()
    }

    fn compare_growth(&self, a: &GrowthOrder, b: &GrowthOrder) -> Result<Ordering, GrowthError> {
        a.compare(b)
    }

    fn leading_term(&self, expr: &Expr) -> Result<LeadingTerm, GrowthError> {
        analyze(expr)
    }

    fn solve_polynomial(&self, p: &DensePoly<Rational>, max_iterations: usize) -> Vec<Root> {
        find_roots(p, max_iterations)
    }

    fn solve_linear_system<F: Field>(&self, matrix: &DenseMatrix<F>, rhs: &[F]) -> Option<Vec<F>> {
        matrix.solve(rhs)
    }

    fn polynomial_in_n(&self, expr: &Expr) -> Option<DensePoly<Rational>> {
        expr.to_polynomial()
    }
}

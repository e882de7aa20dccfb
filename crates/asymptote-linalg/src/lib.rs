//! # asymptote-linalg
//!
//! Dense linear algebra for the Asymptote recurrence solver.
//!
//! The only systems solved are small: a k×k system fitting the coefficients
//! of a general solution to k base cases. Gaussian elimination with partial
//! pivoting by magnitude works for both exact (`Rational`) and approximate
//! (`Complex64`) fields.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dense_matrix;

#[cfg(test)]
mod tests;

pub use dense_matrix::DenseMatrix;

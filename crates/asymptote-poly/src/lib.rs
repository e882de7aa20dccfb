//! # asymptote-poly
//!
//! Dense univariate polynomials for the Asymptote recurrence solver.
//!
//! This crate provides:
//! - Dense polynomials over any [`Field`](asymptote_numeric::Field)
//! - Euclidean division and GCD
//! - Yun squarefree decomposition
//! - Root finding with multiplicities (exact rational and quadratic roots,
//!   Aberth iteration otherwise)
//! - Newton interpolation
//! - Expanded and factored rendering of rational polynomials

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod dense;
mod display;

#[cfg(test)]
mod proptests;

pub use algorithms::gcd::{poly_div_rem, poly_gcd};
pub use algorithms::interpolate::interpolate;
pub use algorithms::roots::{find_roots, ExactRoot, Root};
pub use algorithms::squarefree::{squarefree_decomposition, SquarefreeDecomposition, SquarefreeFactor};
pub use dense::DensePoly;

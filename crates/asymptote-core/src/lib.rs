//! # asymptote-core
//!
//! Symbolic expressions in the recurrence variable `n`.
//!
//! This crate provides:
//! - `Expr`, an owned expression tree with smart constructors that flatten,
//!   fold constants and collect like terms
//! - Substitution of `n`, used to form f(n/b) and g(n − d)
//! - Expansion of products, powers of sums and logarithms
//! - Numeric and exact evaluation
//! - Conversion to and from rational polynomials
//! - Readable display for derivation traces

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod display;
mod eval;
mod expand;
pub mod expr;

pub use expr::Expr;

//! # asymptote-numeric
//!
//! Exact and approximate scalars for the Asymptote recurrence solver.
//!
//! This crate provides:
//! - Arbitrary precision rationals (`Rational`, wrapping `dashu`)
//! - The `Field` trait shared by polynomial and matrix code
//! - `Field` implementations for `Rational` (exact) and `Complex64`
//!   (characteristic roots and the base-case systems built from them)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod field;
pub mod rational;

#[cfg(test)]
mod proptests;

pub use field::{Field, COMPLEX_ZERO_TOLERANCE};
pub use num_complex::Complex64;
pub use rational::Rational;

//! # asymptote-recurrence
//!
//! Recurrence relation solving for the Asymptote engine.
//!
//! This crate provides:
//! - [`RecurrenceModel`]: validated divide-and-conquer, decrease-and-conquer,
//!   complex-combination and linear recurrences
//! - [`Classifier`]: which solving methods may apply
//! - The Master Theorem, iteration, substitution and characteristic
//!   equation solvers, each producing a [`Solution`] with a derivation
//! - [`Engine`]: method dispatch, automatic selection and parallel method
//!   comparison over a pluggable [`Algebra`] backend

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod cas;
pub mod classifier;
pub mod error;
pub mod model;
pub mod options;
pub mod solution;
pub mod solvers;

#[cfg(test)]
mod proptests;

pub use api::{classify, compare_growth, solve, solve_auto, Engine};
pub use cas::{Algebra, NativeAlgebra};
pub use classifier::{Classification, Classifier};
pub use error::{SolveError, SubstitutionStep};
pub use model::{Family, RecurrenceBuilder, RecurrenceModel, RecursiveTerm, Reduction};
pub use options::SolverOptions;
pub use solution::{Bound, BoundKind, DerivationStep, Guess, Method, Solution, StepKind};

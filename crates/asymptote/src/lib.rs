//! # Asymptote
//!
//! Asymptotic analysis of algorithmic recurrence relations.
//!
//! Asymptote classifies a recurrence, solves it with the Master Theorem,
//! iteration, substitution or the characteristic equation, and explains
//! each derivation step by step.
//!
//! ## Features
//!
//! - **Exact Arithmetic**: arbitrary precision rationals throughout
//! - **Growth Classes**: poly-log, exponential and factorial orders under
//!   Big-O dominance
//! - **Four Methods**: each producing a bound, a closed form when one
//!   exists, and a derivation
//! - **Method Comparison**: eligible methods run in parallel
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use asymptote::prelude::*;
//!
//! let model = RecurrenceModel::divide_and_conquer(2, 2)
//!     .driving(Expr::n())
//!     .base_case(1, 1)
//!     .build()?;
//! let solution = solve(&model, Method::MasterTheorem, None);
//! assert_eq!(solution.bound.unwrap().to_string(), "Θ(n log n)");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use asymptote_core as core;
pub use asymptote_growth as growth;
pub use asymptote_linalg as linalg;
pub use asymptote_numeric as numeric;
pub use asymptote_poly as poly;
pub use asymptote_recurrence as recurrence;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use asymptote_core::Expr;
    pub use asymptote_growth::{GrowthOrder, Quantity};
    pub use asymptote_numeric::Rational;
    pub use asymptote_recurrence::{
        classify, compare_growth, solve, solve_auto, Bound, BoundKind, Engine, Guess, Method, RecurrenceModel,
        Solution, SolveError, SolverOptions,
    };
}

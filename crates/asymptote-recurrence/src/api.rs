//! Entry points: classification, solving and growth comparison.
//!
//! [`Engine`] bundles an [`Algebra`] backend with [`SolverOptions`]. The
//! free functions run a default engine over [`NativeAlgebra`].
//!
//! ```rust,ignore
//! use asymptote_recurrence::{solve, Method, RecurrenceModel};
//! use asymptote_core::Expr;
//!
//! let merge_sort = RecurrenceModel::divide_and_conquer(2, 2)
//!     .driving(Expr::n())
//!     .base_case(1, 1)
//!     .build()?;
//! let solution = solve(&merge_sort, Method::MasterTheorem, None);
//! assert_eq!(solution.bound.unwrap().to_string(), "Θ(n log n)");
//! ```

use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::{debug, info_span};

use asymptote_growth::{GrowthError, GrowthOrder};

use crate::cas::{Algebra, NativeAlgebra};
use crate::classifier::{Classification, Classifier};
use crate::error::SolveError;
use crate::model::RecurrenceModel;
use crate::options::SolverOptions;
use crate::solution::{Guess, Method, Solution};
use crate::solvers::{CharacteristicSolver, IterationSolver, MasterTheoremSolver, SubstitutionSolver};

/// Order in which [`Engine::solve_auto`] tries methods.
const AUTO_ORDER: [Method; 3] = [Method::MasterTheorem, Method::CharacteristicEquation, Method::Iteration];

/// The solving engine.
#[derive(Clone, Debug, Default)]
pub struct Engine<A: Algebra = NativeAlgebra> {
    algebra: A,
    options: SolverOptions,
}

impl Engine {
    /// Creates an engine with the native backend and default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the native backend.
    #[must_use]
    pub fn with_options(options: SolverOptions) -> Self {
        Self::with_algebra(NativeAlgebra, options)
    }
}

impl<A: Algebra> Engine<A> {
    /// Creates an engine over a custom backend.
    #[must_use]
    pub fn with_algebra(algebra: A, options: SolverOptions) -> Self {
        Self { algebra, options }
    }

    /// The options in effect.
    #[must_use]
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Reports which methods may apply to `model`.
    #[must_use]
    pub fn classify(&self, model: &RecurrenceModel) -> Classification {
        Classifier::new(&self.algebra).classify(model)
    }

    /// Runs one method. `guess` is only read by
    /// [`Method::Substitution`].
    ///
    /// Failures are reported through [`Solution::diagnostic`].
    #[must_use]
    pub fn solve(&self, model: &RecurrenceModel, method: Method, guess: Option<&Guess>) -> Solution {
        let _span = info_span!("solve", method = %method, family = %model.family()).entered();
        debug!(model = %model, "solving");
        match method {
            Method::MasterTheorem => MasterTheoremSolver::new(&self.algebra, &self.options).solve(model),
            Method::Iteration => IterationSolver::new(&self.algebra, &self.options).solve(model),
            Method::Substitution => SubstitutionSolver::new(&self.algebra, &self.options).solve(model, guess),
            Method::CharacteristicEquation => CharacteristicSolver::new(&self.algebra, &self.options).solve(model),
        }
    }

    /// Tries the eligible guess-free methods in the order Master Theorem,
    /// Characteristic Equation, Iteration and returns the first solution
    /// with a bound.
    ///
    /// When none succeeds, the last failure is returned; a model with no
    /// eligible guess-free method yields a Substitution diagnostic.
    #[must_use]
    pub fn solve_auto(&self, model: &RecurrenceModel) -> Solution {
        let classification = self.classify(model);
        let mut last = None;
        for method in AUTO_ORDER.into_iter().filter(|m| classification.is_eligible(*m)) {
            let solution = self.solve(model, method, None);
            if solution.is_solved() {
                return solution;
            }
            debug!(method = %method, "falling through to the next method");
            last = Some(solution);
        }
        last.unwrap_or_else(|| {
            Solution::failed(
                Method::Substitution,
                Vec::new(),
                SolveError::inapplicable(format!(
                    "no guess-free method applies: {}",
                    classification.notes.join("; ")
                )),
            )
        })
    }

    /// Runs every eligible guess-free method in parallel. The results are
    /// ordered by [`Method`].
    #[must_use]
    pub fn compare_methods(&self, model: &RecurrenceModel) -> Vec<Solution> {
        let classification = self.classify(model);
        let methods: Vec<Method> = classification
            .eligible
            .iter()
            .copied()
            .filter(|m| *m != Method::Substitution)
            .collect();
        methods.par_iter().map(|m| self.solve(model, *m, None)).collect()
    }

    /// Orders two growth classes under Big-O dominance.
    ///
    /// # Errors
    ///
    /// Returns [`GrowthError::Incomparable`] when the parameters cannot be
    /// ordered.
    pub fn compare_growth(&self, a: &GrowthOrder, b: &GrowthOrder) -> Result<Ordering, GrowthError> {
        self.algebra.compare_growth(a, b)
    }
}

/// Reports which methods may apply to `model`.
#[must_use]
pub fn classify(model: &RecurrenceModel) -> Classification {
    Engine::new().classify(model)
}

/// Runs one method with default options.
#[must_use]
pub fn solve(model: &RecurrenceModel, method: Method, guess: Option<&Guess>) -> Solution {
    Engine::new().solve(model, method, guess)
}

/// Picks a method automatically with default options.
#[must_use]
pub fn solve_auto(model: &RecurrenceModel) -> Solution {
    Engine::new().solve_auto(model)
}

/// Orders two growth classes under Big-O dominance.
///
/// # Errors
///
/// Returns [`GrowthError::Incomparable`] when the parameters cannot be
/// ordered.
pub fn compare_growth(a: &GrowthOrder, b: &GrowthOrder) -> Result<Ordering, GrowthError> {
    NativeAlgebra.compare_growth(a, b)
}

#[cfg(test)]
mod tests {
    use asymptote_core::Expr;

    use super::*;
    use crate::solution::BoundKind;

    fn merge_sort() -> RecurrenceModel {
        RecurrenceModel::divide_and_conquer(2, 2)
            .driving(Expr::n())
            .base_case(1, 1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_dispatch() {
        let m = merge_sort();
        for method in [Method::MasterTheorem, Method::Iteration] {
            let s = solve(&m, method, None);
            assert_eq!(s.method, method);
            assert_eq!(s.bound.unwrap().to_string(), "Θ(n log n)");
        }
        let s = solve(&m, Method::CharacteristicEquation, None);
        assert!(s.diagnostic.unwrap().is_structural());
    }

    #[test]
    fn test_auto_prefers_master() {
        let s = solve_auto(&merge_sort());
        assert_eq!(s.method, Method::MasterTheorem);
    }

    #[test]
    fn test_auto_falls_through() {
        // n/log n sits in the gap between Master cases 1 and 2
        let f = Expr::n() / Expr::log(2, Expr::n());
        let m = RecurrenceModel::divide_and_conquer(2, 2)
            .driving(f)
            .base_case(1, 1)
            .build()
            .unwrap();
        let s = solve_auto(&m);
        assert_eq!(s.method, Method::Iteration);
        assert!(s.is_solved());
    }

    #[test]
    fn test_compare_methods() {
        let results = Engine::new().compare_methods(&merge_sort());
        let methods: Vec<Method> = results.iter().map(|s| s.method).collect();
        assert_eq!(methods, vec![Method::MasterTheorem, Method::Iteration]);
        assert!(results.iter().all(Solution::is_solved));
    }

    #[test]
    fn test_substitution_dispatch() {
        let guess = Guess::new(Expr::n() * Expr::log(2, Expr::n()), BoundKind::Theta);
        let s = solve(&merge_sort(), Method::Substitution, Some(&guess));
        assert!(s.is_solved());
    }

    #[test]
    fn test_compare_growth() {
        let quadratic = GrowthOrder::polynomial(2);
        let cubic = GrowthOrder::polynomial(3);
        assert_eq!(compare_growth(&quadratic, &cubic), Ok(Ordering::Less));
    }
}

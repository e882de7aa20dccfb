//! Solver output: bounds and derivations.

use std::fmt;

use serde::{Deserialize, Serialize};

use asymptote_core::Expr;
use asymptote_growth::GrowthOrder;

use crate::error::SolveError;

/// A solving method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Method {
    /// Master Theorem for T(n) = aT(n/b) + f(n).
    MasterTheorem,
    /// Unrolling into a sum.
    Iteration,
    /// Verification of a guessed bound by induction.
    Substitution,
    /// Roots of the characteristic polynomial.
    CharacteristicEquation,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::MasterTheorem => "Master Theorem",
            Method::Iteration => "Iteration",
            Method::Substitution => "Substitution",
            Method::CharacteristicEquation => "Characteristic Equation",
        };
        write!(f, "{name}")
    }
}

/// Kind of asymptotic bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundKind {
    /// Upper bound.
    BigO,
    /// Lower bound.
    BigOmega,
    /// Tight bound.
    Theta,
}

impl BoundKind {
    /// Returns true if the kind includes an upper bound.
    #[must_use]
    pub fn has_upper(self) -> bool {
        matches!(self, BoundKind::BigO | BoundKind::Theta)
    }

    /// Returns true if the kind includes a lower bound.
    #[must_use]
    pub fn has_lower(self) -> bool {
        matches!(self, BoundKind::BigOmega | BoundKind::Theta)
    }

    /// The notation symbol.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BoundKind::BigO => "O",
            BoundKind::BigOmega => "Ω",
            BoundKind::Theta => "Θ",
        }
    }
}

/// An asymptotic bound on T(n).
#[derive(Clone, Debug, PartialEq)]
pub struct Bound {
    /// Θ, O or Ω.
    pub kind: BoundKind,
    /// The growth class.
    pub order: GrowthOrder,
}

impl Bound {
    /// A tight bound.
    #[must_use]
    pub fn theta(order: GrowthOrder) -> Self {
        Self {
            kind: BoundKind::Theta,
            order,
        }
    }

    /// An upper bound.
    #[must_use]
    pub fn big_o(order: GrowthOrder) -> Self {
        Self {
            kind: BoundKind::BigO,
            order,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind.symbol(), self.order)
    }
}

/// A guessed bound for the substitution method.
#[derive(Clone, Debug, PartialEq)]
pub struct Guess {
    /// The guessed function g(n).
    pub expr: Expr,
    /// Which inequality (or both) to verify.
    pub kind: BoundKind,
}

impl Guess {
    /// Creates a guess.
    #[must_use]
    pub fn new(expr: Expr, kind: BoundKind) -> Self {
        Self { expr, kind }
    }
}

/// What a derivation step does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    /// Restating the recurrence and its parameters.
    Setup,
    /// Computing log_b(a).
    CriticalExponent,
    /// Comparing growth classes.
    Comparison,
    /// Choosing a Master Theorem case.
    CaseSelection,
    /// Checking a·f(n/b) ≤ c·f(n).
    Regularity,
    /// One level of unrolling.
    Unrolling,
    /// Reaching the base case.
    Termination,
    /// Reducing a sum.
    Summation,
    /// Substituting the guess.
    Substitution,
    /// Simplifying the inductive step.
    Simplification,
    /// Solving for the constant.
    ConstantSolved,
    /// Checking base cases.
    BaseCase,
    /// Forming the characteristic polynomial.
    CharacteristicPolynomial,
    /// Listing roots.
    Roots,
    /// Writing the general solution.
    GeneralSolution,
    /// Fitting coefficients to base cases.
    Coefficients,
    /// Stating the result.
    Conclusion,
    /// A remark.
    Note,
}

/// One immutable step of a derivation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationStep {
    /// What the step does.
    pub kind: StepKind,
    /// Human-readable description.
    pub description: String,
}

impl fmt::Display for DerivationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// The result of running one method on one recurrence.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// The method that produced this solution.
    pub method: Method,
    /// The bound, if the method succeeded.
    pub bound: Option<Bound>,
    /// An exact closed form, when one was found.
    pub closed_form: Option<String>,
    /// Ordered derivation steps.
    pub steps: Vec<DerivationStep>,
    /// Why the method failed, if it did.
    pub diagnostic: Option<SolveError>,
}

impl Solution {
    /// Returns true if a bound was found.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.bound.is_some()
    }

    pub(crate) fn failed(method: Method, steps: Vec<DerivationStep>, err: SolveError) -> Self {
        Self {
            method,
            bound: None,
            closed_form: None,
            steps,
            diagnostic: Some(err),
        }
    }
}

/// Accumulates derivation steps while a solver runs.
#[derive(Debug, Default)]
pub(crate) struct Trace {
    steps: Vec<DerivationStep>,
}

impl Trace {
    pub(crate) fn push(&mut self, kind: StepKind, description: impl Into<String>) {
        self.steps.push(DerivationStep {
            kind,
            description: description.into(),
        });
    }

    pub(crate) fn into_steps(self) -> Vec<DerivationStep> {
        self.steps
    }

    pub(crate) fn solved(self, method: Method, bound: Bound, closed_form: Option<String>) -> Solution {
        Solution {
            method,
            bound: Some(bound),
            closed_form,
            steps: self.steps,
            diagnostic: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_display() {
        let b = Bound::theta(GrowthOrder::polynomial(2));
        assert_eq!(b.to_string(), "Θ(n^2)");
        assert_eq!(Bound::big_o(GrowthOrder::Constant).to_string(), "O(1)");
    }

    #[test]
    fn test_bound_kind_sides() {
        assert!(BoundKind::Theta.has_upper() && BoundKind::Theta.has_lower());
        assert!(!BoundKind::BigO.has_lower());
        assert!(!BoundKind::BigOmega.has_upper());
    }
}

//! Solver diagnostics.

use asymptote_growth::GrowthError;
use thiserror::Error;

/// The step of the substitution method at which a guess failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SubstitutionStep {
    /// T(n) ≤ c·g(n) (or ≥) does not follow from the hypothesis.
    InductiveStep,
    /// A base case violates the bound for every admissible constant.
    BaseCase,
}

impl std::fmt::Display for SubstitutionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubstitutionStep::InductiveStep => write!(f, "inductive step"),
            SubstitutionStep::BaseCase => write!(f, "base case"),
        }
    }
}

/// Errors reported by model construction and the solvers.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SolveError {
    /// The method's structural preconditions are not met.
    #[error("method does not apply: {0}")]
    MethodInapplicable(String),

    /// Unrolling did not reach a base case.
    #[error("recursion does not terminate: {0}")]
    NonTerminating(String),

    /// The substitution guess failed.
    #[error("guess rejected at the {step}: {reason}")]
    GuessRejected {
        /// Which step failed.
        step: SubstitutionStep,
        /// What went wrong.
        reason: String,
    },

    /// Too few base cases to fix the general solution.
    #[error("underdetermined system: {needed} base cases needed, {given} given")]
    UnderdeterminedSystem {
        /// Order of the recurrence.
        needed: usize,
        /// Base cases supplied.
        given: usize,
    },

    /// Two growth classes could not be ordered.
    #[error(transparent)]
    IncomparableGrowth(#[from] GrowthError),

    /// The recurrence violates a model invariant.
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

impl SolveError {
    /// Returns true if the method cannot apply to this recurrence's shape,
    /// as opposed to a computation on an applicable method failing.
    ///
    /// A caller seeing a structural error should suggest another method.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, SolveError::MethodInapplicable(_) | SolveError::InvalidModel(_))
    }

    pub(crate) fn inapplicable(reason: impl Into<String>) -> Self {
        SolveError::MethodInapplicable(reason.into())
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        SolveError::InvalidModel(reason.into())
    }

    /// Maps growth errors that mean "shape not supported" to
    /// [`SolveError::MethodInapplicable`], keeping genuine incomparability.
    pub(crate) fn from_growth(err: GrowthError) -> Self {
        match err {
            GrowthError::Incomparable { .. } => SolveError::IncomparableGrowth(err),
            GrowthError::Cancellation(_) | GrowthError::Unsupported(_) => SolveError::MethodInapplicable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural() {
        assert!(SolveError::inapplicable("two recursive terms").is_structural());
        assert!(SolveError::invalid("b ≤ 1").is_structural());
        assert!(!SolveError::NonTerminating("stalls at 0".into()).is_structural());
        let rejected = SolveError::GuessRejected {
            step: SubstitutionStep::InductiveStep,
            reason: "n grows too slowly".into(),
        };
        assert!(!rejected.is_structural());
    }

    #[test]
    fn test_growth_mapping() {
        let unsupported = SolveError::from_growth(GrowthError::Unsupported("n^n".into()));
        assert!(matches!(unsupported, SolveError::MethodInapplicable(_)));
        let incomparable = SolveError::from_growth(GrowthError::Incomparable {
            left: "n^k".into(),
            right: "n^2".into(),
        });
        assert!(matches!(incomparable, SolveError::IncomparableGrowth(_)));
    }

    #[test]
    fn test_messages() {
        let e = SolveError::UnderdeterminedSystem { needed: 2, given: 1 };
        assert_eq!(e.to_string(), "underdetermined system: 2 base cases needed, 1 given");
    }
}

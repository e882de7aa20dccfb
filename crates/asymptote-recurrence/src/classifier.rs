//! Method eligibility.
//!
//! Classification only inspects the model's structure; it never runs a
//! solver. A method being eligible means its preconditions on the shape of
//! the recurrence hold, not that it will produce a bound.

use std::collections::BTreeSet;

use tracing::trace;

use asymptote_growth::Quantity;

use crate::cas::Algebra;
use crate::model::{Family, RecurrenceModel, Reduction};
use crate::solution::Method;

/// The methods that may apply to a recurrence, with the reasons for each
/// one that does not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Methods whose structural preconditions hold.
    pub eligible: BTreeSet<Method>,
    /// True if the recurrence has the form aT(n/b) + f(n) with a concrete
    /// a ≥ 1 and b > 1.
    pub master_precondition: bool,
    /// One line per ineligible method.
    pub notes: Vec<String>,
}

impl Classification {
    /// Returns true if `method` is eligible.
    #[must_use]
    pub fn is_eligible(&self, method: Method) -> bool {
        self.eligible.contains(&method)
    }
}

/// Decides method eligibility against an [`Algebra`] backend.
pub struct Classifier<'a, A: Algebra> {
    algebra: &'a A,
}

impl<'a, A: Algebra> Classifier<'a, A> {
    /// Creates a classifier over the given backend.
    #[must_use]
    pub fn new(algebra: &'a A) -> Self {
        Self { algebra }
    }

    /// Classifies `model`.
    #[must_use]
    pub fn classify(&self, model: &RecurrenceModel) -> Classification {
        let mut eligible = BTreeSet::new();
        let mut notes = Vec::new();
        let family = model.family();

        let single_division = family == Family::DivideAndConquer && model.terms().len() == 1;
        let master_precondition = single_division && model.is_concrete();
        if master_precondition {
            eligible.insert(Method::MasterTheorem);
        } else if single_division {
            notes.push("Master Theorem: the subproblem count a must be a number".to_string());
        } else {
            notes.push(format!(
                "Master Theorem: needs T(n) = aT(n/b) + f(n), not a {family} recurrence"
            ));
        }

        if family != Family::LinearHomogeneous {
            notes.push(format!(
                "Characteristic Equation: needs a linear recurrence with constant coefficients, not a {family} recurrence"
            ));
        } else {
            let f = model.driving_function();
            if f.is_zero() || self.algebra.polynomial_in_n(f).is_some() {
                eligible.insert(Method::CharacteristicEquation);
            } else {
                notes.push(format!("Characteristic Equation: f(n) = {f} is not a polynomial in n"));
            }
        }

        match iteration_blocker(model) {
            None => {
                eligible.insert(Method::Iteration);
            }
            Some(reason) => notes.push(format!("Iteration: {reason}")),
        }

        eligible.insert(Method::Substitution);

        trace!(family = %family, eligible = eligible.len(), "classified");
        Classification {
            eligible,
            master_precondition,
            notes,
        }
    }
}

/// Why unrolling does not apply, if it does not.
fn iteration_blocker(model: &RecurrenceModel) -> Option<String> {
    match model.family() {
        Family::DivideAndConquer | Family::DecreaseAndConquer | Family::ComplexCombination => None,
        Family::LinearHomogeneous => match model.terms() {
            [term] if term.reduction == Reduction::Decrease(1) => match &term.coefficient {
                Quantity::Exact(c) if !c.is_negative() => None,
                Quantity::Exact(c) => Some(format!("the coefficient {c} alternates in sign")),
                _ => Some("the coefficient must be a number".to_string()),
            },
            _ => Some("only first-order linear recurrences unroll into a single sum".to_string()),
        },
    }
}

/// Classifies `model` with the native backend.
#[must_use]
pub fn classify(model: &RecurrenceModel) -> Classification {
    Classifier::new(&crate::cas::NativeAlgebra).classify(model)
}

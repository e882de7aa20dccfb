//! Substitution method: verify a guessed bound by induction.
//!
//! With the hypothesis T(m) ≤ c·g(m) (or ≥) for m < n, the right-hand side
//! becomes c·g(n) + c·E(n) + f(n) where E(n) = Σ aᵢ·g(rᵢ(n)) − g(n). The
//! inductive step needs D(n) = c·E(n) + f(n) to be eventually ≤ 0 for the
//! upper bound and ≥ 0 for the lower bound; the leading terms of E and f
//! decide which constants c make that true. Base cases then pin c down.
//!
//! When f(n) alone keeps D(n) positive (E ≡ 0, as for T(n) = 2T(n/2) + 1
//! against g(n) = n), the upper hypothesis is strengthened to
//! T(m) ≤ c·g(m) − b·f(m). The subtracted terms contribute
//! −b·F(n) with F(n) = Σ aᵢ·f(rᵢ(n)) − f(n), which absorbs f(n) once b is
//! large enough whenever F has the growth of f with a positive coefficient.

use std::cmp::Ordering;

use tracing::debug;

use asymptote_core::Expr;
use asymptote_growth::{LeadingTerm, Quantity};

use super::{driving_term, finish, fmt_num, Outcome};
use crate::cas::Algebra;
use crate::error::{SolveError, SubstitutionStep};
use crate::model::RecurrenceModel;
use crate::options::SolverOptions;
use crate::solution::{Bound, BoundKind, Guess, Method, Solution, StepKind, Trace};

/// Large size at which D(n) is sampled when the leading terms cancel.
const BOUNDARY_SAMPLE: f64 = 1_048_576.0;

/// Checks a guessed bound by strong induction.
pub struct SubstitutionSolver<'a, A: Algebra> {
    algebra: &'a A,
    options: &'a SolverOptions,
}

/// Which constants c make the inductive step go through.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Constraint {
    Any,
    AtLeast(f64),
    AtMost(f64),
    Never,
}

/// How the leading terms of E(n) and f(n) relate.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Balance {
    /// E ≡ 0 and f ≡ 0.
    Zero,
    /// E ≡ 0, or f grows strictly faster than E.
    DrivingOnly,
    /// E grows strictly faster than f, with this leading coefficient.
    ExcessOnly(f64),
    /// Same growth class; leading coefficients of E and f.
    Tie { excess: f64, driving: f64 },
}

impl Balance {
    fn upper(self) -> Constraint {
        match self {
            Balance::Zero => Constraint::Any,
            Balance::DrivingOnly => Constraint::Never,
            Balance::ExcessOnly(e) if e < 0.0 => Constraint::Any,
            Balance::ExcessOnly(_) => Constraint::Never,
            Balance::Tie { excess, driving } if excess < 0.0 => Constraint::AtLeast(driving / -excess),
            Balance::Tie { .. } => Constraint::Never,
        }
    }

    fn lower(self) -> Constraint {
        match self {
            Balance::Zero | Balance::DrivingOnly => Constraint::Any,
            Balance::ExcessOnly(e) if e > 0.0 => Constraint::Any,
            Balance::ExcessOnly(_) => Constraint::Never,
            Balance::Tie { excess, .. } if excess >= 0.0 => Constraint::Any,
            Balance::Tie { excess, driving } => Constraint::AtMost(driving / -excess),
        }
    }
}

impl<'a, A: Algebra> SubstitutionSolver<'a, A> {
    /// Creates a solver over the given backend.
    #[must_use]
    pub fn new(algebra: &'a A, options: &'a SolverOptions) -> Self {
        Self { algebra, options }
    }

    /// Verifies `guess` for `model`.
    ///
    /// A missing guess is reported as [`SolveError::MethodInapplicable`].
    #[must_use]
    pub fn solve(&self, model: &RecurrenceModel, guess: Option<&Guess>) -> Solution {
        let mut trace = Trace::default();
        let result = self.run(model, guess, &mut trace);
        finish(Method::Substitution, trace, result)
    }

    fn run(&self, model: &RecurrenceModel, guess: Option<&Guess>, trace: &mut Trace) -> Result<Outcome, SolveError> {
        let guess = guess.ok_or_else(|| SolveError::inapplicable("substitution needs a guessed bound g(n)"))?;
        for term in model.terms() {
            if let Quantity::Exact(a) = &term.coefficient {
                if a.is_negative() {
                    return Err(SolveError::inapplicable(format!(
                        "the negative coefficient {a} reverses the induction hypothesis"
                    )));
                }
            }
        }

        let g = &guess.expr;
        let g_term = self.algebra.leading_term(g).map_err(SolveError::from_growth)?;
        if !g.contains_n() || g_term.coefficient.map_or(true, |c| c <= 0.0) {
            return Err(SolveError::inapplicable(format!(
                "the guess g(n) = {g} must be an eventually positive function of n"
            )));
        }

        trace.push(StepKind::Setup, model.to_string());
        let hypothesis = match guess.kind {
            BoundKind::BigO => "T(m) ≤ c·g(m)",
            BoundKind::BigOmega => "T(m) ≥ c·g(m)",
            BoundKind::Theta => "c₁·g(m) ≤ T(m) ≤ c₂·g(m)",
        };
        trace.push(
            StepKind::Substitution,
            format!("assume {hypothesis} for all m < n, with g(n) = {g}"),
        );

        let c = Expr::symbol("c");
        let shifted: Vec<Expr> = model
            .terms()
            .iter()
            .map(|t| Expr::product([t.coefficient_expr(), g.substitute_n(&t.reduction.as_expr())]))
            .collect();
        let f = model.driving_function();
        let rhs = Expr::sum(
            shifted
                .iter()
                .map(|s| Expr::product([c.clone(), s.clone()]))
                .chain([f.clone()]),
        );
        trace.push(StepKind::Substitution, format!("T(n) is bounded through {}", self.algebra.simplify(&rhs)));

        let excess = Expr::sum(shifted.into_iter().chain([-g.clone()])).expand();
        let gap = Expr::sum([Expr::product([c, excess.clone()]), f.clone()]).expand();
        trace.push(
            StepKind::Simplification,
            format!("the recursive terms give c·g(n) + c·E(n) with E(n) = {excess}, so T(n) - c·g(n) = {gap}"),
        );

        let balance = self.balance(model, &excess)?;
        debug!(?balance, kind = ?guess.kind, "inductive step");

        let mut upper = None;
        let mut lower = None;
        let mut margin = None;
        if guess.kind.has_upper() {
            let mut constraint = balance.upper();
            if constraint == Constraint::Never && balance == Balance::DrivingOnly {
                margin = self.lower_order_margin(model, trace)?;
                if margin.is_some() {
                    constraint = Constraint::Any;
                }
            }
            if constraint == Constraint::Never {
                return Err(SolveError::GuessRejected {
                    step: SubstitutionStep::InductiveStep,
                    reason: format!("{gap} stays positive for every c, so T(n) ≤ c·g(n) does not follow"),
                });
            }
            if margin.is_none() {
                trace.push(StepKind::ConstantSolved, describe("T(n) ≤ c·g(n)", constraint));
            }
            upper = Some(constraint);
        }
        if guess.kind.has_lower() {
            let constraint = balance.lower();
            if constraint == Constraint::Never {
                return Err(SolveError::GuessRejected {
                    step: SubstitutionStep::InductiveStep,
                    reason: format!("{gap} turns negative for every c > 0, so T(n) ≥ c·g(n) does not follow"),
                });
            }
            trace.push(StepKind::ConstantSolved, describe("T(n) ≥ c·g(n)", constraint));
            lower = Some(constraint);
        }

        let ratios = self.base_ratios(model, g, trace)?;
        let mut constants = Vec::new();

        if let Some(constraint) = upper {
            let floor = match constraint {
                Constraint::AtLeast(l) => l,
                _ => 0.0,
            };
            let b = margin.unwrap_or(0.0);
            let mut chosen = floor;
            for r in &ratios {
                let lifted = if b > 0.0 {
                    #[allow(clippy::cast_precision_loss)]
                    let f_n = f.eval(r.n as f64).ok_or_else(|| SolveError::GuessRejected {
                        step: SubstitutionStep::BaseCase,
                        reason: format!("f({}) is undefined, so c·g({}) - b·f({}) cannot be checked", r.n, r.n, r.n),
                    })?;
                    (r.value + b * f_n) / r.g
                } else {
                    r.ratio
                };
                chosen = chosen.max(lifted);
            }
            if chosen <= 0.0 {
                chosen = 1.0;
            }
            if matches!(constraint, Constraint::AtLeast(l) if self.near(chosen, l))
                && !self.boundary_holds(chosen, &excess, f, true)
            {
                chosen *= 2.0;
            }
            if b > 0.0 {
                constants.push(format!("T(n) ≤ {}·g(n) - {}·f(n)", fmt_num(chosen), fmt_num(b)));
            } else {
                constants.push(format!("T(n) ≤ {}·g(n)", fmt_num(chosen)));
            }
        }

        if let Some(constraint) = lower {
            let ceiling = match constraint {
                Constraint::AtMost(u) => u,
                _ => f64::INFINITY,
            };
            let mut chosen = ratios.iter().map(|r| r.ratio).fold(ceiling, f64::min);
            if chosen.is_infinite() {
                chosen = 1.0;
            }
            if chosen <= self.options.tolerance {
                let worst = ratios
                    .iter()
                    .find(|r| r.ratio <= self.options.tolerance)
                    .map_or_else(|| "T(n) - c·g(n)".to_string(), |r| format!("T({}) = {}", r.n, fmt_num(r.value)));
                return Err(SolveError::GuessRejected {
                    step: SubstitutionStep::BaseCase,
                    reason: format!("{worst} is not at least c·g(n) for any c > 0"),
                });
            }
            if matches!(constraint, Constraint::AtMost(u) if self.near(chosen, u))
                && !self.boundary_holds(chosen, &excess, f, false)
            {
                chosen /= 2.0;
            }
            constants.push(format!("T(n) ≥ {}·g(n)", fmt_num(chosen)));
        }

        trace.push(
            StepKind::ConstantSolved,
            format!("{} for all n past the base cases", constants.join(" and ")),
        );
        Ok(Outcome::bound(Bound {
            kind: guess.kind,
            order: g_term.order,
        }))
    }

    fn balance(&self, model: &RecurrenceModel, excess: &Expr) -> Result<Balance, SolveError> {
        let excess_term = if excess.is_zero() {
            None
        } else {
            Some(self.algebra.leading_term(excess).map_err(SolveError::from_growth)?)
        };
        let driving = driving_term(self.algebra, model)?;

        let known = |t: &LeadingTerm, what: &str| {
            t.coefficient
                .ok_or_else(|| SolveError::inapplicable(format!("the sign of the leading term of {what} is unknown")))
        };

        Ok(match (excess_term, driving) {
            (None, None) => Balance::Zero,
            (None, Some(_)) => Balance::DrivingOnly,
            (Some(e), None) => Balance::ExcessOnly(known(&e, "E(n)")?),
            (Some(e), Some(d)) => {
                let ec = known(&e, "E(n)")?;
                match self.algebra.compare_growth(&e.order, &d.order).map_err(SolveError::from_growth)? {
                    Ordering::Greater => Balance::ExcessOnly(ec),
                    Ordering::Less => Balance::DrivingOnly,
                    Ordering::Equal => Balance::Tie {
                        excess: ec,
                        driving: known(&d, "f(n)")?,
                    },
                }
            }
        })
    }

    /// The margin b of the strengthened hypothesis T(m) ≤ c·g(m) − b·f(m),
    /// or `None` when subtracting b·f(m) cannot absorb f(n).
    fn lower_order_margin(&self, model: &RecurrenceModel, trace: &mut Trace) -> Result<Option<f64>, SolveError> {
        let Some(driving) = driving_term(self.algebra, model)? else {
            return Ok(None);
        };
        let Some(f_coef) = driving.coefficient.filter(|c| *c > 0.0) else {
            return Ok(None);
        };

        let f = model.driving_function();
        let absorbed = Expr::sum(
            model
                .terms()
                .iter()
                .map(|t| Expr::product([t.coefficient_expr(), f.substitute_n(&t.reduction.as_expr())]))
                .chain([-f.clone()]),
        )
        .expand();
        if absorbed.is_zero() {
            return Ok(None);
        }
        let term = self.algebra.leading_term(&absorbed).map_err(SolveError::from_growth)?;
        let Some(eta) = term.coefficient.filter(|c| *c > 0.0) else {
            return Ok(None);
        };
        if self.algebra.compare_growth(&term.order, &driving.order).map_err(SolveError::from_growth)? != Ordering::Equal {
            return Ok(None);
        }

        // at twice the threshold D(n) leads with -f(n)
        let least = f_coef / eta;
        let margin = 2.0 * least;
        debug!(least, margin, "strengthened hypothesis");
        trace.push(
            StepKind::Substitution,
            format!("strengthen the hypothesis to T(m) ≤ c·g(m) - b·f(m), which subtracts b·({absorbed}) from f(n) = {f}"),
        );
        trace.push(
            StepKind::ConstantSolved,
            format!(
                "T(n) ≤ c·g(n) - b·f(n) holds in the inductive step for every c > 0 once b > {}; take b = {}",
                fmt_num(least),
                fmt_num(margin)
            ),
        );
        Ok(Some(margin))
    }

    /// T(n)/g(n) at every base case, moving the threshold past sizes where
    /// g(n) is not positive.
    fn base_ratios(&self, model: &RecurrenceModel, g: &Expr, trace: &mut Trace) -> Result<Vec<BaseRatio>, SolveError> {
        let base = model.base_cases();
        let mut ratios = Vec::new();

        for (&n, value) in base {
            #[allow(clippy::cast_precision_loss)]
            let g_n = g.eval(n as f64);
            if let Some(g_n) = g_n.filter(|v| *v > self.options.tolerance) {
                let t = value.to_f64();
                trace.push(
                    StepKind::BaseCase,
                    format!("T({n}) = {value} and g({n}) = {}, so c·g({n}) meets T({n}) at c = {}", fmt_num(g_n), fmt_num(t / g_n)),
                );
                ratios.push(BaseRatio {
                    n,
                    value: t,
                    g: g_n,
                    ratio: t / g_n,
                });
                continue;
            }

            let mut shifted = Vec::new();
            for step in 1..=self.options.max_threshold_shifts {
                let m = n + i64::try_from(step).unwrap_or(i64::MAX);
                if base.contains_key(&m) {
                    continue;
                }
                #[allow(clippy::cast_precision_loss)]
                let Some(g_m) = g.eval(m as f64).filter(|v| *v > self.options.tolerance) else {
                    continue;
                };
                let t = model.evaluate(m, self.options.max_depth).map_err(|e| SolveError::GuessRejected {
                    step: SubstitutionStep::BaseCase,
                    reason: format!("cannot evaluate T({m}): {e}"),
                })?;
                shifted.push(BaseRatio {
                    n: m,
                    value: t,
                    g: g_m,
                    ratio: t / g_m,
                });
            }

            let moved_past = shifted.is_empty() && (1..=self.options.max_threshold_shifts).any(|s| {
                base.contains_key(&(n + i64::try_from(s).unwrap_or(i64::MAX)))
            });
            if shifted.is_empty() && !moved_past {
                return Err(SolveError::GuessRejected {
                    step: SubstitutionStep::BaseCase,
                    reason: format!(
                        "g(n) is not positive at n = {n} or the next {} sizes",
                        self.options.max_threshold_shifts
                    ),
                });
            }

            let listed: Vec<String> = shifted
                .iter()
                .map(|r| format!("T({}) = {}", r.n, fmt_num(r.value)))
                .collect();
            trace.push(
                StepKind::BaseCase,
                if listed.is_empty() {
                    format!("g({n}) is not positive, so the induction starts at the next base case")
                } else {
                    format!(
                        "g({n}) is not positive, so the induction starts after n = {n} with {}",
                        listed.join(", ")
                    )
                },
            );
            ratios.extend(shifted);
        }
        Ok(ratios)
    }

    fn near(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.options.tolerance * (1.0 + b.abs())
    }

    /// Sign of D(n) = c·E(n) + f(n) at a large size, for a constant on the
    /// edge of the admissible range.
    fn boundary_holds(&self, c: f64, excess: &Expr, f: &Expr, upper: bool) -> bool {
        let (Some(e), Some(fv)) = (excess.eval(BOUNDARY_SAMPLE), f.eval(BOUNDARY_SAMPLE)) else {
            return false;
        };
        let gap = c * e + fv;
        let slack = self.options.tolerance * (1.0 + fv.abs());
        if upper {
            gap <= slack
        } else {
            gap >= -slack
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct BaseRatio {
    n: i64,
    value: f64,
    g: f64,
    ratio: f64,
}

fn describe(goal: &str, constraint: Constraint) -> String {
    match constraint {
        Constraint::Any => format!("{goal} holds in the inductive step for every c > 0"),
        Constraint::AtLeast(l) => format!("{goal} holds in the inductive step for c ≥ {}", fmt_num(l)),
        Constraint::AtMost(u) => format!("{goal} holds in the inductive step for 0 < c ≤ {}", fmt_num(u)),
        Constraint::Never => format!("{goal} fails in the inductive step"),
    }
}

#[cfg(test)]
mod tests {
    use asymptote_numeric::Rational;

    use super::*;
    use crate::cas::NativeAlgebra;

    fn check(model: &RecurrenceModel, guess: &Guess) -> Solution {
        let options = SolverOptions::default();
        SubstitutionSolver::new(&NativeAlgebra, &options).solve(model, Some(guess))
    }

    fn merge_sort() -> RecurrenceModel {
        RecurrenceModel::divide_and_conquer(2, 2)
            .driving(Expr::n())
            .base_case(1, 1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_accepts_n_log_n() {
        let guess = Guess::new(Expr::n() * Expr::log(2, Expr::n()), BoundKind::Theta);
        let s = check(&merge_sort(), &guess);
        assert!(s.is_solved(), "{:?}", s.diagnostic);
        assert_eq!(s.bound.unwrap().to_string(), "Θ(n log n)");
        assert!(s.steps.iter().any(|st| st.kind == StepKind::BaseCase));
    }

    #[test]
    fn test_rejects_linear_guess() {
        let guess = Guess::new(Expr::n(), BoundKind::BigO);
        let s = check(&merge_sort(), &guess);
        assert!(matches!(
            s.diagnostic,
            Some(SolveError::GuessRejected {
                step: SubstitutionStep::InductiveStep,
                ..
            })
        ));
    }

    #[test]
    fn test_overestimate_passes_upper_only() {
        let guess = Guess::new(Expr::powi(Expr::n(), 2), BoundKind::BigO);
        assert!(check(&merge_sort(), &guess).is_solved());
        let tight = Guess::new(Expr::powi(Expr::n(), 2), BoundKind::BigOmega);
        assert!(!check(&merge_sort(), &tight).is_solved());
    }

    #[test]
    fn test_strengthened_hypothesis_constant_driving() {
        let m = RecurrenceModel::divide_and_conquer(2, 2)
            .driving(Expr::one())
            .base_case(1, 1)
            .build()
            .unwrap();
        let s = check(&m, &Guess::new(Expr::n(), BoundKind::Theta));
        assert!(s.is_solved(), "{:?}", s.diagnostic);
        assert_eq!(s.bound.unwrap().to_string(), "Θ(n)");
        assert!(s
            .steps
            .iter()
            .any(|st| st.kind == StepKind::Substitution && st.description.starts_with("strengthen the hypothesis")));
        let last = &s.steps[s.steps.len() - 2];
        assert_eq!(
            last.description,
            "T(n) ≤ 3·g(n) - 2·f(n) and T(n) ≥ 1·g(n) for all n past the base cases"
        );
    }

    #[test]
    fn test_strengthened_hypothesis_polynomial_driving() {
        let m = RecurrenceModel::divide_and_conquer(4, 2)
            .driving(Expr::n())
            .base_case(1, 1)
            .build()
            .unwrap();
        let s = check(&m, &Guess::new(Expr::powi(Expr::n(), 2), BoundKind::Theta));
        assert!(s.is_solved(), "{:?}", s.diagnostic);
        assert_eq!(s.bound.unwrap().to_string(), "Θ(n^2)");
        assert!(s.steps.iter().any(|st| st.description.contains("once b > 1; take b = 2")));
    }

    #[test]
    fn test_decrease_quadratic() {
        let m = RecurrenceModel::decrease_and_conquer(1)
            .driving(Expr::n())
            .base_case(0, 0)
            .build()
            .unwrap();
        let s = check(&m, &Guess::new(Expr::powi(Expr::n(), 2), BoundKind::Theta));
        assert!(s.is_solved(), "{:?}", s.diagnostic);
        let last = &s.steps[s.steps.len() - 2];
        assert_eq!(last.description, "T(n) ≤ 1·g(n) and T(n) ≥ 0.5·g(n) for all n past the base cases");
    }

    #[test]
    fn test_zero_base_case_fails_lower_bound() {
        let m = RecurrenceModel::divide_and_conquer(2, 2)
            .driving(Expr::n())
            .base_case(1, 0)
            .base_case(2, 0)
            .build()
            .unwrap();
        let s = check(&m, &Guess::new(Expr::n(), BoundKind::BigOmega));
        assert!(matches!(
            s.diagnostic,
            Some(SolveError::GuessRejected {
                step: SubstitutionStep::BaseCase,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_guess() {
        let options = SolverOptions::default();
        let s = SubstitutionSolver::new(&NativeAlgebra, &options).solve(&merge_sort(), None);
        assert!(s.diagnostic.unwrap().is_structural());
    }

    #[test]
    fn test_negative_coefficient() {
        let m = RecurrenceModel::linear_homogeneous([Rational::from(2), Rational::from(-1)])
            .base_case(0, 0)
            .base_case(1, 1)
            .build()
            .unwrap();
        let s = check(&m, &Guess::new(Expr::n(), BoundKind::Theta));
        assert!(matches!(s.diagnostic, Some(SolveError::MethodInapplicable(_))));
    }
}

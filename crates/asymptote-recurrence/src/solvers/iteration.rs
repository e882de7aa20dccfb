//! Iteration method: unroll the recurrence and sum the levels.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, trace};

use asymptote_core::Expr;
use asymptote_growth::{GrowthOrder, Quantity};
use asymptote_numeric::Rational;
use asymptote_poly::{interpolate, DensePoly};

use super::{combination, driving_term, exponential_with_driving, finish, level_rule, summed_growth, Outcome};
use crate::cas::Algebra;
use crate::error::SolveError;
use crate::model::{Family, RecurrenceModel, Reduction};
use crate::options::SolverOptions;
use crate::solution::{Bound, Method, Solution, StepKind, Trace};

/// Powers of b probed above each base case of a divide recurrence.
const DIVIDE_PROBE_LEVELS: usize = 24;

/// Probe sizes stop growing past this value.
const PROBE_CEILING: i64 = 1 << 40;

/// Unrolls the recurrence and reduces the resulting sum.
pub struct IterationSolver<'a, A: Algebra> {
    algebra: &'a A,
    options: &'a SolverOptions,
}

impl<'a, A: Algebra> IterationSolver<'a, A> {
    /// Creates a solver over the given backend.
    #[must_use]
    pub fn new(algebra: &'a A, options: &'a SolverOptions) -> Self {
        Self { algebra, options }
    }

    /// Solves `model`, reporting failure through the diagnostic.
    #[must_use]
    pub fn solve(&self, model: &RecurrenceModel) -> Solution {
        let mut trace = Trace::default();
        trace.push(StepKind::Setup, model.to_string());
        let result = match model.family() {
            Family::DivideAndConquer => self.divide(model, &mut trace),
            Family::DecreaseAndConquer => match model.reduction_amount() {
                Some(d) => self.decrease(model, d, &mut trace),
                None => Err(SolveError::invalid("decrease-and-conquer without a decrease term")),
            },
            Family::ComplexCombination => combination::solve(self.algebra, self.options, model, &mut trace),
            Family::LinearHomogeneous => self.first_order(model, &mut trace),
        };
        finish(Method::Iteration, trace, result)
    }

    fn divide(&self, model: &RecurrenceModel, trace: &mut Trace) -> Result<Outcome, SolveError> {
        let (Some(a), Some(b)) = (model.subproblem_count(), model.reduction_factor()) else {
            return Err(SolveError::invalid("divide-and-conquer without a divide term"));
        };
        let n0 = probe_termination(model, self.options)?;
        let t0 = base_value(model, n0)?;
        let f = model.driving_function();

        for level in 0..self.options.preview_levels {
            let i = u32::try_from(level).unwrap_or(u32::MAX);
            let shrink = b.pow(i);
            let arg = Expr::product([Expr::Const(shrink.recip().unwrap_or_else(Rational::one)), Expr::n()]);
            let calls = match a {
                Quantity::Exact(a) => Expr::Const(a.pow(i)),
                other => Expr::powi(Expr::Symbol(other.to_string()), i64::from(i)),
            };
            let cost = self.algebra.simplify(&Expr::product([calls.clone(), f.substitute_n(&arg)]));
            let line = if level == 0 {
                format!("level 0: f(n) = {cost}")
            } else {
                format!("level {level}: {calls} subproblems of size n/{shrink} cost {cost}")
            };
            trace.push(StepKind::Unrolling, line);
        }

        let exponent = match a {
            Quantity::Exact(a) => Quantity::log(a, b).ok_or_else(|| SolveError::invalid(format!("log_{b}({a}) is undefined")))?,
            symbolic @ Quantity::Symbol { .. } => Quantity::symbol(format!("log_{b} {}", symbolic.wrapped())),
            other => return Err(SolveError::invalid(format!("coefficient {other} must be rational or symbolic"))),
        };
        let leaves = GrowthOrder::polynomial(exponent.clone());
        let depth = if n0 <= 1 {
            format!("log_{b} n")
        } else {
            format!("log_{b}(n/{n0})")
        };
        trace.push(
            StepKind::Termination,
            format!("the size reaches the base case T({n0}) = {t0} after k = {depth} levels, leaving a^k = Θ({leaves}) leaves"),
        );
        trace.push(StepKind::Summation, format!("T(n) = a^k·T({n0}) + Σ_{{i=0}}^{{k-1}} a^i·f(n/b^i)"));
        debug!(a = %a, b = %b, exponent = %exponent, base = n0, "unrolled divide recurrence");

        if let (Some(a), Some((c, d))) = (a.as_exact(), self.monomial(f)) {
            if let Some(outcome) = divide_closed_form(a, b, &exponent, &c, d, n0, &t0) {
                trace.push(
                    StepKind::Summation,
                    format!("the level costs form a geometric series with ratio a/b^{d} = {}", a / &b.pow(d)),
                );
                return Ok(outcome);
            }
        }

        let Some(f_term) = driving_term(self.algebra, model)? else {
            return Ok(Outcome::bound(Bound::theta(leaves)));
        };
        let order = level_rule(&exponent, &f_term.order)?;
        trace.push(
            StepKind::Summation,
            format!("with f(n) = Θ({}) against Θ({leaves}) leaves the sum is Θ({order})", f_term.order),
        );
        Ok(Outcome::bound(Bound::theta(order)))
    }

    fn decrease(&self, model: &RecurrenceModel, d: u32, trace: &mut Trace) -> Result<Outcome, SolveError> {
        let n0 = probe_termination(model, self.options)?;
        let t0 = base_value(model, n0)?;
        let f = model.driving_function();
        let step = i64::from(d);

        for level in 1..=self.options.preview_levels {
            let shift = step * i64::try_from(level).unwrap_or(i64::MAX);
            let costs: Vec<String> = (0..level)
                .rev()
                .map(|i| {
                    let cost = self.algebra.simplify(&f.substitute_n(&(Expr::n() - step * i64::try_from(i).unwrap_or(0))));
                    wrap_sum(&cost)
                })
                .collect();
            trace.push(
                StepKind::Unrolling,
                format!("T(n) = T(n - {shift}) + {}", costs.join(" + ")),
            );
        }

        let k = Expr::product([Expr::Const(Rational::new(1, step)), Expr::n() - n0]);
        trace.push(
            StepKind::Termination,
            format!("the argument reaches the base case T({n0}) = {t0} after k = {k} steps"),
        );
        let j_arg = Expr::sum([Expr::product([Expr::int(step), Expr::symbol("j")]), Expr::int(n0)]);
        trace.push(
            StepKind::Summation,
            format!("T(n) = T({n0}) + Σ_{{j=1}}^{{k}} f({j_arg})"),
        );
        let residue = if d > 1 {
            format!(" for n ≡ {} (mod {d})", n0.rem_euclid(step))
        } else {
            String::new()
        };

        if f.is_zero() {
            return Ok(Outcome::exact(Bound::theta(GrowthOrder::Constant), format!("T(n) = {t0}{residue}")));
        }

        if let Some(p) = self.algebra.polynomial_in_n(f) {
            let sum = polynomial_sum(&p, n0, step).ok_or_else(|| SolveError::invalid("interpolation of the level sum failed"))?;
            trace.push(
                StepKind::Summation,
                format!("f is a polynomial, so the sum is a polynomial in k: {}", sum.to_string_in("k")),
            );
            let in_n = sum.compose(&DensePoly::linear(Rational::new(1, step), Rational::new(-n0, step)));
            let total = in_n.add(&DensePoly::constant(t0));
            let degree = i64::try_from(total.degree()).unwrap_or(i64::MAX);
            trace!(degree, "polynomial closed form");
            return Ok(Outcome::exact(
                Bound::theta(GrowthOrder::polynomial(degree)),
                format!("T(n) = {}{residue}", total.factored_in("n")),
            ));
        }

        if let Some((c, beta)) = geometric(f) {
            if beta.cmp_i64(1).is_gt() {
                let ratio = beta.pow(d);
                let scale = &(&c * &ratio) / &(&ratio - &Rational::one());
                let shift = beta.powi(n0).map(|p| &scale * &p).unwrap_or_else(Rational::zero);
                let closed = Expr::sum([
                    Expr::product([Expr::Const(scale), Expr::pow(Expr::Const(beta.clone()), Expr::n())]),
                    Expr::Const(&t0 - &shift),
                ]);
                trace.push(
                    StepKind::Summation,
                    format!("geometric sum of {}^j with ratio {ratio} per step", Expr::Const(beta.clone())),
                );
                let order = GrowthOrder::exponential(Quantity::Exact(beta), Quantity::zero()).map_err(SolveError::from_growth)?;
                return Ok(Outcome::exact(Bound::theta(order), format!("T(n) = {closed}{residue}")));
            }
        }

        let Some(f_term) = driving_term(self.algebra, model)? else {
            return Ok(Outcome::bound(Bound::theta(GrowthOrder::Constant)));
        };
        if f_term.order == GrowthOrder::polynomial(-1) {
            trace.push(StepKind::Note, "harmonic sum: Σ 1/j = ln k + O(1)");
        }
        let order = summed_growth(&f_term.order)?;
        trace.push(
            StepKind::Summation,
            format!("summing k = Θ(n) terms of size Θ({}) gives Θ({order})", f_term.order),
        );
        Ok(Outcome::bound(Bound::theta(order)))
    }

    /// T(n) = c·T(n − 1) + f(n).
    fn first_order(&self, model: &RecurrenceModel, trace: &mut Trace) -> Result<Outcome, SolveError> {
        let coefficients = model
            .characteristic_coefficients()
            .ok_or_else(|| SolveError::inapplicable("iteration needs rational coefficients"))?;
        let [c] = coefficients.as_slice() else {
            return Err(SolveError::inapplicable(format!(
                "iteration handles first-order linear recurrences; this one has order {}",
                coefficients.len()
            )));
        };
        if c.is_one() {
            return self.decrease(model, 1, trace);
        }
        if c.is_negative() {
            return Err(SolveError::inapplicable(format!("c = {c} alternates the sign of each level")));
        }

        let n0 = probe_termination(model, self.options)?;
        let t0 = base_value(model, n0)?;
        let c_expr = Expr::Const(c.clone());
        trace.push(
            StepKind::Unrolling,
            format!("T(n) = {c_expr}^k·T(n - k) + Σ_{{j=0}}^{{k-1}} {c_expr}^j·f(n - j)"),
        );
        trace.push(StepKind::Termination, format!("k = n - {n0} reaches the base case T({n0}) = {t0}"));

        let f_order = driving_term(self.algebra, model)?.map(|t| t.order);
        if c.is_zero() {
            return Ok(match f_order {
                Some(order) => Outcome::bound(Bound::theta(order)),
                None => Outcome::exact(Bound::big_o(GrowthOrder::Constant), format!("T(n) = 0 for n > {n0}")),
            });
        }

        if c.cmp_i64(1).is_gt() {
            if f_order.is_none() {
                if t0.is_zero() {
                    return Ok(Outcome::exact(Bound::big_o(GrowthOrder::Constant), "T(n) = 0".to_string()));
                }
                let scale = c.powi(-n0).map_or_else(Rational::one, |p| &t0 * &p);
                let closed = Expr::product([Expr::Const(scale), Expr::pow(c_expr, Expr::n())]);
                let order = exponential_with_driving(&Quantity::Exact(c.clone()), 1, None)?;
                return Ok(Outcome::exact(Bound::theta(order), format!("T(n) = {closed}")));
            }
            let order = exponential_with_driving(&Quantity::Exact(c.clone()), 1, f_order.as_ref())?;
            trace.push(
                StepKind::Summation,
                format!("the factor {}^k dominates the weighted sum: Θ({order})", Expr::Const(c.clone())),
            );
            return Ok(Outcome::bound(Bound::theta(order)));
        }

        // 0 < c < 1: the weights c^j sum to a constant
        trace.push(StepKind::Summation, format!("Σ {c_expr}^j converges, so the last level dominates"));
        Ok(match f_order {
            Some(order) => Outcome::bound(Bound::theta(order)),
            None => Outcome::bound(Bound::big_o(GrowthOrder::Constant)),
        })
    }

    /// `c·n^d` with an integer d ≥ 0.
    fn monomial(&self, f: &Expr) -> Option<(Rational, u32)> {
        let p = self.algebra.polynomial_in_n(f)?;
        if p.is_zero() {
            return None;
        }
        let d = p.degree();
        if (0..d).any(|i| !p.coeff(i).is_zero()) {
            return None;
        }
        Some((p.leading_coeff().clone(), u32::try_from(d).ok()?))
    }
}

/// Exact T(n) for f(n) = c·n^d at sizes n = n0·b^k.
fn divide_closed_form(
    a: &Rational,
    b: &Rational,
    exponent: &Quantity,
    c: &Rational,
    d: u32,
    n0: i64,
    t0: &Rational,
) -> Option<Outcome> {
    let ratio = a / &b.pow(d);
    let n_d = Expr::powi(Expr::n(), i64::from(d));
    let n0_r = Rational::from(n0);
    if !n0_r.is_positive() {
        return None;
    }

    if ratio.is_one() {
        // T(n) = c·n^d·log_b(n/n0) + T(n0)·(n/n0)^d
        let shrink = n0_r.recip()?;
        let log = Expr::log(b.clone(), Expr::product([Expr::Const(shrink), Expr::n()]));
        let closed = Expr::sum([
            Expr::product([Expr::Const(c.clone()), n_d.clone(), log]),
            Expr::product([Expr::Const(t0.checked_div(&n0_r.pow(d))?), n_d]),
        ]);
        let order = GrowthOrder::poly_log(Quantity::from(i64::from(d)), Quantity::one());
        return Some(Outcome::exact(Bound::theta(order), format!("T(n) = {closed}")));
    }

    // particular K·n^d with K = c/(1 − a/b^d), homogeneous A·n^e
    let particular = c.checked_div(&(&Rational::one() - &ratio))?;
    let rest = t0 - &(&particular * &n0_r.pow(d));
    let (homogeneous, n_e) = match exponent {
        Quantity::Exact(e) => {
            let e_int = e.is_integer().then(|| e.to_i64()).flatten();
            let scale = match e_int {
                Some(k) => rest.checked_div(&n0_r.powi(k)?)?,
                None if n0 == 1 => rest,
                None => return None,
            };
            (scale, Expr::pow(Expr::n(), Expr::Const(e.clone())))
        }
        Quantity::LogRatio { .. } if n0 == 1 => (rest, Expr::pow(Expr::n(), Expr::log(b.clone(), Expr::Const(a.clone())))),
        _ => return None,
    };

    let closed = Expr::sum([
        Expr::product([Expr::Const(homogeneous), n_e]),
        Expr::product([Expr::Const(particular), n_d]),
    ]);
    let order = level_rule(exponent, &GrowthOrder::polynomial(i64::from(d))).ok()?;
    Some(Outcome::exact(Bound::theta(order), format!("T(n) = {closed}")))
}

/// S(k) = Σ_{j=1}^{k} p(n0 + j·step) as a polynomial in k.
fn polynomial_sum(p: &DensePoly<Rational>, n0: i64, step: i64) -> Option<DensePoly<Rational>> {
    let mut points = Vec::with_capacity(p.degree() + 2);
    let mut acc = Rational::zero();
    points.push((Rational::zero(), Rational::zero()));
    for k in 1..=i64::try_from(p.degree()).ok()? + 1 {
        acc = &acc + &p.eval(&Rational::from(n0 + k * step));
        points.push((Rational::from(k), acc.clone()));
    }
    interpolate(&points)
}

/// `c·β^n` with rational c and β.
fn geometric(f: &Expr) -> Option<(Rational, Rational)> {
    let (c, rest) = f.split_coefficient();
    match rest {
        Expr::Pow { base, exp } if *exp == Expr::N => base.as_const().map(|beta| (c, beta.clone())),
        _ => None,
    }
}

fn wrap_sum(e: &Expr) -> String {
    match e {
        Expr::Add(_) => format!("({e})"),
        _ => e.to_string(),
    }
}

fn base_value(model: &RecurrenceModel, n0: i64) -> Result<Rational, SolveError> {
    model
        .base_cases()
        .get(&n0)
        .cloned()
        .ok_or_else(|| SolveError::invalid(format!("no base case at n = {n0}")))
}

/// Follows every distinct reduction from probe sizes down to a base case.
///
/// Decrease chains start at each of the `probe_size` sizes above the largest
/// base case; divide chains start at n0·b^j for every positive base case n0.
/// Returns the largest base case, which every chain from above reaches.
///
/// # Errors
///
/// [`SolveError::NonTerminating`] when a chain steps below the smallest
/// base case, stalls, or runs past `max_depth`.
pub(crate) fn probe_termination(model: &RecurrenceModel, options: &SolverOptions) -> Result<i64, SolveError> {
    let base = model.base_cases();
    let (Some(&low), Some(&high)) = (base.keys().next(), base.keys().next_back()) else {
        return Err(SolveError::invalid("at least one base case is required"));
    };

    let mut seen = HashSet::new();
    for term in model.terms() {
        if !seen.insert(&term.reduction) {
            continue;
        }
        let starts = probe_starts(&term.reduction, base, high, options.probe_size);
        trace!(reduction = %term.reduction, probes = starts.len(), "probing termination");
        for start in starts {
            walk(start, &term.reduction, base, low, options.max_depth)?;
        }
    }
    Ok(high)
}

fn probe_starts(reduction: &Reduction, base: &BTreeMap<i64, Rational>, high: i64, probe_size: usize) -> Vec<i64> {
    match reduction {
        Reduction::Decrease(d) => {
            let width = i64::try_from(probe_size.max(*d as usize)).unwrap_or(i64::MAX);
            (1..=width).map(|i| high.saturating_add(i)).collect()
        }
        Reduction::Divide(b) => {
            let mut anchors: Vec<i64> = base.keys().copied().filter(|k| *k > 0).collect();
            if anchors.is_empty() {
                anchors.push(1);
            }
            let mut starts = Vec::new();
            for anchor in anchors {
                let mut size = Rational::from(anchor);
                for _ in 0..DIVIDE_PROBE_LEVELS {
                    size = &size * b;
                    match ceil_i64(&size) {
                        Some(n) if n <= PROBE_CEILING => starts.push(n),
                        _ => break,
                    }
                }
            }
            starts
        }
    }
}

fn walk(
    start: i64,
    reduction: &Reduction,
    base: &BTreeMap<i64, Rational>,
    low: i64,
    max_depth: usize,
) -> Result<(), SolveError> {
    let mut m = start;
    for _ in 0..=max_depth {
        if base.contains_key(&m) {
            return Ok(());
        }
        match reduction.apply(m) {
            Some(next) if next < m && next >= low => m = next,
            Some(next) if next >= m => {
                return Err(SolveError::NonTerminating(format!(
                    "starting from n = {start}, T({m}) calls T({next}) and makes no progress"
                )))
            }
            Some(next) => {
                return Err(SolveError::NonTerminating(format!(
                    "starting from n = {start}, T({m}) calls T({next}) and skips past every base case"
                )))
            }
            None => return Err(SolveError::NonTerminating(format!("T({m}) → T({reduction}) overflows"))),
        }
    }
    Err(SolveError::NonTerminating(format!(
        "starting from n = {start}, no base case is reached within {max_depth} levels"
    )))
}

fn ceil_i64(r: &Rational) -> Option<i64> {
    (-r).floor_i64().map(|v| -v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cas::NativeAlgebra;

    fn solve(model: &RecurrenceModel) -> Solution {
        let options = SolverOptions::default();
        IterationSolver::new(&NativeAlgebra, &options).solve(model)
    }

    #[test]
    fn test_arithmetic_series() {
        let m = RecurrenceModel::decrease_and_conquer(1)
            .driving(Expr::n())
            .base_case(0, 0)
            .build()
            .unwrap();
        let s = solve(&m);
        assert_eq!(s.bound.unwrap().to_string(), "Θ(n^2)");
        assert_eq!(s.closed_form.as_deref(), Some("T(n) = n(n + 1)/2"));
    }

    #[test]
    fn test_constant_step() {
        let m = RecurrenceModel::decrease_and_conquer(1)
            .driving(Expr::one())
            .base_case(1, 1)
            .build()
            .unwrap();
        let s = solve(&m);
        assert_eq!(s.bound.unwrap().to_string(), "Θ(n)");
        assert_eq!(s.closed_form.as_deref(), Some("T(n) = n"));
    }

    #[test]
    fn test_harmonic() {
        let m = RecurrenceModel::decrease_and_conquer(1)
            .driving(Expr::powi(Expr::n(), -1))
            .base_case(1, 1)
            .build()
            .unwrap();
        let s = solve(&m);
        assert_eq!(s.bound.unwrap().to_string(), "Θ(log n)");
        assert!(s.steps.iter().any(|st| st.kind == StepKind::Note));
    }

    #[test]
    fn test_geometric() {
        let m = RecurrenceModel::decrease_and_conquer(1)
            .driving(Expr::pow(Expr::int(2), Expr::n()))
            .base_case(0, 1)
            .build()
            .unwrap();
        let s = solve(&m);
        assert_eq!(s.bound.unwrap().to_string(), "Θ(2^n)");
        assert_eq!(s.closed_form.as_deref(), Some("T(n) = 2·2^n - 1"));
    }

    #[test]
    fn test_divide_exact() {
        let m = RecurrenceModel::divide_and_conquer(2, 2)
            .driving(Expr::n())
            .base_case(1, 1)
            .build()
            .unwrap();
        let s = solve(&m);
        assert_eq!(s.bound.unwrap().to_string(), "Θ(n log n)");
        assert!(s.closed_form.is_some());
        assert_eq!(s.steps.iter().filter(|st| st.kind == StepKind::Unrolling).count(), 3);
    }

    #[test]
    fn test_divide_leaf_heavy() {
        let m = RecurrenceModel::divide_and_conquer(8, 2)
            .driving(Expr::powi(Expr::n(), 2))
            .base_case(1, 1)
            .build()
            .unwrap();
        let s = solve(&m);
        assert_eq!(s.bound.unwrap().to_string(), "Θ(n^3)");
        assert_eq!(s.closed_form.as_deref(), Some("T(n) = 2n^3 - n^2"));
    }

    #[test]
    fn test_divide_reaching_zero() {
        let m = RecurrenceModel::divide_and_conquer(1, 2)
            .driving(Expr::one())
            .base_case(0, 0)
            .build()
            .unwrap();
        let s = solve(&m);
        let termination = s.steps.iter().find(|st| st.kind == StepKind::Termination).unwrap();
        assert!(termination.description.contains("after k = log_2 n levels"), "{}", termination.description);
        assert!(!termination.description.contains("n/0"));
    }

    #[test]
    fn test_skipped_base_case() {
        let m = RecurrenceModel::decrease_and_conquer(2)
            .driving(Expr::one())
            .base_case(0, 0)
            .build()
            .unwrap();
        let s = solve(&m);
        assert!(matches!(s.diagnostic, Some(SolveError::NonTerminating(_))));
    }

    #[test]
    fn test_depth_limit() {
        let m = RecurrenceModel::decrease_and_conquer(1)
            .driving(Expr::one())
            .base_case(0, 0)
            .build()
            .unwrap();
        let options = SolverOptions {
            max_depth: 10,
            ..SolverOptions::default()
        };
        let s = IterationSolver::new(&NativeAlgebra, &options).solve(&m);
        assert!(matches!(s.diagnostic, Some(SolveError::NonTerminating(_))));
    }

    #[test]
    fn test_first_order_linear() {
        let m = RecurrenceModel::linear_homogeneous([2])
            .base_case(0, 1)
            .build()
            .unwrap();
        let s = solve(&m);
        assert_eq!(s.bound.unwrap().to_string(), "Θ(2^n)");
        assert_eq!(s.closed_form.as_deref(), Some("T(n) = 2^n"));
    }

    #[test]
    fn test_second_order_is_inapplicable() {
        let m = RecurrenceModel::linear_homogeneous([1, 1])
            .base_case(0, 0)
            .base_case(1, 1)
            .build()
            .unwrap();
        let s = solve(&m);
        assert!(s.diagnostic.unwrap().is_structural());
    }
}

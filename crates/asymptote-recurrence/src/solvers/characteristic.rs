//! Characteristic equation for linear recurrences with constant
//! coefficients.
//!
//! The general solution is Σ αᵢⱼ·n^j·rᵢ^n over the roots rᵢ of
//! x^k − c₁x^(k−1) − … − c_k, plus a polynomial particular solution when
//! f(n) is a polynomial. When every root is rational the coefficients are
//! solved exactly; otherwise they are solved numerically over the complex
//! numbers.

use std::cmp::Ordering;

use tracing::{debug, trace};

use asymptote_core::Expr;
use asymptote_growth::GrowthOrder;
use asymptote_linalg::DenseMatrix;
use asymptote_numeric::{Complex64, Rational};
use asymptote_poly::{DensePoly, Root};

use super::{characteristic_polynomial, finish, root_magnitude, Outcome};
use crate::cas::Algebra;
use crate::error::SolveError;
use crate::model::{Family, RecurrenceModel};
use crate::options::SolverOptions;
use crate::solution::{Bound, BoundKind, Method, Solution, StepKind, Trace};

/// Solves linear recurrences through the roots of their characteristic
/// polynomial.
pub struct CharacteristicSolver<'a, A: Algebra> {
    algebra: &'a A,
    options: &'a SolverOptions,
}

/// One term n^j·r^n of the homogeneous solution.
#[derive(Clone, Copy, Debug)]
struct BasisTerm {
    root: usize,
    power: u32,
}

/// Coefficients fitted to the base cases.
enum Fit {
    Exact(Vec<Rational>),
    Numeric(Vec<Complex64>),
}

impl<'a, A: Algebra> CharacteristicSolver<'a, A> {
    /// Creates a solver over the given backend.
    #[must_use]
    pub fn new(algebra: &'a A, options: &'a SolverOptions) -> Self {
        Self { algebra, options }
    }

    /// Solves `model`, reporting failure through the diagnostic.
    #[must_use]
    pub fn solve(&self, model: &RecurrenceModel) -> Solution {
        let mut trace = Trace::default();
        let result = self.run(model, &mut trace);
        finish(Method::CharacteristicEquation, trace, result)
    }

    fn run(&self, model: &RecurrenceModel, trace: &mut Trace) -> Result<Outcome, SolveError> {
        if model.family() != Family::LinearHomogeneous {
            return Err(SolveError::inapplicable(format!(
                "the characteristic equation needs T(n) = c₁T(n - 1) + … + c_kT(n - k) + f(n), not a {} recurrence",
                model.family()
            )));
        }
        let coefficients = model
            .characteristic_coefficients()
            .ok_or_else(|| SolveError::inapplicable("the coefficients must be rational"))?;
        let k = coefficients.len();

        let f = model.driving_function();
        let source = if f.is_zero() {
            DensePoly::zero()
        } else {
            self.algebra
                .polynomial_in_n(f)
                .ok_or_else(|| SolveError::inapplicable(format!("f(n) = {f} is not a polynomial in n")))?
        };

        trace.push(StepKind::Setup, model.to_string());
        let poly = characteristic_polynomial(&coefficients);
        trace.push(StepKind::CharacteristicPolynomial, format!("{} = 0", poly.to_string_in("x")));

        let roots = self.algebra.solve_polynomial(&poly, self.options.root_max_iterations);
        let found: usize = roots.iter().map(|r| r.multiplicity as usize).sum();
        if found != k {
            return Err(SolveError::inapplicable(format!(
                "found {found} of {k} roots of the characteristic polynomial"
            )));
        }
        trace.push(StepKind::Roots, describe_roots(&roots));
        debug!(order = k, roots = roots.len(), "characteristic roots");

        for root in roots.iter().filter(|r| !r.is_real() && r.multiplicity > 1) {
            trace.push(
                StepKind::Note,
                format!(
                    "the repeated complex root x = {root} contributes n^j·ρ^n·cos(nθ + φ) terms with ρ = {:.6}",
                    root.magnitude()
                ),
            );
        }

        let basis: Vec<BasisTerm> = roots
            .iter()
            .enumerate()
            .flat_map(|(root, r)| (0..r.multiplicity).map(move |power| BasisTerm { root, power }))
            .collect();

        let particular = if source.is_zero() {
            DensePoly::zero()
        } else {
            let s = roots
                .iter()
                .find(|r| r.as_rational().is_some_and(Rational::is_one))
                .map_or(0, |r| r.multiplicity);
            let q = self.particular_solution(&coefficients, &source, s)?;
            trace.push(
                StepKind::GeneralSolution,
                format!("a particular solution is q(n) = {}", q.to_string_in("n")),
            );
            q
        };
        trace.push(
            StepKind::GeneralSolution,
            format!("T(n) = {}", general_form(&roots, &basis, !particular.is_zero())),
        );

        let base: Vec<(i64, Rational)> = model.base_cases().iter().map(|(n, t)| (*n, t.clone())).collect();
        if base.len() < k {
            return Err(SolveError::UnderdeterminedSystem {
                needed: k,
                given: base.len(),
            });
        }

        let fit = if roots.iter().all(|r| r.as_rational().is_some()) {
            Fit::Exact(self.fit_exact(&roots, &basis, &particular, &base)?)
        } else {
            Fit::Numeric(self.fit_numeric(&roots, &basis, &particular, &base)?)
        };

        let (closed, magnitudes): (String, Vec<f64>) = match &fit {
            Fit::Exact(alphas) => {
                trace.push(
                    StepKind::Coefficients,
                    alphas
                        .iter()
                        .enumerate()
                        .map(|(i, a)| format!("α{} = {a}", i + 1))
                        .collect::<Vec<_>>()
                        .join(", "),
                );
                let closed = exact_closed_form(&roots, &basis, alphas, &particular);
                let magnitudes = alphas.iter().map(|a| if a.is_zero() { 0.0 } else { a.to_f64().abs() }).collect();
                (format!("T(n) = {closed}"), magnitudes)
            }
            Fit::Numeric(alphas) => {
                trace.push(
                    StepKind::Coefficients,
                    alphas
                        .iter()
                        .enumerate()
                        .map(|(i, a)| format!("α{} ≈ {}", i + 1, fmt_complex(*a, self.noise())))
                        .collect::<Vec<_>>()
                        .join(", "),
                );
                let closed = numeric_closed_form(&roots, &basis, alphas, &particular, self.noise());
                let noise = self.noise();
                let magnitudes = alphas.iter().map(|a| if a.norm() > noise { a.norm() } else { 0.0 }).collect();
                (format!("T(n) ≈ {closed}"), magnitudes)
            }
        };

        let bound = self.bound(&roots, &basis, &magnitudes, &particular, trace)?;
        Ok(Outcome::exact(bound, closed))
    }

    /// Coefficient magnitude below which a numerically fitted α counts as
    /// zero.
    fn noise(&self) -> f64 {
        self.options.tolerance.sqrt()
    }

    /// Solves L(n^s·Q(n)) = p(n) for Q by matching values at deg p + 1
    /// points.
    fn particular_solution(
        &self,
        coefficients: &[Rational],
        p: &DensePoly<Rational>,
        s: u32,
    ) -> Result<DensePoly<Rational>, SolveError> {
        let unknowns = p.degree() + 1;
        let shift = s as usize;
        let power = |x: &Rational, e: usize| x.pow(u32::try_from(e).unwrap_or(u32::MAX));

        let mut rows = Vec::with_capacity(unknowns);
        let mut rhs = Vec::with_capacity(unknowns);
        for t in 0..unknowns {
            let t = Rational::from(i64::try_from(t).unwrap_or(i64::MAX));
            let row: Vec<Rational> = (0..unknowns)
                .map(|i| {
                    let e = shift + i;
                    let mut value = power(&t, e);
                    for (j, c) in coefficients.iter().enumerate() {
                        let back = &t - &Rational::from(i64::try_from(j + 1).unwrap_or(i64::MAX));
                        value = &value - &(c * &power(&back, e));
                    }
                    value
                })
                .collect();
            rows.push(row);
            rhs.push(p.eval(&t));
        }

        let matrix = DenseMatrix::from_rows(rows).ok_or_else(|| SolveError::invalid("ragged coefficient matrix"))?;
        let solution = self
            .algebra
            .solve_linear_system(&matrix, &rhs)
            .ok_or_else(|| SolveError::inapplicable("no polynomial particular solution exists"))?;

        let mut coeffs = vec![Rational::zero(); shift + unknowns];
        for (i, q) in solution.into_iter().enumerate() {
            coeffs[shift + i] = q;
        }
        Ok(DensePoly::new(coeffs))
    }

    fn fit_exact(
        &self,
        roots: &[Root],
        basis: &[BasisTerm],
        particular: &DensePoly<Rational>,
        base: &[(i64, Rational)],
    ) -> Result<Vec<Rational>, SolveError> {
        let k = basis.len();
        let value_of = |term: &BasisTerm, n: i64| -> Option<Rational> {
            let r = roots[term.root].as_rational()?;
            Some(&Rational::from(n).pow(term.power) * &r.powi(n)?)
        };

        let mut rows = Vec::with_capacity(k);
        let mut rhs = Vec::with_capacity(k);
        for (n, t) in &base[..k] {
            let row = basis
                .iter()
                .map(|term| value_of(term, *n))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| SolveError::invalid(format!("cannot evaluate the basis at n = {n}")))?;
            rows.push(row);
            rhs.push(t - &particular.eval(&Rational::from(*n)));
        }
        let matrix = DenseMatrix::from_rows(rows).ok_or_else(|| SolveError::invalid("ragged coefficient matrix"))?;
        let alphas = self
            .algebra
            .solve_linear_system(&matrix, &rhs)
            .ok_or_else(|| SolveError::UnderdeterminedSystem {
                needed: k,
                given: matrix.rank(),
            })?;

        for (n, t) in &base[k..] {
            let mut value = particular.eval(&Rational::from(*n));
            for (term, alpha) in basis.iter().zip(&alphas) {
                let b = value_of(term, *n).ok_or_else(|| SolveError::invalid(format!("cannot evaluate the basis at n = {n}")))?;
                value = &value + &(alpha * &b);
            }
            if value != *t {
                return Err(SolveError::invalid(format!(
                    "base case T({n}) = {t} contradicts T({n}) = {value} implied by the first {k}"
                )));
            }
        }
        Ok(alphas)
    }

    fn fit_numeric(
        &self,
        roots: &[Root],
        basis: &[BasisTerm],
        particular: &DensePoly<Rational>,
        base: &[(i64, Rational)],
    ) -> Result<Vec<Complex64>, SolveError> {
        let k = basis.len();
        let value_of = |term: &BasisTerm, n: i64| -> Complex64 {
            #[allow(clippy::cast_precision_loss)]
            let poly = (n as f64).powi(i32::try_from(term.power).unwrap_or(i32::MAX));
            let exp = roots[term.root].value.powi(i32::try_from(n).unwrap_or(i32::MAX));
            exp * poly
        };

        let rows: Vec<Vec<Complex64>> = base[..k]
            .iter()
            .map(|(n, _)| basis.iter().map(|term| value_of(term, *n)).collect())
            .collect();
        let rhs: Vec<Complex64> = base[..k]
            .iter()
            .map(|(n, t)| Complex64::new((t - &particular.eval(&Rational::from(*n))).to_f64(), 0.0))
            .collect();
        let matrix = DenseMatrix::from_rows(rows).ok_or_else(|| SolveError::invalid("ragged coefficient matrix"))?;
        let alphas = self
            .algebra
            .solve_linear_system(&matrix, &rhs)
            .ok_or_else(|| SolveError::UnderdeterminedSystem {
                needed: k,
                given: matrix.rank(),
            })?;

        for (n, t) in &base[k..] {
            let q = particular.eval(&Rational::from(*n)).to_f64();
            let value: Complex64 = basis
                .iter()
                .zip(&alphas)
                .map(|(term, alpha)| alpha * value_of(term, *n))
                .sum::<Complex64>()
                + q;
            let expected = t.to_f64();
            if (value - expected).norm() > self.options.tolerance.sqrt() * (1.0 + expected.abs()) {
                return Err(SolveError::invalid(format!(
                    "base case T({n}) = {t} contradicts T({n}) ≈ {:.6} implied by the first {k}",
                    value.re
                )));
            }
        }
        trace!(coefficients = alphas.len(), "numeric fit");
        Ok(alphas)
    }

    fn bound(
        &self,
        roots: &[Root],
        basis: &[BasisTerm],
        magnitudes: &[f64],
        particular: &DensePoly<Rational>,
        trace: &mut Trace,
    ) -> Result<Bound, SolveError> {
        let live: Vec<&BasisTerm> = basis
            .iter()
            .zip(magnitudes)
            .filter(|(_, m)| **m > 0.0)
            .map(|(t, _)| t)
            .collect();

        let top = live
            .iter()
            .map(|t| roots[t.root].magnitude())
            .fold(0.0_f64, f64::max);
        let dominant: Vec<&&BasisTerm> = live
            .iter()
            .filter(|t| (roots[t.root].magnitude() - top).abs() <= 1e-9 * top.max(1.0))
            .collect();

        let homogeneous = match dominant.iter().max_by_key(|t| t.power) {
            None => None,
            Some(term) => {
                let root = &roots[term.root];
                let magnitude = root_magnitude(root);
                let degree = i64::from(term.power);
                let unit = match root.as_rational() {
                    Some(r) => r.abs().is_one(),
                    None => (top - 1.0).abs() <= 1e-12,
                };
                if unit {
                    Some(GrowthOrder::polynomial(degree))
                } else if top > 1.0 {
                    Some(GrowthOrder::exponential(magnitude, degree.into()).map_err(SolveError::from_growth)?)
                } else {
                    None
                }
            }
        };
        let oscillating = dominant.iter().any(|t| !positive_real(&roots[t.root]));
        let homogeneous_kind = if oscillating {
            trace.push(
                StepKind::Note,
                "the dominant roots are not positive reals, so the terms may cancel periodically and only an upper bound follows",
            );
            BoundKind::BigO
        } else {
            BoundKind::Theta
        };

        let forced = (!particular.is_zero())
            .then(|| GrowthOrder::polynomial(i64::try_from(particular.degree()).unwrap_or(i64::MAX)));

        Ok(match (homogeneous, forced) {
            (None, None) => Bound::big_o(GrowthOrder::Constant),
            (Some(h), None) => Bound {
                kind: homogeneous_kind,
                order: h,
            },
            (None, Some(p)) => Bound::theta(p),
            (Some(h), Some(p)) => match h.compare(&p).map_err(SolveError::from_growth)? {
                Ordering::Less => Bound::theta(p),
                _ => Bound {
                    kind: homogeneous_kind,
                    order: h,
                },
            },
        })
    }
}

/// True for roots on the positive real axis, allowing for numeric noise in
/// the imaginary part.
fn positive_real(root: &Root) -> bool {
    root.value.re > 0.0 && root.value.im.abs() <= 1e-9 * root.magnitude().max(1.0)
}

fn describe_roots(roots: &[Root]) -> String {
    roots
        .iter()
        .map(|r| {
            if r.multiplicity > 1 {
                format!("x = {r} (multiplicity {})", r.multiplicity)
            } else {
                format!("x = {r}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `r` as a power base, parenthesized unless atomic.
fn root_base(root: &Root) -> String {
    let s = root.to_string();
    if s.contains([' ', '/']) || s.starts_with('-') {
        format!("({s})")
    } else {
        s
    }
}

fn basis_text(root: &Root, power: u32) -> String {
    let mut parts = Vec::new();
    match power {
        0 => {}
        1 => parts.push("n".to_string()),
        p => parts.push(format!("n^{p}")),
    }
    if !root.as_rational().is_some_and(Rational::is_one) {
        parts.push(format!("{}^n", root_base(root)));
    }
    if parts.is_empty() {
        "1".to_string()
    } else {
        parts.join("·")
    }
}

fn general_form(roots: &[Root], basis: &[BasisTerm], with_particular: bool) -> String {
    let mut terms: Vec<String> = basis
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let b = basis_text(&roots[t.root], t.power);
            if b == "1" {
                format!("α{}", i + 1)
            } else {
                format!("α{}·{b}", i + 1)
            }
        })
        .collect();
    if with_particular {
        terms.push("q(n)".to_string());
    }
    terms.join(" + ")
}

fn exact_closed_form(roots: &[Root], basis: &[BasisTerm], alphas: &[Rational], particular: &DensePoly<Rational>) -> Expr {
    let homogeneous = basis.iter().zip(alphas).filter_map(|(t, alpha)| {
        let r = roots[t.root].as_rational()?;
        Some(Expr::product([
            Expr::Const(alpha.clone()),
            Expr::powi(Expr::n(), i64::from(t.power)),
            Expr::pow(Expr::Const(r.clone()), Expr::n()),
        ]))
    });
    Expr::sum(homogeneous.chain([Expr::from_polynomial(particular)]))
}

fn numeric_closed_form(
    roots: &[Root],
    basis: &[BasisTerm],
    alphas: &[Complex64],
    particular: &DensePoly<Rational>,
    noise: f64,
) -> String {
    let mut out = String::new();
    for (t, alpha) in basis.iter().zip(alphas) {
        if alpha.norm() <= noise {
            continue;
        }
        let b = basis_text(&roots[t.root], t.power);
        let (negative, magnitude) = if alpha.im.abs() <= noise {
            (alpha.re < 0.0, format!("{:.6}", alpha.re.abs()))
        } else {
            (false, format!("({})", fmt_complex(*alpha, noise)))
        };
        let term = if b == "1" { magnitude } else { format!("{magnitude}·{b}") };
        push_term(&mut out, negative, &term);
    }
    if !particular.is_zero() {
        let q = particular.to_string_in("n");
        match q.strip_prefix('-') {
            Some(rest) => push_term(&mut out, true, rest),
            None => push_term(&mut out, false, &q),
        }
    }
    if out.is_empty() {
        out.push('0');
    }
    out
}

fn push_term(out: &mut String, negative: bool, term: &str) {
    match (out.is_empty(), negative) {
        (true, false) => out.push_str(term),
        (true, true) => {
            out.push('-');
            out.push_str(term);
        }
        (false, false) => {
            out.push_str(" + ");
            out.push_str(term);
        }
        (false, true) => {
            out.push_str(" - ");
            out.push_str(term);
        }
    }
}

fn fmt_complex(z: Complex64, noise: f64) -> String {
    if z.im.abs() <= noise {
        return format!("{:.6}", z.re);
    }
    if z.im < 0.0 {
        format!("{:.6} - {:.6}i", z.re, -z.im)
    } else {
        format!("{:.6} + {:.6}i", z.re, z.im)
    }
}

//! Structured recurrence relations.
//!
//! A [`RecurrenceModel`] is built once through [`RecurrenceBuilder`] and is
//! immutable afterwards. Construction validates the family invariants, so
//! every solver can rely on them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use asymptote_core::Expr;
use asymptote_growth::{analyze, Quantity};
use asymptote_numeric::Rational;

use crate::error::SolveError;

/// Structural family of a recurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Family {
    /// T(n) = aT(n/b) + f(n).
    DivideAndConquer,
    /// T(n) = T(n − d) + f(n).
    DecreaseAndConquer,
    /// A sum of several divide or decrease terms plus f(n).
    ComplexCombination,
    /// T(n) = c₁T(n − 1) + … + c_kT(n − k) + f(n).
    LinearHomogeneous,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::DivideAndConquer => "divide-and-conquer",
            Family::DecreaseAndConquer => "decrease-and-conquer",
            Family::ComplexCombination => "complex combination",
            Family::LinearHomogeneous => "linear homogeneous",
        };
        write!(f, "{name}")
    }
}

/// How a recursive call shrinks its argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Reduction {
    /// n ↦ ⌊n/b⌋, b > 1.
    Divide(Rational),
    /// n ↦ n − d, d ≥ 1.
    Decrease(u32),
}

impl Reduction {
    /// Applies the reduction to a concrete size (floor semantics).
    #[must_use]
    pub fn apply(&self, n: i64) -> Option<i64> {
        match self {
            Reduction::Divide(b) => Rational::from(n).checked_div(b)?.floor_i64(),
            Reduction::Decrease(d) => n.checked_sub(i64::from(*d)),
        }
    }

    /// The reduced argument as an expression: `n/b` or `n − d`.
    #[must_use]
    pub fn as_expr(&self) -> Expr {
        match self {
            Reduction::Divide(b) => Expr::product([Expr::Const(b.recip().unwrap_or_else(Rational::one)), Expr::n()]),
            Reduction::Decrease(d) => Expr::n() - i64::from(*d),
        }
    }

    /// Returns true for n/b.
    #[must_use]
    pub fn is_divide(&self) -> bool {
        matches!(self, Reduction::Divide(_))
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reduction::Divide(b) if b.is_integer() => write!(f, "n/{b}"),
            Reduction::Divide(b) => write!(f, "n/({b})"),
            Reduction::Decrease(d) => write!(f, "n - {d}"),
        }
    }
}

/// One recursive term `coefficient · T(reduction)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecursiveTerm {
    /// The multiplier: an exact rational or a named positive constant.
    pub coefficient: Quantity,
    /// The argument of T.
    pub reduction: Reduction,
}

impl RecursiveTerm {
    /// The coefficient as an expression.
    #[must_use]
    pub fn coefficient_expr(&self) -> Expr {
        match &self.coefficient {
            Quantity::Exact(r) => Expr::Const(r.clone()),
            other => Expr::Symbol(other.to_string()),
        }
    }
}

impl fmt::Display for RecursiveTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.coefficient {
            c if c.is_one() => {}
            Quantity::Exact(r) if r.is_negative() => {
                let magnitude = Quantity::Exact(r.abs());
                if magnitude.is_one() {
                    write!(f, "-")?;
                } else {
                    write!(f, "-{}", magnitude.wrapped())?;
                }
            }
            c => write!(f, "{}", c.wrapped())?,
        }
        write!(f, "T({})", self.reduction)
    }
}

/// A validated recurrence relation.
#[derive(Clone, Debug, PartialEq)]
pub struct RecurrenceModel {
    family: Family,
    terms: Vec<RecursiveTerm>,
    driving: Expr,
    base_cases: BTreeMap<i64, Rational>,
}

impl RecurrenceModel {
    /// Starts T(n) = aT(n/b) + f(n).
    #[must_use]
    pub fn divide_and_conquer(a: impl Into<Quantity>, b: impl Into<Rational>) -> RecurrenceBuilder {
        RecurrenceBuilder::new(Family::DivideAndConquer).term(a, Reduction::Divide(b.into()))
    }

    /// Starts T(n) = T(n − d) + f(n).
    #[must_use]
    pub fn decrease_and_conquer(d: u32) -> RecurrenceBuilder {
        RecurrenceBuilder::new(Family::DecreaseAndConquer).term(1, Reduction::Decrease(d))
    }

    /// Starts a combination of several recursive terms; add them with
    /// [`RecurrenceBuilder::divide_term`] and
    /// [`RecurrenceBuilder::decrease_term`].
    #[must_use]
    pub fn complex_combination() -> RecurrenceBuilder {
        RecurrenceBuilder::new(Family::ComplexCombination)
    }

    /// Starts T(n) = c₁T(n − 1) + … + c_kT(n − k).
    #[must_use]
    pub fn linear_homogeneous<R: Into<Rational>>(coefficients: impl IntoIterator<Item = R>) -> RecurrenceBuilder {
        let coefficients: Vec<Rational> = coefficients.into_iter().map(Into::into).collect();
        let mut builder = RecurrenceBuilder::new(Family::LinearHomogeneous);
        for (j, c) in coefficients.iter().enumerate() {
            if !c.is_zero() {
                let d = u32::try_from(j + 1).unwrap_or(u32::MAX);
                builder = builder.term(c.clone(), Reduction::Decrease(d));
            }
        }
        builder.linear_order = Some(coefficients.len());
        builder.last_coefficient_zero = coefficients.last().map_or(true, Rational::is_zero);
        builder
    }

    /// The structural family.
    #[must_use]
    pub fn family(&self) -> Family {
        self.family
    }

    /// The recursive terms, in construction order.
    #[must_use]
    pub fn terms(&self) -> &[RecursiveTerm] {
        &self.terms
    }

    /// The driving function f(n).
    #[must_use]
    pub fn driving_function(&self) -> &Expr {
        &self.driving
    }

    /// Known values T(n), ordered by n.
    #[must_use]
    pub fn base_cases(&self) -> &BTreeMap<i64, Rational> {
        &self.base_cases
    }

    /// The subproblem count a of a divide-and-conquer recurrence.
    #[must_use]
    pub fn subproblem_count(&self) -> Option<&Quantity> {
        match (self.family, self.terms.as_slice()) {
            (Family::DivideAndConquer, [term]) => Some(&term.coefficient),
            _ => None,
        }
    }

    /// The reduction factor b of a divide-and-conquer recurrence.
    #[must_use]
    pub fn reduction_factor(&self) -> Option<&Rational> {
        match (self.family, self.terms.as_slice()) {
            (Family::DivideAndConquer, [RecursiveTerm { reduction: Reduction::Divide(b), .. }]) => Some(b),
            _ => None,
        }
    }

    /// The reduction amount d of a decrease-and-conquer recurrence.
    #[must_use]
    pub fn reduction_amount(&self) -> Option<u32> {
        match (self.family, self.terms.as_slice()) {
            (Family::DecreaseAndConquer, [RecursiveTerm { reduction: Reduction::Decrease(d), .. }]) => Some(*d),
            _ => None,
        }
    }

    /// Returns true if every coefficient is an exact rational.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        self.terms.iter().all(|t| t.coefficient.as_exact().is_some())
    }

    /// Coefficients c₁..c_k of T(n − 1)..T(n − k), when every term is an
    /// exact decrease term.
    #[must_use]
    pub fn characteristic_coefficients(&self) -> Option<Vec<Rational>> {
        let order = self
            .terms
            .iter()
            .map(|t| match t.reduction {
                Reduction::Decrease(d) => Some(d),
                Reduction::Divide(_) => None,
            })
            .collect::<Option<Vec<_>>>()?
            .into_iter()
            .max()?;

        let mut coefficients = vec![Rational::zero(); usize::try_from(order).ok()?];
        for term in &self.terms {
            let Reduction::Decrease(d) = term.reduction else {
                return None;
            };
            let slot = &mut coefficients[usize::try_from(d).ok()? - 1];
            *slot = &*slot + term.coefficient.as_exact()?;
        }
        Some(coefficients)
    }

    /// Computes T(n) by memoized recursion with floor semantics for n/b.
    ///
    /// # Errors
    ///
    /// - [`SolveError::NonTerminating`] if a reduction drops below every base
    ///   case, stalls, or the recursion exceeds `max_depth`.
    /// - [`SolveError::MethodInapplicable`] for symbolic coefficients.
    /// - [`SolveError::InvalidModel`] if f(n) is undefined at a visited size.
    pub fn evaluate(&self, n: i64, max_depth: usize) -> Result<f64, SolveError> {
        let coefficients = self
            .terms
            .iter()
            .map(|t| t.coefficient.as_exact().map(Rational::to_f64))
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| SolveError::inapplicable("cannot evaluate with symbolic coefficients"))?;

        let smallest = self.base_cases.keys().next().copied().unwrap_or(0);
        let mut memo: HashMap<i64, f64> = self.base_cases.iter().map(|(k, v)| (*k, v.to_f64())).collect();
        let mut stack = vec![n];
        let limit = max_depth.saturating_mul(self.terms.len().max(1));

        while let Some(&m) = stack.last() {
            if memo.contains_key(&m) {
                stack.pop();
                continue;
            }
            if stack.len() > limit {
                return Err(SolveError::NonTerminating(format!(
                    "T({n}) needs more than {max_depth} levels"
                )));
            }

            let mut args = Vec::with_capacity(self.terms.len());
            for term in &self.terms {
                let arg = term
                    .reduction
                    .apply(m)
                    .filter(|&a| a < m && a >= smallest)
                    .ok_or_else(|| {
                        SolveError::NonTerminating(format!(
                            "T({m}) reduces to T({}) which misses every base case",
                            term.reduction
                        ))
                    })?;
                args.push(arg);
            }

            let missing: Vec<i64> = args.iter().copied().filter(|a| !memo.contains_key(a)).collect();
            if missing.is_empty() {
                #[allow(clippy::cast_precision_loss)]
                let f = self
                    .driving
                    .eval(m as f64)
                    .ok_or_else(|| SolveError::invalid(format!("f(n) is undefined at n = {m}")))?;
                let value = coefficients.iter().zip(&args).map(|(c, a)| c * memo[a]).sum::<f64>() + f;
                memo.insert(m, value);
                stack.pop();
            } else {
                stack.extend(missing);
            }
        }

        memo.get(&n)
            .copied()
            .ok_or_else(|| SolveError::NonTerminating(format!("T({n}) was not reached")))
    }
}

impl fmt::Display for RecurrenceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T(n) = ")?;
        for (i, term) in self.terms.iter().enumerate() {
            let shown = term.to_string();
            match (i, shown.strip_prefix('-')) {
                (0, _) => write!(f, "{shown}")?,
                (_, Some(rest)) => write!(f, " - {rest}")?,
                (_, None) => write!(f, " + {shown}")?,
            }
        }
        if !self.driving.is_zero() {
            write!(f, " + {}", self.driving)?;
        }
        Ok(())
    }
}

/// Builder for [`RecurrenceModel`].
#[derive(Clone, Debug)]
pub struct RecurrenceBuilder {
    family: Family,
    terms: Vec<RecursiveTerm>,
    driving: Expr,
    base_cases: BTreeMap<i64, Rational>,
    linear_order: Option<usize>,
    last_coefficient_zero: bool,
}

impl RecurrenceBuilder {
    fn new(family: Family) -> Self {
        Self {
            family,
            terms: Vec::new(),
            driving: Expr::zero(),
            base_cases: BTreeMap::new(),
            linear_order: None,
            last_coefficient_zero: false,
        }
    }

    fn term(mut self, coefficient: impl Into<Quantity>, reduction: Reduction) -> Self {
        self.terms.push(RecursiveTerm {
            coefficient: coefficient.into(),
            reduction,
        });
        self
    }

    /// Adds `a·T(n/b)`.
    #[must_use]
    pub fn divide_term(self, a: impl Into<Quantity>, b: impl Into<Rational>) -> Self {
        self.term(a, Reduction::Divide(b.into()))
    }

    /// Adds `a·T(n − d)`.
    #[must_use]
    pub fn decrease_term(self, a: impl Into<Quantity>, d: u32) -> Self {
        self.term(a, Reduction::Decrease(d))
    }

    /// Sets the driving function f(n).
    #[must_use]
    pub fn driving(mut self, f: Expr) -> Self {
        self.driving = f;
        self
    }

    /// Adds a base case T(n) = value.
    #[must_use]
    pub fn base_case(mut self, n: i64, value: impl Into<Rational>) -> Self {
        self.base_cases.insert(n, value.into());
        self
    }

    /// Validates and builds the model.
    ///
    /// # Errors
    ///
    /// [`SolveError::InvalidModel`] when an invariant is violated.
    pub fn build(self) -> Result<RecurrenceModel, SolveError> {
        if self.base_cases.is_empty() {
            return Err(SolveError::invalid("at least one base case is required"));
        }

        match self.family {
            Family::DivideAndConquer => {
                let [term] = self.terms.as_slice() else {
                    return Err(SolveError::invalid("divide-and-conquer takes exactly one recursive term"));
                };
                if let Quantity::Exact(a) = &term.coefficient {
                    if a.cmp_i64(1).is_lt() {
                        return Err(SolveError::invalid(format!("subproblem count a = {a} must be at least 1")));
                    }
                }
            }
            Family::DecreaseAndConquer => {
                let [term] = self.terms.as_slice() else {
                    return Err(SolveError::invalid("decrease-and-conquer takes exactly one recursive term"));
                };
                if !term.coefficient.is_one() {
                    return Err(SolveError::invalid("decrease-and-conquer has coefficient 1"));
                }
            }
            Family::ComplexCombination => {
                if self.terms.is_empty() {
                    return Err(SolveError::invalid("at least one recursive term is required"));
                }
                for term in &self.terms {
                    if let Quantity::Exact(a) = &term.coefficient {
                        if !a.is_positive() {
                            return Err(SolveError::invalid(format!("coefficient {a} must be positive")));
                        }
                    }
                }
            }
            Family::LinearHomogeneous => {
                if self.linear_order.unwrap_or(0) == 0 {
                    return Err(SolveError::invalid("at least one coefficient is required"));
                }
                if self.last_coefficient_zero {
                    return Err(SolveError::invalid("the last coefficient c_k must be non-zero"));
                }
            }
        }

        for term in &self.terms {
            match &term.coefficient {
                Quantity::Exact(_) | Quantity::Symbol { .. } => {}
                other => return Err(SolveError::invalid(format!("coefficient {other} must be rational or symbolic"))),
            }
            match &term.reduction {
                Reduction::Divide(b) if b.cmp_i64(1).is_le() => {
                    return Err(SolveError::invalid(format!("reduction factor b = {b} must exceed 1")));
                }
                Reduction::Decrease(0) => {
                    return Err(SolveError::invalid("reduction amount d must be at least 1"));
                }
                _ => {}
            }
        }

        if let Ok(leading) = analyze(&self.driving) {
            if leading.is_negative() == Some(true) {
                return Err(SolveError::invalid(format!(
                    "f(n) = {} is eventually negative",
                    self.driving
                )));
            }
        }

        Ok(RecurrenceModel {
            family: self.family,
            terms: self.terms,
            driving: self.driving,
            base_cases: self.base_cases,
        })
    }
}

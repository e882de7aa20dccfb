//! Expression trees in the single variable `n`.
//!
//! Driving functions, substitution guesses and closed forms are all `Expr`
//! values. Construction goes through the smart constructors [`Expr::sum`],
//! [`Expr::product`] and [`Expr::pow`], which flatten nested sums and
//! products, fold constants and collect like terms. Structural equality is
//! therefore a reasonable proxy for mathematical equality on the shapes the
//! solvers produce.

use std::ops::{Add, Div, Mul, Neg, Sub};

use smallvec::SmallVec;

use asymptote_numeric::Rational;

/// An expression in the variable `n`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    // === Atoms ===
    /// A rational constant.
    Const(Rational),

    /// The recurrence variable `n`.
    N,

    /// A named positive constant (e.g. `k`, `c`).
    Symbol(String),

    // === Compound Expressions ===
    /// Sum of expressions.
    ///
    /// Invariant (when built by [`Expr::sum`]): at least 2 terms, no nested
    /// sums, at most one constant which comes last.
    Add(Vec<Expr>),

    /// Product of expressions.
    ///
    /// Invariant (when built by [`Expr::product`]): at least 2 factors, no
    /// nested products, at most one constant which comes first.
    Mul(Vec<Expr>),

    /// Power expression: base^exp.
    Pow {
        /// The base of the power.
        base: Box<Expr>,
        /// The exponent.
        exp: Box<Expr>,
    },

    /// Logarithm. `base: None` is the natural logarithm.
    Log {
        /// The base, greater than 1.
        base: Option<Rational>,
        /// The argument.
        arg: Box<Expr>,
    },

    /// Factorial of the argument.
    Factorial(Box<Expr>),
}

impl Expr {
    /// The variable `n`.
    #[must_use]
    pub fn n() -> Self {
        Expr::N
    }

    /// An integer constant.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Expr::Const(Rational::from(value))
    }

    /// A rational constant `num/den`.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    #[must_use]
    pub fn frac(num: i64, den: i64) -> Self {
        Expr::Const(Rational::new(num, den))
    }

    /// A rational constant.
    #[must_use]
    pub fn constant(value: Rational) -> Self {
        Expr::Const(value)
    }

    /// The constant 0.
    #[must_use]
    pub fn zero() -> Self {
        Expr::Const(Rational::zero())
    }

    /// The constant 1.
    #[must_use]
    pub fn one() -> Self {
        Expr::Const(Rational::one())
    }

    /// A named positive constant.
    #[must_use]
    pub fn symbol(name: &str) -> Self {
        Expr::Symbol(name.to_string())
    }

    /// `base^exp`, folding trivial cases.
    #[must_use]
    pub fn pow(base: Expr, exp: Expr) -> Self {
        match (&base, &exp) {
            (_, Expr::Const(e)) if e.is_zero() => Expr::one(),
            (_, Expr::Const(e)) if e.is_one() => base,
            (Expr::Const(b), _) if b.is_one() => Expr::one(),
            (Expr::Const(b), Expr::Const(e)) if e.is_integer() => e
                .to_i64()
                .and_then(|e| b.powi(e))
                .map_or_else(|| Expr::raw_pow(base.clone(), exp.clone()), Expr::Const),
            // (c·x)^e = c^e · x^e and (x^a)^b = x^(ab) for the positive
            // quantities appearing here
            (Expr::Mul(factors), Expr::Const(_)) => {
                Expr::product(factors.iter().map(|f| Expr::pow(f.clone(), exp.clone())))
            }
            (Expr::Pow { base: inner, exp: e1 }, Expr::Const(_)) if matches!(**e1, Expr::Const(_)) => {
                Expr::pow((**inner).clone(), Expr::product([(**e1).clone(), exp]))
            }
            _ => Expr::raw_pow(base, exp),
        }
    }

    fn raw_pow(base: Expr, exp: Expr) -> Self {
        Expr::Pow {
            base: Box::new(base),
            exp: Box::new(exp),
        }
    }

    /// `base^k` for an integer exponent.
    #[must_use]
    pub fn powi(base: Expr, k: i64) -> Self {
        Expr::pow(base, Expr::int(k))
    }

    /// `√x` as `x^(1/2)`.
    #[must_use]
    pub fn sqrt(arg: Expr) -> Self {
        Expr::pow(arg, Expr::frac(1, 2))
    }

    /// Logarithm to an integer or rational base greater than 1.
    #[must_use]
    pub fn log(base: impl Into<Rational>, arg: Expr) -> Self {
        let base = base.into();
        if let Some(k) = arg.as_const().and_then(|c| exact_log(c, &base)) {
            return Expr::int(k);
        }
        Expr::Log {
            base: Some(base),
            arg: Box::new(arg),
        }
    }

    /// Natural logarithm.
    #[must_use]
    pub fn ln(arg: Expr) -> Self {
        if matches!(&arg, Expr::Const(c) if c.is_one()) {
            return Expr::zero();
        }
        Expr::Log {
            base: None,
            arg: Box::new(arg),
        }
    }

    /// Factorial.
    #[must_use]
    pub fn factorial(arg: Expr) -> Self {
        Expr::Factorial(Box::new(arg))
    }

    /// Builds a sum, flattening nested sums, folding constants and
    /// collecting like terms.
    pub fn sum(terms: impl IntoIterator<Item = Expr>) -> Self {
        let mut collected: Vec<(Expr, Rational)> = Vec::new();
        let mut constant = Rational::zero();

        let mut stack: Vec<Expr> = terms.into_iter().collect();
        stack.reverse();
        while let Some(term) = stack.pop() {
            match term {
                Expr::Add(inner) => stack.extend(inner.into_iter().rev()),
                Expr::Const(c) => constant = &constant + &c,
                other => {
                    let (coeff, rest) = other.split_coefficient();
                    if let Some(slot) = collected.iter_mut().find(|(e, _)| same_term(e, &rest)) {
                        slot.1 = &slot.1 + &coeff;
                    } else {
                        collected.push((rest, coeff));
                    }
                }
            }
        }

        let mut out: Vec<Expr> = collected
            .into_iter()
            .filter(|(_, c)| !c.is_zero())
            .map(|(rest, c)| Expr::product([Expr::Const(c), rest]))
            .collect();
        if !constant.is_zero() {
            out.push(Expr::Const(constant));
        }

        match out.len() {
            0 => Expr::zero(),
            1 => out.pop().unwrap_or_else(Expr::zero),
            _ => Expr::Add(out),
        }
    }

    /// Builds a product, flattening nested products, folding constants and
    /// merging powers of the same base.
    pub fn product(factors: impl IntoIterator<Item = Expr>) -> Self {
        let mut collected: Vec<(Expr, Vec<Expr>)> = Vec::new();
        let mut coefficient = Rational::one();

        let mut stack: Vec<Expr> = factors.into_iter().collect();
        stack.reverse();
        while let Some(factor) = stack.pop() {
            match factor {
                Expr::Mul(inner) => stack.extend(inner.into_iter().rev()),
                Expr::Const(c) => coefficient = &coefficient * &c,
                other => {
                    let (base, exp) = match other {
                        Expr::Pow { base, exp } => (*base, *exp),
                        atom => (atom, Expr::one()),
                    };
                    if let Some(slot) = collected.iter_mut().find(|(b, _)| *b == base) {
                        slot.1.push(exp);
                    } else {
                        collected.push((base, vec![exp]));
                    }
                }
            }
        }

        if coefficient.is_zero() {
            return Expr::zero();
        }

        let mut out = Vec::with_capacity(collected.len() + 1);
        let mut folded = Rational::one();
        for (base, exps) in collected {
            let exp = if exps.len() == 1 {
                exps.into_iter().next().unwrap_or_else(Expr::one)
            } else {
                Expr::sum(exps)
            };
            match Expr::pow(base, exp) {
                Expr::Const(c) => folded = &folded * &c,
                Expr::Mul(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        coefficient = &coefficient * &folded;

        if coefficient.is_zero() {
            return Expr::zero();
        }
        if !coefficient.is_one() || out.is_empty() {
            out.insert(0, Expr::Const(coefficient));
        }

        match out.len() {
            1 => out.pop().unwrap_or_else(Expr::one),
            _ => Expr::Mul(out),
        }
    }

    /// Splits a term into its rational coefficient and the remaining factor.
    #[must_use]
    pub fn split_coefficient(&self) -> (Rational, Expr) {
        match self {
            Expr::Const(c) => (c.clone(), Expr::one()),
            Expr::Mul(factors) => match factors.first() {
                Some(Expr::Const(c)) => {
                    let rest: Vec<Expr> = factors[1..].to_vec();
                    let rest = if rest.len() == 1 {
                        rest.into_iter().next().unwrap_or_else(Expr::one)
                    } else {
                        Expr::Mul(rest)
                    };
                    (c.clone(), rest)
                }
                _ => (Rational::one(), self.clone()),
            },
            _ => (Rational::one(), self.clone()),
        }
    }

    /// Returns the terms of a sum (or the expression itself).
    #[must_use]
    pub fn terms(&self) -> SmallVec<[&Expr; 4]> {
        match self {
            Expr::Add(terms) => terms.iter().collect(),
            other => smallvec::smallvec![other],
        }
    }

    /// Returns the factors of a product (or the expression itself).
    #[must_use]
    pub fn factors(&self) -> SmallVec<[&Expr; 4]> {
        match self {
            Expr::Mul(factors) => factors.iter().collect(),
            other => smallvec::smallvec![other],
        }
    }

    /// Returns the children of this node.
    #[must_use]
    pub fn children(&self) -> SmallVec<[&Expr; 4]> {
        match self {
            Expr::Const(_) | Expr::N | Expr::Symbol(_) => SmallVec::new(),
            Expr::Add(args) | Expr::Mul(args) => args.iter().collect(),
            Expr::Pow { base, exp } => smallvec::smallvec![base.as_ref(), exp.as_ref()],
            Expr::Log { arg, .. } | Expr::Factorial(arg) => smallvec::smallvec![arg.as_ref()],
        }
    }

    /// Returns the constant value if this is a constant.
    #[must_use]
    pub fn as_const(&self) -> Option<&Rational> {
        match self {
            Expr::Const(c) => Some(c),
            _ => None,
        }
    }

    /// Returns true if this is the constant 0.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(c) if c.is_zero())
    }

    /// Returns true if this is the constant 1.
    #[must_use]
    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Const(c) if c.is_one())
    }

    /// Returns true if `n` occurs in the expression.
    #[must_use]
    pub fn contains_n(&self) -> bool {
        match self {
            Expr::N => true,
            Expr::Const(_) | Expr::Symbol(_) => false,
            _ => self.children().iter().any(|c| c.contains_n()),
        }
    }

    /// Returns true if a named symbol occurs in the expression.
    #[must_use]
    pub fn contains_symbol(&self) -> bool {
        match self {
            Expr::Symbol(_) => true,
            Expr::Const(_) | Expr::N => false,
            _ => self.children().iter().any(|c| c.contains_symbol()),
        }
    }

    /// Replaces every occurrence of `n` with `replacement`, rebuilding through
    /// the smart constructors.
    #[must_use]
    pub fn substitute_n(&self, replacement: &Expr) -> Expr {
        match self {
            Expr::N => replacement.clone(),
            Expr::Const(_) | Expr::Symbol(_) => self.clone(),
            Expr::Add(terms) => Expr::sum(terms.iter().map(|t| t.substitute_n(replacement))),
            Expr::Mul(factors) => Expr::product(factors.iter().map(|f| f.substitute_n(replacement))),
            Expr::Pow { base, exp } => Expr::pow(base.substitute_n(replacement), exp.substitute_n(replacement)),
            Expr::Log { base, arg } => {
                let arg = arg.substitute_n(replacement);
                match base {
                    Some(b) => Expr::log(b.clone(), arg),
                    None => Expr::ln(arg),
                }
            }
            Expr::Factorial(arg) => Expr::factorial(arg.substitute_n(replacement)),
        }
    }

    /// Rebuilds the expression bottom-up through the smart constructors.
    #[must_use]
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Const(_) | Expr::N | Expr::Symbol(_) => self.clone(),
            Expr::Add(terms) => Expr::sum(terms.iter().map(Expr::simplify)),
            Expr::Mul(factors) => Expr::product(factors.iter().map(Expr::simplify)),
            Expr::Pow { base, exp } => Expr::pow(base.simplify(), exp.simplify()),
            Expr::Log { base, arg } => match base {
                Some(b) => Expr::log(b.clone(), arg.simplify()),
                None => Expr::ln(arg.simplify()),
            },
            Expr::Factorial(arg) => Expr::factorial(arg.simplify()),
        }
    }
}

/// Like terms up to the order of their factors.
fn same_term(a: &Expr, b: &Expr) -> bool {
    match (a, b) {
        (Expr::Mul(x), Expr::Mul(y)) => x.len() == y.len() && x.iter().all(|f| y.contains(f)),
        _ => a == b,
    }
}

/// k with base^k = c, for |k| ≤ 64.
fn exact_log(c: &Rational, base: &Rational) -> Option<i64> {
    if !c.is_positive() || !base.is_positive() || base.is_one() {
        return None;
    }
    let k = (c.to_f64().ln() / base.to_f64().ln()).round();
    if !k.is_finite() || k.abs() > 64.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let k = k as i64;
    (base.powi(k).as_ref() == Some(c)).then_some(k)
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::int(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::int(i64::from(value))
    }
}

impl From<Rational> for Expr {
    fn from(value: Rational) -> Self {
        Expr::Const(value)
    }
}

impl<T: Into<Expr>> Add<T> for Expr {
    type Output = Expr;

    fn add(self, rhs: T) -> Expr {
        Expr::sum([self, rhs.into()])
    }
}

impl<T: Into<Expr>> Sub<T> for Expr {
    type Output = Expr;

    fn sub(self, rhs: T) -> Expr {
        Expr::sum([self, -rhs.into()])
    }
}

impl<T: Into<Expr>> Mul<T> for Expr {
    type Output = Expr;

    fn mul(self, rhs: T) -> Expr {
        Expr::product([self, rhs.into()])
    }
}

impl<T: Into<Expr>> Div<T> for Expr {
    type Output = Expr;

    fn div(self, rhs: T) -> Expr {
        Expr::product([self, Expr::powi(rhs.into(), -1)])
    }
}

impl Mul<Expr> for i64 {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::product([Expr::int(self), rhs])
    }
}

impl Mul<Expr> for i32 {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::product([Expr::from(self), rhs])
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::product([Expr::int(-1), self])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_terms_collect() {
        let e = Expr::n() + Expr::n();
        assert_eq!(e, 2 * Expr::n());

        let zero = Expr::n() - Expr::n();
        assert!(zero.is_zero());
    }

    #[test]
    fn test_powers_merge() {
        let e = Expr::n() * Expr::n();
        assert_eq!(e, Expr::powi(Expr::n(), 2));

        let back = Expr::powi(Expr::n(), 3) / Expr::n();
        assert_eq!(back, Expr::powi(Expr::n(), 2));
    }

    #[test]
    fn test_constant_folding() {
        let e = Expr::int(2) * Expr::int(3) + Expr::int(1);
        assert_eq!(e, Expr::int(7));
        assert_eq!(Expr::pow(Expr::int(2), Expr::int(10)), Expr::int(1024));
        assert_eq!(Expr::log(2, Expr::int(2)), Expr::one());
        assert_eq!(Expr::log(2, Expr::frac(1, 8)), Expr::int(-3));
        assert!(matches!(Expr::log(2, Expr::int(3)), Expr::Log { .. }));
    }

    #[test]
    fn test_like_terms_ignore_factor_order() {
        let a = Expr::Mul(vec![Expr::n(), Expr::log(2, Expr::n())]);
        let b = Expr::Mul(vec![Expr::log(2, Expr::n()), Expr::n()]);
        assert!((a - b).is_zero());
    }

    #[test]
    fn test_substitute() {
        // n^2 at n/2 is n^2/4
        let f = Expr::powi(Expr::n(), 2);
        let halved = f.substitute_n(&(Expr::n() / 2));
        assert_eq!(halved, Expr::frac(1, 4) * Expr::powi(Expr::n(), 2));
    }

    #[test]
    fn test_contains() {
        assert!((Expr::n() + 1).contains_n());
        assert!(!Expr::log(2, Expr::int(8)).contains_n());
        assert!((Expr::symbol("k") * Expr::n()).contains_symbol());
    }
}

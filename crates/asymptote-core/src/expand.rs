//! Algebraic expansion.
//!
//! Used by the inductive step of the substitution method, where terms such as
//! `2·(n/2)·log_2(n/2) - n·log_2(n)` only cancel once products are
//! distributed and logarithms split.

use asymptote_numeric::Rational;

use crate::expr::Expr;

/// Largest integer power of a sum that is multiplied out.
const MAX_EXPAND_POWER: i64 = 8;

impl Expr {
    /// Expands the expression.
    ///
    /// - products are distributed over sums
    /// - small positive integer powers of sums are multiplied out
    /// - `b^(x + k)` becomes `b^k · b^x` for a constant base and integer `k`
    /// - `log(x·y)` becomes `log x + log y` and `log(x^e)` becomes `e·log x`
    #[must_use]
    pub fn expand(&self) -> Expr {
        match self {
            Expr::Const(_) | Expr::N | Expr::Symbol(_) => self.clone(),
            Expr::Add(terms) => Expr::sum(terms.iter().map(Expr::expand)),
            Expr::Mul(factors) => distribute(factors.iter().map(Expr::expand)),
            Expr::Pow { base, exp } => expand_pow(base.expand(), exp.expand()),
            Expr::Log { base, arg } => expand_log(base.as_ref(), arg.expand()),
            Expr::Factorial(arg) => Expr::factorial(arg.expand()),
        }
    }
}

fn distribute(factors: impl IntoIterator<Item = Expr>) -> Expr {
    let mut acc = vec![Expr::one()];
    for factor in factors {
        let terms: Vec<Expr> = factor.terms().into_iter().cloned().collect();
        acc = acc
            .iter()
            .flat_map(|a| terms.iter().map(move |t| Expr::product([a.clone(), t.clone()])))
            .collect();
    }
    Expr::sum(acc)
}

fn expand_pow(base: Expr, exp: Expr) -> Expr {
    let is_shift = |t: &Expr| t.as_const().is_some_and(Rational::is_integer);

    if matches!(base, Expr::Add(_)) {
        let k = exp.as_const().and_then(Rational::to_i64).filter(|k| (2..=MAX_EXPAND_POWER).contains(k));
        return match k.and_then(|k| usize::try_from(k).ok()) {
            Some(times) => distribute(std::iter::repeat(base).take(times)),
            None => Expr::pow(base, exp),
        };
    }

    let shifted = matches!(base, Expr::Const(_)) && matches!(&exp, Expr::Add(terms) if terms.iter().any(is_shift));
    let (true, Expr::Add(terms)) = (shifted, &exp) else {
        return Expr::pow(base, exp);
    };
    let shift = Expr::sum(terms.iter().filter(|t| is_shift(t)).cloned());
    let rest = Expr::sum(terms.iter().filter(|t| !is_shift(t)).cloned());
    Expr::product([Expr::pow(base.clone(), shift), Expr::pow(base, rest)])
}

fn expand_log(base: Option<&Rational>, arg: Expr) -> Expr {
    match arg {
        Expr::Mul(factors) => Expr::sum(factors.into_iter().map(|f| expand_log(base, f))),
        Expr::Pow { base: x, exp } => Expr::product([*exp, expand_log(base, *x)]),
        other => match base {
            Some(b) => Expr::log(b.clone(), other),
            None => Expr::ln(other),
        },
    }
}

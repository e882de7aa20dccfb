//! Textual rendering of expressions.
//!
//! Output is meant for derivation traces: `3n^2/2 + n`, `2^n`, `n·log_2(n)`,
//! `(n - 1)!`, `1/n`.

use std::fmt;

use asymptote_numeric::Rational;

use crate::expr::Expr;

/// Binding strength, higher binds tighter.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Sum,
    Product,
    Power,
    Atom,
}

fn precedence(e: &Expr) -> Prec {
    match e {
        Expr::Add(_) => Prec::Sum,
        Expr::Mul(_) => Prec::Product,
        Expr::Const(c) if !c.is_integer() || c.is_negative() => Prec::Product,
        Expr::Pow { exp, .. } if exp.as_const().is_some_and(Rational::is_negative) => Prec::Product,
        Expr::Pow { .. } => Prec::Power,
        Expr::Const(_) | Expr::N | Expr::Symbol(_) | Expr::Log { .. } | Expr::Factorial(_) => Prec::Atom,
    }
}

fn wrap(e: &Expr, min: Prec) -> String {
    if precedence(e) < min {
        format!("({e})")
    } else {
        e.to_string()
    }
}

/// True if the term prints with a leading minus sign.
fn is_negative_term(e: &Expr) -> bool {
    match e {
        Expr::Const(c) => c.is_negative(),
        Expr::Mul(factors) => matches!(factors.first(), Some(Expr::Const(c)) if c.is_negative()),
        _ => false,
    }
}

fn fmt_product(f: &mut fmt::Formatter<'_>, coefficient: &Rational, factors: &[Expr]) -> fmt::Result {
    let mut numer: Vec<String> = Vec::new();
    let mut denom: Vec<String> = Vec::new();

    for factor in factors {
        match factor {
            Expr::Pow { base, exp } if exp.as_const().is_some_and(Rational::is_negative) => {
                let positive = Expr::pow((**base).clone(), -(**exp).clone());
                denom.push(wrap(&positive, Prec::Power));
            }
            other => numer.push(wrap(other, Prec::Power)),
        }
    }

    let (num, den) = match (coefficient.numer_i64(), coefficient.denom_i64()) {
        (Some(n), Some(d)) => (n, d),
        _ => {
            numer.insert(0, format!("({coefficient})"));
            (1, 1)
        }
    };

    if num < 0 {
        write!(f, "-")?;
    }
    let mut head = String::new();
    if num.abs() != 1 {
        head.push_str(&num.abs().to_string());
    }
    for (i, part) in numer.iter().enumerate() {
        let juxtapose = i == 0 && part.starts_with(|c: char| c.is_ascii_alphabetic());
        if !head.is_empty() && !juxtapose {
            head.push('·');
        }
        head.push_str(part);
    }
    if head.is_empty() {
        head.push('1');
    }
    write!(f, "{head}")?;

    if den != 1 {
        denom.insert(0, den.to_string());
    }
    match denom.len() {
        0 => Ok(()),
        1 => write!(f, "/{}", denom[0]),
        _ => write!(f, "/({})", denom.join("·")),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(c) => write!(f, "{c}"),
            Expr::N => write!(f, "n"),
            Expr::Symbol(name) => write!(f, "{name}"),
            Expr::Add(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    let negative = is_negative_term(term);
                    let shown = if negative { -term.clone() } else { term.clone() };
                    match (i, negative) {
                        (0, true) => write!(f, "-{}", wrap(&shown, Prec::Product))?,
                        (0, false) => write!(f, "{shown}")?,
                        (_, true) => write!(f, " - {}", wrap(&shown, Prec::Product))?,
                        (_, false) => write!(f, " + {shown}")?,
                    }
                }
                Ok(())
            }
            Expr::Mul(factors) => match factors.split_first() {
                Some((Expr::Const(c), rest)) => fmt_product(f, c, rest),
                _ => fmt_product(f, &Rational::one(), factors),
            },
            Expr::Pow { exp, .. } if exp.as_const().is_some_and(Rational::is_negative) => {
                fmt_product(f, &Rational::one(), std::slice::from_ref(self))
            }
            Expr::Pow { base, exp } => {
                let base = wrap(base, Prec::Atom);
                match exp.as_ref() {
                    Expr::Const(c) if c.is_integer() => write!(f, "{base}^{c}"),
                    Expr::N | Expr::Symbol(_) => write!(f, "{base}^{exp}"),
                    other => write!(f, "{base}^({other})"),
                }
            }
            Expr::Log { base, arg } => match base {
                None => write!(f, "ln({arg})"),
                Some(b) => write!(f, "log_{b}({arg})"),
            },
            Expr::Factorial(arg) => write!(f, "{}!", wrap(arg, Prec::Atom)),
        }
    }
}

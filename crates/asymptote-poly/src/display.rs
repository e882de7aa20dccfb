//! Human-readable rendering of rational polynomials.
//!
//! Closed forms are shown in a named variable, either expanded
//! (`n^2/2 + n/2`) or factored over the rationals (`n(n + 1)/2`).

use asymptote_numeric::Rational;

use crate::algorithms::gcd::poly_exact_div;
use crate::algorithms::roots::{integer_primitive, rational_roots};
use crate::dense::DensePoly;

impl DensePoly<Rational> {
    /// Renders the polynomial expanded, highest degree first.
    #[must_use]
    pub fn to_string_in(&self, var: &str) -> String {
        if self.is_zero() {
            return "0".to_string();
        }

        let mut out = String::new();
        for (degree, c) in self.coeffs().iter().enumerate().rev() {
            if c.is_zero() {
                continue;
            }
            let negative = c.is_negative();
            if out.is_empty() {
                if negative {
                    out.push('-');
                }
            } else {
                out.push_str(if negative { " - " } else { " + " });
            }
            out.push_str(&term(&c.abs(), degree, var));
        }
        out
    }

    /// Renders the polynomial factored over the rationals.
    ///
    /// Falls back to the expanded form when coefficients are too large for
    /// the factoring search.
    #[must_use]
    pub fn factored_in(&self, var: &str) -> String {
        if self.degree() == 0 {
            return self.coeff(0).to_string();
        }

        let Some((content, primitive)) = integer_primitive(self) else {
            return self.to_string_in(var);
        };

        let mut rest = DensePoly::new(primitive.iter().map(|&c| Rational::from(c)).collect());
        let mut factors: Vec<(String, u32)> = Vec::new();

        for root in rational_roots(&rest).into_iter().rev() {
            let (Some(num), Some(den)) = (root.numer_i64(), root.denom_i64()) else {
                continue;
            };
            // den·x − num is primitive and divides rest with integer quotient
            let linear = DensePoly::linear(Rational::from(den), Rational::from(-num));
            let mut multiplicity = 0;
            while let Some(q) = poly_exact_div(&rest, &linear) {
                rest = q;
                multiplicity += 1;
            }
            factors.push((linear.to_string_in(var), multiplicity));
        }

        // A leftover constant folds into the content.
        let content = if rest.degree() == 0 {
            &content * &rest.coeff(0)
        } else {
            factors.push((rest.to_string_in(var), 1));
            content
        };

        let single = factors.len() == 1 && factors[0].1 == 1;
        let mut body = String::new();
        for (factor, multiplicity) in &factors {
            let atomic = factor == var;
            if atomic || (single && content.is_one()) {
                body.push_str(factor);
            } else {
                body.push('(');
                body.push_str(factor);
                body.push(')');
            }
            if *multiplicity > 1 {
                body.push_str(&format!("^{multiplicity}"));
            }
        }

        let (Some(num), Some(den)) = (content.numer_i64(), content.denom_i64()) else {
            return self.to_string_in(var);
        };

        let mut out = String::new();
        if num < 0 {
            out.push('-');
        }
        if num.abs() != 1 {
            out.push_str(&num.abs().to_string());
        }
        out.push_str(&body);
        if den != 1 {
            out.push_str(&format!("/{den}"));
        }
        out
    }
}

/// Renders `c · var^degree` for a non-negative coefficient.
fn term(c: &Rational, degree: usize, var: &str) -> String {
    let monomial = match degree {
        0 => String::new(),
        1 => var.to_string(),
        d => format!("{var}^{d}"),
    };

    if degree == 0 {
        return c.to_string();
    }

    match (c.numer_i64(), c.denom_i64()) {
        (Some(1), Some(1)) => monomial,
        (Some(1), Some(d)) => format!("{monomial}/{d}"),
        (Some(n), Some(1)) => format!("{n}{monomial}"),
        (Some(n), Some(d)) => format!("{n}{monomial}/{d}"),
        _ => format!("({c}){monomial}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(coeffs: &[(i64, i64)]) -> DensePoly<Rational> {
        DensePoly::new(coeffs.iter().map(|&(n, d)| Rational::new(n, d)).collect())
    }

    #[test]
    fn test_expanded() {
        let p = poly(&[(0, 1), (1, 2), (1, 2)]);
        assert_eq!(p.to_string_in("n"), "n^2/2 + n/2");

        let q = poly(&[(-1, 1), (0, 1), (3, 1)]);
        assert_eq!(q.to_string_in("n"), "3n^2 - 1");
    }

    #[test]
    fn test_triangular_factored() {
        let p = poly(&[(0, 1), (1, 2), (1, 2)]);
        assert_eq!(p.factored_in("n"), "n(n + 1)/2");
    }

    #[test]
    fn test_factored_forms() {
        // n + 1
        assert_eq!(poly(&[(1, 1), (1, 1)]).factored_in("n"), "n + 1");
        // 2n^2
        assert_eq!(poly(&[(0, 1), (0, 1), (2, 1)]).factored_in("n"), "2n^2");
        // n^2 + 1 has no rational roots
        assert_eq!(poly(&[(1, 1), (0, 1), (1, 1)]).factored_in("n"), "n^2 + 1");
        // 2n - 1
        assert_eq!(poly(&[(-1, 1), (2, 1)]).factored_in("n"), "2n - 1");
        // constant
        assert_eq!(poly(&[(5, 2)]).factored_in("n"), "5/2");
    }
}

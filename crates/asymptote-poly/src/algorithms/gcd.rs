//! Polynomial division and GCD over a field.

use asymptote_numeric::Field;

use crate::dense::DensePoly;

/// Divides polynomial `a` by `b`, returning `(quotient, remainder)`.
///
/// Returns `None` when `b` is the zero polynomial.
pub fn poly_div_rem<F: Field>(a: &DensePoly<F>, b: &DensePoly<F>) -> Option<(DensePoly<F>, DensePoly<F>)> {
    if b.is_zero() {
        return None;
    }

    if a.degree() < b.degree() {
        return Some((DensePoly::zero(), a.clone()));
    }

    let b_lead_inv = b.leading_coeff().inv()?;
    let b_len = b.coeffs().len();
    let mut quotient = vec![F::zero(); a.degree() - b.degree() + 1];
    let mut remainder = a.coeffs().to_vec();

    while remainder.len() >= b_len {
        let deg_diff = remainder.len() - b_len;
        let coeff = remainder[remainder.len() - 1].clone() * b_lead_inv.clone();

        for (i, bc) in b.coeffs().iter().enumerate() {
            remainder[deg_diff + i] = remainder[deg_diff + i].clone() - coeff.clone() * bc.clone();
        }
        quotient[deg_diff] = coeff;

        // The leading term cancels by construction; drop it even when a
        // floating point residue remains.
        remainder.pop();
        while remainder.len() > 1 && remainder.last().is_some_and(|c| c.is_zero()) {
            remainder.pop();
        }

        if remainder.is_empty() || (remainder.len() == 1 && remainder[0].is_zero()) {
            break;
        }
    }

    Some((DensePoly::new(quotient), DensePoly::new(remainder)))
}

/// Returns the exact quotient `a / b` when `b` divides `a`.
pub fn poly_exact_div<F: Field>(a: &DensePoly<F>, b: &DensePoly<F>) -> Option<DensePoly<F>> {
    let (q, r) = poly_div_rem(a, b)?;
    r.is_zero().then_some(q)
}

/// Makes a polynomial monic (leading coefficient = 1).
pub fn make_monic<F: Field>(p: &DensePoly<F>) -> DensePoly<F> {
    match p.leading_coeff().inv() {
        Some(lead_inv) if !p.is_zero() => p.scale(&lead_inv),
        _ => p.clone(),
    }
}

/// Computes the monic GCD of two polynomials using the Euclidean algorithm.
pub fn poly_gcd<F: Field>(a: &DensePoly<F>, b: &DensePoly<F>) -> DensePoly<F> {
    if a.is_zero() {
        return make_monic(b);
    }
    if b.is_zero() {
        return make_monic(a);
    }

    let mut p = a.clone();
    let mut q = b.clone();

    while !q.is_zero() {
        let Some((_, r)) = poly_div_rem(&p, &q) else {
            break;
        };
        p = q;
        q = r;
    }

    make_monic(&p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use asymptote_numeric::Rational;

    fn poly(coeffs: &[i64]) -> DensePoly<Rational> {
        DensePoly::new(coeffs.iter().map(|&c| Rational::from(c)).collect())
    }

    #[test]
    fn test_div_rem() {
        // (x^2 - 1) / (x - 1) = x + 1
        let (q, r) = poly_div_rem(&poly(&[-1, 0, 1]), &poly(&[-1, 1])).unwrap();
        assert_eq!(q, poly(&[1, 1]));
        assert!(r.is_zero());

        // (x^2 + 1) / (x - 1) = x + 1, remainder 2
        let (q, r) = poly_div_rem(&poly(&[1, 0, 1]), &poly(&[-1, 1])).unwrap();
        assert_eq!(q, poly(&[1, 1]));
        assert_eq!(r, poly(&[2]));
    }

    #[test]
    fn test_div_by_zero() {
        assert!(poly_div_rem(&poly(&[1, 1]), &DensePoly::zero()).is_none());
    }

    #[test]
    fn test_gcd() {
        // gcd((x-1)(x-2), (x-1)(x+3)) = x - 1
        let a = poly(&[-1, 1]).mul(&poly(&[-2, 1]));
        let b = poly(&[-1, 1]).mul(&poly(&[3, 1]));
        assert_eq!(poly_gcd(&a, &b), poly(&[-1, 1]));
    }

    #[test]
    fn test_exact_div() {
        assert_eq!(poly_exact_div(&poly(&[-1, 0, 1]), &poly(&[1, 1])), Some(poly(&[-1, 1])));
        assert_eq!(poly_exact_div(&poly(&[1, 0, 1]), &poly(&[1, 1])), None);
    }
}

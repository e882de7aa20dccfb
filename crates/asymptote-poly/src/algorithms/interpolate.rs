//! Polynomial interpolation.
//!
//! Used to recover summation polynomials: if f is a polynomial of degree d,
//! then S(k) = f(1) + ... + f(k) is a polynomial of degree d + 1 and is
//! determined by d + 2 samples.

use asymptote_numeric::Field;

use crate::dense::DensePoly;

/// Returns the unique polynomial of degree < `points.len()` through `points`.
///
/// Uses Newton's divided differences. Returns `None` if two sample points
/// share an abscissa.
pub fn interpolate<F: Field>(points: &[(F, F)]) -> Option<DensePoly<F>> {
    if points.is_empty() {
        return Some(DensePoly::zero());
    }

    let n = points.len();
    let mut diffs: Vec<F> = points.iter().map(|(_, y)| y.clone()).collect();

    for level in 1..n {
        for i in (level..n).rev() {
            let num = diffs[i].clone() - diffs[i - 1].clone();
            let den = points[i].0.clone() - points[i - level].0.clone();
            diffs[i] = num.field_div(&den)?;
        }
    }

    // p(x) = d0 + (x - x0)(d1 + (x - x1)(d2 + ...))
    let mut result = DensePoly::constant(diffs[n - 1].clone());
    for i in (0..n - 1).rev() {
        let factor = DensePoly::linear(F::one(), -points[i].0.clone());
        result = result.mul(&factor).add(&DensePoly::constant(diffs[i].clone()));
    }

    Some(result)
}

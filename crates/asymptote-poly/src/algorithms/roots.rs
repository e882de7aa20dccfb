//! Root finding for polynomials with rational coefficients.
//!
//! Roots are found factor by factor on the squarefree decomposition, so every
//! root carries its exact multiplicity:
//!
//! 1. rational roots by the rational root theorem (exact)
//! 2. remaining quadratics by the quadratic formula, kept as surds p + q√r
//! 3. anything of higher degree numerically by Aberth–Ehrlich iteration
//!
//! Results are sorted by decreasing magnitude, so the dominant root of a
//! characteristic polynomial comes first.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use asymptote_numeric::{Complex64, Rational};

use crate::algorithms::gcd::poly_exact_div;
use crate::algorithms::squarefree::squarefree_decomposition;
use crate::dense::DensePoly;

/// Largest absolute integer whose divisors are enumerated exhaustively.
const DIVISOR_SEARCH_LIMIT: i64 = 1_000_000_000_000;

/// Relative step size at which Aberth iteration stops.
const ABERTH_STEP_TOLERANCE: f64 = 1e-14;

/// Imaginary parts below this (relative) size are snapped to zero.
const REAL_SNAP_TOLERANCE: f64 = 1e-9;

/// An exactly known root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExactRoot {
    /// A rational root.
    Rational(Rational),
    /// `rational + coefficient · √radicand`; a negative radicand denotes an
    /// imaginary surd.
    QuadraticSurd {
        /// Rational part.
        rational: Rational,
        /// Coefficient of the square root.
        coefficient: Rational,
        /// Squarefree radicand, never 0 or 1.
        radicand: i64,
    },
}

impl ExactRoot {
    /// Numeric value of the root.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_complex(&self) -> Complex64 {
        match self {
            Self::Rational(r) => Complex64::new(r.to_f64(), 0.0),
            Self::QuadraticSurd {
                rational,
                coefficient,
                radicand,
            } => {
                let root = (radicand.unsigned_abs() as f64).sqrt() * coefficient.to_f64();
                if *radicand > 0 {
                    Complex64::new(rational.to_f64() + root, 0.0)
                } else {
                    Complex64::new(rational.to_f64(), root)
                }
            }
        }
    }
}

impl fmt::Display for ExactRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rational(r) => write!(f, "{r}"),
            Self::QuadraticSurd {
                rational,
                coefficient,
                radicand,
            } => fmt_surd(f, rational, coefficient, *radicand),
        }
    }
}

fn fmt_surd(f: &mut fmt::Formatter<'_>, p: &Rational, q: &Rational, r: i64) -> fmt::Result {
    let radical = match r {
        -1 => "i".to_string(),
        r if r < 0 => format!("i√{}", r.unsigned_abs()),
        r => format!("√{r}"),
    };

    let parts = (p.numer_i64(), p.denom_i64(), q.numer_i64(), q.denom_i64());
    let (Some(pn), Some(pd), Some(qn), Some(qd)) = parts else {
        return write!(f, "{p} + {q}{radical}");
    };

    // Put both parts over a common denominator: (P ± Q·√r) / D
    let d = lcm_i64(pd, qd);
    let big_p = pn * (d / pd);
    let big_q = qn * (d / qd);

    let q_term = if big_q.abs() == 1 {
        radical
    } else {
        format!("{}{radical}", big_q.abs())
    };

    let body = match (big_p, big_q < 0) {
        (0, false) => q_term,
        (0, true) => format!("-{q_term}"),
        (p, false) => format!("{p} + {q_term}"),
        (p, true) => format!("{p} - {q_term}"),
    };

    match (d, big_p) {
        (1, _) => write!(f, "{body}"),
        (d, 0) => write!(f, "{body}/{d}"),
        (d, _) => write!(f, "({body})/{d}"),
    }
}

/// A root together with its multiplicity.
#[derive(Clone, Debug, PartialEq)]
pub struct Root {
    /// Numeric value.
    pub value: Complex64,
    /// Multiplicity as a root of the original polynomial.
    pub multiplicity: u32,
    /// Exact form when known.
    pub exact: Option<ExactRoot>,
}

impl Root {
    fn exact(root: ExactRoot, multiplicity: u32) -> Self {
        Self {
            value: root.to_complex(),
            multiplicity,
            exact: Some(root),
        }
    }

    /// Absolute value of the root.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.value.norm()
    }

    /// Returns true if the root lies on the real axis.
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.value.im == 0.0
    }

    /// Returns the exact rational value, if the root is rational.
    #[must_use]
    pub fn as_rational(&self) -> Option<&Rational> {
        match &self.exact {
            Some(ExactRoot::Rational(r)) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(exact) = &self.exact {
            return write!(f, "{exact}");
        }
        let Complex64 { re, im } = self.value;
        if im == 0.0 {
            write!(f, "{re:.6}")
        } else if im < 0.0 {
            write!(f, "{re:.6} - {:.6}i", -im)
        } else {
            write!(f, "{re:.6} + {im:.6}i")
        }
    }
}

/// Finds all complex roots of `p` with multiplicities.
///
/// `max_iterations` bounds the numeric iteration used for factors of degree
/// three and higher that have no rational roots.
pub fn find_roots(p: &DensePoly<Rational>, max_iterations: usize) -> Vec<Root> {
    if p.degree() == 0 {
        return Vec::new();
    }

    let decomp = squarefree_decomposition(p);
    let mut roots = Vec::new();

    for sf in &decomp.factors {
        let m = sf.multiplicity;
        let mut rest = sf.factor.clone();

        for r in rational_roots(&rest) {
            let linear = DensePoly::linear(Rational::one(), -r.clone());
            if let Some(q) = poly_exact_div(&rest, &linear) {
                rest = q;
            }
            roots.push(Root::exact(ExactRoot::Rational(r), m));
        }

        match rest.degree() {
            0 => {}
            1 => {
                if let Some(value) = (-rest.coeff(0)).checked_div(rest.leading_coeff()) {
                    roots.push(Root::exact(ExactRoot::Rational(value), m));
                }
            }
            2 => roots.extend(quadratic_roots(&rest, m, max_iterations)),
            _ => {
                let complex = rest.coeffs().iter().map(|c| Complex64::new(c.to_f64(), 0.0)).collect::<Vec<_>>();
                roots.extend(aberth_roots(&complex, max_iterations).into_iter().map(|value| Root {
                    value,
                    multiplicity: m,
                    exact: None,
                }));
            }
        }
    }

    roots.sort_by(compare_roots);
    roots
}

/// Orders by decreasing magnitude, then decreasing real part, then
/// decreasing imaginary part.
fn compare_roots(a: &Root, b: &Root) -> Ordering {
    b.magnitude()
        .partial_cmp(&a.magnitude())
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.value.re.partial_cmp(&a.value.re).unwrap_or(Ordering::Equal))
        .then_with(|| b.value.im.partial_cmp(&a.value.im).unwrap_or(Ordering::Equal))
}

/// Writes `p = content · primitive` with integer primitive coefficients
/// whose leading coefficient is positive.
///
/// Returns `None` if an intermediate value leaves the `i64` range.
pub fn integer_primitive(p: &DensePoly<Rational>) -> Option<(Rational, Vec<i64>)> {
    let mut denom_lcm = 1i64;
    for c in p.coeffs() {
        denom_lcm = lcm_checked(denom_lcm, c.denom_i64()?)?;
    }

    let scaled = p
        .coeffs()
        .iter()
        .map(|c| {
            let n = c.numer_i64()?;
            n.checked_mul(denom_lcm / c.denom_i64()?)
        })
        .collect::<Option<Vec<i64>>>()?;

    let mut g = scaled.iter().fold(0i64, |acc, &c| gcd_i64(acc, c));
    if g == 0 {
        return Some((Rational::zero(), scaled));
    }
    if scaled.last().is_some_and(|&c| c < 0) {
        g = -g;
    }

    let primitive = scaled.iter().map(|c| c / g).collect();
    Some((Rational::new(g, denom_lcm), primitive))
}

/// Returns the distinct rational roots of `p`, in increasing order.
pub fn rational_roots(p: &DensePoly<Rational>) -> Vec<Rational> {
    let mut found = BTreeSet::new();
    if p.degree() == 0 {
        return Vec::new();
    }

    let Some((_, mut coeffs)) = integer_primitive(p) else {
        return Vec::new();
    };

    if coeffs[0] == 0 {
        found.insert(Rational::zero());
        let shift = coeffs.iter().take_while(|&&c| c == 0).count();
        coeffs.drain(..shift);
    }

    let (Some(&constant), Some(&leading)) = (coeffs.first(), coeffs.last()) else {
        return found.into_iter().collect();
    };

    if coeffs.len() > 1 && constant.abs() <= DIVISOR_SEARCH_LIMIT && leading.abs() <= DIVISOR_SEARCH_LIMIT {
        let stripped = DensePoly::new(coeffs.iter().map(|&c| Rational::from(c)).collect());
        for num in divisors(constant) {
            for den in divisors(leading) {
                for sign in [1, -1] {
                    let candidate = Rational::new(sign * num, den);
                    if stripped.eval(&candidate).is_zero() {
                        found.insert(candidate);
                    }
                }
            }
        }
    }

    found.into_iter().collect()
}

fn quadratic_roots(p: &DensePoly<Rational>, multiplicity: u32, max_iterations: usize) -> Vec<Root> {
    let a = p.coeff(2);
    let b = p.coeff(1);
    let c = p.coeff(0);
    let two_a = &Rational::from(2) * &a;

    let disc = &(&b * &b) - &(&(&Rational::from(4) * &a) * &c);
    let Some(p_part) = (-&b).checked_div(&two_a) else {
        return Vec::new();
    };

    let surd = disc
        .numer_i64()
        .zip(disc.denom_i64())
        .and_then(|(n, d)| n.checked_mul(d))
        .filter(|v| v.abs() <= DIVISOR_SEARCH_LIMIT)
        .map(extract_square);

    let Some((s, r)) = surd else {
        let coeffs = p.coeffs().iter().map(|c| Complex64::new(c.to_f64(), 0.0)).collect::<Vec<_>>();
        return aberth_roots(&coeffs, max_iterations)
            .into_iter()
            .map(|value| Root {
                value,
                multiplicity,
                exact: None,
            })
            .collect();
    };

    // √disc = s·√r / den(disc), so each root is p ± s·√r / (den · 2a)
    let scale = &Rational::from(disc.denom_i64().unwrap_or(1)) * &two_a.abs();
    let Some(q_part) = Rational::from(s).checked_div(&scale) else {
        return Vec::new();
    };

    if r == 1 {
        return vec![
            Root::exact(ExactRoot::Rational(&p_part + &q_part), multiplicity),
            Root::exact(ExactRoot::Rational(&p_part - &q_part), multiplicity),
        ];
    }

    vec![
        Root::exact(
            ExactRoot::QuadraticSurd {
                rational: p_part.clone(),
                coefficient: q_part.clone(),
                radicand: r,
            },
            multiplicity,
        ),
        Root::exact(
            ExactRoot::QuadraticSurd {
                rational: p_part,
                coefficient: -q_part,
                radicand: r,
            },
            multiplicity,
        ),
    ]
}

/// Finds all roots of a polynomial with complex coefficients (ascending
/// order) by Aberth–Ehrlich simultaneous iteration.
pub fn aberth_roots(coeffs: &[Complex64], max_iterations: usize) -> Vec<Complex64> {
    let Some(degree) = coeffs.iter().rposition(|c| c.norm() > 0.0) else {
        return Vec::new();
    };
    if degree == 0 {
        return Vec::new();
    }

    let lead = coeffs[degree];
    let monic: Vec<Complex64> = coeffs[..=degree].iter().map(|c| c / lead).collect();
    let radius = 1.0 + monic[..degree].iter().map(|c| c.norm()).fold(0.0, f64::max);

    #[allow(clippy::cast_precision_loss)]
    let mut z: Vec<Complex64> = (0..degree)
        .map(|k| Complex64::from_polar(radius, std::f64::consts::TAU * k as f64 / degree as f64 + 0.4))
        .collect();

    for _ in 0..max_iterations {
        let mut max_step = 0.0f64;

        for i in 0..degree {
            let (value, slope) = horner_with_derivative(&monic, z[i]);
            if value.norm() == 0.0 {
                continue;
            }

            let ratio = value / slope;
            let repulsion: Complex64 = (0..degree)
                .filter(|&j| j != i)
                .map(|j| Complex64::new(1.0, 0.0) / (z[i] - z[j]))
                .sum();
            let step = ratio / (Complex64::new(1.0, 0.0) - ratio * repulsion);

            if step.is_finite() {
                z[i] -= step;
                max_step = max_step.max(step.norm() / (1.0 + z[i].norm()));
            }
        }

        if max_step < ABERTH_STEP_TOLERANCE {
            break;
        }
    }

    z.into_iter()
        .map(|root| {
            if root.im.abs() < REAL_SNAP_TOLERANCE * (1.0 + root.re.abs()) {
                Complex64::new(root.re, 0.0)
            } else {
                root
            }
        })
        .collect()
}

fn horner_with_derivative(coeffs: &[Complex64], z: Complex64) -> (Complex64, Complex64) {
    let mut value = Complex64::new(0.0, 0.0);
    let mut slope = Complex64::new(0.0, 0.0);
    for c in coeffs.iter().rev() {
        slope = slope * z + value;
        value = value * z + c;
    }
    (value, slope)
}

/// Writes `v = s² · r` with `r` squarefree, keeping the sign of `v` in `r`.
fn extract_square(v: i64) -> (i64, i64) {
    let sign = v.signum();
    let mut m = v.abs();
    let mut s = 1i64;
    let mut f = 2i64;
    while f * f <= m {
        while m % (f * f) == 0 {
            m /= f * f;
            s *= f;
        }
        f += 1;
    }
    (s, sign * m)
}

fn divisors(v: i64) -> Vec<i64> {
    let v = v.abs();
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d = 1i64;
    while d * d <= v {
        if v % d == 0 {
            small.push(d);
            if d != v / d {
                large.push(v / d);
            }
        }
        d += 1;
    }
    small.extend(large.into_iter().rev());
    small
}

/// Greatest common divisor (non-negative).
#[must_use]
pub fn gcd_i64(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn lcm_i64(a: i64, b: i64) -> i64 {
    lcm_checked(a, b).unwrap_or(a.saturating_mul(b))
}

fn lcm_checked(a: i64, b: i64) -> Option<i64> {
    let g = gcd_i64(a, b);
    if g == 0 {
        return Some(0);
    }
    (a / g).checked_mul(b).map(i64::abs)
}

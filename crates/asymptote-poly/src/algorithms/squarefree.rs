//! Squarefree decomposition of polynomials.
//!
//! The squarefree decomposition writes a polynomial as
//!
//! f = u · f₁ · f₂² · f₃³ · ...
//!
//! where each fᵢ is squarefree, monic and coprime to the others. Root
//! multiplicities of a characteristic polynomial are read off directly from
//! the index of the factor containing the root.
//!
//! # Algorithm
//!
//! Uses Yun's algorithm, valid over any field of characteristic 0.

use asymptote_numeric::Field;

use crate::algorithms::gcd::{make_monic, poly_exact_div, poly_gcd};
use crate::dense::DensePoly;

/// A factor with its multiplicity in the squarefree decomposition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SquarefreeFactor<F: Field> {
    /// The squarefree polynomial factor.
    pub factor: DensePoly<F>,
    /// The multiplicity (power) of this factor.
    pub multiplicity: u32,
}

/// Result of squarefree decomposition.
#[derive(Clone, Debug)]
pub struct SquarefreeDecomposition<F: Field> {
    /// The unit (leading coefficient).
    pub unit: F,
    /// The squarefree factors with multiplicities, in increasing multiplicity.
    pub factors: Vec<SquarefreeFactor<F>>,
}

impl<F: Field> SquarefreeDecomposition<F> {
    /// Reconstructs the original polynomial from the decomposition.
    #[must_use]
    pub fn to_polynomial(&self) -> DensePoly<F> {
        self.factors
            .iter()
            .fold(DensePoly::constant(self.unit.clone()), |acc, sf| {
                acc.mul(&sf.factor.pow(sf.multiplicity))
            })
    }

    /// Returns true if all multiplicities are 1.
    #[must_use]
    pub fn is_squarefree(&self) -> bool {
        self.factors.iter().all(|f| f.multiplicity == 1)
    }
}

/// Computes the squarefree decomposition of a polynomial using Yun's algorithm.
///
/// 1. g = gcd(f, f')
/// 2. a = f/g, b = f'/g
/// 3. repeat: c = b − a'; d = gcd(a, c); emit d; a = a/d, b = c/d
pub fn squarefree_decomposition<F: Field>(f: &DensePoly<F>) -> SquarefreeDecomposition<F> {
    let unit = f.leading_coeff().clone();

    if f.degree() == 0 {
        return SquarefreeDecomposition {
            unit,
            factors: Vec::new(),
        };
    }

    let f_monic = make_monic(f);
    let f_prime = f_monic.derivative();
    let g = poly_gcd(&f_monic, &f_prime);

    if g.degree() == 0 {
        return SquarefreeDecomposition {
            unit,
            factors: vec![SquarefreeFactor {
                factor: f_monic,
                multiplicity: 1,
            }],
        };
    }

    let (Some(mut a), Some(mut b)) = (poly_exact_div(&f_monic, &g), poly_exact_div(&f_prime, &g)) else {
        return SquarefreeDecomposition {
            unit,
            factors: vec![SquarefreeFactor {
                factor: f_monic,
                multiplicity: 1,
            }],
        };
    };

    let mut factors = Vec::new();
    let mut multiplicity = 1u32;

    while a.degree() > 0 {
        let c = b.sub(&a.derivative());
        let d = poly_gcd(&a, &c);

        if d.degree() > 0 {
            factors.push(SquarefreeFactor {
                factor: d.clone(),
                multiplicity,
            });
        }

        let (Some(next_a), Some(next_b)) = (poly_exact_div(&a, &d), poly_exact_div(&c, &d)) else {
            break;
        };
        a = next_a;
        b = next_b;
        multiplicity += 1;
    }

    SquarefreeDecomposition { unit, factors }
}

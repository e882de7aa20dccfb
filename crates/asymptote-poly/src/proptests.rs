//! Property-based tests for polynomial arithmetic.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::algorithms::gcd::poly_div_rem;
    use crate::algorithms::interpolate::interpolate;
    use crate::algorithms::roots::find_roots;
    use crate::algorithms::squarefree::squarefree_decomposition;
    use crate::dense::DensePoly;
    use asymptote_numeric::Rational;

    fn small_coeff() -> impl Strategy<Value = Rational> {
        (-20i64..20i64).prop_map(Rational::from)
    }

    // Degree 0-4
    fn small_poly() -> impl Strategy<Value = DensePoly<Rational>> {
        proptest::collection::vec(small_coeff(), 1..=5).prop_map(DensePoly::new)
    }

    fn nonzero_poly() -> impl Strategy<Value = DensePoly<Rational>> {
        small_poly().prop_filter("polynomial must be non-zero", |p| !p.is_zero())
    }

    proptest! {
        #[test]
        fn poly_mul_commutative(a in small_poly(), b in small_poly()) {
            prop_assert_eq!(a.mul(&b), b.mul(&a));
        }

        #[test]
        fn poly_distributive(a in small_poly(), b in small_poly(), c in small_poly()) {
            let left = a.mul(&b.add(&c));
            let right = a.mul(&b).add(&a.mul(&c));
            prop_assert_eq!(left, right);
        }

        #[test]
        fn div_rem_reconstructs(a in small_poly(), b in nonzero_poly()) {
            let (q, r) = poly_div_rem(&a, &b).unwrap();
            prop_assert_eq!(q.mul(&b).add(&r), a);
            prop_assert!(r.is_zero() || r.degree() < b.degree());
        }

        #[test]
        fn squarefree_reconstructs(a in nonzero_poly(), b in nonzero_poly()) {
            // a·b² has a repeated factor whenever b is not constant
            let f = a.mul(&b).mul(&b);
            let decomp = squarefree_decomposition(&f);
            prop_assert_eq!(decomp.to_polynomial(), f);
        }

        #[test]
        fn interpolation_hits_samples(p in small_poly()) {
            let points: Vec<_> = (0..=p.degree() as i64)
                .map(|x| {
                    let x = Rational::from(x);
                    let y = p.eval(&x);
                    (x, y)
                })
                .collect();
            prop_assert_eq!(interpolate(&points).unwrap(), p);
        }

        #[test]
        fn root_multiplicities_sum_to_degree(p in nonzero_poly()) {
            let roots = find_roots(&p, 500);
            let total: u32 = roots.iter().map(|r| r.multiplicity).sum();
            prop_assert_eq!(total as usize, p.degree());
        }
    }
}

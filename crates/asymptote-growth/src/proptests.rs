//! Property-based tests for the growth preorder.

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use proptest::prelude::*;

    use crate::order::GrowthOrder;
    use crate::quantity::Quantity;
    use asymptote_numeric::Rational;

    fn small_rational() -> impl Strategy<Value = Rational> {
        (-6i64..=6, 1i64..=4).prop_map(|(p, q)| Rational::new(p, q))
    }

    fn poly_log() -> impl Strategy<Value = GrowthOrder> {
        (small_rational(), small_rational())
            .prop_map(|(d, k)| GrowthOrder::poly_log(Quantity::exact(d), Quantity::exact(k)))
    }

    fn exponential() -> impl Strategy<Value = GrowthOrder> {
        (2i64..=5, 0i64..=3).prop_map(|(b, d)| GrowthOrder::Exponential {
            base: Quantity::int(b),
            degree: Quantity::int(d),
        })
    }

    fn any_order() -> impl Strategy<Value = GrowthOrder> {
        prop_oneof![
            4 => poly_log(),
            2 => exponential(),
            1 => Just(GrowthOrder::Factorial),
        ]
    }

    proptest! {
        #[test]
        fn compare_reflexive(a in any_order()) {
            prop_assert_eq!(a.compare(&a), Ok(Ordering::Equal));
        }

        #[test]
        fn compare_antisymmetric(a in any_order(), b in any_order()) {
            let ab = a.compare(&b).unwrap();
            let ba = b.compare(&a).unwrap();
            prop_assert_eq!(ab, ba.reverse());
        }

        #[test]
        fn compare_transitive(a in any_order(), b in any_order(), c in any_order()) {
            let ab = a.compare(&b).unwrap();
            let bc = b.compare(&c).unwrap();
            if ab != Ordering::Greater && bc != Ordering::Greater {
                prop_assert_ne!(a.compare(&c).unwrap(), Ordering::Greater);
            }
        }

        #[test]
        fn ties_only_between_identical(a in any_order(), b in any_order()) {
            if a.compare(&b) == Ok(Ordering::Equal) {
                prop_assert_eq!(a, b);
            }
        }

        #[test]
        fn polynomial_successor_dominates(k in -10i64..10) {
            let lower = GrowthOrder::polynomial(k);
            let upper = GrowthOrder::polynomial(k + 1);
            prop_assert_eq!(lower.compare(&upper), Ok(Ordering::Less));
        }

        #[test]
        fn symbolic_degrees_ordered_by_offset(a in small_rational(), b in small_rational()) {
            let k = Quantity::symbol("k");
            let lower = GrowthOrder::polynomial(k.add(&Quantity::exact(a.clone())));
            let upper = GrowthOrder::polynomial(k.add(&Quantity::exact(b.clone())));
            prop_assert_eq!(lower.compare(&upper), Ok(a.cmp(&b)));
        }

        #[test]
        fn exponential_dominates_poly_log(p in poly_log(), e in exponential()) {
            prop_assert_eq!(p.compare(&e), Ok(Ordering::Less));
        }

        #[test]
        fn multiply_by_constant_is_identity(a in any_order()) {
            prop_assert_eq!(a.multiply(&GrowthOrder::Constant), a);
        }

        #[test]
        fn multiply_is_monotone(a in poly_log(), b in poly_log(), c in poly_log()) {
            if a.compare(&b).unwrap() == Ordering::Less {
                prop_assert_eq!(a.multiply(&c).compare(&b.multiply(&c)), Ok(Ordering::Less));
            }
        }
    }
}

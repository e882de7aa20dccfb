//! Property-based tests for rational arithmetic.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::field::Field;
    use crate::rational::Rational;

    fn small_int() -> impl Strategy<Value = i64> {
        -1000i64..1000i64
    }

    fn non_zero_int() -> impl Strategy<Value = i64> {
        prop_oneof![-1000i64..-1i64, 1i64..1000i64]
    }

    fn rational() -> impl Strategy<Value = Rational> {
        (small_int(), non_zero_int()).prop_map(|(n, d)| Rational::new(n, d))
    }

    proptest! {
        #[test]
        fn rational_add_commutative(a in rational(), b in rational()) {
            prop_assert_eq!(&a + &b, &b + &a);
        }

        #[test]
        fn rational_mul_associative(a in rational(), b in rational(), c in rational()) {
            prop_assert_eq!(&(&a * &b) * &c, &a * &(&b * &c));
        }

        #[test]
        fn rational_distributive(a in rational(), b in rational(), c in rational()) {
            prop_assert_eq!(&a * &(&b + &c), &(&a * &b) + &(&a * &c));
        }

        #[test]
        fn rational_inverse(a in rational()) {
            prop_assume!(!a.is_zero());
            let inv = Field::inv(&a).unwrap();
            prop_assert!((a * inv).is_one());
        }

        #[test]
        fn rational_order_matches_f64(a in rational(), b in rational()) {
            prop_assume!((a.to_f64() - b.to_f64()).abs() > 1e-9);
            prop_assert_eq!(a < b, a.to_f64() < b.to_f64());
        }

        #[test]
        fn floor_is_below(a in rational()) {
            let floor = Rational::from(a.floor_i64().unwrap());
            prop_assert!(floor <= a);
            prop_assert!(a < &floor + &Rational::one());
        }
    }
}

//! Integration tests for asymptote-linalg.

#[cfg(test)]
mod integration_tests {
    use crate::dense_matrix::DenseMatrix;
    use asymptote_numeric::{Complex64, Field, Rational};

    #[test]
    fn test_exact_system() {
        // x + y = 3, x - y = 1
        let m = DenseMatrix::from_rows(vec![
            vec![Rational::from(1), Rational::from(1)],
            vec![Rational::from(1), Rational::from(-1)],
        ])
        .unwrap();
        let x = m.solve(&[Rational::from(3), Rational::from(1)]).unwrap();
        assert_eq!(x, vec![Rational::from(2), Rational::from(1)]);
        assert_eq!(m.mv(&x).unwrap(), vec![Rational::from(3), Rational::from(1)]);
    }

    #[test]
    fn test_pivoting_needed() {
        // Zero in the top-left corner forces a row swap
        let m = DenseMatrix::from_rows(vec![
            vec![Rational::zero(), Rational::from(2)],
            vec![Rational::from(3), Rational::from(1)],
        ])
        .unwrap();
        let x = m.solve(&[Rational::from(4), Rational::from(5)]).unwrap();
        assert_eq!(x, vec![Rational::from(1), Rational::from(2)]);
    }

    #[test]
    fn test_fibonacci_base_system() {
        // α + β = 0, αφ + βψ = 1
        let sqrt5 = 5f64.sqrt();
        let phi = Complex64::new((1.0 + sqrt5) / 2.0, 0.0);
        let psi = Complex64::new((1.0 - sqrt5) / 2.0, 0.0);
        let m = DenseMatrix::from_rows(vec![
            vec![<Complex64 as Field>::one(), <Complex64 as Field>::one()],
            vec![phi, psi],
        ])
        .unwrap();
        let x = m
            .solve(&[<Complex64 as Field>::zero(), <Complex64 as Field>::one()])
            .unwrap();
        assert!((x[0].re - 1.0 / sqrt5).abs() < 1e-12);
        assert!((x[1].re + 1.0 / sqrt5).abs() < 1e-12);
    }
}

//! Dense matrices stored in row-major order.

use std::ops::{Index, IndexMut};

use asymptote_numeric::Field;

/// Dense matrix stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<F> {
    /// Matrix entries in row-major order.
    data: Vec<F>,
    /// Number of rows.
    num_rows: usize,
    /// Number of columns.
    num_cols: usize,
}

impl<F: Field> DenseMatrix<F> {
    /// Creates a new matrix filled with zeros.
    #[must_use]
    pub fn zeros(num_rows: usize, num_cols: usize) -> Self {
        Self {
            data: vec![F::zero(); num_rows * num_cols],
            num_rows,
            num_cols,
        }
    }

    /// Creates a matrix from rows.
    ///
    /// Returns `None` if the rows have different lengths.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<F>>) -> Option<Self> {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != num_cols) {
            return None;
        }
        Some(Self {
            data: rows.into_iter().flatten().collect(),
            num_rows,
            num_cols,
        })
    }

    /// Creates an identity matrix.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = F::one();
        }
        m
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Checks if the matrix is square.
    #[must_use]
    pub fn is_square(&self) -> bool {
        self.num_rows == self.num_cols
    }

    /// Returns a slice of the specified row.
    #[must_use]
    pub fn row(&self, row: usize) -> &[F] {
        let start = row * self.num_cols;
        &self.data[start..start + self.num_cols]
    }

    /// Matrix-vector multiply: y = A * x.
    ///
    /// Returns `None` on a dimension mismatch.
    #[must_use]
    pub fn mv(&self, x: &[F]) -> Option<Vec<F>> {
        if x.len() != self.num_cols {
            return None;
        }
        Some(
            (0..self.num_rows)
                .map(|row| {
                    self.row(row)
                        .iter()
                        .zip(x)
                        .fold(F::zero(), |acc, (a, b)| acc + a.clone() * b.clone())
                })
                .collect(),
        )
    }

    /// Swaps two rows.
    pub fn swap_rows(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        for col in 0..self.num_cols {
            self.data.swap(i * self.num_cols + col, j * self.num_cols + col);
        }
    }

    /// Row `target` += `scale` · row `source`.
    fn add_scaled_row(&mut self, target: usize, source: usize, scale: &F) {
        for col in 0..self.num_cols {
            let v = self[(source, col)].clone() * scale.clone();
            self[(target, col)] = self[(target, col)].clone() + v;
        }
    }

    /// Reduces to row-echelon form with partial pivoting, returning the
    /// reduced matrix and its rank.
    #[must_use]
    pub fn row_echelon(&self) -> (Self, usize) {
        let mut m = self.clone();
        let mut pivot_row = 0;

        for col in 0..m.num_cols {
            if pivot_row >= m.num_rows {
                break;
            }

            let best = (pivot_row..m.num_rows)
                .filter(|&row| !m[(row, col)].is_zero())
                .max_by(|&a, &b| {
                    m[(a, col)]
                        .magnitude()
                        .partial_cmp(&m[(b, col)].magnitude())
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            let Some(best) = best else {
                continue;
            };
            m.swap_rows(pivot_row, best);

            let Some(pivot_inv) = m[(pivot_row, col)].inv() else {
                continue;
            };
            for row in pivot_row + 1..m.num_rows {
                let factor = -(m[(row, col)].clone() * pivot_inv.clone());
                if !factor.is_zero() {
                    m.add_scaled_row(row, pivot_row, &factor);
                }
                m[(row, col)] = F::zero();
            }
            pivot_row += 1;
        }

        (m, pivot_row)
    }

    /// Returns the rank.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.row_echelon().1
    }

    /// Solves the square system A x = b.
    ///
    /// Returns `None` if the matrix is not square, the dimensions disagree,
    /// or the matrix is singular.
    #[must_use]
    pub fn solve(&self, b: &[F]) -> Option<Vec<F>> {
        let n = self.num_rows;
        if !self.is_square() || b.len() != n {
            return None;
        }

        let mut aug = Self::zeros(n, n + 1);
        for row in 0..n {
            for col in 0..n {
                aug[(row, col)] = self[(row, col)].clone();
            }
            aug[(row, n)] = b[row].clone();
        }

        let (echelon, rank) = aug.row_echelon();
        if rank < n || (0..n).any(|i| echelon[(i, i)].is_zero()) {
            return None;
        }

        let mut x = vec![F::zero(); n];
        for row in (0..n).rev() {
            let mut acc = echelon[(row, n)].clone();
            for col in row + 1..n {
                acc = acc - echelon[(row, col)].clone() * x[col].clone();
            }
            x[row] = acc.field_div(&echelon[(row, row)])?;
        }

        Some(x)
    }
}

impl<F> Index<(usize, usize)> for DenseMatrix<F> {
    type Output = F;

    fn index(&self, (row, col): (usize, usize)) -> &F {
        &self.data[row * self.num_cols + col]
    }
}

impl<F> IndexMut<(usize, usize)> for DenseMatrix<F> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut F {
        &mut self.data[row * self.num_cols + col]
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use asymptote_numeric::Rational;

    fn q(n: i64) -> Rational {
        Rational::from(n)
    }

    #[test]
    fn test_identity_solve() {
        let id = DenseMatrix::<Rational>::identity(3);
        let b = vec![q(1), q(2), q(3)];
        assert_eq!(id.solve(&b), Some(b));
    }

    #[test]
    fn test_singular() {
        let m = DenseMatrix::from_rows(vec![vec![q(1), q(2)], vec![q(2), q(4)]]).unwrap();
        assert_eq!(m.rank(), 1);
        assert!(m.solve(&[q(1), q(2)]).is_none());
    }

    #[test]
    fn test_ragged_rows() {
        assert!(DenseMatrix::from_rows(vec![vec![q(1)], vec![q(1), q(2)]]).is_none());
    }
}

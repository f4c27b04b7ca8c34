//! LU factorization with partial pivoting (C3).
//!
//! Grounded on the dense Gaussian-elimination factorization in
//! `examples/original_source/simplex/src/matrix.cc` (`get_inverse`), with the
//! combined-storage / permutation-vector layout generalized to
//! [`crate::scalar::Scalar`] instead of being pinned to `f64`.

use crate::SolverError;
use crate::linalg::matrix::DenseMatrix;
use crate::scalar::Scalar;

/// `PA = LU`. `lu` packs `L` (unit diagonal, strictly below) and `U` (on and
/// above the diagonal) into one square matrix; `permutation[i]` is the
/// original row that now occupies row `i`.
#[derive(Debug, Clone)]
pub struct LuFactorization<S: Scalar> {
    lu: DenseMatrix<S>,
    permutation: Vec<usize>,
    sign: i32,
}

impl<S: Scalar> LuFactorization<S> {
    /// Factorizes a square matrix, choosing the largest-magnitude entry in
    /// each column as pivot. Fails with [`SolverError::Singular`] if a pivot
    /// column's best candidate falls below `S::tol_pivot()` (§4.3).
    pub fn factorize(matrix: &DenseMatrix<S>) -> Result<Self, SolverError> {
        if matrix.rows() != matrix.cols() {
            return Err(SolverError::dimension_mismatch(
                "LU factorization requires a square matrix",
            ));
        }

        let n = matrix.rows();
        let mut lu = matrix.clone();
        let mut permutation: Vec<usize> = (0..n).collect();
        let mut sign = 1;

        for k in 0..n {
            let mut pivot_row = k;
            let mut pivot_value = lu.get(k, k).abs();
            for i in (k + 1)..n {
                let val = lu.get(i, k).abs();
                if val > pivot_value {
                    pivot_row = i;
                    pivot_value = val;
                }
            }

            if pivot_value <= S::tol_pivot() {
                return Err(SolverError::singular(format!(
                    "no usable pivot in column {k} (best magnitude {})",
                    pivot_value
                )));
            }

            if pivot_row != k {
                lu.swap_rows(k, pivot_row);
                permutation.swap(k, pivot_row);
                sign = -sign;
            }

            let pivot = lu.get(k, k);
            for i in (k + 1)..n {
                let factor = lu.get(i, k) / pivot;
                lu.set(i, k, factor);
                for j in (k + 1)..n {
                    let updated = lu.get(i, j) - factor * lu.get(k, j);
                    lu.set(i, j, updated);
                }
            }
        }

        Ok(Self {
            lu,
            permutation,
            sign,
        })
    }

    pub fn dim(&self) -> usize {
        self.lu.rows()
    }

    /// Solves `Ax = b` via `Ly = Pb` then `Ux = y`.
    pub fn solve(&self, b: &[S]) -> Result<Vec<S>, SolverError> {
        let n = self.dim();
        if b.len() != n {
            return Err(SolverError::dimension_mismatch(
                "right-hand side length does not match factorization dimension",
            ));
        }

        let mut y: Vec<S> = (0..n).map(|i| b[self.permutation[i]]).collect();
        for i in 0..n {
            for j in 0..i {
                y[i] = y[i] - self.lu.get(i, j) * y[j];
            }
        }

        let mut x = vec![S::zero(); n];
        for i in (0..n).rev() {
            let mut sum = y[i];
            for j in (i + 1)..n {
                sum = sum - self.lu.get(i, j) * x[j];
            }
            let diag = self.lu.get(i, i);
            if diag.abs() <= S::tol_pivot() {
                return Err(SolverError::singular(
                    "zero diagonal encountered during back substitution",
                ));
            }
            x[i] = sum / diag;
        }

        Ok(x)
    }

    /// Determinant via the signed product of `U`'s diagonal.
    pub fn determinant(&self) -> S {
        let mut det = if self.sign >= 0 { S::one() } else { -S::one() };
        for i in 0..self.dim() {
            det = det * self.lu.get(i, i);
        }
        det
    }

    /// Materializes `A^{-1}` by solving `A x_j = e_j` for every column.
    pub fn inverse(&self) -> Result<DenseMatrix<S>, SolverError> {
        let n = self.dim();
        let mut out = DenseMatrix::new(n, n);
        for j in 0..n {
            let mut e = vec![S::zero(); n];
            e[j] = S::one();
            let col = self.solve(&e)?;
            for i in 0..n {
                out.set(i, j, col[i]);
            }
        }
        Ok(out)
    }
}

/// Convenience entry point: `A^{-1}` for a square matrix, per §4.3.
pub fn inverse<S: Scalar>(matrix: &DenseMatrix<S>) -> Result<DenseMatrix<S>, SolverError> {
    LuFactorization::factorize(matrix)?.inverse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factorizes_and_solves() {
        let m = DenseMatrix::from_row_major(3, 3, vec![2.0, 1.0, 1.0, 4.0, 3.0, 3.0, 8.0, 7.0, 9.0]);
        let lu = LuFactorization::factorize(&m).unwrap();
        let x = lu.solve(&[4.0, 10.0, 22.0]).unwrap();
        let reconstructed = m.mul_vec(&x);
        assert!((reconstructed[0] - 4.0).abs() < 1e-9);
        assert!((reconstructed[1] - 10.0).abs() < 1e-9);
        assert!((reconstructed[2] - 22.0).abs() < 1e-9);
    }

    #[test]
    fn detects_singular_matrix() {
        let m = DenseMatrix::from_row_major(2, 2, vec![1.0, 2.0, 2.0, 4.0]);
        assert!(LuFactorization::factorize(&m).is_err());
    }

    #[test]
    fn inverse_round_trips_to_identity() {
        let m = DenseMatrix::from_row_major(2, 2, vec![4.0, 7.0, 2.0, 6.0]);
        let inv = inverse(&m).unwrap();
        let product = m.mul(&inv);
        assert!(product.approx_eq(&DenseMatrix::identity(2), 1e-9));
    }

    #[test]
    fn determinant_matches_known_value() {
        let m = DenseMatrix::from_row_major(2, 2, vec![4.0, 7.0, 2.0, 6.0]);
        let lu = LuFactorization::factorize(&m).unwrap();
        assert!((lu.determinant() - 10.0).abs() < 1e-9);
    }
}

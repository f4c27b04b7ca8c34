//! Basis inverse maintainer (C4).
//!
//! Grounded on `Matrix::get_inverse_with_column` in
//! `examples/original_source/simplex/src/matrix.cc`: a rank-1 product-form
//! update of `B^-1` after a single column swap at basis position `q`, so
//! most iterations avoid a full LU refactorization. Periodic refactoring
//! (every `K` updates) bounds the accumulated rounding error, per §4.4.

use crate::SolverError;
use crate::linalg::lu;
use crate::linalg::matrix::DenseMatrix;
use crate::scalar::Scalar;

/// Owns the current `B^-1` and the columns composing `B`, and knows how to
/// refresh itself either by full refactorization or by a single rank-1
/// update.
#[derive(Debug, Clone)]
pub struct BasisInverse<S: Scalar> {
    inverse: DenseMatrix<S>,
    updates_since_refactor: usize,
}

impl<S: Scalar> BasisInverse<S> {
    /// Builds `B^-1` from scratch via LU factorization (§4.3).
    pub fn refactor(basis_columns: &DenseMatrix<S>) -> Result<Self, SolverError> {
        let inverse = lu::inverse(basis_columns)?;
        Ok(Self {
            inverse,
            updates_since_refactor: 0,
        })
    }

    pub fn inverse(&self) -> &DenseMatrix<S> {
        &self.inverse
    }

    pub fn dim(&self) -> usize {
        self.inverse.rows()
    }

    pub fn updates_since_refactor(&self) -> usize {
        self.updates_since_refactor
    }

    /// Applies the rank-1 update for replacing basis position `q` with a
    /// column whose product against the *old* `B^-1` is `a_tilde`:
    ///
    /// ```text
    /// new_inverse(i, j) = old_inverse(i, j) - old_inverse(q, j) * a_tilde(i) / a_tilde(q)   (i != q)
    /// new_inverse(q, j) = old_inverse(q, j) / a_tilde(q)
    /// ```
    ///
    /// Fails with [`SolverError::Singular`] if `a_tilde(q)` is not a usable
    /// pivot (caller should fall back to [`BasisInverse::refactor`]).
    pub fn update(&mut self, entering_column: &[S], leaving_row: usize) -> Result<(), SolverError> {
        let n = self.dim();
        if entering_column.len() != n {
            return Err(SolverError::dimension_mismatch(
                "entering column length does not match basis dimension",
            ));
        }
        if leaving_row >= n {
            return Err(SolverError::dimension_mismatch(
                "leaving row index out of range",
            ));
        }

        let a_tilde = self.inverse.mul_vec(entering_column);
        let pivot = a_tilde[leaving_row];
        if pivot.abs() <= S::tol_pivot() {
            return Err(SolverError::singular(
                "rank-1 basis update pivot too small",
            ));
        }

        let old = self.inverse.clone();
        for j in 0..n {
            let old_qj = old.get(leaving_row, j);
            for i in 0..n {
                if i == leaving_row {
                    continue;
                }
                let updated = old.get(i, j) - (old_qj * a_tilde[i]) / pivot;
                self.inverse.set(i, j, updated);
            }
            self.inverse.set(leaving_row, j, old_qj / pivot);
        }

        self.updates_since_refactor += 1;
        Ok(())
    }

    /// True once `updates_since_refactor` reaches the refactor cadence `K`,
    /// signalling the caller should call [`BasisInverse::refactor`] instead
    /// of another [`BasisInverse::update`] (§4.4).
    pub fn due_for_refactor(&self, cadence: usize) -> bool {
        self.updates_since_refactor >= cadence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refactor_matches_lu_inverse() {
        let basis = DenseMatrix::from_row_major(2, 2, vec![1.0, 0.0, 0.0, 1.0]);
        let bi = BasisInverse::refactor(&basis).unwrap();
        assert!(bi.inverse().approx_eq(&DenseMatrix::identity(2), 1e-12));
    }

    #[test]
    fn rank1_update_matches_full_refactor() {
        // Start from the identity basis, swap column 0 for [2, 1]^T at row 0.
        let mut bi = BasisInverse::refactor(&DenseMatrix::<f64>::identity(2)).unwrap();
        bi.update(&[2.0, 1.0], 0).unwrap();

        let new_basis = DenseMatrix::from_row_major(2, 2, vec![2.0, 0.0, 1.0, 1.0]);
        let expected = BasisInverse::refactor(&new_basis).unwrap();
        assert!(bi.inverse().approx_eq(expected.inverse(), 1e-9));
    }

    #[test]
    fn update_rejects_singular_pivot() {
        let mut bi = BasisInverse::refactor(&DenseMatrix::<f64>::identity(2)).unwrap();
        assert!(bi.update(&[0.0, 1.0], 0).is_err());
    }

    #[test]
    fn refactor_cadence_tracks_update_count() {
        let mut bi = BasisInverse::refactor(&DenseMatrix::<f64>::identity(2)).unwrap();
        assert!(!bi.due_for_refactor(1));
        bi.update(&[2.0, 1.0], 0).unwrap();
        assert!(bi.due_for_refactor(1));
    }
}

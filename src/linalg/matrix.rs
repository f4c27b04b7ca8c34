//! Dense row-major matrix storage (C2).
//!
//! Value semantics only: a [`DenseMatrix`] owns its storage outright, is
//! `Clone`, and carries no cached "is this derived quantity current" flags.
//! Per spec.md §9's design note, a reference-counted, cache-flagged matrix
//! is deliberately not used here — callers that need a factorization or
//! inverse ask for one explicitly (see [`crate::linalg::lu`] and
//! [`crate::linalg::basis`]).

use crate::scalar::Scalar;

/// A dense `rows x cols` matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<S: Scalar> {
    rows: usize,
    cols: usize,
    data: Vec<S>,
}

impl<S: Scalar> DenseMatrix<S> {
    /// Creates an `rows x cols` matrix filled with `S::zero()`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::new_filled(rows, cols, S::zero())
    }

    /// Creates an `rows x cols` matrix with every entry set to `value`.
    pub fn new_filled(rows: usize, cols: usize, value: S) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Builds a matrix from a row-major flat buffer. Panics if the length
    /// does not equal `rows * cols` (invariant of §3.2).
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<S>) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "row-major buffer length must equal rows * cols"
        );
        Self { rows, cols, data }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::new(n, n);
        for i in 0..n {
            m.set(i, i, S::one());
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.rows && j < self.cols, "matrix index out of bounds");
        i * self.cols + j
    }

    pub fn get(&self, i: usize, j: usize) -> S {
        self.data[self.index(i, j)]
    }

    pub fn set(&mut self, i: usize, j: usize, value: S) {
        let idx = self.index(i, j);
        self.data[idx] = value;
    }

    /// Addressing for a 1xn or nx1 matrix by a single index (§3.2).
    pub fn get1(&self, i: usize) -> S {
        assert!(
            self.rows == 1 || self.cols == 1,
            "single-index access requires a row or column vector"
        );
        self.data[i]
    }

    pub fn set1(&mut self, i: usize, value: S) {
        assert!(
            self.rows == 1 || self.cols == 1,
            "single-index access requires a row or column vector"
        );
        self.data[i] = value;
    }

    pub fn row(&self, i: usize) -> &[S] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [S] {
        let start = i * self.cols;
        &mut self.data[start..start + self.cols]
    }

    pub fn column(&self, j: usize) -> Vec<S> {
        (0..self.rows).map(|i| self.get(i, j)).collect()
    }

    /// O(max(r,c)) row swap.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            let (ia, ib) = (self.index(a, j), self.index(b, j));
            self.data.swap(ia, ib);
        }
    }

    /// O(max(r,c)) column swap.
    pub fn swap_columns(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for i in 0..self.rows {
            let (ia, ib) = (self.index(i, a), self.index(i, b));
            self.data.swap(ia, ib);
        }
    }

    /// Transposes in place. Only defined for square matrices; non-square
    /// transforms should build a new matrix via [`DenseMatrix::transposed`].
    pub fn transpose(&mut self) {
        assert_eq!(self.rows, self.cols, "in-place transpose requires a square matrix");
        for i in 0..self.rows {
            for j in (i + 1)..self.cols {
                let (ia, ib) = (self.index(i, j), self.index(j, i));
                self.data.swap(ia, ib);
            }
        }
    }

    pub fn transposed(&self) -> Self {
        let mut out = Self::new(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.set(j, i, self.get(i, j));
            }
        }
        out
    }

    pub fn resize_zero(&mut self, rows: usize, cols: usize) {
        let mut out = Self::new(rows, cols);
        for i in 0..self.rows.min(rows) {
            for j in 0..self.cols.min(cols) {
                out.set(i, j, self.get(i, j));
            }
        }
        *self = out;
    }

    pub fn add(&self, other: &Self) -> Self {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| *a + *b)
            .collect();
        Self::from_row_major(self.rows, self.cols, data)
    }

    pub fn sub(&self, other: &Self) -> Self {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| *a - *b)
            .collect();
        Self::from_row_major(self.rows, self.cols, data)
    }

    pub fn mul(&self, other: &Self) -> Self {
        assert_eq!(self.cols, other.rows, "matrix dimensions do not conform for multiplication");
        let mut out = Self::new(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a_ik = self.get(i, k);
                if a_ik.is_zero_exact() {
                    continue;
                }
                for j in 0..other.cols {
                    let cur = out.get(i, j);
                    out.set(i, j, cur + a_ik * other.get(k, j));
                }
            }
        }
        out
    }

    /// Matrix-vector product where `x` is a column vector of length `cols`.
    pub fn mul_vec(&self, x: &[S]) -> Vec<S> {
        assert_eq!(self.cols, x.len());
        (0..self.rows)
            .map(|i| {
                let row = self.row(i);
                let mut acc = S::zero();
                for j in 0..self.cols {
                    acc = acc + row[j] * x[j];
                }
                acc
            })
            .collect()
    }

    /// Row-vector times matrix: `y^T A` where `y` has length `rows`.
    pub fn row_vec_mul(&self, y: &[S]) -> Vec<S> {
        assert_eq!(self.rows, y.len());
        let mut out = vec![S::zero(); self.cols];
        for i in 0..self.rows {
            if y[i].is_zero_exact() {
                continue;
            }
            let row = self.row(i);
            for j in 0..self.cols {
                out[j] = out[j] + y[i] * row[j];
            }
        }
        out
    }

    /// Equality within `TOL_FEAS`, used by round-trip tests (§8).
    pub fn approx_eq(&self, other: &Self, tol: S) -> bool {
        if (self.rows, self.cols) != (other.rows, other.cols) {
            return false;
        }
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| (*a - *b).abs() <= tol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m3() -> DenseMatrix<f64> {
        DenseMatrix::from_row_major(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
    }

    #[test]
    fn row_col_access() {
        let m = m3();
        assert_eq!(m.get(1, 2), 6.0);
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(m.column(1), vec![2.0, 5.0]);
    }

    #[test]
    fn swap_rows_and_columns() {
        let mut m = m3();
        m.swap_rows(0, 1);
        assert_eq!(m.row(0), &[4.0, 5.0, 6.0]);
        m.swap_columns(0, 2);
        assert_eq!(m.row(0), &[6.0, 5.0, 4.0]);
    }

    #[test]
    fn transpose_square() {
        let mut m = DenseMatrix::from_row_major(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        m.transpose();
        assert_eq!(m.row(0), &[1.0, 3.0]);
        assert_eq!(m.row(1), &[2.0, 4.0]);
    }

    #[test]
    fn mul_identity_is_noop() {
        let m = m3();
        let id = DenseMatrix::<f64>::identity(3);
        let product = m.mul(&id);
        assert!(product.approx_eq(&m, 1e-12));
    }

    #[test]
    fn mul_vec_matches_definition() {
        let m = m3();
        let x = vec![1.0, 1.0, 1.0];
        assert_eq!(m.mul_vec(&x), vec![6.0, 15.0]);
    }
}

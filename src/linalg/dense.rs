//! Dense row-major matrix and the Gauss-Jordan solver.

use thiserror::Error;

use super::Field;

/// Failure of [`solve_in_place`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    /// No usable pivot in the given column
    #[error("matrix is singular (no pivot in column {column})")]
    Singular { column: usize },
}

/// A dense matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<F> {
    data: Vec<F>,
    rows: usize,
    cols: usize,
}

impl<F: Field> DenseMatrix<F> {
    /// Create an all-zero `rows x cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![F::zero(); rows * cols],
            rows,
            cols,
        }
    }

    /// Create an `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, F::one());
        }
        m
    }

    /// Build a matrix from a list of equally long rows.
    ///
    /// # Panics
    /// If the rows differ in length.
    pub fn from_rows(rows: &[Vec<F>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            assert_eq!(row.len(), cols, "all rows must have the same length");
            data.extend_from_slice(row);
        }
        Self {
            data,
            rows: rows.len(),
            cols,
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Check whether the matrix is square.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Get element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> F {
        self.data[row * self.cols + col]
    }

    /// Set element at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: F) {
        self.data[row * self.cols + col] = value;
    }

    /// Add to element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: F) {
        let idx = row * self.cols + col;
        self.data[idx] = self.data[idx] + value;
    }

    /// Swap two rows in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    /// Largest entry magnitude in column `col`.
    pub fn column_magnitude(&self, col: usize) -> F {
        (0..self.rows)
            .map(|i| self.get(i, col).magnitude())
            .fold(F::zero(), |acc, v| if v > acc { v } else { acc })
    }

    /// Matrix-vector product `A·x`.
    ///
    /// # Panics
    /// If `x.len()` differs from the column count.
    pub fn mul_vec(&self, x: &[F]) -> Vec<F> {
        assert_eq!(x.len(), self.cols, "vector length must match column count");
        (0..self.rows)
            .map(|i| {
                (0..self.cols).fold(F::zero(), |sum, j| sum + self.get(i, j) * x[j])
            })
            .collect()
    }
}

/// Solve `A·x = b` by Gauss-Jordan elimination with partial pivoting.
///
/// Both `a` and `b` are consumed as scratch space; on success `b` holds the
/// solution `x` and `a` has been reduced to the identity. On failure their
/// contents are unspecified.
///
/// # Panics
/// If `a` is not square or `b.len()` does not match its dimension.
pub fn solve_in_place<F: Field>(a: &mut DenseMatrix<F>, b: &mut [F]) -> Result<(), SolveError> {
    assert!(a.is_square(), "solve_in_place requires a square matrix");
    let n = a.rows();
    assert_eq!(b.len(), n, "right-hand side length must match matrix dimension");

    // Zero test is relative to each column as assembled
    let scales: Vec<F> = (0..n).map(|k| a.column_magnitude(k)).collect();

    for k in 0..n {
        // Find pivot
        let mut max_row = k;
        let mut max_val = a.get(k, k).magnitude();
        for i in (k + 1)..n {
            let val = a.get(i, k).magnitude();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        if a.get(max_row, k).is_negligible(scales[k]) {
            return Err(SolveError::Singular { column: k });
        }

        a.swap_rows(k, max_row);
        b.swap(k, max_row);

        // Normalize the pivot row
        let inv = F::one() / a.get(k, k);
        a.set(k, k, F::one());
        for j in (k + 1)..n {
            a.set(k, j, a.get(k, j) * inv);
        }
        b[k] = b[k] * inv;

        // Eliminate column k from every other row
        for i in 0..n {
            if i == k {
                continue;
            }
            let factor = a.get(i, k);
            if factor.is_zero() {
                continue;
            }
            a.set(i, k, F::zero());
            for j in (k + 1)..n {
                a.set(i, j, a.get(i, j) - a.get(k, j) * factor);
            }
            b[i] = b[i] - b[k] * factor;
        }
    }

    Ok(())
}

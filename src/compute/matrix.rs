//! Dense row-major matrix used for network weights and layer activations.
//!
//! Arithmetic returns new matrices. The only operation that writes into the
//! receiver is [`Matrix::mutate`]; [`Matrix::mutated`] is its copying twin.

use std::ops::{Index, IndexMut};

use rand::Rng;

/// Controls mutation density: one perturbed cell per this many cells.
/// Lower values touch more cells per call.
pub const MUTATION_COEFFICIENT: f64 = 7.0;

/// Shape-related matrix errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("Cannot {op} a {}x{} matrix with a {}x{} matrix", .left.0, .left.1, .right.0, .right.1)]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error("Matrix must have at least one row and one column")]
    Empty,
    #[error("Row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Dense 2-D buffer of `f64` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Zero-filled matrix.
    ///
    /// # Panics
    ///
    /// Panics if `rows` or `cols` is zero.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        assert_non_empty(rows, cols);
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Matrix with every cell drawn uniformly from `[-1, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `rows` or `cols` is zero.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        assert_non_empty(rows, cols);
        let data = (0..rows * cols).map(|_| rng.gen_range(-1.0..=1.0)).collect();
        Self { rows, cols, data }
    }

    /// `1 x n` matrix holding `values`.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn row_vector(values: &[f64]) -> Self {
        assert_non_empty(1, values.len());
        Self {
            rows: 1,
            cols: values.len(),
            data: values.to_vec(),
        }
    }

    /// Build from nested rows, inferring the shape from the nesting.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(MatrixError::Empty);
        }

        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(MatrixError::RaggedRow {
                    row: i,
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bounds-checked cell read.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Cells of one row.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Iterate rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.cols.max(1))
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[f64] {
        &self.data
    }

    /// Sum of all cells.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Matrix product `self * other`.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        if self.cols != other.rows {
            return Err(MatrixError::DimensionMismatch {
                op: "multiply",
                left: self.shape(),
                right: other.shape(),
            });
        }

        let mut target = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut cell = 0.0;
                for k in 0..self.cols {
                    cell += self.data[i * self.cols + k] * other.data[k * other.cols + j];
                }
                target.data[i * other.cols + j] = cell;
            }
        }

        Ok(target)
    }

    /// Add `scalar` to every cell.
    pub fn add_scalar(&self, scalar: f64) -> Matrix {
        self.map(|x| x + scalar)
    }

    /// Elementwise hyperbolic tangent.
    pub fn tanh(&self) -> Matrix {
        self.map(f64::tanh)
    }

    /// Elementwise `self - other`.
    pub fn difference(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        if self.shape() != other.shape() {
            return Err(MatrixError::DimensionMismatch {
                op: "subtract",
                left: self.shape(),
                right: other.shape(),
            });
        }

        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| a - b)
                .collect(),
        })
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    /// Number of cells a single [`mutate`](Self::mutate) call perturbs.
    pub fn mutation_points(&self) -> usize {
        ((self.len() as f64 / MUTATION_COEFFICIENT).round() as usize).max(1)
    }

    /// Perturb [`mutation_points`](Self::mutation_points) random cells in place.
    ///
    /// Cells are picked with repetition. Each pick adds a uniform offset from
    /// `[-1, 1]` and clamps the result back into `[-1, 1]`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.is_empty() {
            return;
        }

        for _ in 0..self.mutation_points() {
            let idx = rng.gen_range(0..self.data.len());
            let value = self.data[idx] + rng.gen_range(-1.0..=1.0);
            self.data[idx] = value.clamp(-1.0, 1.0);
        }
    }

    /// Mutated copy; the receiver is left untouched.
    pub fn mutated<R: Rng + ?Sized>(&self, rng: &mut R) -> Matrix {
        let mut copy = self.clone();
        copy.mutate(rng);
        copy
    }
}

#[inline]
fn assert_non_empty(rows: usize, cols: usize) {
    assert!(
        rows > 0 && cols > 0,
        "matrix must have at least one row and one column, got {rows}x{cols}"
    );
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        &mut self.data[row * self.cols + col]
    }
}

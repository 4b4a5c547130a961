use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// `(rows, cols)`.
pub type Shape = (usize, usize);

/// Tolerance used by `Matrix::approx_eq`.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Direction of a reduction, concatenation, tiling or permutation.
///
/// - `Row` (axis 0) works along each row, across its columns: `sum(Row)`
///   yields a column vector, `stack(Row)` concatenates horizontally and
///   `shuffle(Row)` permutes columns.
/// - `Col` (axis 1) works along each column, across its rows: `sum(Col)`
///   yields a row vector, `stack(Col)` concatenates vertically and
///   `shuffle(Col)` permutes rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Row,
    Col,
}

impl TryFrom<usize> for Axis {
    type Error = Error;

    fn try_from(axis: usize) -> Result<Axis> {
        match axis {
            0 => Ok(Axis::Row),
            1 => Ok(Axis::Col),
            other => Err(Error::InvalidAxis(other)),
        }
    }
}

/// Dense, immutable `rows x cols` matrix of `f64`.
///
/// Every operation returns a new matrix. Both dimensions are always positive
/// and every row holds exactly `cols` values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn filled(rows: usize, cols: usize, value: f64) -> Result<Matrix> {
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyMatrix { rows, cols });
        }
        Ok(Matrix {
            rows,
            cols,
            data: vec![vec![value; cols]; rows],
        })
    }

    pub fn zeros(rows: usize, cols: usize) -> Result<Matrix> {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn ones(rows: usize, cols: usize) -> Result<Matrix> {
        Matrix::filled(rows, cols, 1.0)
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyMatrix { rows, cols });
        }
        if let Some((row, values)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(Error::RaggedData {
                row,
                expected: cols,
                actual: values.len(),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Builds a matrix from row-major values.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<f64>) -> Result<Matrix> {
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyMatrix { rows, cols });
        }
        if values.len() != rows * cols {
            return Err(Error::ShapeMismatch {
                op: "from_vec",
                left: (rows, cols),
                right: (1, values.len()),
            });
        }
        let data = values.chunks(cols).map(<[f64]>::to_vec).collect();
        Ok(Matrix { rows, cols, data })
    }

    /// A `values.len() x 1` matrix.
    pub fn column(values: Vec<f64>) -> Result<Matrix> {
        let rows = values.len();
        Matrix::from_vec(rows, 1, values)
    }

    /// A `1 x values.len()` matrix.
    pub fn row(values: Vec<f64>) -> Result<Matrix> {
        let cols = values.len();
        Matrix::from_vec(1, cols, values)
    }

    /// Xavier (Glorot) initialization: samples from N(0, 2 / (fan_in + fan_out)).
    ///
    /// Suited to Sigmoid/Tanh/Linear layers; keeps activation and gradient
    /// variance roughly equal across layers. Biases use the same variance as
    /// the weights of their layer.
    pub fn xavier<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        fan_in: usize,
        fan_out: usize,
        rng: &mut R,
    ) -> Result<Matrix> {
        let std_dev = (2.0 / (fan_in + fan_out) as f64).sqrt();
        let normal = Normal::new(0.0, std_dev).map_err(|e| {
            Error::InvalidConfig(format!("xavier init for fan {fan_in}+{fan_out}: {e}"))
        })?;
        let mut res = Matrix::zeros(rows, cols)?;
        for row in res.data.iter_mut() {
            for value in row.iter_mut() {
                *value = normal.sample(rng);
            }
        }
        Ok(res)
    }

    /// Internal constructor; callers guarantee `rows > 0 && cols > 0`.
    fn generate<F>(rows: usize, cols: usize, f: F) -> Matrix
    where
        F: Fn(usize, usize) -> f64,
    {
        let data = (0..rows)
            .map(|i| (0..cols).map(|j| f(i, j)).collect())
            .collect();
        Matrix { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> Shape {
        (self.rows, self.cols)
    }

    pub fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Row-major copy of all values.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.iter().flatten().copied().collect()
    }

    pub fn ones_like(&self) -> Matrix {
        Matrix::generate(self.rows, self.cols, |_, _| 1.0)
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix::generate(self.rows, self.cols, |i, j| functor(self.data[i][j]))
    }

    pub fn ensure_shape(&self, expected: Shape, op: &'static str) -> Result<()> {
        if self.shape() != expected {
            return Err(Error::ShapeMismatch {
                op,
                left: self.shape(),
                right: expected,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Elementwise arithmetic
    // -----------------------------------------------------------------------

    fn zip_with<F>(&self, other: &Matrix, op: &'static str, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch {
                op,
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(Matrix::generate(self.rows, self.cols, |i, j| {
            f(self.data[i][j], other.data[i][j])
        }))
    }

    /// Applies `f` between every row of `self` and the `1 x cols` vector `row`.
    fn zip_row<F>(&self, row: &Matrix, op: &'static str, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if row.rows != 1 || row.cols != self.cols {
            return Err(Error::ShapeMismatch {
                op,
                left: self.shape(),
                right: row.shape(),
            });
        }
        Ok(Matrix::generate(self.rows, self.cols, |i, j| {
            f(self.data[i][j], row.data[0][j])
        }))
    }

    /// Applies `f` between every column of `self` and the `rows x 1` vector `col`.
    fn zip_col<F>(&self, col: &Matrix, op: &'static str, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if col.cols != 1 || col.rows != self.rows {
            return Err(Error::ShapeMismatch {
                op,
                left: self.shape(),
                right: col.shape(),
            });
        }
        Ok(Matrix::generate(self.rows, self.cols, |i, j| {
            f(self.data[i][j], col.data[i][0])
        }))
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    pub fn add_row(&self, row: &Matrix) -> Result<Matrix> {
        self.zip_row(row, "add_row", |a, b| a + b)
    }

    pub fn add_col(&self, col: &Matrix) -> Result<Matrix> {
        self.zip_col(col, "add_col", |a, b| a + b)
    }

    pub fn add_scalar(&self, value: f64) -> Matrix {
        self.map(|x| x + value)
    }

    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "sub", |a, b| a - b)
    }

    pub fn sub_row(&self, row: &Matrix) -> Result<Matrix> {
        self.zip_row(row, "sub_row", |a, b| a - b)
    }

    pub fn sub_col(&self, col: &Matrix) -> Result<Matrix> {
        self.zip_col(col, "sub_col", |a, b| a - b)
    }

    pub fn sub_scalar(&self, value: f64) -> Matrix {
        self.map(|x| x - value)
    }

    /// Elementwise (Hadamard) product.
    pub fn mul(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "mul", |a, b| a * b)
    }

    pub fn mul_row(&self, row: &Matrix) -> Result<Matrix> {
        self.zip_row(row, "mul_row", |a, b| a * b)
    }

    pub fn mul_col(&self, col: &Matrix) -> Result<Matrix> {
        self.zip_col(col, "mul_col", |a, b| a * b)
    }

    pub fn mul_scalar(&self, value: f64) -> Matrix {
        self.map(|x| x * value)
    }

    pub fn div(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "div", |a, b| a / b)
    }

    pub fn div_row(&self, row: &Matrix) -> Result<Matrix> {
        self.zip_row(row, "div_row", |a, b| a / b)
    }

    pub fn div_col(&self, col: &Matrix) -> Result<Matrix> {
        self.zip_col(col, "div_col", |a, b| a / b)
    }

    pub fn div_scalar(&self, value: f64) -> Matrix {
        self.map(|x| x / value)
    }

    /// Standard matrix product: `(r x k) . (k x c) -> (r x c)`.
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(Error::ShapeMismatch {
                op: "matmul",
                left: self.shape(),
                right: rhs.shape(),
            });
        }

        let mut res = Matrix::generate(self.rows, rhs.cols, |_, _| 0.0);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[i][k];
                for j in 0..rhs.cols {
                    res.data[i][j] += a * rhs.data[k][j];
                }
            }
        }

        Ok(res)
    }

    // -----------------------------------------------------------------------
    // Reductions
    // -----------------------------------------------------------------------

    fn reduce<F>(&self, axis: Axis, init: f64, f: F) -> Matrix
    where
        F: Fn(f64, f64) -> f64,
    {
        match axis {
            Axis::Row => Matrix::generate(self.rows, 1, |i, _| {
                self.data[i].iter().fold(init, |acc, &x| f(acc, x))
            }),
            Axis::Col => Matrix::generate(1, self.cols, |_, j| {
                self.data.iter().fold(init, |acc, row| f(acc, row[j]))
            }),
        }
    }

    pub fn sum(&self, axis: Axis) -> Matrix {
        self.reduce(axis, 0.0, |acc, x| acc + x)
    }

    pub fn min(&self, axis: Axis) -> Matrix {
        self.reduce(axis, f64::INFINITY, f64::min)
    }

    pub fn max(&self, axis: Axis) -> Matrix {
        self.reduce(axis, f64::NEG_INFINITY, f64::max)
    }

    pub fn sum_all(&self) -> f64 {
        self.data.iter().flatten().sum()
    }

    // -----------------------------------------------------------------------
    // Structural operations
    // -----------------------------------------------------------------------

    pub fn transpose(&self) -> Matrix {
        Matrix::generate(self.cols, self.rows, |i, j| self.data[j][i])
    }

    fn slice_indices(start: usize, stop: usize, step: usize, len: usize) -> Result<Vec<usize>> {
        if step == 0 || start >= stop || stop > len {
            return Err(Error::InvalidSlice {
                start,
                stop,
                step,
                len,
            });
        }
        Ok((start..stop).step_by(step).collect())
    }

    /// Rows `start, start + step, ...` below `stop`.
    pub fn row_slice(&self, start: usize, stop: usize, step: usize) -> Result<Matrix> {
        let indices = Matrix::slice_indices(start, stop, step, self.rows)?;
        Ok(Matrix::generate(indices.len(), self.cols, |i, j| {
            self.data[indices[i]][j]
        }))
    }

    /// Columns `start, start + step, ...` below `stop`.
    pub fn col_slice(&self, start: usize, stop: usize, step: usize) -> Result<Matrix> {
        let indices = Matrix::slice_indices(start, stop, step, self.cols)?;
        Ok(Matrix::generate(self.rows, indices.len(), |i, j| {
            self.data[i][indices[j]]
        }))
    }

    /// Tiles the matrix `factor` times along `axis`: `Row` repeats each row
    /// horizontally, `Col` repeats each column vertically.
    pub fn extend(&self, factor: usize, axis: Axis) -> Result<Matrix> {
        if factor == 0 {
            return Err(Error::InvalidConfig("extend factor must be at least 1".into()));
        }
        Ok(match axis {
            Axis::Row => Matrix::generate(self.rows, self.cols * factor, |i, j| {
                self.data[i][j % self.cols]
            }),
            Axis::Col => Matrix::generate(self.rows * factor, self.cols, |i, j| {
                self.data[i % self.rows][j]
            }),
        })
    }

    /// Concatenates `other` after `self`: `Row` appends columns (row counts
    /// must match), `Col` appends rows (column counts must match).
    pub fn stack(&self, other: &Matrix, axis: Axis) -> Result<Matrix> {
        match axis {
            Axis::Row => {
                if self.rows != other.rows {
                    return Err(Error::ShapeMismatch {
                        op: "stack",
                        left: self.shape(),
                        right: other.shape(),
                    });
                }
                let data = self
                    .data
                    .iter()
                    .zip(other.data.iter())
                    .map(|(a, b)| a.iter().chain(b.iter()).copied().collect())
                    .collect();
                Ok(Matrix {
                    rows: self.rows,
                    cols: self.cols + other.cols,
                    data,
                })
            }
            Axis::Col => {
                if self.cols != other.cols {
                    return Err(Error::ShapeMismatch {
                        op: "stack",
                        left: self.shape(),
                        right: other.shape(),
                    });
                }
                let data = self.data.iter().chain(other.data.iter()).cloned().collect();
                Ok(Matrix {
                    rows: self.rows + other.rows,
                    cols: self.cols,
                    data,
                })
            }
        }
    }

    /// Reorders entries along `axis` by `indices`: `Col` permutes rows,
    /// `Row` permutes columns. `indices` must be a permutation of the
    /// permuted dimension.
    pub fn shuffle(&self, indices: &[usize], axis: Axis) -> Result<Matrix> {
        let len = match axis {
            Axis::Row => self.cols,
            Axis::Col => self.rows,
        };
        if indices.len() != len {
            return Err(Error::InvalidPermutation(format!(
                "expected {len} indices, got {}",
                indices.len()
            )));
        }
        let mut seen = vec![false; len];
        for &index in indices {
            if index >= len {
                return Err(Error::IndexOutOfBounds { index, len });
            }
            if std::mem::replace(&mut seen[index], true) {
                return Err(Error::InvalidPermutation(format!(
                    "index {index} appears more than once"
                )));
            }
        }
        Ok(match axis {
            Axis::Row => Matrix::generate(self.rows, self.cols, |i, j| self.data[i][indices[j]]),
            Axis::Col => Matrix::generate(self.rows, self.cols, |i, j| self.data[indices[i]][j]),
        })
    }

    /// `1 x (rows * cols)` row-major view of the values.
    pub fn flatten(&self) -> Matrix {
        Matrix {
            rows: 1,
            cols: self.rows * self.cols,
            data: vec![self.to_vec()],
        }
    }

    pub fn reshape(&self, rows: usize, cols: usize) -> Result<Matrix> {
        if rows * cols != self.rows * self.cols {
            return Err(Error::ShapeMismatch {
                op: "reshape",
                left: self.shape(),
                right: (rows, cols),
            });
        }
        Matrix::from_vec(rows, cols, self.to_vec())
    }

    // -----------------------------------------------------------------------
    // Comparison
    // -----------------------------------------------------------------------

    /// True when shapes match and every pair of values differs by at most
    /// `epsilon`.
    pub fn equal_values(&self, other: &Matrix, epsilon: f64) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .flatten()
                .zip(other.data.iter().flatten())
                .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    pub fn approx_eq(&self, other: &Matrix) -> bool {
        self.equal_values(other, DEFAULT_EPSILON)
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = Error;

    fn try_from(data: Vec<Vec<f64>>) -> Result<Matrix> {
        Matrix::from_data(data)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(matrix: Matrix) -> Self {
        matrix.data
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.data.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                match f.precision() {
                    Some(precision) => write!(f, "{value:.precision$}")?,
                    None => write!(f, "{value}")?,
                }
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

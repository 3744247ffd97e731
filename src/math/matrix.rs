use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{NnError, Result};
use crate::math::gaussian;

/// A rectangular grid of `f32` values with shape-checked arithmetic.
///
/// Shape-preserving operations (`add`, `hadamard`) and shape-changing ones
/// (`transform`, `reshape`, `transpose`) all mutate the receiver in place.
/// Operands are borrowed and never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f32>>,
}

/// Unchecked wire form; converted through `Matrix::try_from` so a document
/// whose grid disagrees with its declared shape is rejected.
#[derive(Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f32>>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = NnError;

    fn try_from(raw: RawMatrix) -> Result<Matrix> {
        if raw.data.len() != raw.rows || raw.data.iter().any(|row| row.len() != raw.cols) {
            return Err(NnError::shape(
                "deserialize",
                format!("grid does not match declared shape [{}, {}]", raw.rows, raw.cols),
            ));
        }
        Ok(Matrix { rows: raw.rows, cols: raw.cols, data: raw.data })
    }
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Wraps a caller-supplied grid. The shape is taken from the grid; every
    /// row must have the same length. An empty grid yields a `[0, 0]` matrix.
    pub fn from_data(data: Vec<Vec<f32>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        if let Some(bad) = data.iter().position(|row| row.len() != cols) {
            return Err(NnError::shape(
                "from_data",
                format!("row {bad} has {} columns, expected {cols}", data[bad].len()),
            ));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Builds a `[rows, cols]` matrix from a row-major element sequence.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<f32>) -> Result<Matrix> {
        if rows.checked_mul(cols) != Some(values.len()) {
            return Err(NnError::dimension(
                "from_vec",
                format!("{} values cannot fill a [{rows}, {cols}] matrix", values.len()),
            ));
        }
        Ok(Matrix::unflatten(rows, cols, &values))
    }

    /// A `[n, 1]` column vector.
    pub fn column(values: Vec<f32>) -> Matrix {
        let rows = values.len();
        Matrix {
            rows,
            cols: 1,
            data: values.into_iter().map(|v| vec![v]).collect(),
        }
    }

    /// Every cell drawn independently from N(mean, std_dev).
    pub fn gaussian<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        mean: f32,
        std_dev: f32,
        rng: &mut R,
    ) -> Matrix {
        let mut values = vec![0.0; rows * cols];
        gaussian::fill_normal(&mut values, mean, std_dev, rng);
        Matrix::unflatten(rows, cols, &values)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f32> {
        self.check_index(row, col)?;
        Ok(self.data[row][col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) -> Result<()> {
        self.check_index(row, col)?;
        self.data[row][col] = value;
        Ok(())
    }

    /// Single-index access, only defined for column vectors.
    pub fn get_at(&self, i: usize) -> Result<f32> {
        self.check_column_vector("get_at")?;
        self.get(i, 0)
    }

    /// Single-index assignment, only defined for column vectors.
    pub fn set_at(&mut self, i: usize, value: f32) -> Result<()> {
        self.check_column_vector("set_at")?;
        self.set(i, 0, value)
    }

    /// Row-major iterator over every cell.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().flat_map(|row| row.iter().copied())
    }

    /// Row-major copy of every cell.
    pub fn to_vec(&self) -> Vec<f32> {
        self.iter().collect()
    }

    pub fn sum(&self) -> f32 {
        self.iter().sum()
    }

    pub fn map_in_place<F>(&mut self, mut functor: F)
    where
        F: FnMut(f32) -> f32,
    {
        for row in &mut self.data {
            for x in row.iter_mut() {
                *x = functor(*x);
            }
        }
    }

    /// Elementwise sum, stored in `self`.
    pub fn add(&mut self, other: &Matrix) -> Result<()> {
        self.check_same_shape("add", other)?;
        self.zip_in_place(other, |a, b| a + b);
        Ok(())
    }

    /// Elementwise (Hadamard) product, stored in `self`.
    pub fn hadamard(&mut self, other: &Matrix) -> Result<()> {
        self.check_same_shape("hadamard", other)?;
        self.zip_in_place(other, |a, b| a * b);
        Ok(())
    }

    /// Inner product of the two matrices viewed as flat vectors.
    pub fn dot(&self, other: &Matrix) -> Result<f32> {
        self.check_same_shape("dot", other)?;
        Ok(self.iter().zip(other.iter()).map(|(a, b)| a * b).sum())
    }

    /// Replaces `self` with `other x self`.
    ///
    /// Requires `self.rows == other.cols`; the result is `[other.rows, self.cols]`.
    pub fn transform(&mut self, other: &Matrix) -> Result<()> {
        if self.rows != other.cols {
            return Err(NnError::dimension(
                "transform",
                format!(
                    "cannot multiply {:?} by {:?}: {} columns vs {} rows",
                    other.shape(),
                    self.shape(),
                    other.cols,
                    self.rows
                ),
            ));
        }

        let mut res = vec![vec![0.0; self.cols]; other.rows];
        for (i, out_row) in res.iter_mut().enumerate() {
            for (j, cell) in out_row.iter_mut().enumerate() {
                let mut sum = 0.0;
                for k in 0..other.cols {
                    sum += other.data[i][k] * self.data[k][j];
                }
                *cell = sum;
            }
        }

        self.rows = other.rows;
        self.data = res;
        Ok(())
    }

    /// Reinterprets the row-major element sequence as `[rows, cols]`.
    pub fn reshape(&mut self, rows: usize, cols: usize) -> Result<()> {
        if rows.checked_mul(cols) != Some(self.len()) {
            return Err(NnError::dimension(
                "reshape",
                format!("cannot reshape {:?} ({} cells) into [{rows}, {cols}]", self.shape(), self.len()),
            ));
        }
        let flat = self.to_vec();
        *self = Matrix::unflatten(rows, cols, &flat);
        Ok(())
    }

    pub fn transpose(&mut self) {
        let mut res = vec![vec![0.0; self.rows]; self.cols];

        for (i, row) in self.data.iter().enumerate() {
            for (j, &x) in row.iter().enumerate() {
                res[j][i] = x;
            }
        }

        std::mem::swap(&mut self.rows, &mut self.cols);
        self.data = res;
    }

    /// `values` must hold exactly `rows * cols` cells in row-major order;
    /// cell `(i, j)` is read from `values[i * cols + j]`.
    fn unflatten(rows: usize, cols: usize, values: &[f32]) -> Matrix {
        let data = (0..rows)
            .map(|i| values[i * cols..(i + 1) * cols].to_vec())
            .collect();
        Matrix { rows, cols, data }
    }

    fn zip_in_place<F>(&mut self, other: &Matrix, op: F)
    where
        F: Fn(f32, f32) -> f32,
    {
        for (row, other_row) in self.data.iter_mut().zip(other.data.iter()) {
            for (x, &y) in row.iter_mut().zip(other_row.iter()) {
                *x = op(*x, y);
            }
        }
    }

    fn check_same_shape(&self, op: &'static str, other: &Matrix) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(NnError::shape(
                op,
                format!("{:?} vs {:?}", self.shape(), other.shape()),
            ));
        }
        Ok(())
    }

    fn check_index(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(NnError::Index {
                index: vec![row, col],
                shape: vec![self.rows, self.cols],
            });
        }
        Ok(())
    }

    fn check_column_vector(&self, op: &'static str) -> Result<()> {
        if self.cols != 1 {
            return Err(NnError::shape(
                op,
                format!("single-index access needs a column vector, got {:?}", self.shape()),
            ));
        }
        Ok(())
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.data == other.data
    }
}

impl Hash for Matrix {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rows.hash(state);
        self.cols.hash(state);
        for x in self.iter() {
            // 0.0 == -0.0, so both must hash the same.
            let bits = if x == 0.0 { 0 } else { x.to_bits() };
            bits.hash(state);
        }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, row) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ",\n ")?;
            }
            write!(f, "[")?;
            for (j, x) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{x}")?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

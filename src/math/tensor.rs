use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// A batch of equally-shaped matrices, shape `[batch_size, rows, cols]`.
///
/// Every operation is delegated to the contained matrices one batch element
/// at a time. Shapes are validated for the whole batch before any element is
/// touched, so a failed call leaves the tensor unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTensor")]
pub struct Tensor {
    rows: usize,
    cols: usize,
    data: Vec<Matrix>,
}

#[derive(Deserialize)]
struct RawTensor {
    rows: usize,
    cols: usize,
    data: Vec<Matrix>,
}

impl TryFrom<RawTensor> for Tensor {
    type Error = NnError;

    fn try_from(raw: RawTensor) -> Result<Tensor> {
        if raw.data.iter().any(|m| m.shape() != [raw.rows, raw.cols]) {
            return Err(NnError::shape(
                "deserialize",
                format!("batch elements do not all have shape [{}, {}]", raw.rows, raw.cols),
            ));
        }
        Ok(Tensor { rows: raw.rows, cols: raw.cols, data: raw.data })
    }
}

impl Tensor {
    /// `batches` zero matrices of shape `[rows, cols]`.
    pub fn zeros(batches: usize, rows: usize, cols: usize) -> Tensor {
        Tensor {
            rows,
            cols,
            data: (0..batches).map(|_| Matrix::zeros(rows, cols)).collect(),
        }
    }

    /// Takes ownership of `matrices`, which must all share one shape.
    /// An empty vector yields a `[0, 0, 0]` tensor.
    pub fn from_matrices(matrices: Vec<Matrix>) -> Result<Tensor> {
        let [rows, cols] = matrices.first().map_or([0, 0], Matrix::shape);
        if let Some(bad) = matrices.iter().position(|m| m.shape() != [rows, cols]) {
            return Err(NnError::shape(
                "from_matrices",
                format!(
                    "batch element {bad} has shape {:?}, expected [{rows}, {cols}]",
                    matrices[bad].shape()
                ),
            ));
        }
        Ok(Tensor { rows, cols, data: matrices })
    }

    pub fn batch_size(&self) -> usize {
        self.data.len()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.data.len(), self.rows, self.cols]
    }

    pub fn matrices(&self) -> &[Matrix] {
        &self.data
    }

    pub fn into_matrices(self) -> Vec<Matrix> {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Matrix> {
        self.data.iter()
    }

    /// Replaces every cell of every batch element with `functor(cell)`,
    /// walking batch elements in order and each one row-major.
    pub fn map_in_place<F>(&mut self, mut functor: F)
    where
        F: FnMut(f32) -> f32,
    {
        for m in &mut self.data {
            m.map_in_place(&mut functor);
        }
    }

    /// Visits each batch element mutably. `visit` must leave the shape alone.
    pub(crate) fn for_each_matrix<F>(&mut self, visit: F)
    where
        F: FnMut(&mut Matrix),
    {
        self.data.iter_mut().for_each(visit);
    }

    /// The matrix at batch position `batch`.
    pub fn matrix(&self, batch: usize) -> Result<&Matrix> {
        self.check_batch(batch)?;
        Ok(&self.data[batch])
    }

    /// Replaces the matrix at batch position `batch`. The replacement must
    /// have the per-batch shape.
    pub fn set_matrix(&mut self, batch: usize, matrix: Matrix) -> Result<()> {
        self.check_batch(batch)?;
        self.check_element_shape("set_matrix", &matrix)?;
        self.data[batch] = matrix;
        Ok(())
    }

    /// `(row, col)` access, only defined for a batch of one.
    pub fn get(&self, row: usize, col: usize) -> Result<f32> {
        self.sole("get")?.get(row, col)
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) -> Result<()> {
        self.sole_mut("set")?.set(row, col, value)
    }

    /// Single-index access into the sole column vector of a batch of one.
    pub fn get_at(&self, i: usize) -> Result<f32> {
        self.sole("get_at")?.get_at(i)
    }

    pub fn set_at(&mut self, i: usize, value: f32) -> Result<()> {
        self.sole_mut("set_at")?.set_at(i, value)
    }

    pub fn get_in(&self, batch: usize, row: usize, col: usize) -> Result<f32> {
        self.matrix(batch)?.get(row, col)
    }

    pub fn set_in(&mut self, batch: usize, row: usize, col: usize, value: f32) -> Result<()> {
        self.check_batch(batch)?;
        self.data[batch].set(row, col, value)
    }

    pub fn add(&mut self, other: &Tensor) -> Result<()> {
        self.check_same_shape("add", other)?;
        for (m, o) in self.data.iter_mut().zip(other.data.iter()) {
            m.add(o)?;
        }
        Ok(())
    }

    /// Adds `other` to every batch element.
    pub fn add_matrix(&mut self, other: &Matrix) -> Result<()> {
        self.check_element_shape("add", other)?;
        for m in &mut self.data {
            m.add(other)?;
        }
        Ok(())
    }

    pub fn hadamard(&mut self, other: &Tensor) -> Result<()> {
        self.check_same_shape("hadamard", other)?;
        for (m, o) in self.data.iter_mut().zip(other.data.iter()) {
            m.hadamard(o)?;
        }
        Ok(())
    }

    /// Multiplies every batch element cellwise by `other`.
    pub fn hadamard_matrix(&mut self, other: &Matrix) -> Result<()> {
        self.check_element_shape("hadamard", other)?;
        for m in &mut self.data {
            m.hadamard(other)?;
        }
        Ok(())
    }

    /// One inner product per batch element.
    pub fn dot(&self, other: &Tensor) -> Result<Vec<f32>> {
        self.check_same_shape("dot", other)?;
        self.data.iter().zip(other.data.iter()).map(|(m, o)| m.dot(o)).collect()
    }

    pub fn dot_matrix(&self, other: &Matrix) -> Result<Vec<f32>> {
        self.check_element_shape("dot", other)?;
        self.data.iter().map(|m| m.dot(other)).collect()
    }

    /// Per-batch `other[b] x self[b]`. Both tensors need the same batch size.
    pub fn transform(&mut self, other: &Tensor) -> Result<()> {
        if self.batch_size() != other.batch_size() {
            return Err(NnError::shape(
                "transform",
                format!("batch sizes differ: {} vs {}", self.batch_size(), other.batch_size()),
            ));
        }
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
        for (m, o) in self.data.iter_mut().zip(other.data.iter()) {
            m.transform(o)?;
        }
        self.rows = other.rows;
        Ok(())
    }

    /// Applies the same `other x self[b]` to every batch element.
    pub fn transform_matrix(&mut self, other: &Matrix) -> Result<()> {
        if self.rows != other.cols() {
            return Err(NnError::dimension(
                "transform",
                format!(
                    "cannot multiply {:?} by per-batch {:?}: {} columns vs {} rows",
                    other.shape(),
                    [self.rows, self.cols],
                    other.cols(),
                    self.rows
                ),
            ));
        }
        for m in &mut self.data {
            m.transform(other)?;
        }
        self.rows = other.rows();
        Ok(())
    }

    /// Reshapes every batch element; the per-sample cell count must not change.
    pub fn reshape(&mut self, rows: usize, cols: usize) -> Result<()> {
        if rows.checked_mul(cols) != Some(self.rows * self.cols) {
            return Err(NnError::dimension(
                "reshape",
                format!(
                    "cannot reshape per-batch [{}, {}] into [{rows}, {cols}]",
                    self.rows, self.cols
                ),
            ));
        }
        for m in &mut self.data {
            m.reshape(rows, cols)?;
        }
        self.rows = rows;
        self.cols = cols;
        Ok(())
    }

    pub fn transpose(&mut self) {
        for m in &mut self.data {
            m.transpose();
        }
        std::mem::swap(&mut self.rows, &mut self.cols);
    }

    fn sole(&self, op: &'static str) -> Result<&Matrix> {
        match self.data.as_slice() {
            [only] => Ok(only),
            _ => Err(self.not_single(op)),
        }
    }

    fn sole_mut(&mut self, op: &'static str) -> Result<&mut Matrix> {
        if self.data.len() != 1 {
            return Err(self.not_single(op));
        }
        Ok(&mut self.data[0])
    }

    fn not_single(&self, op: &'static str) -> NnError {
        NnError::shape(
            op,
            format!("needs a batch of one, tensor has shape {:?}", self.shape()),
        )
    }

    fn check_batch(&self, batch: usize) -> Result<()> {
        if batch >= self.data.len() {
            return Err(NnError::Index {
                index: vec![batch],
                shape: self.shape().to_vec(),
            });
        }
        Ok(())
    }

    fn check_same_shape(&self, op: &'static str, other: &Tensor) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(NnError::shape(
                op,
                format!("{:?} vs {:?}", self.shape(), other.shape()),
            ));
        }
        Ok(())
    }

    fn check_element_shape(&self, op: &'static str, other: &Matrix) -> Result<()> {
        if other.shape() != [self.rows, self.cols] {
            return Err(NnError::shape(
                op,
                format!(
                    "matrix {:?} does not match per-batch shape [{}, {}]",
                    other.shape(),
                    self.rows,
                    self.cols
                ),
            ));
        }
        Ok(())
    }
}

impl From<Matrix> for Tensor {
    fn from(matrix: Matrix) -> Tensor {
        Tensor {
            rows: matrix.rows(),
            cols: matrix.cols(),
            data: vec![matrix],
        }
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.data == other.data
    }
}

impl Hash for Tensor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.shape().hash(state);
        for m in &self.data {
            m.hash(state);
        }
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, m) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ",\n\n")?;
            }
            write!(f, "{m}")?;
        }
        write!(f, "]")
    }
}

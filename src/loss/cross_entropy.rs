use crate::error::{NnError, Result};
use crate::math::{Matrix, Tensor};

/// Cross-entropy over raw scores against a one-hot target column.
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// Computes `ln(sum_{i != t} e^x_i) - x_t`, where `t` is the index at which
    /// the one-hot target `y` equals 1.
    ///
    /// `x` and `y` must be equally-shaped column vectors with at least two
    /// classes. A target with no cell equal to 1 is a `Value` error.
    pub fn matrix(x: &Matrix, y: &Matrix) -> Result<f32> {
        if x.shape() != y.shape() {
            return Err(NnError::shape(
                "cross_entropy_loss",
                format!("input {:?} vs target {:?}", x.shape(), y.shape()),
            ));
        }
        if x.cols() != 1 || x.rows() < 2 {
            return Err(NnError::shape(
                "cross_entropy_loss",
                format!("expected a column of at least two class scores, got {:?}", x.shape()),
            ));
        }

        let target = y.iter().position(|v| v == 1.0).ok_or_else(|| {
            NnError::value("target", format!("no class is marked 1 in {:?}", y.to_vec()))
        })?;

        let scores = x.to_vec();
        let others = scores.iter().enumerate().filter(|&(i, _)| i != target).map(|(_, &s)| s);
        // Shift by the largest competing score so exp() cannot overflow.
        let max = others.clone().fold(f32::NEG_INFINITY, f32::max);
        let log_sum = others.map(|s| (s - max).exp()).sum::<f32>().ln() + max;

        Ok(log_sum - scores[target])
    }

    /// One loss per batch element, each stored at its batch position.
    pub fn loss(x: &Tensor, y: &Tensor) -> Result<Vec<f32>> {
        if x.shape() != y.shape() {
            return Err(NnError::shape(
                "cross_entropy_loss",
                format!("input {:?} vs target {:?}", x.shape(), y.shape()),
            ));
        }
        let mut losses = Vec::with_capacity(x.batch_size());
        for (a, b) in x.iter().zip(y.iter()) {
            losses.push(CrossEntropyLoss::matrix(a, b)?);
        }
        Ok(losses)
    }
}

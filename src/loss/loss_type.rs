use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::loss::{CrossEntropyLoss, MseLoss};
use crate::math::Tensor;

/// Selects which loss an evaluation run reports.
///
/// - `Mse`          — mean-squared error per sample.
/// - `CrossEntropy` — cross-entropy against one-hot column targets; also
///   enables argmax accuracy in `evaluate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    Mse,
    CrossEntropy,
}

impl LossType {
    /// Per-sample losses of prediction `x` against target `y`.
    pub fn compute(&self, x: &Tensor, y: &Tensor) -> Result<Vec<f32>> {
        match self {
            LossType::Mse => MseLoss::loss(x, y),
            LossType::CrossEntropy => CrossEntropyLoss::loss(x, y),
        }
    }
}

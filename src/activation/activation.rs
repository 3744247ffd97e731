use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::layers::Module;
use crate::math::{Matrix, Tensor};

/// Stateless activation functions over matrices and tensors.
///
/// Applying to a `Tensor` applies the `Matrix` version to every batch
/// element independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Sigmoid,
    #[serde(rename = "relu")]
    ReLU,
    Tanh,
    /// Normalizes over every cell of a matrix (not per row), so each batch
    /// element of a tensor sums to 1 on its own.
    Softmax,
}

impl ActivationFunction {
    pub fn apply_matrix(&self, m: &mut Matrix) {
        match self {
            ActivationFunction::Sigmoid => m.map_in_place(|x| 1.0 / (1.0 + (-x).exp())),
            ActivationFunction::ReLU => m.map_in_place(|x| if x > 0.0 { x } else { 0.0 }),
            ActivationFunction::Tanh => m.map_in_place(f32::tanh),
            ActivationFunction::Softmax => softmax(m),
        }
    }

    pub fn apply(&self, mut x: Tensor) -> Tensor {
        x.for_each_matrix(|m| self.apply_matrix(m));
        x
    }
}

impl Module for ActivationFunction {
    fn forward(&mut self, x: Tensor) -> Result<Tensor> {
        Ok(self.apply(x))
    }
}

/// `e^x_ij / sum(e^x)` over the whole matrix. The maximum is subtracted first
/// so large logits do not overflow; the quotient is unchanged.
fn softmax(m: &mut Matrix) {
    if m.is_empty() {
        return;
    }
    let max = m.iter().fold(f32::NEG_INFINITY, f32::max);
    m.map_in_place(|x| (x - max).exp());
    let sum = m.sum();
    m.map_in_place(|x| x / sum);
}

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};
use crate::layers::{Layer, Module};
use crate::math::{Matrix, Tensor};

/// Applies `W x + b` to every sample of a batch.
///
/// Shapes: weight `[output_size, input_size]`, bias `[output_size, 1]`,
/// samples `[input_size, 1]` in and `[output_size, 1]` out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linear {
    input_size: usize,
    output_size: usize,
    weight: Matrix,
    bias: Matrix,
}

impl Linear {
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> Linear {
        let mut layer = Linear {
            input_size,
            output_size,
            weight: Matrix::zeros(output_size, input_size),
            bias: Matrix::zeros(output_size, 1),
        };
        layer.reset_parameters(rng);
        layer
    }

    /// Builds a layer around explicit parameters. Sizes are read from
    /// `weight`; `bias` must be `[weight.rows(), 1]`.
    pub fn from_parameters(weight: Matrix, bias: Matrix) -> Result<Linear> {
        if bias.shape() != [weight.rows(), 1] {
            return Err(NnError::shape(
                "linear",
                format!(
                    "bias {:?} does not match weight {:?}; expected [{}, 1]",
                    bias.shape(),
                    weight.shape(),
                    weight.rows()
                ),
            ));
        }
        Ok(Linear {
            input_size: weight.cols(),
            output_size: weight.rows(),
            weight,
            bias,
        })
    }

    /// Redraws the weight from N(0, 1/sqrt(input_size)) and zeroes the bias.
    pub fn reset_parameters<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let std_dev = 1.0 / (self.input_size as f32).sqrt();
        self.weight = Matrix::gaussian(self.output_size, self.input_size, 0.0, std_dev, rng);
        self.bias = Matrix::zeros(self.output_size, 1);
    }

    pub fn weight(&self) -> &Matrix {
        &self.weight
    }

    pub fn bias(&self) -> &Matrix {
        &self.bias
    }

    /// Checks the parameters agree with the declared sizes (used after
    /// deserialization).
    pub(crate) fn validate(&self) -> Result<()> {
        if self.weight.shape() != [self.output_size, self.input_size]
            || self.bias.shape() != [self.output_size, 1]
        {
            return Err(NnError::shape(
                "linear",
                format!(
                    "parameters {:?} / {:?} do not match sizes {} -> {}",
                    self.weight.shape(),
                    self.bias.shape(),
                    self.input_size,
                    self.output_size
                ),
            ));
        }
        Ok(())
    }
}

impl Module for Linear {
    fn forward(&mut self, mut x: Tensor) -> Result<Tensor> {
        if x.rows() != self.input_size || x.cols() != 1 {
            return Err(NnError::shape(
                "linear",
                format!(
                    "expected samples of shape [{}, 1], got {:?}",
                    self.input_size,
                    x.shape()
                ),
            ));
        }
        x.transform_matrix(&self.weight)?;
        x.add_matrix(&self.bias)?;
        Ok(x)
    }
}

impl Layer for Linear {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn output_size(&self) -> usize {
        self.output_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn forward_maps_four_to_three() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut layer = Linear::new(4, 3, &mut rng);
        let out = layer.forward(Tensor::zeros(1, 4, 1)).unwrap();
        assert_eq!(out.shape(), [1, 3, 1]);
    }

    #[test]
    fn forward_is_weight_times_input_plus_bias() {
        let weight = Matrix::from_data(vec![vec![1.0, 2.0], vec![-1.0, 0.5]]).unwrap();
        let bias = Matrix::column(vec![0.5, 1.0]);
        let mut layer = Linear::from_parameters(weight, bias).unwrap();

        let x = Tensor::from_matrices(vec![
            Matrix::column(vec![1.0, 1.0]),
            Matrix::column(vec![2.0, 4.0]),
        ])
        .unwrap();
        let y = layer.forward(x).unwrap();

        assert_eq!(y.matrix(0).unwrap().to_vec(), vec![3.5, 0.5]);
        assert_eq!(y.matrix(1).unwrap().to_vec(), vec![10.5, 1.0]);
        // Parameters are shared by the batch but never written by forward.
        assert_eq!(layer.bias().to_vec(), vec![0.5, 1.0]);
    }

    #[test]
    fn forward_rejects_wrong_sample_shape() {
        let mut layer = Linear::new(4, 3, &mut StdRng::seed_from_u64(0));
        let err = layer.forward(Tensor::zeros(2, 3, 1)).unwrap_err();
        assert!(matches!(err, NnError::Shape { op: "linear", .. }));
        let err = layer.forward(Tensor::zeros(2, 4, 2)).unwrap_err();
        assert!(matches!(err, NnError::Shape { op: "linear", .. }));
    }

    #[test]
    fn reset_draws_scaled_gaussian_and_zero_bias() {
        let mut rng = StdRng::seed_from_u64(21);
        let layer = Linear::new(400, 50, &mut rng);
        assert_eq!(layer.weight().shape(), [50, 400]);
        assert_eq!(layer.bias(), &Matrix::zeros(50, 1));

        let n = layer.weight().len() as f32;
        let mean = layer.weight().sum() / n;
        let var = layer.weight().iter().map(|w| (w - mean).powi(2)).sum::<f32>() / n;
        // std_dev = 1 / sqrt(400) = 0.05
        assert!(mean.abs() < 0.005, "mean = {mean}");
        assert!((var.sqrt() - 0.05).abs() < 0.005, "std = {}", var.sqrt());
    }

    #[test]
    fn reset_with_fresh_draws_changes_weight() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut layer = Linear::new(3, 2, &mut rng);
        let before = layer.weight().clone();
        layer.reset_parameters(&mut rng);
        assert_ne!(layer.weight(), &before);
    }

    #[test]
    fn from_parameters_checks_bias_shape() {
        let err = Linear::from_parameters(Matrix::zeros(3, 2), Matrix::zeros(2, 1)).unwrap_err();
        assert!(matches!(err, NnError::Shape { .. }));
        let ok = Linear::from_parameters(Matrix::zeros(3, 2), Matrix::zeros(3, 1)).unwrap();
        assert_eq!((ok.input_size(), ok.output_size()), (2, 3));
    }
}

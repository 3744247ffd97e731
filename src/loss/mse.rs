use crate::error::{NnError, Result};
use crate::math::{Matrix, Tensor};

pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((x - y)²) over every cell.
    pub fn matrix(x: &Matrix, y: &Matrix) -> Result<f32> {
        if x.shape() != y.shape() {
            return Err(NnError::shape(
                "mse_loss",
                format!("input {:?} vs target {:?}", x.shape(), y.shape()),
            ));
        }
        if x.is_empty() {
            return Err(NnError::shape("mse_loss", "mean over an empty matrix"));
        }
        let n = x.len() as f32;
        Ok(x.iter().zip(y.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>() / n)
    }

    /// One MSE per batch element.
    pub fn loss(x: &Tensor, y: &Tensor) -> Result<Vec<f32>> {
        if x.shape() != y.shape() {
            return Err(NnError::shape(
                "mse_loss",
                format!("input {:?} vs target {:?}", x.shape(), y.shape()),
            ));
        }
        x.iter().zip(y.iter())
            .map(|(a, b)| MseLoss::matrix(a, b))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_squared_differences() {
        let x = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let y = Matrix::from_data(vec![vec![1.0, 0.0], vec![4.0, 4.0]]).unwrap();
        // (0 + 4 + 1 + 0) / 4
        assert_eq!(MseLoss::matrix(&x, &y).unwrap(), 1.25);
        assert_eq!(MseLoss::matrix(&x, &x).unwrap(), 0.0);
    }

    #[test]
    fn per_batch_losses() {
        let x = Tensor::from_matrices(vec![Matrix::column(vec![1.0, 1.0]), Matrix::column(vec![0.0, 2.0])]).unwrap();
        let y = Tensor::from_matrices(vec![Matrix::column(vec![1.0, 1.0]), Matrix::column(vec![2.0, 2.0])]).unwrap();
        assert_eq!(MseLoss::loss(&x, &y).unwrap(), vec![0.0, 2.0]);
    }

    #[test]
    fn shape_mismatch_and_empty_input_fail() {
        let err = MseLoss::matrix(&Matrix::zeros(2, 1), &Matrix::zeros(1, 2)).unwrap_err();
        assert!(matches!(err, NnError::Shape { op: "mse_loss", .. }));
        assert!(MseLoss::matrix(&Matrix::zeros(0, 0), &Matrix::zeros(0, 0)).is_err());
        assert!(MseLoss::loss(&Tensor::zeros(2, 2, 1), &Tensor::zeros(3, 2, 1)).is_err());
    }
}

use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};
use crate::math::Tensor;

/// One mini-batch: input samples and their targets, paired by batch position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub input: Tensor,
    pub output: Tensor,
}

impl Batch {
    pub fn new(input: Tensor, output: Tensor) -> Result<Batch> {
        if input.batch_size() != output.batch_size() {
            return Err(NnError::shape(
                "batch",
                format!(
                    "{} inputs but {} targets",
                    input.batch_size(),
                    output.batch_size()
                ),
            ));
        }
        Ok(Batch { input, output })
    }

    /// Number of samples in this batch.
    pub fn batch_size(&self) -> usize {
        self.input.batch_size()
    }
}

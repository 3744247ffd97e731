use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layers::{Layer, Module};
use crate::math::Tensor;

/// Pass-through placeholder; input and output sizes are the same by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    size: usize,
}

impl Identity {
    pub fn new(size: usize) -> Identity {
        Identity { size }
    }
}

impl Module for Identity {
    fn forward(&mut self, x: Tensor) -> Result<Tensor> {
        Ok(x)
    }
}

impl Layer for Identity {
    fn input_size(&self) -> usize {
        self.size
    }

    fn output_size(&self) -> usize {
        self.size
    }
}

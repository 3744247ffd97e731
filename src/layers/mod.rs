pub mod dropout;
pub mod identity;
pub mod linear;

pub use dropout::Dropout;
pub use identity::Identity;
pub use linear::Linear;

use crate::error::Result;
use crate::math::Tensor;

/// Anything that can run a forward pass over a batch.
pub trait Module {
    fn forward(&mut self, x: Tensor) -> Result<Tensor>;
}

/// A module with fixed per-sample input and output sizes.
pub trait Layer: Module {
    fn input_size(&self) -> usize;
    fn output_size(&self) -> usize;
}

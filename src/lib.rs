pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod loss;
pub mod network;
pub mod data;
pub mod eval;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::matrix::Matrix;
pub use math::tensor::Tensor;
pub use activation::activation::ActivationFunction;
pub use layers::{Dropout, Identity, Layer, Linear, Module};
pub use loss::{CrossEntropyLoss, LossType, MseLoss};
pub use network::{LayerSpec, Network, NetworkSpec, Step};
pub use data::batch::Batch;
pub use eval::{evaluate, EvalStats};

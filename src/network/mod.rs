pub mod network;
pub mod spec;

pub use network::{Network, Step};
pub use spec::{NetworkSpec, LayerSpec};

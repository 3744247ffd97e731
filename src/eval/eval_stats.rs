use serde::{Serialize, Deserialize};

/// Summary of one forward-only pass over a set of batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalStats {
    /// Number of batches evaluated.
    pub batches: usize,
    /// Total samples across all batches.
    pub samples: usize,
    /// Mean per-sample loss over every sample.
    pub mean_loss: f32,
    /// Mean per-sample loss of each batch, in batch order.
    pub batch_losses: Vec<f32>,
    /// Fraction of samples whose predicted argmax matches the target's;
    /// only set for `CrossEntropy` runs.
    pub accuracy: Option<f32>,
    /// Wall-clock duration of the pass in milliseconds.
    pub elapsed_ms: u64,
}

use std::time::Instant;

use crate::data::batch::Batch;
use crate::error::Result;
use crate::eval::eval_stats::EvalStats;
use crate::loss::loss_type::LossType;
use crate::math::Matrix;
use crate::network::network::Network;

/// Runs `network` forward over every batch and reports its losses.
///
/// No parameters are touched beyond what `forward` itself does (dropout
/// masks are redrawn). Inputs are cloned, so `batches` stays intact.
///
/// # Errors
/// The first shape or loss error aborts the pass and is returned as-is.
pub fn evaluate(network: &mut Network, batches: &[Batch], loss_type: LossType) -> Result<EvalStats> {
    let t_start = Instant::now();

    let mut total_loss = 0.0;
    let mut samples = 0;
    let mut correct = 0;
    let mut batch_losses = Vec::with_capacity(batches.len());

    for (i, batch) in batches.iter().enumerate() {
        let prediction = network.forward(batch.input.clone())?;
        let losses = loss_type.compute(&prediction, &batch.output)?;

        let batch_total: f32 = losses.iter().sum();
        let batch_mean = if losses.is_empty() { 0.0 } else { batch_total / losses.len() as f32 };
        tracing::debug!("batch {} of {}: mean loss {batch_mean:.6}", i + 1, batches.len());

        total_loss += batch_total;
        samples += losses.len();
        batch_losses.push(batch_mean);

        if loss_type == LossType::CrossEntropy {
            correct += prediction.iter().zip(batch.output.iter())
                .filter(|(p, y)| argmax(p) == argmax(y))
                .count();
        }
    }

    let mean_loss = if samples == 0 { 0.0 } else { total_loss / samples as f32 };
    let accuracy = match loss_type {
        LossType::CrossEntropy if samples > 0 => Some(correct as f32 / samples as f32),
        LossType::CrossEntropy => Some(0.0),
        LossType::Mse => None,
    };
    let elapsed_ms = t_start.elapsed().as_millis() as u64;

    tracing::info!(
        "evaluated {samples} samples in {} batches: mean loss {mean_loss:.6}, accuracy {:?} ({elapsed_ms} ms)",
        batches.len(),
        accuracy,
    );

    Ok(EvalStats {
        batches: batches.len(),
        samples,
        mean_loss,
        batch_losses,
        accuracy,
        elapsed_ms,
    })
}

/// Row-major index of the largest cell.
fn argmax(m: &Matrix) -> usize {
    m.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

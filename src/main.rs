// Small demo binary: builds a seeded 4 -> 3 -> 3 classifier and runs a
// forward-only evaluation over synthetic one-hot batches.
//   RUST_LOG=debug cargo run
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use tensor_nn::{
    evaluate, ActivationFunction, Batch, LayerSpec, LossType, Matrix, NetworkSpec, Tensor,
};

const BATCH_SIZE: usize = 8;
const N_BATCHES: usize = 4;
const N_CLASSES: usize = 3;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let spec = NetworkSpec {
        name: "iris-like".into(),
        layers: vec![
            LayerSpec::Linear { input_size: 4, output_size: 3 },
            LayerSpec::Activation { function: ActivationFunction::ReLU },
            LayerSpec::Dropout { size: 3, p: 0.7 },
            LayerSpec::Linear { input_size: 3, output_size: N_CLASSES },
            LayerSpec::Activation { function: ActivationFunction::Softmax },
        ],
        loss: LossType::CrossEntropy,
        seed: Some(0),
    };
    let mut network = spec.build()?;

    let mut rng = StdRng::seed_from_u64(1);
    let batches = (0..N_BATCHES)
        .map(|_| synthetic_batch(&mut rng))
        .collect::<Result<Vec<_>, _>>()?;

    let stats = evaluate(&mut network, &batches, spec.loss)?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Random features with a one-hot label picked uniformly.
fn synthetic_batch(rng: &mut StdRng) -> tensor_nn::Result<Batch> {
    let mut inputs = Vec::with_capacity(BATCH_SIZE);
    let mut targets = Vec::with_capacity(BATCH_SIZE);
    for _ in 0..BATCH_SIZE {
        inputs.push(Matrix::gaussian(4, 1, 0.0, 1.0, rng));
        let mut target = vec![0.0; N_CLASSES];
        target[rng.gen_range(0..N_CLASSES)] = 1.0;
        targets.push(Matrix::column(target));
    }
    Batch::new(Tensor::from_matrices(inputs)?, Tensor::from_matrices(targets)?)
}

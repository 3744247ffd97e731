use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{into_io, Result};
use crate::layers::{Dropout, Identity, Linear};
use crate::loss::loss_type::LossType;
use crate::network::network::{Network, Step};

/// Describes one step in a network specification.
///
/// - `Linear`     — `input_size` → `output_size` affine layer
/// - `Dropout`    — keeps each cell with probability `p`
/// - `Identity`   — pass-through of `size` features
/// - `Activation` — elementwise (or whole-sample softmax) function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    Linear { input_size: usize, output_size: usize },
    Dropout { size: usize, p: f32 },
    Identity { size: usize },
    Activation { function: ActivationFunction },
}

/// A fully serializable description of a network architecture plus the loss
/// it is evaluated with.
///
/// `NetworkSpec` can be saved to / loaded from JSON independently of any
/// parameters, and turned into a freshly initialised `Network` with `build`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name used in logs.
    pub name: String,
    /// Ordered list of steps (input → output).
    pub layers: Vec<LayerSpec>,
    /// Loss reported by `evaluate`.
    pub loss: LossType,
    /// Seeds every random draw made by `build` (weights and dropout masks).
    /// Without it, initialisation is seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkSpec {
    /// Initialises a network from this spec. Linear weights are drawn from
    /// one generator; each dropout layer gets its own generator seeded from it.
    pub fn build(&self) -> Result<Network> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut steps = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let step = match *layer {
                LayerSpec::Linear { input_size, output_size } => {
                    Step::Linear(Linear::new(input_size, output_size, &mut rng))
                }
                LayerSpec::Dropout { size, p } => {
                    Step::Dropout(Dropout::with_rng(size, p, StdRng::seed_from_u64(rng.gen()))?)
                }
                LayerSpec::Identity { size } => Step::Identity(Identity::new(size)),
                LayerSpec::Activation { function } => Step::Activation { function },
            };
            steps.push(step);
        }

        let network = Network::new(steps)?;
        tracing::info!(
            "built network '{}': {} steps, {:?} -> {:?}",
            self.name,
            network.steps.len(),
            network.input_size(),
            network.output_size()
        );
        Ok(network)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `NetworkSpec` from a JSON file and checks it builds.
    pub fn load_json(path: &str) -> std::io::Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        spec.build().map_err(into_io)?;
        Ok(spec)
    }
}

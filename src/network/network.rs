use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{into_io, NnError, Result};
use crate::layers::{Dropout, Identity, Layer, Linear, Module};
use crate::math::Tensor;

/// One stage of a forward pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    Linear(Linear),
    Dropout(Dropout),
    Identity(Identity),
    Activation { function: ActivationFunction },
}

impl Step {
    /// `(input_size, output_size)` for layers; activations are size-transparent.
    pub fn sizes(&self) -> Option<(usize, usize)> {
        match self {
            Step::Linear(l) => Some((l.input_size(), l.output_size())),
            Step::Dropout(d) => Some((d.input_size(), d.output_size())),
            Step::Identity(i) => Some((i.input_size(), i.output_size())),
            Step::Activation { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::Linear(_) => "linear",
            Step::Dropout(_) => "dropout",
            Step::Identity(_) => "identity",
            Step::Activation { .. } => "activation",
        }
    }
}

impl Module for Step {
    fn forward(&mut self, x: Tensor) -> Result<Tensor> {
        match self {
            Step::Linear(l) => l.forward(x),
            Step::Dropout(d) => d.forward(x),
            Step::Identity(i) => i.forward(x),
            Step::Activation { function } => function.forward(x),
        }
    }
}

/// An ordered chain of layers and activations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub steps: Vec<Step>,
}

impl Network {
    /// Builds a network, checking that every sized step accepts what the
    /// previous sized step produces.
    pub fn new(steps: Vec<Step>) -> Result<Network> {
        let network = Network { steps };
        network.validate()?;
        Ok(network)
    }

    /// Forward pass; logs each step's output shape.
    pub fn forward(&mut self, x: Tensor) -> Result<Tensor> {
        let mut current = x;
        for (i, step) in self.steps.iter_mut().enumerate() {
            current = step.forward(current)?;
            tracing::debug!("step {i} ({}) -> {:?}", step.name(), current.shape());
        }
        Ok(current)
    }

    /// Input size of the first sized step.
    pub fn input_size(&self) -> Option<usize> {
        self.steps.iter().find_map(Step::sizes).map(|(input, _)| input)
    }

    /// Output size of the last sized step.
    pub fn output_size(&self) -> Option<usize> {
        self.steps.iter().rev().find_map(Step::sizes).map(|(_, output)| output)
    }

    pub fn validate(&self) -> Result<()> {
        let mut previous: Option<(usize, usize)> = None;
        for (i, step) in self.steps.iter().enumerate() {
            if let Step::Linear(l) = step {
                l.validate()?;
            }
            let Some((input, output)) = step.sizes() else {
                continue;
            };
            if let Some((at, prev_output)) = previous {
                if input != prev_output {
                    return Err(NnError::shape(
                        "network",
                        format!(
                            "step {i} ({}) expects {input} inputs but step {at} produces {prev_output}",
                            step.name()
                        ),
                    ));
                }
            }
            previous = Some((i, output));
        }
        Ok(())
    }

    /// Serializes the network parameters to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: &str) -> std::io::Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let network: Network = serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        network.validate().map_err(into_io)?;
        Ok(network)
    }
}

impl Module for Network {
    fn forward(&mut self, x: Tensor) -> Result<Tensor> {
        Network::forward(self, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Matrix;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn iris_like(seed: u64) -> Network {
        let mut rng = StdRng::seed_from_u64(seed);
        Network::new(vec![
            Step::Linear(Linear::new(4, 3, &mut rng)),
            Step::Activation { function: ActivationFunction::ReLU },
            Step::Dropout(Dropout::with_seed(3, 1.0, seed).unwrap()),
            Step::Linear(Linear::new(3, 3, &mut rng)),
            Step::Activation { function: ActivationFunction::Softmax },
        ])
        .unwrap()
    }

    #[test]
    fn forward_chains_every_step() {
        let mut net = iris_like(1);
        assert_eq!((net.input_size(), net.output_size()), (Some(4), Some(3)));

        let x = Tensor::from_matrices(vec![Matrix::column(vec![5.1, 3.5, 1.4, 0.2]); 8]).unwrap();
        let y = net.forward(x).unwrap();
        assert_eq!(y.shape(), [8, 3, 1]);
        for m in y.iter() {
            assert!((m.sum() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn rejects_unchained_sizes() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = Network::new(vec![
            Step::Linear(Linear::new(4, 3, &mut rng)),
            Step::Activation { function: ActivationFunction::Tanh },
            Step::Identity(Identity::new(5)),
        ])
        .unwrap_err();
        assert!(matches!(err, NnError::Shape { op: "network", .. }));
    }

    #[test]
    fn forward_error_propagates() {
        let mut net = iris_like(2);
        let err = net.forward(Tensor::zeros(2, 5, 1)).unwrap_err();
        assert!(matches!(err, NnError::Shape { op: "linear", .. }));
    }

    #[test]
    fn json_shape_is_tagged() {
        let net = Network::new(vec![
            Step::Identity(Identity::new(2)),
            Step::Activation { function: ActivationFunction::Sigmoid },
        ])
        .unwrap();
        let json = serde_json::to_string(&net).unwrap();
        assert_eq!(
            json,
            r#"{"steps":[{"type":"identity","size":2},{"type":"activation","function":"sigmoid"}]}"#
        );
    }
}

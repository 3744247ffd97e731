use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};
use crate::layers::{Layer, Module};
use crate::math::Tensor;

/// Zeroes each cell of the batch independently, keeping it with probability `p`.
///
/// Kept cells are not rescaled. The mask is redrawn on every call from the
/// layer's own generator; nothing else is carried between calls. The
/// generator is not persisted: a deserialized layer is reseeded from entropy.
/// A clone gets a generator forked from the original's, so the two draw
/// different masks while staying reproducible under a fixed seed.
#[derive(Debug, Serialize, Deserialize)]
#[serde(try_from = "RawDropout")]
pub struct Dropout {
    size: usize,
    p: f32,
    #[serde(skip_serializing)]
    rng: StdRng,
}

#[derive(Deserialize)]
struct RawDropout {
    size: usize,
    p: f32,
}

impl TryFrom<RawDropout> for Dropout {
    type Error = NnError;

    fn try_from(raw: RawDropout) -> Result<Dropout> {
        Dropout::new(raw.size, raw.p)
    }
}

impl Clone for Dropout {
    fn clone(&self) -> Dropout {
        let mut fork = self.rng.clone();
        Dropout {
            size: self.size,
            p: self.p,
            rng: StdRng::from_seed(fork.gen()),
        }
    }
}

impl Dropout {
    pub fn new(size: usize, p: f32) -> Result<Dropout> {
        Dropout::with_rng(size, p, StdRng::from_entropy())
    }

    pub fn with_seed(size: usize, p: f32, seed: u64) -> Result<Dropout> {
        Dropout::with_rng(size, p, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(size: usize, p: f32, rng: StdRng) -> Result<Dropout> {
        if !(0.0..=1.0).contains(&p) {
            return Err(NnError::value("p", format!("{p} is outside [0, 1]")));
        }
        if p == 0.0 {
            tracing::warn!("dropout with p = 0 zeroes every input");
        }
        Ok(Dropout { size, p, rng })
    }

    /// Probability of keeping a cell.
    pub fn p(&self) -> f32 {
        self.p
    }
}

impl Module for Dropout {
    fn forward(&mut self, mut x: Tensor) -> Result<Tensor> {
        let p = self.p;
        let rng = &mut self.rng;
        x.map_in_place(|v| if rng.gen::<f32>() < p { v } else { 0.0 });
        Ok(x)
    }
}

impl Layer for Dropout {
    fn input_size(&self) -> usize {
        self.size
    }

    fn output_size(&self) -> usize {
        self.size
    }
}

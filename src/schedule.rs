//! Seed rotation across minibatches and layers.
//!
//! A training loop samples one minibatch per step and one hop per GNN layer.
//! `SeedSchedule` hands out the [`KeySeed`] for each (batch, layer):
//!
//! - layers get distinct seeds (`seed + layer`) unless layer dependency is on,
//!   in which case every layer reuses the same keys;
//! - with a batch dependency of `d > 1`, keys blend from the current seed to the
//!   next one over `d` batches, then the pair rotates.

use crate::key::{KeySeed, Seeds};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Per-batch, per-layer seeds for labor sampling.
#[derive(Debug, Clone)]
pub struct SeedSchedule {
    rng: ChaCha8Rng,
    current: u64,
    next: u64,
    batch: u64,
    batch_dependency: u64,
    layer_dependency: bool,
}

impl SeedSchedule {
    /// Schedule with fresh seeds every batch and distinct seeds per layer.
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let current = rng.random();
        let next = rng.random();
        Self {
            rng,
            current,
            next,
            batch: 0,
            batch_dependency: 1,
            layer_dependency: false,
        }
    }

    /// Blend keys over `batches` consecutive batches (values below 1 mean 1).
    pub fn with_batch_dependency(mut self, batches: u64) -> Self {
        self.batch_dependency = batches.max(1);
        self
    }

    /// Use the same keys for every layer.
    pub fn with_layer_dependency(mut self, on: bool) -> Self {
        self.layer_dependency = on;
        self
    }

    /// Number of batches sampled so far.
    pub fn batch(&self) -> u64 {
        self.batch
    }

    /// Key seed for `layer` of the current batch.
    pub fn key_seed(&self, layer: usize) -> KeySeed {
        let offset = if self.layer_dependency { 0 } else { layer as u64 };
        KeySeed::blended(
            self.current.wrapping_add(offset),
            self.next.wrapping_add(offset),
            self.batch % self.batch_dependency,
            self.batch_dependency,
        )
    }

    /// Shared seeds for `layer` of the current batch.
    pub fn seeds(&self, layer: usize) -> Seeds<'static> {
        Seeds::Shared(self.key_seed(layer))
    }

    /// Move to the next batch, rotating seeds at the end of each period.
    pub fn advance(&mut self) {
        self.batch += 1;
        if self.batch % self.batch_dependency == 0 {
            self.current = self.next;
            self.next = self.rng.random();
            debug!(batch = self.batch, "rotated labor seeds");
        }
    }
}

//! `roka`: labor sampling for GNN minibatches.
//!
//! Labor (layer-neighbor) sampling picks a bounded number of incident edges per
//! seed row, like plain neighbor sampling, but draws each decision from a key
//! that depends only on a seed and the neighbor's global id. Seed rows sharing
//! a neighbor therefore agree on it, which keeps minibatches small and the
//! estimator variance low.
//!
//! Exposed modules:
//! - `graph`: borrowed CSR / COO adjacency views and the sampled edge list.
//! - `csr`, `coo`: the two sampling entry points.
//! - `key`: the pure `(seed, global id) -> [0, 1)` key hash, incl. batch blending.
//! - `probability`: uniform and capped proportional inclusion probabilities.
//! - `schedule`: per-batch, per-layer seed rotation.
//! - `visit`: the atomic visit counter.
//!
//! ```
//! use roka::{csr_labor_sample, Budget, CsrGraph, KeySeed, LaborSampler, Seeds};
//!
//! let indptr = [0i64, 3, 5];
//! let indices = [0i64, 1, 2, 0, 2];
//! let graph = CsrGraph::<i64, f32>::new(3, &indptr, &indices)?;
//! let sampler = LaborSampler::new(Budget::Fanout(2));
//! let sample = csr_labor_sample(&graph, &[0, 1], &Seeds::Shared(KeySeed::new(7)), &sampler)?;
//! assert!(sample.iter().all(|(_, c, _, w)| c < 3 && w == 1.0));
//! # Ok::<(), roka::LaborError>(())
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod coo;
pub mod csr;
mod engine;
pub mod error;
pub mod graph;
pub mod key;
pub mod numeric;
pub mod probability;
pub mod sampler;
pub mod schedule;
pub mod visit;

pub use config::{Budget, Importance, LaborConfig};
pub use coo::coo_labor_sample;
pub use csr::csr_labor_sample;
pub use error::{LaborError, Result};
pub use graph::{CooGraph, CsrGraph, LaborSample, NodeIds};
pub use key::{draw_row_seeds, KeySeed, Seeds};
pub use numeric::{Index, Weight};
pub use sampler::LaborSampler;
pub use schedule::SeedSchedule;
pub use visit::VisitCounter;

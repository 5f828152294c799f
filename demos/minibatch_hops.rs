//! Two-hop labor sampling over a few minibatches.
//!
//! Shows how a training loop drives the sampler: one call per hop, new seed
//! rows taken from the previous hop's columns, seeds rotated per batch.
//! Run with `RUST_LOG=roka=debug` to see per-call summaries.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roka::{Budget, CsrGraph, Importance, LaborSampler, SeedSchedule, VisitCounter};
use std::collections::BTreeSet;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Random graph: 2000 nodes, 30 neighbors each, power-law-ish weights.
    let num_nodes = 2_000usize;
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut indptr = vec![0i64];
    let mut indices = Vec::new();
    for _ in 0..num_nodes {
        for _ in 0..30 {
            indices.push(rng.random_range(0..num_nodes as i64));
        }
        indptr.push(indices.len() as i64);
    }
    let weights: Vec<f64> = (0..indices.len())
        .map(|_| 1.0 / (1.0 + rng.random_range(0.0f64..20.0)).powf(1.3))
        .collect();
    let graph = CsrGraph::new(num_nodes, &indptr, &indices)?.with_weights(&weights)?;

    let fanouts = [10usize, 5];
    let visits = VisitCounter::new(num_nodes);
    let mut schedule = SeedSchedule::new(7).with_batch_dependency(2);

    for batch in 0..3 {
        let mut frontier: Vec<i64> = (0..64).map(|i| (batch * 64 + i) as i64).collect();
        for (layer, &k) in fanouts.iter().enumerate() {
            let sampler = LaborSampler::new(Budget::Fanout(k))
                .with_importance(Importance::Weighted)
                .with_visits(&visits);
            let sample = sampler.sample_csr(&graph, &frontier, &schedule.seeds(layer))?;
            let next: BTreeSet<i64> = sample.cols.iter().copied().collect();
            println!(
                "batch {batch} layer {layer}: {} seeds -> {} edges, {} distinct neighbors",
                frontier.len(),
                sample.len(),
                next.len()
            );
            frontier = next.into_iter().collect();
        }
        schedule.advance();
    }

    let counts = visits.snapshot();
    let touched = counts.iter().filter(|&&c| c > 0).count();
    println!("nodes touched across all hops: {touched} of {num_nodes}");
    Ok(())
}

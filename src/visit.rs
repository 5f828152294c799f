//! Caller-owned visit counter.
//!
//! Counts how often each node is selected across calls (e.g. across the hops
//! of one minibatch). Sampling only ever increments it; rows sampled on
//! different threads may hit the same node, so entries are atomic.

use std::sync::atomic::{AtomicU64, Ordering};

/// One atomic counter per node, indexed by local column id.
#[derive(Debug, Default)]
pub struct VisitCounter {
    counts: Vec<AtomicU64>,
}

impl VisitCounter {
    /// A zeroed counter for `num_nodes` nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            counts: (0..num_nodes).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[inline]
    pub(crate) fn record(&self, node: usize) {
        self.counts[node].fetch_add(1, Ordering::Relaxed);
    }

    /// Current count for `node`.
    pub fn get(&self, node: usize) -> u64 {
        self.counts[node].load(Ordering::Relaxed)
    }

    /// Copy of all counts.
    pub fn snapshot(&self) -> Vec<u64> {
        self.counts.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }

    /// Consume the counter and return the counts.
    pub fn into_counts(self) -> Vec<u64> {
        self.counts.into_iter().map(AtomicU64::into_inner).collect()
    }
}

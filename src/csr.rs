//! Labor sampling over a CSR adjacency.

use crate::engine;
use crate::error::Result;
use crate::graph::{CsrGraph, LaborSample};
use crate::key::Seeds;
use crate::numeric::{Index, Weight};
use crate::sampler::LaborSampler;

/// Sample up to `budget` incident edges for each entry of `seed_rows`.
///
/// Row slices are read straight from the row pointer; nothing in the
/// adjacency is copied. The result lists selected edges grouped by seed row
/// (in `seed_rows` order), each row's edges in their original order.
///
/// # Errors
///
/// - [`LaborError::RowOutOfRange`](crate::LaborError::RowOutOfRange) if a seed
///   row is negative or `>= num_rows`.
/// - [`LaborError::ShapeMismatch`](crate::LaborError::ShapeMismatch) if the
///   per-row seeds, node-id mapping or visit counter do not line up.
/// - [`LaborError::UnsupportedConfiguration`](crate::LaborError::UnsupportedConfiguration)
///   if importance sampling is requested on an unweighted graph.
///
/// Nothing is written to the visit counter when an error is returned.
pub fn csr_labor_sample<I: Index, F: Weight>(
    graph: &CsrGraph<'_, I, F>,
    seed_rows: &[I],
    seeds: &Seeds<'_>,
    sampler: &LaborSampler<'_, I>,
) -> Result<LaborSample<I, F>> {
    engine::sample_rows(graph, seed_rows, seeds, sampler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Budget;
    use crate::error::LaborError;
    use crate::key::KeySeed;

    #[test]
    fn three_row_scenario() {
        // Row 0 -> {1, 2, 3}, unit weights, budget 2, plain mode.
        let indptr = [0i64, 3, 4, 5];
        let indices = [1i64, 2, 3, 0, 0];
        let weights = [1.0f64; 5];
        let g = CsrGraph::new(4, &indptr, &indices)
            .and_then(|g| g.with_weights(&weights))
            .expect("valid graph");
        let sampler = LaborSampler::new(Budget::Fanout(2));
        let run = |seed: u64| {
            csr_labor_sample(&g, &[0], &Seeds::Shared(KeySeed::new(seed)), &sampler)
                .expect("sample")
        };

        // Each neighbor is kept with p = 2/3; pick a seed that keeps exactly two.
        let seed = (0..64u64)
            .find(|&s| run(s).len() == 2)
            .expect("some seed keeps two of three");
        let s = run(seed);
        assert_eq!(s.rows, vec![0, 0]);
        assert!(s.cols.iter().all(|c| [1, 2, 3].contains(c)));
        assert_ne!(s.cols[0], s.cols[1]);
        assert!(s.cols[0] < s.cols[1], "input order is kept");
        assert_eq!(s.importances, vec![1.0, 1.0]);
        assert_eq!(s.edge_weights, Some(vec![1.0, 1.0]));
        assert_eq!(run(seed), s);
    }

    #[test]
    fn every_seed_keeps_a_subset_in_order() {
        let indptr = [0i32, 6];
        let indices = [5i32, 3, 1, 4, 0, 2];
        let g = CsrGraph::<i32, f32>::new(6, &indptr, &indices).expect("valid graph");
        let sampler = LaborSampler::new(Budget::Fanout(3));
        for seed in 0..32 {
            let s = csr_labor_sample(&g, &[0], &Seeds::Shared(KeySeed::new(seed)), &sampler)
                .expect("sample");
            let positions: Vec<i32> = s.edge_ids.clone();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
            for (c, e) in s.cols.iter().zip(&s.edge_ids) {
                assert_eq!(*c, indices[*e as usize]);
            }
        }
    }

    #[test]
    fn explicit_edge_ids_are_reported() {
        let indptr = [0i64, 2];
        let indices = [0i64, 1];
        let ids = [40i64, 41];
        let g = CsrGraph::<i64, f64>::new(2, &indptr, &indices)
            .and_then(|g| g.with_edge_ids(&ids))
            .expect("valid graph");
        let s = csr_labor_sample(&g, &[0], &Seeds::Shared(KeySeed::new(0)), &LaborSampler::new(Budget::All))
            .expect("sample");
        assert_eq!(s.edge_ids, vec![40, 41]);
        assert!(g.with_edge_ids(&ids[..1]).is_err());
    }

    #[test]
    fn negative_weight_fails_before_sampling() {
        let indptr = [0i64, 2];
        let indices = [0i64, 1];
        let err = CsrGraph::<i64, f64>::new(2, &indptr, &indices)
            .and_then(|g| g.with_weights(&[1.0, -2.0]))
            .expect_err("negative weight");
        assert_eq!(err, LaborError::NumericDomain { edge: 1, value: -2.0 });
    }

    #[test]
    fn duplicate_seed_rows_are_sampled_each_time() {
        let indptr = [0i64, 5];
        let indices = [0i64, 1, 2, 3, 4];
        let g = CsrGraph::<i64, f64>::new(5, &indptr, &indices).expect("valid graph");
        let s = csr_labor_sample(
            &g,
            &[0, 0],
            &Seeds::Shared(KeySeed::new(8)),
            &LaborSampler::new(Budget::Fanout(2)),
        )
        .expect("sample");
        let half = s.len() / 2;
        assert_eq!(s.len() % 2, 0);
        assert_eq!(s.cols[..half], s.cols[half..]);
    }
}

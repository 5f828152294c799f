//! Labor sampling over a COO adjacency.

use crate::engine;
use crate::error::Result;
use crate::graph::{CooGraph, LaborSample};
use crate::key::Seeds;
use crate::numeric::{Index, Weight};
use crate::sampler::LaborSampler;
use tracing::trace;

/// Same contract as [`crate::csr_labor_sample`] for a coordinate list.
///
/// Edges are first grouped by row with a stable counting sort (O(nnz + rows)),
/// so a row's edges keep their input order and the result equals the CSR
/// result for the same adjacency. Edge ids default to positions in the COO
/// arrays.
///
/// # Errors
///
/// As for [`crate::csr_labor_sample`].
pub fn coo_labor_sample<I: Index, F: Weight>(
    graph: &CooGraph<'_, I, F>,
    seed_rows: &[I],
    seeds: &Seeds<'_>,
    sampler: &LaborSampler<'_, I>,
) -> Result<LaborSample<I, F>> {
    let grouped = graph.group_by_row();
    trace!(
        num_rows = graph.num_rows(),
        num_edges = graph.num_edges(),
        "grouped coo by row"
    );
    engine::sample_rows(&grouped.as_csr(), seed_rows, seeds, sampler)
}

//! The sampler handle shared by both façades.

use crate::config::{Budget, Importance, LaborConfig};
use crate::error::Result;
use crate::graph::{CooGraph, CsrGraph, LaborSample, NodeIds};
use crate::key::Seeds;
use crate::numeric::{Index, Weight};
use crate::visit::VisitCounter;

/// Labor neighbor sampler.
///
/// Holds everything about a call except the graph, the seed rows and their
/// seeds: budget, importance mode, the global-id mapping used for keys and an
/// optional visit counter.
#[derive(Debug, Clone, Copy)]
pub struct LaborSampler<'a, I> {
    config: LaborConfig,
    node_ids: NodeIds<'a, I>,
    visits: Option<&'a VisitCounter>,
}

impl<'a, I: Index> LaborSampler<'a, I> {
    /// Plain sampler with the given budget, identity node ids and no counter.
    pub fn new(budget: Budget) -> Self {
        Self::from_config(LaborConfig::new(budget))
    }

    pub fn from_config(config: LaborConfig) -> Self {
        Self {
            config,
            node_ids: NodeIds::Identity,
            visits: None,
        }
    }

    /// Set the importance mode.
    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.config.importance = importance;
        self
    }

    /// Map local column ids to global ids before hashing.
    pub fn with_node_ids(mut self, node_ids: &'a [I]) -> Self {
        self.node_ids = NodeIds::Mapped(node_ids);
        self
    }

    /// Count selections per node into `visits`.
    pub fn with_visits(mut self, visits: &'a VisitCounter) -> Self {
        self.visits = Some(visits);
        self
    }

    pub fn config(&self) -> &LaborConfig {
        &self.config
    }

    pub fn node_ids(&self) -> NodeIds<'a, I> {
        self.node_ids
    }

    pub fn visits(&self) -> Option<&'a VisitCounter> {
        self.visits
    }

    /// Sample from a CSR graph. See [`crate::csr_labor_sample`].
    pub fn sample_csr<F: Weight>(
        &self,
        graph: &CsrGraph<'_, I, F>,
        seed_rows: &[I],
        seeds: &Seeds<'_>,
    ) -> Result<LaborSample<I, F>> {
        crate::csr::csr_labor_sample(graph, seed_rows, seeds, self)
    }

    /// Sample from a COO graph. See [`crate::coo_labor_sample`].
    pub fn sample_coo<F: Weight>(
        &self,
        graph: &CooGraph<'_, I, F>,
        seed_rows: &[I],
        seeds: &Seeds<'_>,
    ) -> Result<LaborSample<I, F>> {
        crate::coo::coo_labor_sample(graph, seed_rows, seeds, self)
    }
}

//! Labor selection engine.
//!
//! For every seed row the engine decides, edge by edge, whether to keep the
//! edge by comparing the neighbor's key against the edge's inclusion
//! probability:
//!
//! \[
//! \text{keep}(s, t) \iff u_{seed(s)}(gid(t)) < p_{st}
//! \]
//!
//! Rows that share a seed see the same key for a shared neighbor, so the
//! union of neighbors pulled into a minibatch shrinks compared to independent
//! coin flips, while each row on its own is still a Poisson sample with the
//! requested inclusion probabilities.
//!
//! ## Output layout
//!
//! Rows are handled independently in three passes: plan (probabilities per
//! row), count (selected edges per row), fill. Counts are turned into offsets
//! before anything is written, so each row writes its own disjoint slice of
//! the preallocated output. With the `parallel` feature the passes run on
//! rayon's pool; results are identical either way.
//!
//! ## Iterative importance
//!
//! With [`Importance::Iterative`], a per-node factor \(\phi_t\) (initially 1)
//! scales each edge weight. Each round solves every row's scale \(c_s\) over
//! \(w_e \phi_t\), then sets \(\phi_t \leftarrow \max_{s \ni t} c_s \phi_t\).
//! Rows then lean towards neighbors that other rows want anyway.
//!
//! ## References
//!
//! - Balin & Çatalyürek (2023): *Layer-Neighbor Sampling: Defusing Neighborhood
//!   Explosion in GNNs*.

use crate::config::{Budget, Importance};
use crate::error::{LaborError, Result};
use crate::graph::{CsrGraph, LaborSample, NodeIds};
use crate::key::Seeds;
use crate::numeric::{Index, Weight};
use crate::probability::{self, Inclusion};
use crate::sampler::LaborSampler;
use crate::visit::VisitCounter;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

/// Iterative importance stops early once every row scale is this close to 1.
const CONVERGENCE_TOLERANCE: f64 = 1e-4;

#[cfg(feature = "parallel")]
fn map_rows<T, G>(n: usize, g: G) -> Vec<T>
where
    T: Send,
    G: Fn(usize) -> T + Sync + Send,
{
    (0..n).into_par_iter().map(g).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_rows<T, G>(n: usize, g: G) -> Vec<T>
where
    G: Fn(usize) -> T,
{
    (0..n).map(g).collect()
}

/// One row's disjoint window into the output buffers.
struct RowChunk<'o, I, F> {
    rows: &'o mut [I],
    cols: &'o mut [I],
    edge_ids: &'o mut [I],
    weights: Option<&'o mut [F]>,
    importances: &'o mut [F],
}

impl<'o, I, F> RowChunk<'o, I, F> {
    /// Split off the first `n` entries of every buffer.
    fn take_front(&mut self, n: usize) -> Self {
        fn front<'o, T>(s: &mut &'o mut [T], n: usize) -> &'o mut [T] {
            let (head, tail) = std::mem::take(s).split_at_mut(n);
            *s = tail;
            head
        }
        Self {
            rows: front(&mut self.rows, n),
            cols: front(&mut self.cols, n),
            edge_ids: front(&mut self.edge_ids, n),
            weights: self.weights.as_mut().map(|w| front(w, n)),
            importances: front(&mut self.importances, n),
        }
    }
}

struct Engine<'a, I, F> {
    graph: &'a CsrGraph<'a, I, F>,
    seeds: Seeds<'a>,
    node_ids: NodeIds<'a, I>,
    visits: Option<&'a VisitCounter>,
    budget: Budget,
    importance: Importance,
    factors: Option<Vec<F>>,
}

impl<I: Index, F: Weight> Engine<'_, I, F> {
    #[inline]
    fn col_pos(&self, edge: usize) -> usize {
        // Column ids are validated when the graph view is built.
        self.graph.indices()[edge].position().unwrap_or(0)
    }

    /// Size used for proportional probabilities: `w` or `w · φ`.
    #[inline]
    fn size(&self, edge: usize) -> F {
        match (self.importance, self.graph.weights()) {
            (Importance::Plain, _) | (_, None) => F::one(),
            (_, Some(w)) => match &self.factors {
                Some(phi) => w[edge] * phi[self.col_pos(edge)],
                None => w[edge],
            },
        }
    }

    /// Output weight of a selected edge.
    #[inline]
    fn importance_weight(&self, edge: usize, p: F) -> F {
        match (self.importance, self.graph.weights()) {
            (Importance::Plain, _) | (_, None) => F::one(),
            (_, Some(w)) => w[edge] / p,
        }
    }

    fn plan(&self, row: usize) -> Inclusion<F> {
        let range = self.graph.row_range(row);
        let m = range.len();
        if self.budget.keeps_all(m) {
            return Inclusion::All;
        }
        let Budget::Fanout(k) = self.budget else {
            return Inclusion::All;
        };
        match (self.importance, self.graph.weights()) {
            (Importance::Plain, _) | (_, None) => probability::uniform(m, k),
            (_, Some(w)) => match self.factors {
                Some(_) => {
                    let sizes: Vec<F> = range.map(|j| self.size(j)).collect();
                    probability::proportional(&sizes, k)
                }
                None => probability::proportional(&w[range], k),
            },
        }
    }

    /// Call `f(edge, p)` for each selected edge of the seed row at `pos`.
    #[inline]
    fn for_each_selected(
        &self,
        pos: usize,
        row: usize,
        plan: Inclusion<F>,
        mut f: impl FnMut(usize, F),
    ) {
        let range = self.graph.row_range(row);
        if matches!(plan, Inclusion::All) {
            for j in range {
                f(j, F::one());
            }
            return;
        }
        let seed = self.seeds.for_row(pos);
        let indices = self.graph.indices();
        for j in range {
            let p = plan.probability(self.size(j));
            if p <= F::zero() {
                continue;
            }
            let keep = p >= F::one()
                || F::from_f64_lossy(seed.key(self.node_ids.global(indices[j]))) < p;
            if keep {
                f(j, p);
            }
        }
    }

    fn count(&self, pos: usize, row: usize, plan: Inclusion<F>) -> usize {
        let mut n = 0usize;
        self.for_each_selected(pos, row, plan, |_, _| n += 1);
        n
    }

    fn fill(&self, pos: usize, row: usize, plan: Inclusion<F>, chunk: RowChunk<'_, I, F>) {
        let RowChunk {
            rows,
            cols,
            edge_ids,
            mut weights,
            importances,
        } = chunk;
        let row_id = I::from_position(row);
        let indices = self.graph.indices();
        let mut at = 0usize;
        self.for_each_selected(pos, row, plan, |j, p| {
            rows[at] = row_id;
            cols[at] = indices[j];
            edge_ids[at] = self.graph.edge_id(j);
            if let (Some(out), Some(w)) = (weights.as_deref_mut(), self.graph.weights()) {
                out[at] = w[j];
            }
            importances[at] = self.importance_weight(j, p);
            if let Some(v) = self.visits {
                v.record(self.col_pos(j));
            }
            at += 1;
        });
    }

    /// Refine the per-node factors for [`Importance::Iterative`].
    fn refine_factors(&mut self, rows: &[usize], rounds: u32) {
        let all_whole = rows
            .iter()
            .all(|&row| self.budget.keeps_all(self.graph.row_range(row).len()));
        if all_whole || self.graph.weights().is_none() {
            return;
        }
        let num_cols = self.graph.num_cols();
        let mut phi = vec![F::one(); num_cols];
        for round in 0..rounds {
            self.factors = Some(phi.clone());
            let scales: Vec<F> = map_rows(rows.len(), |pos| self.plan(rows[pos]).scale());

            let mut next = vec![F::zero(); num_cols];
            let mut deviation = 0.0f64;
            for (&row, &c) in rows.iter().zip(&scales) {
                if !c.is_finite() {
                    continue;
                }
                deviation = deviation.max((c.widen() - 1.0).abs());
                for j in self.graph.row_range(row) {
                    let t = self.col_pos(j);
                    let candidate = c * phi[t];
                    if candidate > next[t] {
                        next[t] = candidate;
                    }
                }
            }
            for (f, n) in phi.iter_mut().zip(next) {
                if n > F::zero() {
                    *f = n;
                }
            }
            trace!(round, deviation, "refined importance factors");
            if deviation < CONVERGENCE_TOLERANCE {
                break;
            }
        }
        self.factors = Some(phi);
    }
}

/// Validate a call and run the three passes.
pub(crate) fn sample_rows<I: Index, F: Weight>(
    graph: &CsrGraph<'_, I, F>,
    seed_rows: &[I],
    seeds: &Seeds<'_>,
    sampler: &LaborSampler<'_, I>,
) -> Result<LaborSample<I, F>> {
    let config = *sampler.config();
    seeds.check_len(seed_rows.len())?;
    sampler.node_ids().check_len(graph.num_cols())?;
    if let Some(v) = sampler.visits() {
        if v.len() < graph.num_cols() {
            return Err(LaborError::ShapeMismatch {
                what: "visit counter",
                expected: graph.num_cols(),
                actual: v.len(),
            });
        }
    }
    if config.importance.is_weighted() && graph.weights().is_none() {
        return Err(LaborError::UnsupportedConfiguration(
            "importance sampling requires edge weights",
        ));
    }
    let rows = seed_rows
        .iter()
        .map(|&r| graph.check_row(r))
        .collect::<Result<Vec<usize>>>()?;

    let mut engine = Engine {
        graph,
        seeds: *seeds,
        node_ids: sampler.node_ids(),
        visits: sampler.visits(),
        budget: config.budget,
        importance: config.importance,
        factors: None,
    };
    if let Importance::Iterative { rounds } = config.importance {
        engine.refine_factors(&rows, rounds);
    }

    let plans: Vec<Inclusion<F>> = map_rows(rows.len(), |pos| engine.plan(rows[pos]));
    let counts: Vec<usize> = map_rows(rows.len(), |pos| engine.count(pos, rows[pos], plans[pos]));
    let total: usize = counts.iter().sum();

    let mut out_rows = vec![I::zero(); total];
    let mut out_cols = vec![I::zero(); total];
    let mut out_edge_ids = vec![I::zero(); total];
    let mut out_weights = graph.weights().map(|_| vec![F::zero(); total]);
    let mut out_importances = vec![F::zero(); total];
    {
        let mut rest = RowChunk {
            rows: &mut out_rows,
            cols: &mut out_cols,
            edge_ids: &mut out_edge_ids,
            weights: out_weights.as_deref_mut(),
            importances: &mut out_importances,
        };
        let chunks: Vec<RowChunk<'_, I, F>> = counts.iter().map(|&n| rest.take_front(n)).collect();

        #[cfg(feature = "parallel")]
        chunks
            .into_par_iter()
            .enumerate()
            .for_each(|(pos, chunk)| engine.fill(pos, rows[pos], plans[pos], chunk));
        #[cfg(not(feature = "parallel"))]
        chunks
            .into_iter()
            .enumerate()
            .for_each(|(pos, chunk)| engine.fill(pos, rows[pos], plans[pos], chunk));
    }

    debug!(
        seed_rows = rows.len(),
        selected = total,
        budget = ?config.budget,
        importance = ?config.importance,
        "labor sample"
    );

    Ok(LaborSample {
        num_rows: graph.num_rows(),
        num_cols: graph.num_cols(),
        rows: out_rows,
        cols: out_cols,
        edge_ids: out_edge_ids,
        edge_weights: out_weights,
        importances: out_importances,
    })
}

//! Borrowed adjacency views and the sampled edge list.
//!
//! Both views validate their shape once on construction (row pointer, index
//! bounds, weight length and domain), so the engine can slice rows without
//! re-checking.

use crate::error::{LaborError, Result};
use crate::numeric::{Index, Weight};
use std::ops::Range;

/// Counts that are written back out as `I` must fit its positive range.
fn check_fits<I: Index>(what: &'static str, n: usize) -> Result<()> {
    if n > I::max_position() {
        return Err(LaborError::ShapeMismatch {
            what,
            expected: I::max_position(),
            actual: n,
        });
    }
    Ok(())
}

fn check_columns<I: Index>(cols: &[I], num_cols: usize) -> Result<()> {
    for (edge, &c) in cols.iter().enumerate() {
        match c.position() {
            Some(p) if p < num_cols => {}
            _ => {
                return Err(LaborError::ColumnOutOfRange {
                    col: c.widen(),
                    edge,
                    num_cols,
                })
            }
        }
    }
    Ok(())
}

fn check_weights<F: Weight>(weights: &[F], nnz: usize) -> Result<()> {
    if weights.len() != nnz {
        return Err(LaborError::ShapeMismatch {
            what: "edge weights",
            expected: nnz,
            actual: weights.len(),
        });
    }
    if let Some((edge, w)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_valid_weight())
    {
        return Err(LaborError::NumericDomain {
            edge,
            value: w.widen(),
        });
    }
    Ok(())
}

fn check_edge_ids<I>(ids: &[I], nnz: usize) -> Result<()> {
    if ids.len() != nnz {
        return Err(LaborError::ShapeMismatch {
            what: "edge ids",
            expected: nnz,
            actual: ids.len(),
        });
    }
    Ok(())
}

/// Compressed-sparse-row adjacency, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct CsrGraph<'a, I, F> {
    num_cols: usize,
    indptr: &'a [I],
    indices: &'a [I],
    edge_ids: Option<&'a [I]>,
    weights: Option<&'a [F]>,
}

impl<'a, I: Index, F: Weight> CsrGraph<'a, I, F> {
    /// Wrap a row pointer of length `num_rows + 1` and its column indices.
    pub fn new(num_cols: usize, indptr: &'a [I], indices: &'a [I]) -> Result<Self> {
        let Some(&first) = indptr.first() else {
            return Err(LaborError::MalformedRowPointer {
                position: 0,
                reason: "row pointer is empty",
            });
        };
        if first != I::zero() {
            return Err(LaborError::MalformedRowPointer {
                position: 0,
                reason: "row pointer must start at 0",
            });
        }
        for (i, w) in indptr.windows(2).enumerate() {
            if w[1] < w[0] {
                return Err(LaborError::MalformedRowPointer {
                    position: i + 1,
                    reason: "row pointer must be non-decreasing",
                });
            }
        }
        let last = indptr[indptr.len() - 1];
        if last.position() != Some(indices.len()) {
            return Err(LaborError::MalformedRowPointer {
                position: indptr.len() - 1,
                reason: "row pointer must end at the number of edges",
            });
        }
        check_fits::<I>("row count for index width", indptr.len() - 1)?;
        check_fits::<I>("edge count for index width", indices.len())?;
        check_columns(indices, num_cols)?;
        Ok(Self::from_parts(num_cols, indptr, indices))
    }

    pub(crate) fn from_parts(num_cols: usize, indptr: &'a [I], indices: &'a [I]) -> Self {
        Self {
            num_cols,
            indptr,
            indices,
            edge_ids: None,
            weights: None,
        }
    }

    /// Attach per-edge weights, aligned with the column indices.
    pub fn with_weights(mut self, weights: &'a [F]) -> Result<Self> {
        check_weights(weights, self.indices.len())?;
        self.weights = Some(weights);
        Ok(self)
    }

    /// Attach explicit edge ids. Without them an edge's id is its position.
    pub fn with_edge_ids(mut self, edge_ids: &'a [I]) -> Result<Self> {
        check_edge_ids(edge_ids, self.indices.len())?;
        self.edge_ids = Some(edge_ids);
        Ok(self)
    }

    pub fn num_rows(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn num_edges(&self) -> usize {
        self.indices.len()
    }

    pub fn indices(&self) -> &'a [I] {
        self.indices
    }

    pub fn weights(&self) -> Option<&'a [F]> {
        self.weights
    }

    /// Edge positions of row `r`. `r` must be in range.
    #[inline]
    pub(crate) fn row_range(&self, r: usize) -> Range<usize> {
        // Validated on construction: non-negative and non-decreasing.
        let start = self.indptr[r].position().unwrap_or(0);
        let end = self.indptr[r + 1].position().unwrap_or(start);
        start..end
    }

    #[inline]
    pub(crate) fn edge_id(&self, pos: usize) -> I {
        match self.edge_ids {
            Some(ids) => ids[pos],
            None => I::from_position(pos),
        }
    }

    /// Resolve a seed row id to a row index.
    pub(crate) fn check_row(&self, row: I) -> Result<usize> {
        match row.position() {
            Some(r) if r < self.num_rows() => Ok(r),
            _ => Err(LaborError::RowOutOfRange {
                row: row.widen(),
                num_rows: self.num_rows(),
            }),
        }
    }
}

/// Coordinate-list adjacency in arbitrary order, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct CooGraph<'a, I, F> {
    num_rows: usize,
    num_cols: usize,
    row: &'a [I],
    col: &'a [I],
    edge_ids: Option<&'a [I]>,
    weights: Option<&'a [F]>,
}

impl<'a, I: Index, F: Weight> CooGraph<'a, I, F> {
    /// Wrap parallel row and column index arrays.
    pub fn new(num_rows: usize, num_cols: usize, row: &'a [I], col: &'a [I]) -> Result<Self> {
        if row.len() != col.len() {
            return Err(LaborError::ShapeMismatch {
                what: "coo column indices",
                expected: row.len(),
                actual: col.len(),
            });
        }
        check_fits::<I>("row count for index width", num_rows)?;
        check_fits::<I>("edge count for index width", row.len())?;
        for &r in row {
            match r.position() {
                Some(p) if p < num_rows => {}
                _ => {
                    return Err(LaborError::RowOutOfRange {
                        row: r.widen(),
                        num_rows,
                    })
                }
            }
        }
        check_columns(col, num_cols)?;
        Ok(Self {
            num_rows,
            num_cols,
            row,
            col,
            edge_ids: None,
            weights: None,
        })
    }

    /// Attach per-edge weights, aligned with the index arrays.
    pub fn with_weights(mut self, weights: &'a [F]) -> Result<Self> {
        check_weights(weights, self.row.len())?;
        self.weights = Some(weights);
        Ok(self)
    }

    /// Attach explicit edge ids. Without them an edge's id is its position.
    pub fn with_edge_ids(mut self, edge_ids: &'a [I]) -> Result<Self> {
        check_edge_ids(edge_ids, self.row.len())?;
        self.edge_ids = Some(edge_ids);
        Ok(self)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn num_edges(&self) -> usize {
        self.row.len()
    }

    pub fn weights(&self) -> Option<&'a [F]> {
        self.weights
    }

    /// Stable counting sort by row into owned CSR buffers.
    ///
    /// Edges of one row keep their relative order from the input.
    pub(crate) fn group_by_row(&self) -> GroupedRows<I, F> {
        let nnz = self.row.len();
        let mut counts = vec![0usize; self.num_rows + 1];
        for &r in self.row {
            // Validated on construction.
            counts[r.position().unwrap_or(0) + 1] += 1;
        }
        for i in 1..counts.len() {
            counts[i] += counts[i - 1];
        }
        let indptr: Vec<I> = counts.iter().map(|&c| I::from_position(c)).collect();

        let mut next = counts;
        let mut order = vec![0usize; nnz];
        for (pos, &r) in self.row.iter().enumerate() {
            let slot = &mut next[r.position().unwrap_or(0)];
            order[*slot] = pos;
            *slot += 1;
        }

        let indices = order.iter().map(|&p| self.col[p]).collect();
        let edge_ids = order
            .iter()
            .map(|&p| match self.edge_ids {
                Some(ids) => ids[p],
                None => I::from_position(p),
            })
            .collect();
        let weights = self
            .weights
            .map(|w| order.iter().map(|&p| w[p]).collect());

        GroupedRows {
            num_cols: self.num_cols,
            indptr,
            indices,
            edge_ids,
            weights,
        }
    }
}

/// Owned CSR buffers produced by grouping a COO graph.
#[derive(Debug, Clone)]
pub(crate) struct GroupedRows<I, F> {
    num_cols: usize,
    indptr: Vec<I>,
    indices: Vec<I>,
    edge_ids: Vec<I>,
    weights: Option<Vec<F>>,
}

impl<I: Index, F: Weight> GroupedRows<I, F> {
    pub(crate) fn as_csr(&self) -> CsrGraph<'_, I, F> {
        CsrGraph {
            num_cols: self.num_cols,
            indptr: &self.indptr,
            indices: &self.indices,
            edge_ids: Some(&self.edge_ids),
            weights: self.weights.as_deref(),
        }
    }
}

/// Mapping from local column index to the global node id used for keys.
#[derive(Debug, Clone, Copy)]
pub enum NodeIds<'a, I> {
    /// Local ids are already global.
    Identity,
    /// `ids[local]` is the global id.
    Mapped(&'a [I]),
}

impl<I> Default for NodeIds<'_, I> {
    fn default() -> Self {
        NodeIds::Identity
    }
}

impl<I: Index> NodeIds<'_, I> {
    pub(crate) fn check_len(&self, num_cols: usize) -> Result<()> {
        match self {
            NodeIds::Mapped(ids) if ids.len() != num_cols => Err(LaborError::ShapeMismatch {
                what: "global node ids",
                expected: num_cols,
                actual: ids.len(),
            }),
            _ => Ok(()),
        }
    }

    /// Key bits of the global id of local column `col`.
    #[inline]
    pub fn global(&self, col: I) -> u64 {
        match self {
            NodeIds::Identity => col.key_bits(),
            NodeIds::Mapped(ids) => ids[col.position().unwrap_or(0)].key_bits(),
        }
    }
}

/// Selected edges in coordinate form.
///
/// `rows[i]`, `cols[i]` and `edge_ids[i]` describe one selected edge;
/// `importances[i]` is its importance weight (`w / p`) or `1` in plain mode.
#[derive(Debug, Clone, PartialEq)]
pub struct LaborSample<I, F> {
    pub num_rows: usize,
    pub num_cols: usize,
    pub rows: Vec<I>,
    pub cols: Vec<I>,
    pub edge_ids: Vec<I>,
    /// Original weights of the selected edges, when the input had weights.
    pub edge_weights: Option<Vec<F>>,
    pub importances: Vec<F>,
}

impl<I: Index, F: Weight> LaborSample<I, F> {
    /// Number of selected edges.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(row, col, edge_id, importance)` per selected edge.
    pub fn iter(&self) -> impl Iterator<Item = (I, I, I, F)> + '_ {
        self.rows
            .iter()
            .zip(&self.cols)
            .zip(&self.edge_ids)
            .zip(&self.importances)
            .map(|(((&r, &c), &e), &w)| (r, c, e, w))
    }
}

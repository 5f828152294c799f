//! Sampling configuration.
//!
//! `Budget` serializes as a signed fanout where any negative value means
//! "keep every incident edge", matching how fanouts are usually written in
//! training configs (`[15, 10, -1]`).

use serde::{Deserialize, Serialize};

/// Per-row sample budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Budget {
    /// Keep every incident edge.
    #[default]
    All,
    /// Keep about `k` edges per row (exactly `min(k, degree)` in expectation).
    Fanout(usize),
}

impl Budget {
    /// Parse a signed fanout: negative means [`Budget::All`].
    pub fn from_fanout(fanout: i64) -> Self {
        match usize::try_from(fanout) {
            Ok(k) => Budget::Fanout(k),
            Err(_) => Budget::All,
        }
    }

    /// Whether a row of `degree` edges is kept whole.
    #[inline]
    pub fn keeps_all(self, degree: usize) -> bool {
        match self {
            Budget::All => true,
            Budget::Fanout(k) => degree <= k,
        }
    }
}

impl From<i64> for Budget {
    fn from(fanout: i64) -> Self {
        Self::from_fanout(fanout)
    }
}

impl From<Budget> for i64 {
    fn from(b: Budget) -> Self {
        match b {
            Budget::All => -1,
            Budget::Fanout(k) => i64::try_from(k).unwrap_or(i64::MAX),
        }
    }
}

/// How inclusion probabilities and output weights are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    /// Uniform probabilities `min(1, k / m)`; output weights are `1`.
    #[default]
    Plain,
    /// Probabilities proportional to edge weight, output weights `w / p`.
    Weighted,
    /// Like `Weighted`, with per-node factors shared across seed rows and
    /// refined for up to `rounds` rounds so that rows agree on which
    /// neighbors to pull in.
    Iterative { rounds: u32 },
}

impl Importance {
    /// Whether output weights are inverse inclusion probabilities.
    pub fn is_weighted(self) -> bool {
        !matches!(self, Importance::Plain)
    }
}

/// Budget and importance mode for one sampling call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaborConfig {
    pub budget: Budget,
    #[serde(default)]
    pub importance: Importance,
}

impl LaborConfig {
    /// Plain sampling with the given budget.
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            importance: Importance::Plain,
        }
    }

    /// Set the importance mode.
    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }
}

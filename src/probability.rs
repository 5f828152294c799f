//! Inclusion probabilities for one seed row.
//!
//! Given non-negative sizes \(q_i\) and a budget \(k\), find a scale \(c\) with
//!
//! \[
//! \sum_i \min(1, c \, q_i) = k
//! \]
//!
//! by the usual cap-and-redistribute fixed point: entries whose share reaches
//! 1 are capped, the remaining budget is spread over the uncapped mass, and
//! the loop stops once a round caps nothing. Every round caps at least one
//! entry, so it runs at most `m` times and usually far fewer (about the number
//! of distinct weight magnitudes above the cut).

use crate::numeric::Weight;

/// How a row turns sizes into inclusion probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Inclusion<F> {
    /// Every edge is kept (`p = 1`).
    All,
    /// Every edge with positive size is kept, zero-size edges never are.
    Positive,
    /// Edges with size at least the cut are kept, the rest never are.
    ///
    /// Produced when capping alone uses up the whole budget.
    AtLeast(F),
    /// `p = min(1, c · q)` for positive `q`, 0 otherwise.
    Scaled(F),
}

impl<F: Weight> Inclusion<F> {
    /// Probability for an edge of size `q`.
    #[inline]
    pub fn probability(self, q: F) -> F {
        match self {
            Inclusion::All => F::one(),
            Inclusion::Positive if q > F::zero() => F::one(),
            Inclusion::AtLeast(cut) if q >= cut => F::one(),
            Inclusion::Scaled(c) if q > F::zero() => (c * q).min(F::one()),
            _ => F::zero(),
        }
    }

    /// Scale factor, with "keep" modes reported as unbounded.
    pub fn scale(self) -> F {
        match self {
            Inclusion::Scaled(c) => c,
            _ => F::infinity(),
        }
    }
}

/// Uniform probabilities `min(1, k / m)` for a row of `m` edges.
pub fn uniform<F: Weight>(m: usize, budget: usize) -> Inclusion<F> {
    if m <= budget {
        Inclusion::All
    } else {
        Inclusion::Scaled(F::from_f64_lossy(budget as f64 / m as f64))
    }
}

/// Probabilities proportional to `sizes`, capped at 1, summing to `budget`.
///
/// Sizes must be finite and non-negative. When at most `budget` sizes are
/// positive, every positive-size edge is kept. Mass is accumulated in `f64`
/// so `f32` rows cannot overflow it.
pub fn proportional<F: Weight>(sizes: &[F], budget: usize) -> Inclusion<F> {
    let positive = sizes.iter().filter(|&&q| q > F::zero()).count();
    if positive <= budget {
        return Inclusion::Positive;
    }

    let mut capped = vec![false; sizes.len()];
    let mut remaining = budget;
    loop {
        let mass: f64 = sizes
            .iter()
            .zip(&capped)
            .filter(|(_, done)| !**done)
            .map(|(&q, _)| q.widen())
            .sum();
        let c = remaining as f64 / mass;

        let mut newly = 0usize;
        for (&q, done) in sizes.iter().zip(capped.iter_mut()) {
            if !*done && c * q.widen() >= 1.0 {
                *done = true;
                newly += 1;
            }
        }
        if newly == 0 {
            return Inclusion::Scaled(F::from_f64_lossy(c));
        }
        remaining = remaining.saturating_sub(newly);
        if remaining == 0 {
            // Caps only ever take the largest sizes, so the capped set is
            // everything at or above its smallest member.
            let cut = sizes
                .iter()
                .zip(&capped)
                .filter(|(_, done)| **done)
                .fold(F::infinity(), |acc, (&q, _)| acc.min(q));
            return Inclusion::AtLeast(cut);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total<F: Weight>(inc: Inclusion<F>, sizes: &[F]) -> f64 {
        sizes.iter().map(|&q| inc.probability(q).widen()).sum()
    }

    #[test]
    fn uniform_caps_at_one() {
        assert_eq!(uniform::<f64>(3, 5), Inclusion::All);
        assert_eq!(uniform::<f64>(3, 3), Inclusion::All);
        let inc = uniform::<f64>(4, 1);
        assert_eq!(inc.probability(1.0), 0.25);
    }

    #[test]
    fn proportional_without_caps() {
        let sizes = [1.0f64, 1.0, 2.0, 4.0];
        let inc = proportional(&sizes, 2);
        assert!((inc.probability(1.0) - 0.25).abs() < 1e-12);
        assert!((inc.probability(4.0) - 1.0).abs() < 1e-12);
        assert!((total(inc, &sizes) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn proportional_redistributes_capped_mass() {
        // 100 dominates: capped at 1, remaining 1 unit spread over the rest.
        let sizes = [100.0f64, 1.0, 1.0, 2.0];
        let inc = proportional(&sizes, 2);
        assert_eq!(inc.probability(100.0), 1.0);
        assert!((inc.probability(1.0) - 0.25).abs() < 1e-12);
        assert!((inc.probability(2.0) - 0.5).abs() < 1e-12);
        assert!((total(inc, &sizes) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn proportional_cascading_caps() {
        // Capping the first entry pushes the second over 1 in the next round.
        let sizes = [50.0f64, 10.0, 1.0, 1.0, 1.0, 1.0];
        let inc = proportional(&sizes, 3);
        assert_eq!(inc.probability(50.0), 1.0);
        assert_eq!(inc.probability(10.0), 1.0);
        assert!((inc.probability(1.0) - 0.25).abs() < 1e-12);
        assert!((total(inc, &sizes) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn proportional_ignores_zero_sizes() {
        let sizes = [0.0f32, 3.0, 0.0, 5.0];
        let inc = proportional(&sizes, 2);
        assert_eq!(inc, Inclusion::Positive);
        assert_eq!(inc.probability(0.0), 0.0);
        assert_eq!(inc.probability(3.0), 1.0);

        let inc = proportional(&sizes, 1);
        assert_eq!(inc.probability(0.0), 0.0);
        assert!((total(inc, &sizes) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_budget_keeps_nothing() {
        let sizes = [1.0f64, 2.0];
        let inc = proportional(&sizes, 0);
        assert_eq!(total(inc, &sizes), 0.0);
        assert_eq!(uniform::<f32>(2, 0).probability(1.0), 0.0);
    }

    #[test]
    fn caps_that_use_up_the_budget_keep_the_capped_edges() {
        // The tiny entry vanishes in the mass, so the first round caps three
        // entries and nothing is left to spread.
        let sizes = [1.0f64, 1.0, 1.0, 1e-20];
        let inc = proportional(&sizes, 3);
        assert_eq!(inc, Inclusion::AtLeast(1.0));
        assert_eq!(inc.probability(1.0), 1.0);
        assert_eq!(inc.probability(1e-20), 0.0);
        assert_eq!(total(inc, &sizes), 3.0);

        let sizes = [1.0f32, 1.0, 1.0, 1e-9];
        let inc = proportional(&sizes, 3);
        assert_eq!(inc.probability(1.0), 1.0);
        assert!((total(inc, &sizes) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn huge_f32_mass_does_not_overflow() {
        let sizes = [3.0e38f32, 3.0e38, 3.0e38, 1.0];
        let inc = proportional(&sizes, 2);
        let t = total(inc, &sizes);
        assert!((t - 2.0).abs() < 1e-5, "total {t}");
        assert!(inc.probability(3.0e38) > 0.5);
    }

    #[test]
    fn zero_sizes_never_drawn_under_a_scale() {
        let inc = Inclusion::Scaled(f32::INFINITY);
        assert_eq!(inc.probability(0.0), 0.0);
        assert_eq!(inc.probability(1.0), 1.0);
    }

    #[test]
    fn precisions_agree() {
        let s64 = [3.0f64, 1.0, 7.0, 0.5, 2.0];
        let s32: Vec<f32> = s64.iter().map(|&x| x as f32).collect();
        let a = proportional(&s64, 3);
        let b = proportional(&s32, 3);
        for (&q64, &q32) in s64.iter().zip(&s32) {
            let d = a.probability(q64) - f64::from(b.probability(q32));
            assert!(d.abs() < 1e-6, "diff {d}");
        }
    }
}

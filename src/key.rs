//! Correlated random keys.
//!
//! Labor sampling replaces per-edge coin flips with a key `u ∈ [0, 1)` that is
//! a pure function of a seed and the neighbor's global id. Two seed rows that
//! use the same seed and share a neighbor see the same key for it, so their
//! decisions about that neighbor are coordinated rather than independent.
//!
//! Keys come from a splitmix64-style finalizer; there is no generator state,
//! which keeps the sampler reproducible and safe to evaluate from any thread.
//!
//! ## Batch dependency
//!
//! [`KeySeed::blended`] mixes two seeds with an angle that advances with a
//! batch counter:
//!
//! \[
//! z = \cos\theta \, N_a(id) + \sin\theta \, N_b(id), \qquad u = \Phi(z)
//! \]
//!
//! where \(N_a, N_b\) are standard normals drawn from a generator seeded by
//! the `(seed, id)` hash and \(\Phi\) is the
//! standard normal CDF. Each key stays uniform, while keys of consecutive
//! batches are correlated and drift from seed `a` to seed `b` over a period.

use crate::error::{LaborError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;
/// Largest f64 below 1.
const ONE_BELOW: f64 = 1.0 - f64::EPSILON / 2.0;

#[inline]
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[inline]
fn hash_pair(seed: u64, id: u64) -> u64 {
    mix64(mix64(seed.wrapping_add(GOLDEN_GAMMA)) ^ id.wrapping_mul(GOLDEN_GAMMA))
}

/// Top 53 bits as a float in `[0, 1)`.
#[inline]
fn unit(bits: u64) -> f64 {
    (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Uniform key in `[0, 1)` for `(seed, id)`.
#[inline]
pub fn uniform_key(seed: u64, id: u64) -> f64 {
    unit(hash_pair(seed, id))
}

/// Standard normal key for `(seed, id)`.
///
/// The generator is seeded from the pair hash, so the draw is still a pure
/// function of `(seed, id)`.
#[inline]
pub fn normal_key(seed: u64, id: u64) -> f64 {
    let mut rng = ChaCha8Rng::seed_from_u64(hash_pair(seed, id));
    StandardNormal.sample(&mut rng)
}

/// Complementary error function, fractional error below 1.2e-7.
///
/// Chebyshev fit from Numerical Recipes (`erfcc`).
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let r = t * poly.exp();
    if x >= 0.0 {
        r
    } else {
        2.0 - r
    }
}

/// Standard normal CDF clamped to `[0, 1)`.
#[inline]
pub fn normal_cdf(z: f64) -> f64 {
    (0.5 * erfc(-z * FRAC_1_SQRT_2)).clamp(0.0, ONE_BELOW)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Blend {
    next: u64,
    cos: f64,
    sin: f64,
}

/// The seed a row's keys are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeySeed {
    seed: u64,
    blend: Option<Blend>,
}

impl KeySeed {
    /// Independent keys from a single seed.
    pub const fn new(seed: u64) -> Self {
        Self { seed, blend: None }
    }

    /// Keys that move from `current` towards `next` as `step` goes from `0`
    /// to `period`.
    ///
    /// A `period` of 0 or 1 means no dependency between batches and is the
    /// same as [`KeySeed::new`] with `current`.
    pub fn blended(current: u64, next: u64, step: u64, period: u64) -> Self {
        if period <= 1 {
            return Self::new(current);
        }
        let theta = FRAC_PI_2 * (step % period) as f64 / period as f64;
        Self {
            seed: current,
            blend: Some(Blend {
                next,
                cos: theta.cos(),
                sin: theta.sin(),
            }),
        }
    }

    /// Draw an independent seed from `rng`.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.random())
    }

    /// The primary seed value.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether keys blend two seeds.
    pub fn is_blended(&self) -> bool {
        self.blend.is_some()
    }

    /// Key in `[0, 1)` for the node with global id `id`.
    #[inline]
    pub fn key(&self, id: u64) -> f64 {
        match self.blend {
            None => uniform_key(self.seed, id),
            Some(b) => {
                let z = b.cos * normal_key(self.seed, id) + b.sin * normal_key(b.next, id);
                normal_cdf(z)
            }
        }
    }
}

impl From<u64> for KeySeed {
    fn from(seed: u64) -> Self {
        Self::new(seed)
    }
}

/// Where each seed row gets its [`KeySeed`].
#[derive(Debug, Clone, Copy)]
pub enum Seeds<'a> {
    /// All seed rows share one seed, so shared neighbors get identical keys.
    Shared(KeySeed),
    /// One seed per seed row, aligned with the seed-row slice.
    PerRow(&'a [u64]),
}

impl Seeds<'_> {
    pub(crate) fn check_len(&self, num_seed_rows: usize) -> Result<()> {
        match self {
            Seeds::Shared(_) => Ok(()),
            Seeds::PerRow(s) if s.len() == num_seed_rows => Ok(()),
            Seeds::PerRow(s) => Err(LaborError::ShapeMismatch {
                what: "per-row seeds",
                expected: num_seed_rows,
                actual: s.len(),
            }),
        }
    }

    /// Seed for the seed row at `pos`.
    #[inline]
    pub fn for_row(&self, pos: usize) -> KeySeed {
        match self {
            Seeds::Shared(k) => *k,
            Seeds::PerRow(s) => KeySeed::new(s[pos]),
        }
    }
}

/// Draw one seed per seed row from `rng`.
pub fn draw_row_seeds<R: Rng + ?Sized>(num_seed_rows: usize, rng: &mut R) -> Vec<u64> {
    (0..num_seed_rows).map(|_| rng.random()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn keys_are_pure() {
        assert_eq!(uniform_key(7, 11), uniform_key(7, 11));
        assert_ne!(uniform_key(7, 11), uniform_key(8, 11));
        assert_ne!(uniform_key(7, 11), uniform_key(7, 12));
    }

    #[test]
    fn keys_in_unit_interval() {
        for seed in 0..50u64 {
            for id in 0..200u64 {
                let u = uniform_key(seed, id);
                assert!((0.0..1.0).contains(&u), "u={u}");
            }
        }
    }

    #[test]
    fn keys_look_uniform() {
        // Chi-squared smoke test over 20 buckets.
        let buckets = 20;
        let n = 100_000u64;
        let mut counts = vec![0usize; buckets];
        for id in 0..n {
            let u = uniform_key(12345, id);
            counts[(u * buckets as f64) as usize] += 1;
        }
        let expected = n as f64 / buckets as f64;
        let chi2: f64 = counts
            .iter()
            .map(|&c| {
                let d = c as f64 - expected;
                d * d / expected
            })
            .sum();
        // df = 19.
        assert!(chi2 < 60.0, "chi2={chi2:.2} counts={counts:?}");
    }

    #[test]
    fn normal_keys_are_pure_and_standard() {
        assert_eq!(normal_key(3, 17), normal_key(3, 17));
        assert_ne!(normal_key(3, 17), normal_key(4, 17));
        let n = 20_000u64;
        let draws: Vec<f64> = (0..n).map(|id| normal_key(99, id)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|z| (z - mean) * (z - mean)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.03, "mean={mean}");
        assert!((var - 1.0).abs() < 0.05, "var={var}");
    }

    #[test]
    fn normal_cdf_reference_points() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(1.0) - 0.841_344_746).abs() < 1e-6);
        assert!((normal_cdf(-1.96) - 0.024_997_895).abs() < 1e-6);
        assert!(normal_cdf(40.0) < 1.0);
        assert!(normal_cdf(-40.0) >= 0.0);
    }

    #[test]
    fn blended_keys_stay_uniform() {
        let seed = KeySeed::blended(3, 9, 1, 4);
        let n = 50_000u64;
        let mean: f64 = (0..n).map(|id| seed.key(id)).sum::<f64>() / n as f64;
        let below_quarter = (0..n).filter(|&id| seed.key(id) < 0.25).count() as f64 / n as f64;
        assert!((mean - 0.5).abs() < 0.01, "mean={mean}");
        assert!((below_quarter - 0.25).abs() < 0.01, "p={below_quarter}");
    }

    #[test]
    fn blended_step_zero_depends_on_current_only() {
        let a = KeySeed::blended(3, 9, 0, 4);
        let b = KeySeed::blended(3, 1234, 0, 4);
        for id in 0..100 {
            assert!((a.key(id) - b.key(id)).abs() < 1e-12);
        }
    }

    #[test]
    fn neighbouring_steps_are_correlated() {
        let n = 10_000u64;
        let s1 = KeySeed::blended(5, 6, 1, 8);
        let s2 = KeySeed::blended(5, 6, 2, 8);
        let far = KeySeed::new(77);
        let close = (0..n).filter(|&id| (s1.key(id) - s2.key(id)).abs() < 0.1).count();
        let random = (0..n).filter(|&id| (s1.key(id) - far.key(id)).abs() < 0.1).count();
        assert!(close > random * 2, "close={close} random={random}");
    }

    #[test]
    fn seeds_drawn_from_a_generator_are_reproducible() {
        let a = KeySeed::from_rng(&mut ChaCha8Rng::seed_from_u64(21));
        let b = KeySeed::from_rng(&mut ChaCha8Rng::seed_from_u64(21));
        assert_eq!(a, b);
        assert!(!a.is_blended());
        assert_ne!(a, KeySeed::from_rng(&mut ChaCha8Rng::seed_from_u64(22)));
    }

    #[test]
    fn period_one_is_plain() {
        assert_eq!(KeySeed::blended(4, 5, 0, 1), KeySeed::new(4));
        assert!(!KeySeed::blended(4, 5, 3, 0).is_blended());
    }

    #[test]
    fn per_row_seed_length_checked() {
        let seeds = [1u64, 2];
        assert!(Seeds::PerRow(&seeds).check_len(2).is_ok());
        let err = Seeds::PerRow(&seeds).check_len(3).expect_err("length mismatch");
        assert!(matches!(err, LaborError::ShapeMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn drawn_seeds_are_reproducible() {
        let a = draw_row_seeds(4, &mut ChaCha8Rng::seed_from_u64(1));
        let b = draw_row_seeds(4, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
    }
}

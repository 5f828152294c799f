//! Index and weight widths.
//!
//! The engine is generic over two independent axes: the integer width used
//! for row/column/edge ids (`i32` or `i64`) and the float precision used for
//! weights and probabilities (`f32` or `f64`). Both traits are sealed, so the
//! four supported combinations are the only instantiations.

use num_traits::{Float, PrimInt};
use std::fmt::Debug;

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Integer type for row, column and edge ids.
pub trait Index: PrimInt + Debug + Send + Sync + 'static + sealed::Sealed {
    /// Lossless widening to `i64`.
    fn widen(self) -> i64;

    /// Cast from a position that has already been checked to fit.
    fn from_position(pos: usize) -> Self;

    /// Largest position representable by this width.
    fn max_position() -> usize;

    /// Bit pattern used when this id feeds the key hash.
    #[inline]
    fn key_bits(self) -> u64 {
        self.widen() as u64
    }

    /// Non-negative value as a `usize`, `None` if negative.
    #[inline]
    fn position(self) -> Option<usize> {
        usize::try_from(self.widen()).ok()
    }
}

impl Index for i32 {
    #[inline]
    fn widen(self) -> i64 {
        i64::from(self)
    }

    #[inline]
    fn from_position(pos: usize) -> Self {
        pos as i32
    }

    #[inline]
    fn max_position() -> usize {
        i32::MAX as usize
    }
}

impl Index for i64 {
    #[inline]
    fn widen(self) -> i64 {
        self
    }

    #[inline]
    fn from_position(pos: usize) -> Self {
        pos as i64
    }

    #[inline]
    fn max_position() -> usize {
        usize::try_from(i64::MAX).unwrap_or(usize::MAX)
    }
}

/// Float type for edge weights, probabilities and importance weights.
pub trait Weight: Float + Debug + Default + Send + Sync + 'static + sealed::Sealed {
    /// Rounding conversion from `f64`.
    fn from_f64_lossy(v: f64) -> Self;

    /// Lossless widening to `f64`.
    fn widen(self) -> f64;

    /// A weight is usable when it is finite and not negative.
    #[inline]
    fn is_valid_weight(self) -> bool {
        self.is_finite() && self >= Self::zero()
    }
}

impl Weight for f32 {
    #[inline]
    fn from_f64_lossy(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn widen(self) -> f64 {
        f64::from(self)
    }
}

impl Weight for f64 {
    #[inline]
    fn from_f64_lossy(v: f64) -> Self {
        v
    }

    #[inline]
    fn widen(self) -> f64 {
        self
    }
}

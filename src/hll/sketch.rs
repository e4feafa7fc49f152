// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::error::Error;
use crate::error::ErrorKind;
use crate::hash;

/// Smallest supported precision, 16 registers.
pub const MIN_PRECISION: u8 = 4;
/// Largest supported precision, 262144 registers.
pub const MAX_PRECISION: u8 = 18;

// Range-correction constants of the classic Flajolet et al. algorithm.
// The large-range threshold is fixed at 2^32 / 30 because the correction
// formula models a hash range capped at 32 bits; it is not derived from
// the precision.
const TWO_POW_32: f64 = 4294967296.0;
const LARGE_RANGE_THRESHOLD: f64 = TWO_POW_32 / 30.0;

/// A HyperLogLog sketch for approximate distinct counting.
///
/// Each key contributes one 64-bit hash: the top `p` bits select one of
/// `m = 2^p` registers and the rank of the leftmost set bit in the
/// remaining bits is recorded as an order statistic. Registers only move
/// upward, so updates are idempotent and insertion-order independent, and
/// the estimator reads the whole register array in one bounded pass.
///
/// Expected standard error is `1.04 / sqrt(m)`; see [`relative_error`].
///
/// [`relative_error`]: Self::relative_error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HllSketch {
    /// Register-index width in bits (p)
    precision: u8,
    /// One 6-bit-range rank per register, stored one cell per byte.
    /// Length = 2^precision
    registers: Vec<u8>,
}

impl HllSketch {
    /// Creates a sketch with `2^precision` registers.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParameter`] if `precision` is outside
    /// `[4, 18]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::hll::HllSketch;
    ///
    /// let mut sketch = HllSketch::new(14).unwrap();
    /// for i in 0..1000u32 {
    ///     sketch.update(&i.to_le_bytes());
    /// }
    ///
    /// let estimate = sketch.estimate();
    /// assert!(estimate > 950 && estimate < 1050);
    /// ```
    pub fn new(precision: u8) -> Result<Self, Error> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                "precision must be in [4, 18]",
            )
            .with_context("precision", precision));
        }

        Ok(HllSketch {
            precision,
            registers: vec![0u8; 1 << precision],
        })
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Records a key.
    ///
    /// Idempotent: re-inserting a key never changes the state, and the
    /// final state does not depend on insertion order.
    pub fn update(&mut self, key: &[u8]) {
        let h = hash::wide_hash(key, hash::DEFAULT_SEED);

        let index = (h >> (64 - self.precision)) as usize;
        // The remainder occupies the top bits after shifting the index out,
        // so its leftmost set bit is exactly what leading_zeros measures.
        // An all-zero remainder ranks one past the remainder width.
        let remainder = h << self.precision;
        let rank = if remainder == 0 {
            64 - u32::from(self.precision) + 1
        } else {
            remainder.leading_zeros() + 1
        };
        let rho = rank as u8;

        if rho > self.registers[index] {
            self.registers[index] = rho;
        }
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Returns the estimated number of distinct keys seen.
    ///
    /// Computes the bias-corrected harmonic-mean estimate
    /// `alpha * m^2 / sum(2^-register[j])`, switching to linear counting
    /// (`m * ln(m / zero_registers)`) while the raw estimate is below
    /// `2.5 * m` with empty registers remaining, and to the logarithmic
    /// large-range correction above `2^32 / 30`.
    pub fn estimate(&self) -> u64 {
        let m = self.registers.len() as f64;

        let mut harmonic_sum = 0.0;
        let mut zero_registers = 0u64;
        for &rank in &self.registers {
            harmonic_sum += 1.0 / (1u64 << rank) as f64;
            if rank == 0 {
                zero_registers += 1;
            }
        }

        let raw = self.alpha() * m * m / harmonic_sum;

        let corrected = if raw <= 2.5 * m && zero_registers > 0 {
            m * (m / zero_registers as f64).ln()
        } else if raw > LARGE_RANGE_THRESHOLD {
            -TWO_POW_32 * (1.0 - raw / TWO_POW_32).ln()
        } else {
            raw
        };

        corrected as u64
    }

    // ========================================================================
    // Set Operations
    // ========================================================================

    /// Merges another sketch into this one by element-wise register max.
    ///
    /// Since each register already holds the max rank over its stream, the
    /// merged array equals the array a single sketch would hold after
    /// observing the union of both streams; the merge loses nothing with
    /// respect to the underlying rank statistics and is commutative and
    /// associative. Precision is checked before any mutation.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DimensionMismatch`] unless both sketches have
    /// the same precision.
    pub fn merge(&mut self, other: &HllSketch) -> Result<(), Error> {
        if self.precision != other.precision {
            return Err(Error::new(
                ErrorKind::DimensionMismatch,
                "cannot merge sketches of different precisions",
            )
            .with_context("precision", self.precision)
            .with_context("other_precision", other.precision));
        }

        for (register, other_register) in self.registers.iter_mut().zip(&other.registers) {
            if *other_register > *register {
                *register = *other_register;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns whether any key has been recorded.
    pub fn is_empty(&self) -> bool {
        self.registers.iter().all(|&r| r == 0)
    }

    /// Returns the configured precision (p).
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Returns the number of registers (m = 2^p).
    pub fn num_registers(&self) -> usize {
        self.registers.len()
    }

    /// Returns the size of the register array in cells, independent of
    /// stream length.
    pub fn memory_usage(&self) -> usize {
        self.registers.len()
    }

    /// Returns the expected standard error of [`estimate`](Self::estimate),
    /// `1.04 / sqrt(m)`. A property of the precision alone.
    pub fn relative_error(&self) -> f64 {
        1.04 / (self.registers.len() as f64).sqrt()
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    /// Bias correction constant for the raw estimator.
    ///
    /// Documented small-m constants for p in {4, 5, 6}, the asymptotic
    /// formula above that.
    fn alpha(&self) -> f64 {
        match self.precision {
            4 => 0.673,
            5 => 0.697,
            6 => 0.709,
            _ => 0.7213 / (1.0 + 1.079 / self.registers.len() as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sketch_estimates_zero() {
        let sketch = HllSketch::new(12).unwrap();
        assert!(sketch.is_empty());
        assert_eq!(sketch.estimate(), 0);
    }

    #[test]
    fn test_small_cardinality_is_exactish() {
        // Linear counting regime: estimates should be very close.
        let mut sketch = HllSketch::new(12).unwrap();
        for i in 0..100u32 {
            sketch.update(&i.to_le_bytes());
        }
        let estimate = sketch.estimate();
        assert!(
            (90..=110).contains(&estimate),
            "estimate should be near 100, got {estimate}"
        );
    }

    #[test]
    fn test_duplicates_do_not_inflate() {
        let mut sketch = HllSketch::new(12).unwrap();
        for _ in 0..10 {
            for i in 0..100u32 {
                sketch.update(&i.to_le_bytes());
            }
        }
        let estimate = sketch.estimate();
        assert!(
            (90..=110).contains(&estimate),
            "duplicates should not inflate estimate, got {estimate}"
        );
    }

    #[test]
    fn test_update_is_idempotent_on_state() {
        let mut a = HllSketch::new(10).unwrap();
        for i in 0..50u32 {
            a.update(&i.to_le_bytes());
        }
        let mut b = a.clone();
        for i in 0..50u32 {
            b.update(&i.to_le_bytes());
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_merge_mismatched_precision() {
        let mut a = HllSketch::new(10).unwrap();
        let b = HllSketch::new(11).unwrap();
        let err = a.merge(&b).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
    }

    #[test]
    fn test_merge_matches_union_state() {
        let mut left = HllSketch::new(12).unwrap();
        let mut right = HllSketch::new(12).unwrap();
        let mut combined = HllSketch::new(12).unwrap();

        for i in 0..1000u32 {
            let key = i.to_le_bytes();
            if i % 2 == 0 {
                left.update(&key);
            } else {
                right.update(&key);
            }
            combined.update(&key);
        }

        left.merge(&right).unwrap();
        assert_eq!(left, combined);
    }

    #[test]
    fn test_relative_error_is_pure_in_precision() {
        let sketch = HllSketch::new(14).unwrap();
        let expected = 1.04 / (16384.0f64).sqrt();
        assert!((sketch.relative_error() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_alpha_constants() {
        assert_eq!(HllSketch::new(4).unwrap().alpha(), 0.673);
        assert_eq!(HllSketch::new(5).unwrap().alpha(), 0.697);
        assert_eq!(HllSketch::new(6).unwrap().alpha(), 0.709);
        let a7 = HllSketch::new(7).unwrap().alpha();
        assert!((a7 - 0.7213 / (1.0 + 1.079 / 128.0)).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_precision() {
        assert!(HllSketch::new(3).is_err());
        assert!(HllSketch::new(19).is_err());
        assert!(HllSketch::new(4).is_ok());
        assert!(HllSketch::new(18).is_ok());
    }
}

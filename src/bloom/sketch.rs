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

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides fast membership queries with:
/// - No false negatives (inserted keys always return `true`)
/// - Tunable false positive rate
/// - Constant space usage
///
/// Bits only ever move from 0 to 1, so deletion is not supported; use
/// [`CountingBloomFilter`](crate::bloom::CountingBloomFilter) when removal
/// is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    /// Total number of bits in the filter (m)
    num_bits: u64,
    /// Number of hash functions to use (k)
    num_hashes: u16,
    /// Number of inserted keys (n)
    num_items: u64,
    /// Bit array, byte packed. Length = ceil(num_bits / 8)
    bits: Vec<u8>,
}

impl BloomFilter {
    /// Creates a filter with explicit dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParameter`] if `num_bits` is zero or
    /// `num_hashes` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::new(10_000, 7).unwrap();
    /// assert_eq!(filter.num_bits(), 10_000);
    /// ```
    pub fn new(num_bits: u64, num_hashes: u16) -> Result<Self, Error> {
        if num_bits == 0 {
            return Err(
                Error::new(ErrorKind::InvalidParameter, "num_bits must be positive")
                    .with_context("num_bits", num_bits),
            );
        }
        if num_hashes == 0 {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                "num_hashes must be at least 1",
            ));
        }

        let num_bytes = num_bits.div_ceil(8) as usize;
        Ok(BloomFilter {
            num_bits,
            num_hashes,
            num_items: 0,
            bits: vec![0u8; num_bytes],
        })
    }

    /// Creates a filter with optimal dimensions for a target accuracy.
    ///
    /// Sizes the bit array as `m = ceil(-n * ln(p) / ln(2)^2)` and the hash
    /// count as `k = max(1, round((m/n) * ln(2)))`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParameter`] if `expected_items` is zero
    /// or `fp_rate` is not in `(0, 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::bloom::BloomFilter;
    ///
    /// // Optimal for 10,000 items with a 1% false positive target
    /// let filter = BloomFilter::with_accuracy(10_000, 0.01).unwrap();
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn with_accuracy(expected_items: u64, fp_rate: f64) -> Result<Self, Error> {
        if expected_items == 0 {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                "expected_items must be positive",
            ));
        }
        if !(fp_rate > 0.0 && fp_rate < 1.0) {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                "fp_rate must be in (0, 1)",
            )
            .with_context("fp_rate", fp_rate));
        }

        let num_bits = Self::suggest_num_bits(expected_items, fp_rate);
        let num_hashes = Self::suggest_num_hashes(expected_items, num_bits);
        Self::new(num_bits, num_hashes)
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Inserts a key into the filter.
    ///
    /// After insertion, `contains(key)` always returns `true` for that exact
    /// key, regardless of what other keys are inserted afterwards.
    pub fn insert(&mut self, key: &[u8]) {
        let (h1, h2) = hash::base_hashes(key, hash::DEFAULT_SEED);
        for i in 0..self.num_hashes {
            self.set_bit(hash::index_at(h1, h2, i, self.num_bits));
        }
        self.num_items += 1;
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether a key is possibly in the set.
    ///
    /// Returns:
    /// - `true`: key was **possibly** inserted (or false positive)
    /// - `false`: key was **definitely not** inserted
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::bloom::BloomFilter;
    /// let mut filter = BloomFilter::with_accuracy(100, 0.01).unwrap();
    /// filter.insert(b"apple");
    ///
    /// assert!(filter.contains(b"apple"));
    /// assert!(!filter.contains(b"grape"));
    /// ```
    pub fn contains(&self, key: &[u8]) -> bool {
        let (h1, h2) = hash::base_hashes(key, hash::DEFAULT_SEED);
        for i in 0..self.num_hashes {
            if !self.get_bit(hash::index_at(h1, h2, i, self.num_bits)) {
                return false;
            }
        }
        true
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns whether any key has been inserted.
    pub fn is_empty(&self) -> bool {
        self.num_items == 0
    }

    /// Returns the total number of bits in the filter (m).
    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    /// Returns the number of hash functions used (k).
    pub fn num_hashes(&self) -> u16 {
        self.num_hashes
    }

    /// Returns the number of keys inserted so far (n).
    pub fn num_items(&self) -> u64 {
        self.num_items
    }

    /// Returns the size of the backing bit array in bytes, `ceil(m / 8)`.
    ///
    /// Constant regardless of how many keys have been inserted.
    pub fn memory_usage(&self) -> usize {
        self.bits.len()
    }

    /// Returns the theoretical false positive rate for the current load.
    ///
    /// Computed as `(1 - e^(-k*n/m))^k`, which is non-decreasing in the
    /// number of inserted keys. Returns `0.0` while the filter is empty.
    pub fn theoretical_fp_rate(&self) -> f64 {
        if self.num_items == 0 {
            return 0.0;
        }
        let k = f64::from(self.num_hashes);
        let n = self.num_items as f64;
        let m = self.num_bits as f64;
        (1.0 - (-k * n / m).exp()).powf(k)
    }

    // ========================================================================
    // Static Suggestion Methods
    // ========================================================================

    /// Suggests the optimal number of bits given expected items and target
    /// false positive rate: `m = ceil(-n * ln(p) / ln(2)^2)`.
    pub fn suggest_num_bits(expected_items: u64, fp_rate: f64) -> u64 {
        let n = expected_items as f64;
        let ln2_squared = std::f64::consts::LN_2 * std::f64::consts::LN_2;
        (-n * fp_rate.ln() / ln2_squared).ceil() as u64
    }

    /// Suggests the optimal number of hash functions given expected items
    /// and bit count: `k = max(1, round((m/n) * ln(2)))`.
    pub fn suggest_num_hashes(expected_items: u64, num_bits: u64) -> u16 {
        let m = num_bits as f64;
        let n = expected_items as f64;
        let k = (m / n * std::f64::consts::LN_2).round() as u16;
        k.max(1)
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn get_bit(&self, bit_index: u64) -> bool {
        let byte = self.bits[(bit_index / 8) as usize];
        (byte >> (bit_index % 8)) & 1 != 0
    }

    fn set_bit(&mut self, bit_index: u64) {
        self.bits[(bit_index / 8) as usize] |= 1 << (bit_index % 8);
    }
}

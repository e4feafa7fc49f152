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

/// Widest supported counter, 4 bits, saturating at 15.
const MAX_COUNTER_BITS: u8 = 4;

/// A Bloom filter variant that supports deletion.
///
/// Replaces the bit array with an array of small saturating counters, one
/// per slot. Insertion increments the k target counters, removal decrements
/// them, and membership holds while all k counters are positive.
///
/// The no-false-negative guarantee is contingent on the caller never
/// removing a key that was not actually inserted; such a removal can drive
/// shared counters to zero and introduce false negatives for colliding
/// keys. That is a caller contract, not an internal invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountingBloomFilter {
    /// Number of counters (m)
    num_counters: u64,
    /// Number of hash functions to use (k)
    num_hashes: u16,
    /// Width of each counter in bits, at most 4
    counter_bits: u8,
    /// Saturation value, `2^counter_bits - 1`
    max_count: u8,
    /// Number of keys currently held (n)
    num_items: u64,
    /// One cell per counter. Length = num_counters
    counters: Vec<u8>,
}

impl CountingBloomFilter {
    /// Creates a counting filter with explicit dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParameter`] if `num_counters` is zero,
    /// `num_hashes` is zero, or `counter_bits` is outside `[1, 4]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::bloom::CountingBloomFilter;
    ///
    /// let filter = CountingBloomFilter::new(10_000, 7, 4).unwrap();
    /// assert_eq!(filter.max_count(), 15);
    /// ```
    pub fn new(num_counters: u64, num_hashes: u16, counter_bits: u8) -> Result<Self, Error> {
        if num_counters == 0 {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                "num_counters must be positive",
            ));
        }
        if num_hashes == 0 {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                "num_hashes must be at least 1",
            ));
        }
        if counter_bits == 0 || counter_bits > MAX_COUNTER_BITS {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                "counter_bits must be in [1, 4]",
            )
            .with_context("counter_bits", counter_bits));
        }

        Ok(CountingBloomFilter {
            num_counters,
            num_hashes,
            counter_bits,
            max_count: (1u8 << counter_bits) - 1,
            num_items: 0,
            counters: vec![0u8; num_counters as usize],
        })
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Inserts a key, incrementing its k target counters.
    ///
    /// The update is all-or-nothing: if any target counter is already
    /// saturated the whole insert fails and no counter is modified, so the
    /// filter never silently undercounts.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Overflow`] when a target counter is at
    /// `max_count`.
    pub fn insert(&mut self, key: &[u8]) -> Result<(), Error> {
        let indices = self.target_counters(key);
        for &idx in &indices {
            if self.counters[idx] == self.max_count {
                return Err(Error::new(
                    ErrorKind::Overflow,
                    "insert would saturate a counter",
                )
                .with_context("counter_index", idx)
                .with_context("max_count", self.max_count));
            }
        }

        for &idx in &indices {
            self.counters[idx] += 1;
        }
        self.num_items += 1;
        Ok(())
    }

    /// Removes a previously inserted key, decrementing its target counters.
    ///
    /// The membership test runs first; removal of an absent key fails
    /// without mutating anything. Counters already at zero stay at zero
    /// (a target counter can be zero despite a passing membership test only
    /// through the caller-contract violation described on the type).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotPresent`] if the key fails the membership
    /// test.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::bloom::CountingBloomFilter;
    /// let mut filter = CountingBloomFilter::new(1024, 5, 4).unwrap();
    /// filter.insert(b"apple").unwrap();
    /// filter.remove(b"apple").unwrap();
    /// assert!(!filter.contains(b"apple"));
    /// ```
    pub fn remove(&mut self, key: &[u8]) -> Result<(), Error> {
        if !self.contains(key) {
            return Err(Error::new(
                ErrorKind::NotPresent,
                "cannot remove a key that is not present",
            ));
        }

        for idx in self.target_counters(key) {
            if self.counters[idx] > 0 {
                self.counters[idx] -= 1;
            }
        }
        self.num_items -= 1;
        Ok(())
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether a key is possibly in the set.
    ///
    /// `true` iff all k target counters are positive. Same false positive
    /// behavior as [`BloomFilter`](crate::bloom::BloomFilter), and the same
    /// no-false-negative guarantee under correct usage.
    pub fn contains(&self, key: &[u8]) -> bool {
        let (h1, h2) = hash::base_hashes(key, hash::DEFAULT_SEED);
        for i in 0..self.num_hashes {
            let idx = hash::index_at(h1, h2, i, self.num_counters) as usize;
            if self.counters[idx] == 0 {
                return false;
            }
        }
        true
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns whether any key is currently held.
    pub fn is_empty(&self) -> bool {
        self.num_items == 0
    }

    /// Returns the number of counters (m).
    pub fn num_counters(&self) -> u64 {
        self.num_counters
    }

    /// Returns the number of hash functions used (k).
    pub fn num_hashes(&self) -> u16 {
        self.num_hashes
    }

    /// Returns the configured counter width in bits.
    pub fn counter_bits(&self) -> u8 {
        self.counter_bits
    }

    /// Returns the saturation value of each counter.
    pub fn max_count(&self) -> u8 {
        self.max_count
    }

    /// Returns the number of keys currently held (inserts minus removes).
    pub fn num_items(&self) -> u64 {
        self.num_items
    }

    /// Returns the size of the counter array in cells, constant regardless
    /// of how many keys are held.
    pub fn memory_usage(&self) -> usize {
        self.counters.len()
    }

    /// Returns the theoretical false positive rate for the current load,
    /// `(1 - e^(-k*n/m))^k`. Returns `0.0` while the filter is empty.
    pub fn theoretical_fp_rate(&self) -> f64 {
        if self.num_items == 0 {
            return 0.0;
        }
        let k = f64::from(self.num_hashes);
        let n = self.num_items as f64;
        let m = self.num_counters as f64;
        (1.0 - (-k * n / m).exp()).powf(k)
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    /// Returns the distinct counter indices targeted by a key.
    ///
    /// Kirsch-Mitzenmacher can map two of the k probes to the same slot;
    /// collapsing duplicates keeps insert and remove exact inverses of each
    /// other on every counter.
    fn target_counters(&self, key: &[u8]) -> Vec<usize> {
        let (h1, h2) = hash::base_hashes(key, hash::DEFAULT_SEED);
        let mut indices: Vec<usize> = (0..self.num_hashes)
            .map(|i| hash::index_at(h1, h2, i, self.num_counters) as usize)
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove_round_trip() {
        let mut filter = CountingBloomFilter::new(1024, 5, 4).unwrap();

        filter.insert(b"apple").unwrap();
        assert!(filter.contains(b"apple"));
        assert_eq!(filter.num_items(), 1);

        filter.remove(b"apple").unwrap();
        assert!(!filter.contains(b"apple"));
        assert_eq!(filter.num_items(), 0);
    }

    #[test]
    fn test_remove_absent_key_fails_without_mutation() {
        let mut filter = CountingBloomFilter::new(1024, 5, 4).unwrap();
        filter.insert(b"kept").unwrap();
        let snapshot = filter.clone();

        let err = filter.remove(b"never-inserted").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotPresent);
        assert_eq!(filter, snapshot);
    }

    #[test]
    fn test_overflow_is_all_or_nothing() {
        // 1-bit counters saturate after a single insert of a key.
        let mut filter = CountingBloomFilter::new(256, 3, 1).unwrap();
        filter.insert(b"once").unwrap();
        let snapshot = filter.clone();

        let err = filter.insert(b"once").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        assert_eq!(filter, snapshot);
        assert_eq!(filter.num_items(), 1);
    }

    #[test]
    fn test_repeated_insert_counts_up_to_saturation() {
        let mut filter = CountingBloomFilter::new(512, 4, 4).unwrap();
        for _ in 0..15 {
            filter.insert(b"hot-key").unwrap();
        }
        assert_eq!(
            filter.insert(b"hot-key").unwrap_err().kind(),
            ErrorKind::Overflow
        );
        assert_eq!(filter.num_items(), 15);
    }

    #[test]
    fn test_balanced_pairs_restore_num_items() {
        let mut filter = CountingBloomFilter::new(2048, 5, 4).unwrap();
        for i in 0..50u32 {
            filter.insert(&i.to_le_bytes()).unwrap();
        }
        for i in 0..50u32 {
            filter.remove(&i.to_le_bytes()).unwrap();
        }
        assert_eq!(filter.num_items(), 0);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_invalid_counter_bits() {
        assert!(CountingBloomFilter::new(128, 3, 0).is_err());
        assert!(CountingBloomFilter::new(128, 3, 5).is_err());
        assert!(CountingBloomFilter::new(128, 3, 4).is_ok());
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(CountingBloomFilter::new(0, 3, 4).is_err());
        assert!(CountingBloomFilter::new(128, 0, 4).is_err());
    }
}

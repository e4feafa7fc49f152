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

use crate::common::random::XorShift64;
use crate::error::Error;
use crate::error::ErrorKind;
use crate::hash;

/// A Count-Min sketch for approximate frequency estimation over a multiset
/// stream.
///
/// Maintains a `d x w` matrix of counters. Each row hashes keys under an
/// independent seed; an update adds the weight to one cell per row, and an
/// estimate takes the minimum cell over the rows. Collisions can only
/// inflate a cell, so estimates never undercount.
///
/// With dimensions from [`from_error_bounds(epsilon, delta)`], the estimate
/// for any key exceeds its true frequency by at most `epsilon *
/// total_weight` with probability at least `1 - delta`.
///
/// [`from_error_bounds(epsilon, delta)`]: Self::from_error_bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMinSketch {
    /// Number of rows / hash functions (d)
    num_hashes: u8,
    /// Number of counters per row (w)
    num_buckets: u32,
    /// Independent hash seed per row, derived deterministically from the
    /// library seed so same-shaped sketches are mergeable
    row_seeds: Vec<u32>,
    /// Row-major d x w counter matrix
    table: Vec<u64>,
    /// Sum of all update weights
    total_weight: u64,
}

impl CountMinSketch {
    /// Creates a sketch with explicit dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParameter`] if either dimension is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::countmin::CountMinSketch;
    ///
    /// let mut sketch = CountMinSketch::new(5, 256).unwrap();
    /// sketch.update(b"apple");
    /// sketch.update_with_weight(b"banana", 3);
    ///
    /// assert!(sketch.estimate(b"banana") >= 3);
    /// ```
    pub fn new(num_hashes: u8, num_buckets: u32) -> Result<Self, Error> {
        if num_hashes == 0 {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                "num_hashes must be at least 1",
            ));
        }
        if num_buckets == 0 {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                "num_buckets must be positive",
            ));
        }

        let mut rng = XorShift64::seeded(u64::from(hash::DEFAULT_SEED));
        let row_seeds = (0..num_hashes).map(|_| rng.next_u64() as u32).collect();

        Ok(CountMinSketch {
            num_hashes,
            num_buckets,
            row_seeds,
            table: vec![0u64; num_hashes as usize * num_buckets as usize],
            total_weight: 0,
        })
    }

    /// Creates a sketch sized from error bounds.
    ///
    /// Uses `w = ceil(e / epsilon)` buckets and `d = ceil(ln(1 / delta))`
    /// hash functions, the standard Cormode-Muthukrishnan sizing.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParameter`] unless both bounds are in
    /// `(0, 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::countmin::CountMinSketch;
    ///
    /// // Overestimate by at most 0.1% of the stream, 99% of the time
    /// let sketch = CountMinSketch::from_error_bounds(0.001, 0.01).unwrap();
    /// assert_eq!(sketch.num_buckets(), 2719);
    /// assert_eq!(sketch.num_hashes(), 5);
    /// ```
    pub fn from_error_bounds(epsilon: f64, delta: f64) -> Result<Self, Error> {
        if !(epsilon > 0.0 && epsilon < 1.0) {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                "epsilon must be in (0, 1)",
            )
            .with_context("epsilon", epsilon));
        }
        if !(delta > 0.0 && delta < 1.0) {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                "delta must be in (0, 1)",
            )
            .with_context("delta", delta));
        }

        Self::new(Self::suggest_num_hashes(delta), Self::suggest_num_buckets(epsilon))
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Records one occurrence of a key.
    pub fn update(&mut self, key: &[u8]) {
        self.update_with_weight(key, 1);
    }

    /// Records `weight` occurrences of a key.
    ///
    /// Counters are monotonically non-decreasing; there is no decay path.
    pub fn update_with_weight(&mut self, key: &[u8], weight: u64) {
        for row in 0..self.num_hashes as usize {
            let cell = self.cell_index(key, row);
            self.table[cell] += weight;
        }
        self.total_weight += weight;
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Returns the estimated frequency of a key.
    ///
    /// Always at least the true frequency; overestimates only when every
    /// row has a colliding key in the same cell.
    pub fn estimate(&self, key: &[u8]) -> u64 {
        let mut min = u64::MAX;
        for row in 0..self.num_hashes as usize {
            min = min.min(self.table[self.cell_index(key, row)]);
        }
        min
    }

    // ========================================================================
    // Set Operations
    // ========================================================================

    /// Merges another sketch into this one by cell-wise addition.
    ///
    /// The merged state is identical to the state obtained by feeding both
    /// streams into a single sketch, which makes merge commutative and
    /// associative and suits per-worker sketches combined after independent
    /// ingestion. Dimensions are checked before any mutation.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DimensionMismatch`] unless both sketches have
    /// the same number of hashes and buckets.
    pub fn merge(&mut self, other: &CountMinSketch) -> Result<(), Error> {
        if self.num_hashes != other.num_hashes || self.num_buckets != other.num_buckets {
            return Err(Error::new(
                ErrorKind::DimensionMismatch,
                "cannot merge sketches of different shapes",
            )
            .with_context("num_hashes", self.num_hashes)
            .with_context("other_num_hashes", other.num_hashes)
            .with_context("num_buckets", self.num_buckets)
            .with_context("other_num_buckets", other.num_buckets));
        }

        for (cell, other_cell) in self.table.iter_mut().zip(&other.table) {
            *cell += *other_cell;
        }
        self.total_weight += other.total_weight;
        Ok(())
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns whether the sketch has seen any updates.
    pub fn is_empty(&self) -> bool {
        self.total_weight == 0
    }

    /// Returns the number of rows / hash functions (d).
    pub fn num_hashes(&self) -> u8 {
        self.num_hashes
    }

    /// Returns the number of counters per row (w).
    pub fn num_buckets(&self) -> u32 {
        self.num_buckets
    }

    /// Returns the sum of all update weights over the stream.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns the size of the counter matrix in bytes, independent of
    /// stream length.
    pub fn memory_usage(&self) -> usize {
        self.table.len() * std::mem::size_of::<u64>()
    }

    // ========================================================================
    // Static Suggestion Methods
    // ========================================================================

    /// Suggests the number of buckets for a relative error target:
    /// `w = ceil(e / epsilon)`.
    pub fn suggest_num_buckets(epsilon: f64) -> u32 {
        (std::f64::consts::E / epsilon).ceil() as u32
    }

    /// Suggests the number of hash functions for a failure probability:
    /// `d = ceil(ln(1 / delta))`.
    pub fn suggest_num_hashes(delta: f64) -> u8 {
        (1.0 / delta).ln().ceil() as u8
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    /// Row-major index of the cell a key maps to in a given row.
    ///
    /// Each row hashes under its own seed rather than combining two base
    /// hashes, so collisions do not correlate across rows.
    fn cell_index(&self, key: &[u8], row: usize) -> usize {
        let col = hash::wide_hash(key, self.row_seeds[row]) % u64::from(self.num_buckets);
        row * self.num_buckets as usize + col as usize
    }
}

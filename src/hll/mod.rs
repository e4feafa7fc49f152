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

//! HyperLogLog sketch implementation for cardinality estimation.
//!
//! Estimates the number of distinct keys in a stream using `2^p` one-byte
//! registers, with a standard error of `1.04 / sqrt(2^p)`. Precision `p`
//! ranges from 4 to 18, trading 16 bytes against 256 KiB of state.
//!
//! Sketches over the same precision merge losslessly by register max, so a
//! stream can be partitioned across workers and the per-worker sketches
//! combined afterwards.
//!
//! # Usage
//!
//! ```rust
//! use streamsketch::hll::HllSketch;
//!
//! let mut sketch = HllSketch::new(12).unwrap();
//! for i in 0..10_000u32 {
//!     sketch.update(&i.to_le_bytes());
//! }
//!
//! let estimate = sketch.estimate();
//! let tolerance = (10_000.0 * 3.0 * sketch.relative_error()) as u64;
//! assert!(estimate.abs_diff(10_000) <= tolerance);
//! ```

mod sketch;
pub use self::sketch::HllSketch;
pub use self::sketch::MAX_PRECISION;
pub use self::sketch::MIN_PRECISION;

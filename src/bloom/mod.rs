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

//! Bloom filters for probabilistic set membership testing.
//!
//! Two variants are provided:
//!
//! - [`BloomFilter`]: the classic bit-array filter. Smallest footprint,
//!   no deletion.
//! - [`CountingBloomFilter`]: saturating counters instead of bits,
//!   supporting removal at 4-8x the space.
//!
//! Both derive their k probe positions from a single 128-bit MurmurHash3
//! digest via the Kirsch-Mitzenmacher construction and guarantee no false
//! negatives under correct usage.
//!
//! # Usage
//!
//! ```rust
//! use streamsketch::bloom::BloomFilter;
//!
//! let mut filter = BloomFilter::with_accuracy(1000, 0.01).unwrap();
//! filter.insert(b"apple");
//!
//! assert!(filter.contains(b"apple"));
//! assert!(!filter.contains(b"grape"));
//! ```

mod counting;
pub use self::counting::CountingBloomFilter;

mod sketch;
pub use self::sketch::BloomFilter;

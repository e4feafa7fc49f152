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

//! Approximate, sublinear-space data structures for stream analytics.
//!
//! Each structure summarizes an unbounded stream in a fixed-size state and
//! answers queries with bounded, quantified error:
//!
//! - [`bloom::BloomFilter`]: set membership, no false negatives
//! - [`bloom::CountingBloomFilter`]: set membership with deletion
//! - [`countmin::CountMinSketch`]: per-key frequency, never undercounts
//! - [`hll::HllSketch`]: distinct-count estimation
//!
//! Keys are byte slices; callers serialize their domain keys to bytes
//! before calling any operation. All structures are single-owner and
//! sequentially accessed, with no internal locking: mutators take
//! `&mut self`, readers take `&self`. The intended scaling strategy for
//! parallel ingestion is one independent same-shaped instance per worker,
//! combined at the end with `merge` (Count-Min and HyperLogLog).
//!
//! # Usage
//!
//! ```rust
//! use streamsketch::bloom::BloomFilter;
//! use streamsketch::hll::HllSketch;
//!
//! let mut seen = BloomFilter::with_accuracy(100_000, 0.01).unwrap();
//! let mut uniques = HllSketch::new(14).unwrap();
//!
//! for event in ["login:alice", "login:bob", "login:alice"] {
//!     seen.insert(event.as_bytes());
//!     uniques.update(event.as_bytes());
//! }
//!
//! assert!(seen.contains(b"login:alice"));
//! assert_eq!(uniques.estimate(), 2);
//! ```

pub mod bloom;
pub mod common;
pub mod countmin;
pub mod error;
pub mod hash;
pub mod hll;

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

use streamsketch::countmin::CountMinSketch;
use streamsketch::error::ErrorKind;

#[test]
fn test_error_bound_holds_on_small_stream() {
    let mut sketch = CountMinSketch::from_error_bounds(0.001, 0.01).unwrap();

    for _ in 0..1000 {
        sketch.update(b"apple");
    }
    for _ in 0..500 {
        sketch.update(b"banana");
    }

    let apple = sketch.estimate(b"apple");
    assert!(apple >= 1000, "estimate must never undercount, got {apple}");

    // epsilon * total_weight = 0.001 * 1500 = 1.5
    let bound = 1000 + (0.001 * sketch.total_weight() as f64).ceil() as u64;
    assert!(
        apple <= bound,
        "estimate {apple} exceeds error bound {bound}"
    );
    assert!(sketch.estimate(b"banana") >= 500);
}

#[test]
fn test_never_undercounts_under_heavy_collisions() {
    // Deliberately undersized sketch so every row collides.
    let mut sketch = CountMinSketch::new(3, 32).unwrap();

    for i in 0..2000u32 {
        sketch.update(format!("filler-{i}").as_bytes());
    }
    sketch.update_with_weight(b"needle", 42);

    assert!(sketch.estimate(b"needle") >= 42);
}

#[test]
fn test_weighted_updates_accumulate() {
    let mut sketch = CountMinSketch::new(5, 1024).unwrap();
    sketch.update_with_weight(b"apple", 10);
    sketch.update_with_weight(b"apple", 5);

    assert!(sketch.estimate(b"apple") >= 15);
    assert_eq!(sketch.total_weight(), 15);
}

#[test]
fn test_unseen_key_on_sparse_sketch() {
    let mut sketch = CountMinSketch::from_error_bounds(0.001, 0.01).unwrap();
    sketch.update(b"only-key");

    // With one update in a 2719-wide table, a disjoint key collides in all
    // five rows with negligible probability.
    assert_eq!(sketch.estimate(b"never-seen"), 0);
}

#[test]
fn test_merge_dimension_mismatch() {
    let mut a = CountMinSketch::new(5, 256).unwrap();
    let b = CountMinSketch::new(3, 256).unwrap();
    assert_eq!(
        a.merge(&b).unwrap_err().kind(),
        ErrorKind::DimensionMismatch
    );
}

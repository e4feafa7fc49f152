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

//! Merge must be commutative and associative cell-for-cell, not just up to
//! estimation error. Distributed aggregation relies on workers being able
//! to combine partial sketches in any grouping.

use streamsketch::countmin::CountMinSketch;
use streamsketch::hll::HllSketch;

fn countmin_parts() -> (CountMinSketch, CountMinSketch, CountMinSketch) {
    let mut a = CountMinSketch::new(5, 512).unwrap();
    let mut b = CountMinSketch::new(5, 512).unwrap();
    let mut c = CountMinSketch::new(5, 512).unwrap();

    for i in 0..300u32 {
        a.update(format!("a-{i}").as_bytes());
        b.update_with_weight(format!("b-{i}").as_bytes(), 2);
        c.update(format!("shared-{}", i % 50).as_bytes());
    }
    (a, b, c)
}

fn hll_parts() -> (HllSketch, HllSketch, HllSketch) {
    let mut a = HllSketch::new(12).unwrap();
    let mut b = HllSketch::new(12).unwrap();
    let mut c = HllSketch::new(12).unwrap();

    for i in 0..3000u32 {
        a.update(format!("a-{i}").as_bytes());
        b.update(format!("b-{i}").as_bytes());
        c.update(format!("a-{}", i / 2).as_bytes());
    }
    (a, b, c)
}

#[test]
fn test_countmin_merge_commutative() {
    let (a, b, _) = countmin_parts();

    let mut ab = a.clone();
    ab.merge(&b).unwrap();
    let mut ba = b.clone();
    ba.merge(&a).unwrap();

    assert_eq!(ab, ba);
}

#[test]
fn test_countmin_merge_associative() {
    let (a, b, c) = countmin_parts();

    let mut left = a.clone();
    left.merge(&b).unwrap();
    left.merge(&c).unwrap();

    let mut bc = b.clone();
    bc.merge(&c).unwrap();
    let mut right = a.clone();
    right.merge(&bc).unwrap();

    let mut reordered = a.clone();
    reordered.merge(&c).unwrap();
    reordered.merge(&b).unwrap();

    assert_eq!(left, right);
    assert_eq!(left, reordered);
    assert_eq!(left.total_weight(), 300 + 600 + 300);
}

#[test]
fn test_hll_merge_commutative() {
    let (a, b, _) = hll_parts();

    let mut ab = a.clone();
    ab.merge(&b).unwrap();
    let mut ba = b.clone();
    ba.merge(&a).unwrap();

    assert_eq!(ab, ba);
}

#[test]
fn test_hll_merge_associative() {
    let (a, b, c) = hll_parts();

    let mut left = a.clone();
    left.merge(&b).unwrap();
    left.merge(&c).unwrap();

    let mut bc = b.clone();
    bc.merge(&c).unwrap();
    let mut right = a.clone();
    right.merge(&bc).unwrap();

    let mut reordered = a.clone();
    reordered.merge(&c).unwrap();
    reordered.merge(&b).unwrap();

    assert_eq!(left, right);
    assert_eq!(left, reordered);
}

#[test]
fn test_hll_merge_is_idempotent() {
    let (a, b, _) = hll_parts();

    let mut once = a.clone();
    once.merge(&b).unwrap();
    let mut twice = once.clone();
    twice.merge(&b).unwrap();

    // Max-of-max absorbs repeated merges of the same partial state.
    assert_eq!(once, twice);
}

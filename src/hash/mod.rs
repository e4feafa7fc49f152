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

//! Hash provider shared by all sketches.
//!
//! Keys enter the library as byte slices; callers serialize their domain
//! keys to bytes before calling any sketch operation. A single
//! MurmurHash3 x64_128 invocation yields two 64-bit digests `(h1, h2)`.
//! The Bloom filters stretch that pair into `k` indices with the
//! Kirsch-Mitzenmacher construction `h1 + i * h2`; the Count-Min sketch
//! re-hashes under an independent seed per row; HyperLogLog splits the
//! single wide digest into an index prefix and a rank suffix.
//!
//! Hashing is total over all byte-string inputs and cannot fail. It only
//! needs good bit dispersion, not unpredictability.

/// Default seed for all hash computations.
///
/// Sketches hashed under different seeds are not comparable, so this is a
/// fixed library-wide constant rather than per-instance state.
pub const DEFAULT_SEED: u32 = 9001;

/// Computes the two 64-bit base hashes of a key from one 128-bit
/// MurmurHash3 digest.
#[inline]
pub fn base_hashes(key: &[u8], seed: u32) -> (u64, u64) {
    mur3::murmurhash3_x64_128(key, seed)
}

/// Computes a single wide 64-bit hash of a key.
#[inline]
pub fn wide_hash(key: &[u8], seed: u32) -> u64 {
    let (h1, _) = mur3::murmurhash3_x64_128(key, seed);
    h1
}

/// Derives the i-th index in `[0, range)` from the two base hashes via
/// Kirsch-Mitzenmacher: `(h1 + i * h2) mod range`.
///
/// Wrapping arithmetic stands in for the modular reduction over 2^64.
#[inline]
pub fn index_at(h1: u64, h2: u64, i: u16, range: u64) -> u64 {
    debug_assert!(range > 0);
    h1.wrapping_add(u64::from(i).wrapping_mul(h2)) % range
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference vectors for MurmurHash3 x64_128 with seed 0, covering tail
    // lengths above, below, and exactly at the 8-byte block boundary.
    #[test]
    fn test_murmur_reference_vectors() {
        let key = "The quick brown fox jumps over the lazy dog";
        let (h1, h2) = base_hashes(key.as_bytes(), 0);
        assert_eq!(h1, 0xe34bbc7bbc071b6c);
        assert_eq!(h2, 0x7a433ca9c49a9347);

        // change one bit
        let key = "The quick brown fox jumps over the lazy eog";
        let (h1, h2) = base_hashes(key.as_bytes(), 0);
        assert_eq!(h1, 0x362108102c62d1c9);
        assert_eq!(h2, 0x3285cd100292b305);

        // remainder = 8
        let key = "The quick brown fox jumps over the lazy1";
        let (h1, h2) = base_hashes(key.as_bytes(), 0);
        assert_eq!(h1, 0xe3301a827e5cdfe3);
        assert_eq!(h2, 0xbdbf05f8da0f0392);

        // remainder = 0
        let key = "The quick brown fox jumps over t";
        let (h1, h2) = base_hashes(key.as_bytes(), 0);
        assert_eq!(h1, 0xdf6af91bb29bdacf);
        assert_eq!(h2, 0x91a341c58df1f3a6);
    }

    #[test]
    fn test_wide_hash_is_first_base_hash() {
        let key = b"stream-key";
        let (h1, _) = base_hashes(key, DEFAULT_SEED);
        assert_eq!(wide_hash(key, DEFAULT_SEED), h1);
    }

    #[test]
    fn test_index_at_stays_in_range() {
        let (h1, h2) = base_hashes(b"bounded", DEFAULT_SEED);
        for i in 0..64 {
            assert!(index_at(h1, h2, i, 1021) < 1021);
        }
    }

    #[test]
    fn test_index_at_zeroth_is_h1_mod_range() {
        let (h1, h2) = base_hashes(b"anchor", DEFAULT_SEED);
        assert_eq!(index_at(h1, h2, 0, 997), h1 % 997);
    }

    #[test]
    fn test_seed_changes_digest() {
        let key = b"salted";
        assert_ne!(base_hashes(key, 0), base_hashes(key, 1));
    }
}

//! Approximate fingerprint lookup: MinHash signatures over character sets,
//! banded LSH for threshold queries.
//!
//! Fingerprints whose *character sets* are similar are close in edit
//! distance far more often than random strings, which is all the candidate
//! shortlist needs - every candidate still has to clear the exact fuzzy
//! threshold afterwards. Recall matters here, precision does not.
//!
//! Everything is deterministic: fixed permutation seeds, keys returned in
//! insertion order. Two runs over the same input produce the same shortlist.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

/// Number of MinHash permutations per signature.
pub(crate) const NUM_PERMUTATIONS: usize = 128;

/// Fixed per-permutation seeds, one splitmix64 stream.
static SEEDS: LazyLock<[u64; NUM_PERMUTATIONS]> = LazyLock::new(|| {
    let mut seeds = [0u64; NUM_PERMUTATIONS];
    let mut state: u64 = 0x517c_c1b7_2722_0a95;
    for seed in seeds.iter_mut() {
        state = splitmix64(state);
        *seed = state;
    }
    seeds
});

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// MinHash signature of a fingerprint's set of distinct characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSketch {
    mins: [u64; NUM_PERMUTATIONS],
}

impl CharSketch {
    /// Sketch the distinct characters of `fingerprint`. Duplicate characters
    /// cannot change a minimum, so no explicit set is built.
    pub fn of(fingerprint: &str) -> Self {
        let mut mins = [u64::MAX; NUM_PERMUTATIONS];
        for c in fingerprint.chars() {
            let base = splitmix64(c as u64);
            for (min, seed) in mins.iter_mut().zip(SEEDS.iter()) {
                let hashed = splitmix64(base ^ seed);
                if hashed < *min {
                    *min = hashed;
                }
            }
        }
        Self { mins }
    }

    /// Estimated Jaccard similarity of the underlying character sets.
    pub fn similarity(&self, other: &Self) -> f64 {
        let matching = self
            .mins
            .iter()
            .zip(other.mins.iter())
            .filter(|(a, b)| a == b)
            .count();
        matching as f64 / NUM_PERMUTATIONS as f64
    }
}

/// Banded LSH index over [`CharSketch`] signatures.
///
/// `insert` files a key under one bucket per band; `query` returns every key
/// sharing at least one bucket with the probe, in insertion order.
#[derive(Debug, Clone)]
pub struct SketchIndex {
    bands: usize,
    rows: usize,
    keys: Vec<String>,
    buckets: HashMap<(usize, u64), Vec<u32>>,
}

impl SketchIndex {
    /// Build an empty index tuned so that pairs at the given similarity
    /// threshold are likely to share a band.
    pub fn new(threshold: f64) -> Self {
        let (bands, rows) = band_split(threshold.clamp(0.0, 1.0));
        Self {
            bands,
            rows,
            keys: Vec::new(),
            buckets: HashMap::new(),
        }
    }

    /// File `key` under its band buckets.
    pub fn insert(&mut self, key: String, sketch: &CharSketch) {
        let id = self.keys.len() as u32;
        for (band, hash) in self.band_hashes(sketch) {
            self.buckets.entry((band, hash)).or_default().push(id);
        }
        self.keys.push(key);
    }

    /// All keys colliding with the probe in at least one band, in insertion
    /// order.
    pub fn query(&self, sketch: &CharSketch) -> Vec<&str> {
        let mut ids: BTreeSet<u32> = BTreeSet::new();
        for (band, hash) in self.band_hashes(sketch) {
            if let Some(bucket) = self.buckets.get(&(band, hash)) {
                ids.extend(bucket.iter().copied());
            }
        }
        ids.into_iter()
            .map(|id| self.keys[id as usize].as_str())
            .collect()
    }

    /// Number of keys in the index.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn band_hashes(&self, sketch: &CharSketch) -> Vec<(usize, u64)> {
        let mut hashes = Vec::with_capacity(self.bands);
        for band in 0..self.bands {
            let mut hash = splitmix64(band as u64 ^ 0x6b65_7973);
            for slot in &sketch.mins[band * self.rows..(band + 1) * self.rows] {
                hash = splitmix64(hash ^ slot);
            }
            hashes.push((band, hash));
        }
        hashes
    }
}

/// Pick the `(bands, rows)` split of the signature whose collision threshold
/// `(1/b)^(1/r)` lands closest to the requested one.
fn band_split(threshold: f64) -> (usize, usize) {
    let mut best = (NUM_PERMUTATIONS, 1);
    let mut best_error = f64::MAX;

    let mut rows = 1;
    while rows <= NUM_PERMUTATIONS {
        let bands = NUM_PERMUTATIONS / rows;
        let collision_threshold = (1.0 / bands as f64).powf(1.0 / rows as f64);
        let error = (collision_threshold - threshold).abs();
        if error < best_error {
            best_error = error;
            best = (bands, rows);
        }
        rows *= 2;
    }

    best
}

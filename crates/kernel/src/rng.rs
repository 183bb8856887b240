//! Seeded randomness.
//!
//! Both functions here are part of the world schema: changing either formula
//! regenerates every deployed world differently.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-wide world seed. Set once at world creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldSeed(pub u32);

impl WorldSeed {
    /// Derive a seed from a phrase (FNV-1a, 32-bit, over the UTF-8 bytes).
    pub fn from_phrase(phrase: &str) -> Self {
        let mut h: u32 = 0x811c_9dc5;
        for &b in phrase.as_bytes() {
            h ^= b as u32;
            h = h.wrapping_mul(0x0100_0193);
        }
        Self(h)
    }
}

impl From<u32> for WorldSeed {
    fn from(seed: u32) -> Self {
        Self(seed)
    }
}

impl fmt::Display for WorldSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Combine the world seed with a sector coordinate into a per-sector seed.
pub fn coord_hash(seed: WorldSeed, x: i32, y: i32) -> u32 {
    let mut h = seed.0
        ^ (x as u32).wrapping_mul(374_761_393)
        ^ (y as u32).wrapping_mul(668_265_263);
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^ (h >> 16)
}

/// Mulberry32: a 32-bit counter mixed through two xor-shift/multiply rounds.
///
/// Every helper below consumes exactly one [`Mulberry32::next_f64`] draw so
/// the stream position of each generation step stays easy to reason about.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(state: u32) -> Self {
        Self { state }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        (t ^ (t >> 14)) as f64 / 4_294_967_296.0
    }

    /// Uniform float in `[min, max)`.
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform integer in `[min, max]`.
    pub fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        let span = (max - min) as f64 + 1.0;
        min + (self.next_f64() * span).floor() as u32
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform angle in `[0, 2π)`.
    pub fn angle(&mut self) -> f64 {
        self.next_f64() * std::f64::consts::TAU
    }

    /// Uniformly chosen element. Panics on an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let i = (self.next_f64() * items.len() as f64).floor() as usize;
        &items[i.min(items.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_hash_is_stable() {
        let seed = WorldSeed(42);
        assert_eq!(coord_hash(seed, 0, 0), coord_hash(seed, 0, 0));
        assert_eq!(coord_hash(seed, -3, 8), coord_hash(seed, -3, 8));
    }

    #[test]
    fn coord_hash_separates_neighbours() {
        let seed = WorldSeed(42);
        let h = coord_hash(seed, 0, 0);
        assert_ne!(h, coord_hash(seed, 1, 0));
        assert_ne!(h, coord_hash(seed, 0, 1));
        assert_ne!(coord_hash(seed, 1, 0), coord_hash(seed, 0, 1));
        assert_ne!(h, coord_hash(WorldSeed(43), 0, 0));
    }

    #[test]
    fn coord_hash_known_value() {
        // seed 0 at the origin: h = 0, mixes to 0.
        assert_eq!(coord_hash(WorldSeed(0), 0, 0), 0);
        // seed 1 at the origin: (1 ^ 0) * 1274126177, then ^ >> 16.
        let h: u32 = 1_274_126_177;
        assert_eq!(coord_hash(WorldSeed(1), 0, 0), h ^ (h >> 16));
    }

    #[test]
    fn coord_hash_golden_values() {
        // Frozen: every deployed world depends on these.
        assert_eq!(coord_hash(WorldSeed(42), 3, -7), 3_321_372_387);
        assert_eq!(coord_hash(WorldSeed(42), 0, 0), 1_973_702_734);
        assert_eq!(coord_hash(WorldSeed(7), -1, 2), 3_728_207_779);
    }

    #[test]
    fn mulberry_golden_stream() {
        let mut rng = Mulberry32::new(42);
        let expected: [u64; 3] = [
            0x3fe3_3c3d_ef80_0000,
            0x3fdc_b0ca_e280_0000,
            0x3feb_4766_5800_0000,
        ];
        for bits in expected {
            assert_eq!(rng.next_f64().to_bits(), bits);
        }
    }

    #[test]
    fn mulberry_same_state_same_stream() {
        let mut a = Mulberry32::new(1234);
        let mut b = Mulberry32::new(1234);
        for _ in 0..1000 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn mulberry_values_in_unit_interval() {
        let mut rng = Mulberry32::new(0);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn mulberry_known_first_value() {
        // Mulberry32 seeded with 0, worked by hand from the reference steps.
        let state: u32 = 0x6d2b_79f5;
        let mut t = (state ^ (state >> 15)).wrapping_mul(state | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let expected = (t ^ (t >> 14)) as f64 / 4_294_967_296.0;

        let mut rng = Mulberry32::new(0);
        assert_eq!(rng.next_f64(), expected);
        assert_eq!(rng.state, state);
    }

    #[test]
    fn range_inclusive_hits_both_ends() {
        let mut rng = Mulberry32::new(99);
        let mut seen = [false; 3];
        for _ in 0..1000 {
            let v = rng.range_inclusive(2, 4);
            assert!((2..=4).contains(&v));
            seen[(v - 2) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(rng.range_inclusive(7, 7), 7);
    }

    #[test]
    fn pick_stays_in_bounds() {
        let mut rng = Mulberry32::new(5);
        let items = ["a", "b", "c"];
        for _ in 0..500 {
            assert!(items.contains(rng.pick(&items)));
        }
    }

    #[test]
    fn phrase_seed_is_stable() {
        assert_eq!(
            WorldSeed::from_phrase("andromeda"),
            WorldSeed::from_phrase("andromeda")
        );
        assert_ne!(
            WorldSeed::from_phrase("andromeda"),
            WorldSeed::from_phrase("andromedb")
        );
        // FNV-1a offset basis for the empty string.
        assert_eq!(WorldSeed::from_phrase("").0, 0x811c_9dc5);
    }
}

//! A seeded, deterministic linear-congruential generator.
//!
//! Spec.md §5 requires the exact update formula below so that two engines
//! given the same seed produce byte-identical sequences; this rules out
//! using the `rand` crate's default generators, whose internals aren't
//! part of any stability contract. Injected into the engine so tests can
//! stub it with a fixed sequence.

/// The multiplier from Knuth's MMIX generator, as named by the spec.
const MULTIPLIER: u64 = 6364136223846793005;
const INCREMENT: u64 = 1;

/// A minimal `state = state * MULTIPLIER + INCREMENT (mod 2^64)` generator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Lcg64 {
    state: u64,
}

impl Lcg64 {
    pub fn new(seed: u64) -> Self {
        Lcg64 { state: seed }
    }

    /// Advance the generator and return the new raw 64-bit state.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        self.state
    }

    /// A uniform integer in `0..bound`, or 0 if `bound` is 0.
    pub fn next_below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        self.next_u64() % bound
    }

    /// True with probability `numerator / denominator`.
    pub fn chance(&mut self, numerator: u64, denominator: u64) -> bool {
        if denominator == 0 {
            return false;
        }
        self.next_below(denominator) < numerator
    }

    /// The generator's current raw state, for save/restore.
    pub fn state(&self) -> u64 {
        self.state
    }

    pub fn from_state(state: u64) -> Self {
        Lcg64 { state }
    }
}

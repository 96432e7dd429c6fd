//! Deterministic per-behavior RNG.
//!
//! # Determinism strategy
//!
//! Each behavior that needs randomness (today only the ballistic escape uses
//! it for per-cycle jitter) gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (slot * MIXING_CONSTANT)
//!
//! where `slot` is the behavior's index in its mode's registration list.  The
//! mixing constant is the 64-bit fractional part of the golden ratio, which
//! spreads consecutive slots uniformly across the seed space.  This means:
//!
//! - Behaviors never share RNG state, so adding a behavior to a mode does not
//!   change the jitter sequence of the others.
//! - The same seed and the same tick inputs always replay the same maneuvers.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-behavior deterministic RNG.
pub struct BehaviorRng(SmallRng);

impl BehaviorRng {
    /// Seed deterministically from the run's global seed and a slot index.
    pub fn new(global_seed: u64, slot: u32) -> Self {
        let seed = global_seed ^ (slot as u64).wrapping_mul(MIXING_CONSTANT);
        BehaviorRng(SmallRng::seed_from_u64(seed))
    }

    /// Multiplicative jitter factor drawn uniformly from
    /// `[1 - spread, 1 + spread]`; `spread` is clamped to `[0, 1]`.
    #[inline]
    pub fn jitter(&mut self, spread: f64) -> f64 {
        let spread = spread.clamp(0.0, 1.0);
        if spread == 0.0 {
            return 1.0;
        }
        self.0.gen_range(1.0 - spread..=1.0 + spread)
    }

    /// `+1.0` or `-1.0` with equal probability.
    #[inline]
    pub fn sign(&mut self) -> f64 {
        if self.0.r#gen::<bool>() { 1.0 } else { -1.0 }
    }
}

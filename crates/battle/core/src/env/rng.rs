//! Deterministic random rolls.
//!
//! Every roll is derived from the match seed, a monotonically increasing roll
//! nonce kept in the world, and a context tag, so a match replays exactly
//! given the same seed and the same frame deltas.

/// RNG oracle for deterministic random number generation.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform value in `[0, 1)`.
    fn unit_f32(&self, seed: u64) -> f32 {
        // 24 bits keep the result exactly representable.
        (self.next_u32(seed) >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform value in `[min, max)`. Returns `min` for empty ranges.
    fn range_f32(&self, seed: u64, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + self.unit_f32(seed) * (max - min)
    }

    /// Rolls against a probability in `[0, 1]`.
    fn chance(&self, seed: u64, probability: f32) -> bool {
        if probability >= 1.0 {
            return true;
        }
        if probability <= 0.0 {
            return false;
        }
        self.unit_f32(seed) <= probability
    }
}

/// PCG-XSH-RR: 64-bit LCG state with a permuted 32-bit output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Roll purposes, mixed into the seed so that two rolls with the same nonce
/// but different purposes stay independent.
pub mod roll {
    pub const TRIGGER_CHANCE: u32 = 1;
    pub const TELEPORT_X: u32 = 2;
    pub const TELEPORT_Y: u32 = 3;
    pub const SPAWN_JITTER: u32 = 4;
}

/// Combines the match seed, roll nonce, unit id and purpose into one seed.
pub fn compute_seed(match_seed: u64, nonce: u64, unit: u32, context: u32) -> u64 {
    const PRIME1: u64 = 0x9E3779B97F4A7C15;
    const PRIME2: u64 = 0xBF58476D1CE4E5B9;
    const PRIME3: u64 = 0x94D049BB133111EB;

    let mut hash = match_seed;
    hash ^= nonce.wrapping_mul(PRIME1);
    hash = hash.rotate_left(31).wrapping_mul(PRIME2);
    hash ^= u64::from(unit).wrapping_mul(PRIME3);
    hash = hash.rotate_left(27).wrapping_mul(PRIME1);
    hash ^= u64::from(context);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(PRIME2);
    hash ^= hash >> 29;
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcg_is_deterministic() {
        let rng = PcgRng;
        assert_eq!(rng.next_u32(42), rng.next_u32(42));
        assert_ne!(rng.next_u32(42), rng.next_u32(43));
    }

    #[test]
    fn unit_float_stays_in_range() {
        let rng = PcgRng;
        for nonce in 0..500 {
            let value = rng.unit_f32(compute_seed(7, nonce, 1, roll::TRIGGER_CHANCE));
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn certain_chances_short_circuit() {
        let rng = PcgRng;
        assert!(rng.chance(1, 1.0));
        assert!(!rng.chance(1, 0.0));
    }

    #[test]
    fn context_changes_seed() {
        assert_ne!(
            compute_seed(1, 1, 1, roll::TELEPORT_X),
            compute_seed(1, 1, 1, roll::TELEPORT_Y)
        );
    }
}

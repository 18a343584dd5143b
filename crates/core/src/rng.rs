//! RNG module - short correlation ids
//!
//! Rematch requests carry a short random id so a response can be matched to
//! the request it answers. Ids are drawn from a small LCG, so a fixed seed
//! gives a reproducible sequence in tests.

/// Length of generated ids
pub const ID_LEN: usize = 7;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // High bits of an LCG are the well-mixed ones.
        (self.next_u32() >> 16) % max
    }

    /// A fresh lowercase base-36 id of [`ID_LEN`] characters
    pub fn next_id(&mut self) -> String {
        (0..ID_LEN)
            .map(|_| BASE36[self.next_range(BASE36.len() as u32) as usize] as char)
            .collect()
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);
        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn test_ids_are_short_base36() {
        let mut rng = SimpleRng::new(42);
        for _ in 0..50 {
            let id = rng.next_id();
            assert_eq!(id.len(), ID_LEN);
            assert!(id.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_consecutive_ids_differ() {
        let mut rng = SimpleRng::new(7);
        let a = rng.next_id();
        let b = rng.next_id();
        assert_ne!(a, b);
    }
}

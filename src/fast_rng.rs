// Fast PCG-LCG random number stream with skip-ahead
//
// Each worker thread should own its own stream. `FastRng::for_stream` jumps
// the LCG so that streams built from the same seed never overlap for fewer
// than STREAM_STRIDE draws each.

use rand::{RngCore, SeedableRng};

/// LCG multiplier
const PRN_MULT: u64 = 6364136223846793005;
/// LCG additive constant
const PRN_ADD: u64 = 1442695040888963407;
/// Number of draws reserved for each stream
pub const STREAM_STRIDE: u64 = 1 << 40;

/// Fast RNG built on a 64-bit LCG with an RXS-M-XS output permutation.
///
/// Implements [`RngCore`] so it can be handed to any sampling routine that is
/// generic over `rand::Rng`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FastRng {
    state: u64,
}

impl FastRng {
    /// Create a new FastRng with the given seed
    #[inline]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Create the `stream`-th independent stream derived from `seed`
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        let mut rng = Self::new(seed);
        rng.skip_ahead(stream.wrapping_mul(STREAM_STRIDE));
        rng
    }

    /// Advance the stream by `n` draws in O(log n)
    pub fn skip_ahead(&mut self, mut n: u64) {
        let mut g = PRN_MULT;
        let mut c = PRN_ADD;
        let mut g_new: u64 = 1;
        let mut c_new: u64 = 0;

        while n > 0 {
            if n & 1 == 1 {
                g_new = g_new.wrapping_mul(g);
                c_new = c_new.wrapping_mul(g).wrapping_add(c);
            }
            c = g.wrapping_add(1).wrapping_mul(c);
            g = g.wrapping_mul(g);
            n >>= 1;
        }

        self.state = g_new.wrapping_mul(self.state).wrapping_add(c_new);
    }

    /// Generate a random f64 in [0, 1)
    #[inline(always)]
    pub fn random(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Reseed the stream
    #[inline]
    pub fn reseed(&mut self, seed: u64) {
        self.state = seed;
    }

    #[inline(always)]
    fn step(&mut self) -> u64 {
        self.state = PRN_MULT.wrapping_mul(self.state).wrapping_add(PRN_ADD);
        let word = ((self.state >> ((self.state >> 59) + 5)) ^ self.state)
            .wrapping_mul(12605985483714917081);
        (word >> 43) ^ word
    }
}

impl SeedableRng for FastRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }
}

impl RngCore for FastRng {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

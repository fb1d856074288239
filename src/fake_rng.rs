// Deterministic random stream that replays a fixed list of values

use rand::RngCore;

const SCALE: f64 = (1u64 << 53) as f64;

/// Replays a fixed sequence of numbers in [0, 1) through `Rng::gen::<f64>()`.
///
/// Values are encoded into the top 53 bits of each `next_u64` so that the
/// standard `f64` conversion returns the nearest representable value not
/// above the requested one. The sequence wraps around once exhausted.
#[derive(Clone, Debug)]
pub struct FakeRng {
    values: Vec<f64>,
    position: usize,
}

impl FakeRng {
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "FakeRng needs at least one value");
        assert!(
            values.iter().all(|v| (0.0..1.0).contains(v)),
            "FakeRng values must lie in [0, 1)"
        );
        FakeRng { values, position: 0 }
    }

    /// Number of values drawn so far
    pub fn position(&self) -> usize {
        self.position
    }

    fn next_value(&mut self) -> f64 {
        let v = self.values[self.position % self.values.len()];
        self.position += 1;
        v
    }
}

impl RngCore for FakeRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let mantissa = (self.next_value() * SCALE) as u64;
        mantissa.min((1u64 << 53) - 1) << 11
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

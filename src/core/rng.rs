// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector2f };

use rand::rngs::SmallRng;
use rand::{ Rng, SeedableRng };

/// Per-path uniform random stream.
///
/// Every independent render context owns one; the estimator threads it
/// through explicitly so no stream is ever shared between threads.
#[derive(Debug, Clone)]
pub struct PathRng {
    inner: SmallRng,
}

impl PathRng {
    pub fn new(seed: u64) -> Self {
        Self { inner: SmallRng::seed_from_u64(seed) }
    }

    /// Stream for one pixel of a render seeded with `seed`.
    pub fn for_pixel(seed: u64, x: usize, y: usize) -> Self {
        let key = ((seed & 0xFFFF_FFFF) << 32)
            | (((y as u64) & 0xFFFF) << 16)
            | ((x as u64) & 0xFFFF);
        Self::new(key)
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f32(&mut self) -> Float {
        self.inner.gen::<Float>()
    }

    pub fn next_2d(&mut self) -> Vector2f {
        Vector2f::new(self.next_f32(), self.next_f32())
    }
}

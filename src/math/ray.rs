// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f, FLOAT_MAX };

/// A half-open ray segment `origin + t * dir` for `t` in `[min_t, max_t]`.
///
/// The direction is normalized on construction, so `t` is always a
/// world-space distance from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    min_t: Float,
    max_t: Float,
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(FLOAT_MAX) }
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn min_t(&self) -> Float {
        self.min_t
    }

    pub fn max_t(&self) -> Float {
        self.max_t
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    pub fn test_segment(&self, t: Float) -> bool {
        t >= self.min_t && t <= self.max_t
    }
}

#[cfg(test)]
mod tests {
    use super::{ Ray3f, Vector3f };
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ray3f_normalizes_direction() {
        let o = Vector3f::new(0.0, 0.0, 0.0);
        let d = Vector3f::new(1.0, 0.0, 1.0);
        let ray = Ray3f::new(o, d, None, None);
        assert_eq!(o, ray.origin());
        assert_abs_diff_eq!(ray.dir().norm(), 1.0, epsilon = 1e-6);

        let p = ray.at(std::f32::consts::SQRT_2);
        assert_abs_diff_eq!(p.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_ray3f_segment() {
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 1.0, 0.0), Some(0.5), Some(10.0));
        assert!(!ray.test_segment(0.25));
        assert!(ray.test_segment(0.5));
        assert!(ray.test_segment(10.0));
        assert!(!ray.test_segment(10.5));
    }
}

// Copyright @yucwang 2023

use crate::math::constants::Vector3f;

/// Orthonormal shading frame with `n` as the local +z axis.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    s: Vector3f,
    t: Vector3f,
    n: Vector3f
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            s: Vector3f::new(1.0, 0.0, 0.0),
            t: Vector3f::new(0.0, 1.0, 0.0),
            n: Vector3f::new(0.0, 0.0, 1.0)
        }
    }
}

impl Frame {
    pub fn from_normal(n: &Vector3f) -> Frame {
        let t = if n.x.abs() > n.y.abs() {
            Vector3f::new(n.z, 0.0, -n.x) / (n.x * n.x + n.z * n.z).sqrt()
        } else {
            Vector3f::new(0.0, n.z, -n.y) / (n.y * n.y + n.z * n.z).sqrt()
        };
        let s = t.cross(n);

        Frame { s, t, n: *n }
    }

    pub fn n(&self) -> Vector3f {
        self.n
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.s), v.dot(&self.t), v.dot(&self.n))
    }

    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        v.x * self.s + v.y * self.t + v.z * self.n
    }
}

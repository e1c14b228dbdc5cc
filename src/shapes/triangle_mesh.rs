// Copyright @yucwang 2023

use super::triangle::Triangle;

use crate::core::bvh::BVH;
use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::core::shape::Shape;
use crate::io::obj_utils::{ self, ObjLoadError };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::warp::square_to_triangle;

use std::path::Path;

/// A mesh instance: triangles behind their own BVH, sampled as one surface.
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    tri_areas: Vec<Float>,
    total_area: Float,
    bounds: AABB,
    bvh: BVH,
}

impl TriangleMesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let tri_areas: Vec<Float> = triangles.iter().map(|t| t.surface_area()).collect();
        let total_area = tri_areas.iter().sum();
        let mut bounds = AABB::default();
        for tri in &triangles {
            bounds.expand_by_aabb(&tri.bounding_box());
        }
        let bvh = BVH::new(triangles.iter().map(|t| t.bounding_box()).collect());

        Self { triangles, tri_areas, total_area, bounds, bvh }
    }

    /// Planar quad `p0 p1 p2 p3`, normal from the winding of `p0 p1 p2`.
    pub fn quad(p0: Vector3f, p1: Vector3f, p2: Vector3f, p3: Vector3f) -> Self {
        Self::new(vec![Triangle::new(p0, p1, p2), Triangle::new(p0, p2, p3)])
    }

    pub fn from_obj<P: AsRef<Path>>(path: P,
                                    scale: &Vector3f,
                                    translate: &Vector3f) -> Result<Self, ObjLoadError> {
        let triangles = obj_utils::load_triangles_from_file(path)?
            .iter()
            .map(|tri| tri.apply_transform(scale, translate))
            .collect();
        Ok(Self::new(triangles))
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }
}

impl Shape for TriangleMesh {
    fn bounding_box(&self) -> AABB {
        self.bounds
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (idx, hit) = self.bvh.ray_intersection(ray, |prim_idx, ray| {
            self.triangles[prim_idx].ray_intersection(ray).map(|h| {
                let t = h.t();
                (h, t)
            })
        })?;

        Some(hit.with_prim_index(idx))
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        if self.triangles.is_empty() || self.total_area <= 0.0 {
            let intersection = SurfaceIntersection::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), 0.0);
            return SurfaceSampleRecord::new(intersection, 0.0);
        }

        // Pick a triangle by area with u.x, then reuse the remainder of u.x.
        let target = u.x * self.total_area;
        let mut accum = 0.0;
        let mut idx = self.triangles.len() - 1;
        for (i, area) in self.tri_areas.iter().enumerate() {
            accum += *area;
            if target <= accum {
                idx = i;
                break;
            }
        }

        let tri_area = self.tri_areas[idx].max(1e-6);
        let rescaled = ((target - (accum - tri_area)) / tri_area).max(0.0).min(0.999999);
        let bary = square_to_triangle(&Vector2f::new(rescaled, u.y));
        let tri = &self.triangles[idx];
        let intersection = SurfaceIntersection::new(tri.point_at(&bary), tri.geometric_normal(), 0.0)
            .with_prim_index(idx);

        SurfaceSampleRecord::new(intersection, 1.0 / self.total_area)
    }

    fn surface_area(&self) -> Float {
        self.total_area
    }
}

// Copyright @yucwang 2023

use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f };
use crate::math::ray::Ray3f;

pub trait Shape: Send + Sync {
    fn bounding_box(&self) -> AABB;

    /// Closest hit inside the ray segment, if any.
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection>;

    /// Uniform point on the surface; the pdf is with respect to area.
    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord;

    fn surface_area(&self) -> Float;
}

// Copyright @yucwang 2023

use crate::core::scene::ObjectId;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// Nearest-hit record of a ray query.
///
/// `object` is a handle into the owning scene's object list. Shapes fill
/// in the geometric part; the scene stamps emission and object id.
#[derive(Debug, Clone)]
pub struct SurfaceIntersection {
    p: Vector3f,
    normal: Vector3f,
    t: Float,
    le: RGBSpectrum,
    object: Option<ObjectId>,
    prim_index: Option<usize>,
}

/// A point drawn on a surface together with its area-measure density.
#[derive(Debug, Clone)]
pub struct SurfaceSampleRecord {
    intersection: SurfaceIntersection,
    pdf: Float,
}

impl SurfaceIntersection {
    pub fn new(p: Vector3f, normal: Vector3f, t: Float) -> Self {
        Self { p, normal, t, le: RGBSpectrum::default(), object: None, prim_index: None }
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    /// Distance from the ray origin.
    pub fn t(&self) -> Float {
        self.t
    }

    pub fn le(&self) -> RGBSpectrum {
        self.le
    }

    pub fn object(&self) -> Option<ObjectId> {
        self.object
    }

    pub fn prim_index(&self) -> Option<usize> {
        self.prim_index
    }

    pub fn with_le(mut self, le: RGBSpectrum) -> Self {
        self.le = le;
        self
    }

    pub fn with_object(mut self, object: ObjectId) -> Self {
        self.object = Some(object);
        self
    }

    pub fn with_prim_index(mut self, prim_index: usize) -> Self {
        self.prim_index = Some(prim_index);
        self
    }
}

impl SurfaceSampleRecord {
    pub fn new(intersection: SurfaceIntersection, pdf: Float) -> Self {
        Self { intersection, pdf }
    }

    pub fn intersection(&self) -> &SurfaceIntersection {
        &self.intersection
    }

    pub fn into_intersection(self) -> SurfaceIntersection {
        self.intersection
    }

    pub fn pdf(&self) -> Float {
        self.pdf
    }
}

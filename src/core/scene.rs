// Copyright @yucwang 2026

use crate::core::bsdf::BSDF;
use crate::core::bvh::BVH;
use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::core::rng::PathRng;
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

use std::sync::Arc;
use thiserror::Error;

/// Handle of an object inside its [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("scene contains no objects")]
    EmptyScene,
    #[error("scene contains no emissive objects, direct lighting is undefined")]
    NoEmitters,
}

pub struct SceneObject {
    shape: Arc<dyn Shape>,
    material: Arc<dyn BSDF>,
    name: Option<String>,
}

impl SceneObject {
    pub fn new(shape: Arc<dyn Shape>, material: Arc<dyn BSDF>) -> Self {
        Self { shape, material, name: None }
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn shape(&self) -> &dyn Shape {
        self.shape.as_ref()
    }

    pub fn material(&self) -> &dyn BSDF {
        self.material.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn has_emit(&self) -> bool {
        self.material.has_emission()
    }

    pub fn emission(&self) -> RGBSpectrum {
        self.material.emission()
    }
}

/// Collects objects before the acceleration structure exists.
#[derive(Default)]
pub struct SceneBuilder {
    objects: Vec<SceneObject>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Builds the BVH once and freezes the scene.
    ///
    /// Scenes without any emitter are rejected: next event estimation has
    /// nothing to sample.
    pub fn build(self) -> Result<Scene, SceneError> {
        if self.objects.is_empty() {
            return Err(SceneError::EmptyScene);
        }

        let emitters: Vec<ObjectId> = self.objects.iter()
            .enumerate()
            .filter(|(_, object)| object.has_emit())
            .map(|(idx, _)| ObjectId(idx))
            .collect();
        let emit_area: Float = emitters.iter()
            .map(|id| self.objects[id.0].shape.surface_area())
            .sum();
        if emitters.is_empty() || emit_area <= 0.0 {
            return Err(SceneError::NoEmitters);
        }

        log::info!("Generating BVH over {} objects.", self.objects.len());
        let bvh = BVH::new(self.objects.iter().map(|o| o.shape.bounding_box()).collect());
        log::info!("Scene ready: {} emitters, total emissive area {:.4}.", emitters.len(), emit_area);

        Ok(Scene { objects: self.objects, emitters, emit_area, bvh })
    }
}

/// Immutable render-time scene: object arena, emissive subset and BVH.
pub struct Scene {
    objects: Vec<SceneObject>,
    emitters: Vec<ObjectId>,
    emit_area: Float,
    bvh: BVH,
}

impl Scene {
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> &SceneObject {
        &self.objects[id.0]
    }

    pub fn emitters(&self) -> &[ObjectId] {
        &self.emitters
    }

    pub fn emit_area(&self) -> Float {
        self.emit_area
    }

    pub fn bounds(&self) -> AABB {
        self.bvh.bounds()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Material of the object a hit belongs to.
    pub fn material(&self, hit: &SurfaceIntersection) -> Option<&dyn BSDF> {
        hit.object().map(|id| self.object(id).material())
    }

    pub fn is_emissive(&self, hit: &SurfaceIntersection) -> bool {
        hit.object().map_or(false, |id| self.object(id).has_emit())
    }

    /// Nearest hit along `ray`, stamped with the hit object's id and emission.
    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (idx, hit) = self.bvh.ray_intersection(ray, |prim_idx, ray| {
            self.objects[prim_idx].shape.ray_intersection(ray).map(|h| {
                let t = h.t();
                (h, t)
            })
        })?;

        let object = &self.objects[idx];
        Some(hit.with_le(object.emission()).with_object(ObjectId(idx)))
    }

    /// Picks an emitter with probability proportional to its area, then a
    /// uniform point on it.
    ///
    /// The returned pdf is the chosen emitter's own `1 / area`; it is not
    /// scaled by the selection probability.
    pub fn sample_light(&self, rng: &mut PathRng) -> Option<SurfaceSampleRecord> {
        let (&last, _) = self.emitters.split_last()?;
        if self.emit_area <= 0.0 {
            return None;
        }

        let target = rng.next_f32() * self.emit_area;
        let mut accum = 0.0;
        let mut chosen = last;
        for &id in &self.emitters {
            accum += self.objects[id.0].shape.surface_area();
            if target <= accum {
                chosen = id;
                break;
            }
        }

        let object = &self.objects[chosen.0];
        let sample = object.shape.sample(&rng.next_2d());
        let pdf = sample.pdf();
        let intersection = sample.into_intersection()
            .with_le(object.emission())
            .with_object(chosen);
        Some(SurfaceSampleRecord::new(intersection, pdf))
    }
}

// Copyright @yucwang 2023

use crate::core::rng::PathRng;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

// All directions are world space and point away from the surface:
// `wo` toward the viewer, `wi` toward the light.
pub trait BSDF: Send + Sync {
    fn eval(&self, wi: &Vector3f, wo: &Vector3f, n: &Vector3f) -> RGBSpectrum;

    /// Draws an incident direction `wi` for the outgoing direction `wo`.
    fn sample(&self, wo: &Vector3f, n: &Vector3f, rng: &mut PathRng) -> Vector3f;

    /// Solid-angle density of `sample` producing `wi`. Zero outside its support.
    fn pdf(&self, wo: &Vector3f, wi: &Vector3f, n: &Vector3f) -> Float;

    fn emission(&self) -> RGBSpectrum {
        RGBSpectrum::default()
    }

    fn has_emission(&self) -> bool {
        !self.emission().is_black()
    }
}

// Copyright @yucwang 2023

use crate::core::bsdf::BSDF;
use crate::core::rng::PathRng;
use crate::math::constants::{ Float, INV_PI, Vector3f };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf,
                         sample_uniform_hemisphere, sample_uniform_hemisphere_pdf };

/// How continuation directions are drawn around the normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HemisphereSampling {
    Uniform,
    Cosine,
}

impl Default for HemisphereSampling {
    fn default() -> Self {
        HemisphereSampling::Uniform
    }
}

/// Lambertian reflector, optionally emissive.
///
/// Single sided: it reflects only toward viewers on the side the normal
/// points to.
#[derive(Debug, Clone)]
pub struct LambertianDiffuseBSDF {
    albedo: RGBSpectrum,
    emission: RGBSpectrum,
    sampling: HemisphereSampling,
}

impl LambertianDiffuseBSDF {
    pub fn new(albedo: RGBSpectrum) -> Self {
        Self {
            albedo,
            emission: RGBSpectrum::default(),
            sampling: HemisphereSampling::default(),
        }
    }

    pub fn with_emission(mut self, emission: RGBSpectrum) -> Self {
        self.emission = emission;
        self
    }

    pub fn with_sampling(mut self, sampling: HemisphereSampling) -> Self {
        self.sampling = sampling;
        self
    }
}

impl BSDF for LambertianDiffuseBSDF {
    fn eval(&self, _wi: &Vector3f, wo: &Vector3f, n: &Vector3f) -> RGBSpectrum {
        if wo.dot(n) > 0.0 {
            self.albedo * INV_PI
        } else {
            RGBSpectrum::default()
        }
    }

    fn sample(&self, _wo: &Vector3f, n: &Vector3f, rng: &mut PathRng) -> Vector3f {
        let u = rng.next_2d();
        let local = match self.sampling {
            HemisphereSampling::Uniform => sample_uniform_hemisphere(&u),
            HemisphereSampling::Cosine => sample_cosine_hemisphere(&u),
        };

        Frame::from_normal(n).to_world(&local)
    }

    fn pdf(&self, _wo: &Vector3f, wi: &Vector3f, n: &Vector3f) -> Float {
        let cos_theta = wi.dot(n);
        if cos_theta <= 0.0 {
            return 0.0;
        }

        match self.sampling {
            HemisphereSampling::Uniform => sample_uniform_hemisphere_pdf(),
            HemisphereSampling::Cosine => sample_cosine_hemisphere_pdf(cos_theta),
        }
    }

    fn emission(&self) -> RGBSpectrum {
        self.emission
    }
}

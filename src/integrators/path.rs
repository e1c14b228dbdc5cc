// Copyright @yucwang 2026

use crate::core::bsdf::BSDF;
use crate::core::integrator::Integrator;
use crate::core::interaction::SurfaceIntersection;
use crate::core::rng::PathRng;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::math::constants::{ Float, Vector2f, Vector3f, FLOAT_MAX };
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("russian roulette survival probability must lie in (0, 1), got {0}")]
    RussianRoulette(Float),
    #[error("{name} must be a non-negative number, got {value}")]
    NegativeTolerance { name: &'static str, value: Float },
    #[error("samples per pixel must be at least 1")]
    ZeroSamples,
}

/// Tunables of the path tracing estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathConfig {
    /// Deepest bounce that is still shaded.
    pub max_depth: u32,
    /// Survival probability of the roulette draw after each direct estimate.
    pub russian_roulette: Float,
    /// Continuation directions with a pdf at or below this are dropped.
    pub epsilon: Float,
    /// Slack allowed between the shadow-ray hit distance and the light distance.
    pub occlusion_tolerance: Float,
    /// Offset along secondary rays that keeps them off their own surface.
    pub ray_epsilon: Float,
    pub samples_per_pixel: u32,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            russian_roulette: 0.8,
            epsilon: 5e-4,
            occlusion_tolerance: 1e-3,
            ray_epsilon: 1e-4,
            samples_per_pixel: 16,
        }
    }
}

impl PathConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.russian_roulette > 0.0 && self.russian_roulette < 1.0) {
            return Err(ConfigError::RussianRoulette(self.russian_roulette));
        }
        let tolerances = [
            ("epsilon", self.epsilon),
            ("occlusion tolerance", self.occlusion_tolerance),
            ("ray epsilon", self.ray_epsilon),
        ];
        for &(name, value) in tolerances.iter() {
            if !(value >= 0.0) {
                return Err(ConfigError::NegativeTolerance { name, value });
            }
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        Ok(())
    }
}

/// Shadow test: the first blocker along the shadow ray may sit closer than
/// the light sample by strictly less than `tolerance`.
pub fn passes_occlusion_test(blocker_t: Float, light_distance: Float, tolerance: Float) -> bool {
    blocker_t - light_distance > -tolerance
}

/// Recursive unidirectional path tracer with next event estimation on area
/// lights and Russian roulette termination.
pub struct PathIntegrator {
    config: PathConfig,
}

impl PathIntegrator {
    pub fn new(config: PathConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Radiance arriving at the origin of `ray` from its direction.
    ///
    /// `depth` counts the bounces already taken; calls deeper than
    /// `max_depth` return black, so the recursion is bounded by
    /// `max_depth - depth + 1` shading steps.
    pub fn cast_ray(&self, scene: &Scene, ray: &Ray3f, depth: u32, rng: &mut PathRng) -> RGBSpectrum {
        let hit = match scene.ray_intersection(ray) {
            Some(hit) if depth <= self.config.max_depth => hit,
            _ => return RGBSpectrum::zero(),
        };

        if scene.is_emissive(&hit) {
            return hit.le();
        }
        let material = match scene.material(&hit) {
            Some(material) => material,
            None => return RGBSpectrum::zero(),
        };

        let depth = depth + 1;
        let wo = -ray.dir();
        let direct = self.direct_lighting(scene, &hit, material, &wo, rng);

        if rng.next_f32() > self.config.russian_roulette {
            return direct;
        }

        direct + self.indirect_lighting(scene, &hit, material, &wo, depth, rng)
    }

    fn direct_lighting(&self,
                       scene: &Scene,
                       hit: &SurfaceIntersection,
                       material: &dyn BSDF,
                       wo: &Vector3f,
                       rng: &mut PathRng) -> RGBSpectrum {
        let light = match scene.sample_light(rng) {
            Some(light) => light,
            None => return RGBSpectrum::zero(),
        };
        let light_point = light.intersection();

        let to_light = light_point.p() - hit.p();
        let dist2 = to_light.norm_squared();
        if dist2 <= 0.0 || light.pdf() <= 0.0 {
            return RGBSpectrum::zero();
        }
        let dist = dist2.sqrt();
        let ws = to_light / dist;

        let shadow_ray = Ray3f::new(hit.p(), ws, Some(self.config.ray_epsilon), None);
        if !self.is_unoccluded(scene, &shadow_ray, dist) {
            return RGBSpectrum::zero();
        }

        let n = hit.normal();
        let cos_surface = ws.dot(&n).max(0.0);
        let cos_light = (-ws).dot(&light_point.normal()).max(0.0);

        light_point.le() * material.eval(&ws, wo, &n) * (cos_surface * cos_light / dist2 / light.pdf())
    }

    fn indirect_lighting(&self,
                         scene: &Scene,
                         hit: &SurfaceIntersection,
                         material: &dyn BSDF,
                         wo: &Vector3f,
                         depth: u32,
                         rng: &mut PathRng) -> RGBSpectrum {
        let n = hit.normal();
        let wi = material.sample(wo, &n, rng).normalize();
        let pdf = material.pdf(wo, &wi, &n);
        if !(pdf > self.config.epsilon) {
            return RGBSpectrum::zero();
        }

        let next_ray = Ray3f::new(hit.p(), wi, Some(self.config.ray_epsilon), None);
        match scene.ray_intersection(&next_ray) {
            // Emitters reached here were already counted by the light sample.
            Some(next) if !scene.is_emissive(&next) => {
                let cos_theta = wi.dot(&n).max(0.0);
                self.cast_ray(scene, &next_ray, depth, rng)
                    * material.eval(&wi, wo, &n)
                    * (cos_theta / pdf / self.config.russian_roulette)
            }
            _ => RGBSpectrum::zero(),
        }
    }

    fn is_unoccluded(&self, scene: &Scene, shadow_ray: &Ray3f, light_distance: Float) -> bool {
        let blocker_t = scene.ray_intersection(shadow_ray).map_or(FLOAT_MAX, |h| h.t());
        passes_occlusion_test(blocker_t, light_distance, self.config.occlusion_tolerance)
    }
}

impl Integrator for PathIntegrator {
    fn trace_ray_forward(&self, scene: &Scene, sensor: &dyn Sensor, pixel: Vector2f, rng: &mut PathRng) -> RGBSpectrum {
        let jitter = rng.next_2d();
        let u = Vector2f::new((pixel.x + jitter.x) / sensor.width() as Float,
                              (pixel.y + jitter.y) / sensor.height() as Float);
        let ray = sensor.sample_ray(&u);
        self.cast_ray(scene, &ray, 0, rng)
    }

    fn samples_per_pixel(&self) -> u32 {
        self.config.samples_per_pixel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::{ SceneBuilder, SceneObject };
    use crate::core::shape::Shape;
    use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
    use crate::math::constants::{ PI, INV_PI };
    use crate::shapes::sphere::Sphere;
    use crate::shapes::triangle_mesh::TriangleMesh;
    use approx::assert_relative_eq;
    use std::sync::atomic::{ AtomicUsize, Ordering };
    use std::sync::Arc;

    fn diffuse(albedo: Float) -> Arc<dyn BSDF> {
        Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::splat(albedo)))
    }

    fn light(radiance: Float) -> Arc<dyn BSDF> {
        Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.0))
            .with_emission(RGBSpectrum::splat(radiance)))
    }

    /// Horizontal square; normal -y when `facing_down`, +y otherwise.
    fn square(center: Vector3f, half: Float, facing_down: bool) -> Arc<dyn Shape> {
        let a = center + Vector3f::new(-half, 0.0, -half);
        let b = center + Vector3f::new(half, 0.0, -half);
        let c = center + Vector3f::new(half, 0.0, half);
        let d = center + Vector3f::new(-half, 0.0, half);
        if facing_down {
            Arc::new(TriangleMesh::quad(a, b, c, d))
        } else {
            Arc::new(TriangleMesh::quad(a, d, c, b))
        }
    }

    fn integrator(config: PathConfig) -> PathIntegrator {
        PathIntegrator::new(config).expect("valid config")
    }

    /// Floor at y = 0 lit by a square light of side `2 * half` at height `height`.
    fn floor_and_light(center: Vector3f, half: Float, height: Float, radiance: Float) -> Scene {
        let mut builder = SceneBuilder::new();
        builder.add_object(SceneObject::new(square(center, 5.0, false), diffuse(0.5)));
        builder.add_object(SceneObject::new(
            square(center + Vector3f::new(0.0, height, 0.0), half, true), light(radiance)));
        builder.build().expect("scene should build")
    }

    #[test]
    fn test_config_validation() {
        assert!(PathConfig::default().validate().is_ok());
        let almost_one = PathConfig { russian_roulette: 0.999, ..PathConfig::default() };
        assert!(almost_one.validate().is_ok());

        // A survival probability of one never terminates a path.
        let rr_one = PathConfig { russian_roulette: 1.0, ..PathConfig::default() };
        assert_eq!(rr_one.validate(), Err(ConfigError::RussianRoulette(1.0)));
        let deep = PathConfig { russian_roulette: 1.0, max_depth: 1_000_000, ..PathConfig::default() };
        assert!(PathIntegrator::new(deep).is_err());

        let bad_rr = PathConfig { russian_roulette: 0.0, ..PathConfig::default() };
        assert_eq!(bad_rr.validate(), Err(ConfigError::RussianRoulette(0.0)));
        let bad_rr = PathConfig { russian_roulette: 1.5, ..PathConfig::default() };
        assert!(PathIntegrator::new(bad_rr).is_err());

        let bad_eps = PathConfig { epsilon: -1.0, ..PathConfig::default() };
        assert_eq!(bad_eps.validate(),
                   Err(ConfigError::NegativeTolerance { name: "epsilon", value: -1.0 }));
        let no_spp = PathConfig { samples_per_pixel: 0, ..PathConfig::default() };
        assert_eq!(no_spp.validate(), Err(ConfigError::ZeroSamples));
    }

    #[test]
    fn test_miss_returns_zero() {
        let scene = floor_and_light(Vector3f::zeros(), 0.5, 2.0, 10.0);
        let path = integrator(PathConfig::default());
        let mut rng = PathRng::new(1);

        let ray = Ray3f::new(Vector3f::new(0.0, 1.0, 0.0), Vector3f::new(1.0, 0.1, 0.0), None, None);
        for _ in 0..64 {
            assert_eq!(path.cast_ray(&scene, &ray, 0, &mut rng), RGBSpectrum::zero());
        }
    }

    #[test]
    fn test_depth_cutoff_returns_zero() {
        let scene = floor_and_light(Vector3f::zeros(), 0.5, 2.0, 10.0);
        let config = PathConfig { max_depth: 3, ..PathConfig::default() };
        let path = integrator(config);
        let mut rng = PathRng::new(2);

        let at_light = Ray3f::new(Vector3f::new(0.0, 1.0, 0.0), Vector3f::new(0.0, 1.0, 0.0), None, None);
        let at_floor = Ray3f::new(Vector3f::new(0.1, 1.0, -0.2), Vector3f::new(0.0, -1.0, 0.0), None, None);
        for _ in 0..64 {
            assert_eq!(path.cast_ray(&scene, &at_light, config.max_depth + 1, &mut rng), RGBSpectrum::zero());
            assert_eq!(path.cast_ray(&scene, &at_floor, config.max_depth + 1, &mut rng), RGBSpectrum::zero());
        }
        assert_eq!(path.cast_ray(&scene, &at_light, config.max_depth, &mut rng), RGBSpectrum::splat(10.0));
    }

    #[test]
    fn test_direct_emitter_hit_returns_emission() {
        let mut builder = SceneBuilder::new();
        builder.add_object(SceneObject::new(square(Vector3f::zeros(), 5.0, false), diffuse(0.9)));
        builder.add_object(SceneObject::new(
            Arc::new(Sphere::new(Vector3f::new(0.0, 1.0, 4.0), 0.5)), diffuse(0.9)));
        builder.add_object(SceneObject::new(
            square(Vector3f::new(0.0, 3.0, 0.0), 1.0, true),
            Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.9))
                .with_emission(RGBSpectrum::new(17.0, 12.0, 4.0)))));
        let scene = builder.build().unwrap();
        let path = integrator(PathConfig::default());
        let mut rng = PathRng::new(3);

        let ray = Ray3f::new(Vector3f::new(0.2, 1.0, -0.3), Vector3f::new(0.0, 1.0, 0.0), None, None);
        for depth in 0..=PathConfig::default().max_depth {
            assert_eq!(path.cast_ray(&scene, &ray, depth, &mut rng), RGBSpectrum::new(17.0, 12.0, 4.0));
        }
    }

    #[test]
    fn test_occlusion_boundary() {
        // Exactly representable values so the boundary itself is tested.
        assert!(passes_occlusion_test(2.0, 2.0, 0.5));
        assert!(passes_occlusion_test(1.75, 2.0, 0.5));
        assert!(!passes_occlusion_test(1.5, 2.0, 0.5));
        assert!(!passes_occlusion_test(1.0, 2.0, 0.5));
        assert!(passes_occlusion_test(FLOAT_MAX, 2.0, 0.5));

        let tol = PathConfig::default().occlusion_tolerance;
        assert!(passes_occlusion_test(2.0 - 0.5 * tol, 2.0, tol));
        assert!(!passes_occlusion_test(2.0 - 2.0 * tol, 2.0, tol));
    }

    #[test]
    fn test_blocked_light_gives_no_direct_light() {
        let mut builder = SceneBuilder::new();
        builder.add_object(SceneObject::new(square(Vector3f::zeros(), 5.0, false), diffuse(0.5)));
        builder.add_object(SceneObject::new(square(Vector3f::new(0.0, 2.0, 0.0), 0.5, true), light(10.0)));
        // Black occluder halfway, facing the light.
        builder.add_object(SceneObject::new(square(Vector3f::new(0.0, 1.0, 0.0), 4.0, false), diffuse(0.0)));
        let scene = builder.build().unwrap();
        let path = integrator(PathConfig::default());
        let mut rng = PathRng::new(4);

        let ray = Ray3f::new(Vector3f::new(0.1, 0.5, -0.2), Vector3f::new(0.0, -1.0, 0.0), None, None);
        for _ in 0..256 {
            assert_eq!(path.cast_ray(&scene, &ray, 0, &mut rng), RGBSpectrum::zero());
        }
    }

    /// Returns the mirrored normal as the continuation direction and counts
    /// how often it is asked to.
    #[derive(Default)]
    struct CountingBSDF {
        samples: AtomicUsize,
    }

    impl BSDF for CountingBSDF {
        fn eval(&self, _wi: &Vector3f, _wo: &Vector3f, _n: &Vector3f) -> RGBSpectrum {
            RGBSpectrum::splat(0.1)
        }

        fn sample(&self, _wo: &Vector3f, n: &Vector3f, _rng: &mut PathRng) -> Vector3f {
            self.samples.fetch_add(1, Ordering::Relaxed);
            -n
        }

        fn pdf(&self, _wo: &Vector3f, _wi: &Vector3f, _n: &Vector3f) -> Float {
            1.0
        }
    }

    #[test]
    fn test_recursion_is_bounded_by_max_depth() {
        let counter = Arc::new(CountingBSDF::default());
        let mut builder = SceneBuilder::new();
        // The camera sits inside a closed sphere, so every bounce hits it again.
        builder.add_object(SceneObject::new(Arc::new(Sphere::new(Vector3f::zeros(), 10.0)), counter.clone()));
        builder.add_object(SceneObject::new(Arc::new(Sphere::new(Vector3f::new(0.0, 5.0, 0.0), 0.5)), light(1.0)));
        let scene = builder.build().unwrap();

        let config = PathConfig { max_depth: 4, russian_roulette: 0.999, ..PathConfig::default() };
        let path = integrator(config);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), None, None);

        for &start in &[0u32, 2, 4, 5] {
            let bound = (config.max_depth + 1).saturating_sub(start) as usize;
            let mut deepest = 0;
            for seed in 0..200u64 {
                counter.samples.store(0, Ordering::Relaxed);
                let mut rng = PathRng::new(seed);
                let radiance = path.cast_ray(&scene, &ray, start, &mut rng);
                assert!(radiance.is_finite());
                let samples = counter.samples.load(Ordering::Relaxed);
                assert!(samples <= bound, "start depth {} took {} bounces", start, samples);
                deepest = deepest.max(samples);
            }
            // Roulette almost always survives, so some path reaches the bound.
            assert_eq!(deepest, bound, "start depth {}", start);
        }
    }

    /// Reflects straight back along the normal but reports a zero density.
    #[derive(Default)]
    struct ZeroPdfBSDF {
        samples: AtomicUsize,
    }

    impl BSDF for ZeroPdfBSDF {
        fn eval(&self, _wi: &Vector3f, wo: &Vector3f, n: &Vector3f) -> RGBSpectrum {
            if wo.dot(n) > 0.0 { RGBSpectrum::splat(0.2) } else { RGBSpectrum::zero() }
        }

        fn sample(&self, _wo: &Vector3f, n: &Vector3f, _rng: &mut PathRng) -> Vector3f {
            self.samples.fetch_add(1, Ordering::Relaxed);
            *n
        }

        fn pdf(&self, _wo: &Vector3f, _wi: &Vector3f, _n: &Vector3f) -> Float {
            0.0
        }
    }

    #[test]
    fn test_degenerate_pdf_skips_indirect_light() {
        let material = Arc::new(ZeroPdfBSDF::default());
        let mut builder = SceneBuilder::new();
        builder.add_object(SceneObject::new(square(Vector3f::zeros(), 5.0, false), material.clone()));
        builder.add_object(SceneObject::new(square(Vector3f::new(0.0, 2.0, 0.0), 0.5, true), light(10.0)));
        // Ceiling above the receiver: a followed continuation would hit it and recurse.
        builder.add_object(SceneObject::new(square(Vector3f::new(0.0, 3.0, 0.0), 5.0, true), material.clone()));
        let scene = builder.build().unwrap();
        let path = integrator(PathConfig::default());

        // Off the light's footprint, so the reflected direction reaches the ceiling.
        let ray = Ray3f::new(Vector3f::new(1.5, 1.0, 0.3), Vector3f::new(0.0, -1.0, 0.0), None, None);
        let hit = scene.ray_intersection(&ray).unwrap();
        let floor = scene.material(&hit).unwrap();

        let mut survived = 0;
        for seed in 0..64u64 {
            let mut rng = PathRng::new(seed);
            let mut direct_rng = rng.clone();
            material.samples.store(0, Ordering::Relaxed);

            let radiance = path.cast_ray(&scene, &ray, 0, &mut rng);
            let direct = path.direct_lighting(&scene, &hit, floor, &-ray.dir(), &mut direct_rng);

            let samples = material.samples.load(Ordering::Relaxed);
            assert!(samples <= 1, "seed {} recursed {} times", seed, samples);
            survived += samples;
            assert!(!direct.is_black());
            assert_eq!(radiance, direct, "seed {}", seed);
        }
        assert!(survived > 0, "roulette never let a continuation through");
    }

    // Irradiance form factor of an axis-aligned rectangle with one corner
    // straight above the receiver.
    fn corner_form_factor(a: Float, b: Float, d: Float) -> Float {
        let x = a / d;
        let y = b / d;
        let sx = (1.0 + x * x).sqrt();
        let sy = (1.0 + y * y).sqrt();
        (x / sx * (y / sx).atan() + y / sy * (x / sy).atan()) / (2.0 * PI)
    }

    #[test]
    fn test_estimate_converges_to_lambertian_direct_light() {
        let center = Vector3f::new(0.5, 0.0, 0.25);
        let (half, height, radiance, albedo) = (0.1, 2.0, 10.0, 0.5);
        let scene = floor_and_light(center, half, height, radiance);
        let path = integrator(PathConfig::default());
        let mut rng = PathRng::new(6);

        let ray = Ray3f::new(center + Vector3f::new(0.0, 1.0, 0.0), Vector3f::new(0.0, -1.0, 0.0), None, None);
        let samples = 20_000;
        let mut sum = RGBSpectrum::zero();
        for _ in 0..samples {
            sum += path.cast_ray(&scene, &ray, 0, &mut rng);
        }
        let mean = sum / samples as Float;

        let exact = albedo * radiance * 4.0 * corner_form_factor(half, half, height);
        let area = 4.0 * half * half;
        let small_source = radiance * albedo * INV_PI * area / (height * height);
        for c in 0..3 {
            assert_relative_eq!(mean[c], exact, max_relative = 0.01);
            assert_relative_eq!(mean[c], small_source, max_relative = 0.03);
        }
    }

    #[test]
    fn test_russian_roulette_does_not_bias_estimate() {
        let mut builder = SceneBuilder::new();
        builder.add_object(SceneObject::new(square(Vector3f::zeros(), 3.0, false), diffuse(0.5)));
        builder.add_object(SceneObject::new(square(Vector3f::new(0.0, 2.0, 0.0), 0.25, true), light(10.0)));
        // Wall at x = 1 facing the receiver, lit by the square light.
        builder.add_object(SceneObject::new(
            Arc::new(TriangleMesh::quad(Vector3f::new(1.0, 0.0, -3.0),
                                        Vector3f::new(1.0, 0.0, 3.0),
                                        Vector3f::new(1.0, 3.0, 3.0),
                                        Vector3f::new(1.0, 3.0, -3.0))),
            diffuse(0.8)));
        let scene = builder.build().unwrap();

        let ray = Ray3f::new(Vector3f::new(0.05, 1.0, -0.1), Vector3f::new(0.0, -1.0, 0.0), None, None);
        let estimate = |rr: Float, seed: u64| {
            let path = integrator(PathConfig { russian_roulette: rr, max_depth: 6, ..PathConfig::default() });
            let mut rng = PathRng::new(seed);
            let samples = 40_000;
            let mut sum = RGBSpectrum::zero();
            for _ in 0..samples {
                sum += path.cast_ray(&scene, &ray, 0, &mut rng);
            }
            (sum / samples as Float).average()
        };

        let direct_only = {
            let path = integrator(PathConfig::default());
            let hit = scene.ray_intersection(&ray).expect("floor is below the ray");
            let material = scene.material(&hit).expect("hit carries its object");
            let mut rng = PathRng::new(7);
            let mut sum = RGBSpectrum::zero();
            for _ in 0..5_000 {
                sum += path.direct_lighting(&scene, &hit, material, &-ray.dir(), &mut rng);
            }
            (sum / 5_000.0).average()
        };

        let rarely_killed = estimate(0.95, 8);
        let often_killed = estimate(0.5, 9);
        assert!(rarely_killed > direct_only * 1.01,
                "indirect light missing: {} vs {}", rarely_killed, direct_only);
        assert_relative_eq!(often_killed, rarely_killed, max_relative = 0.03);
    }
}

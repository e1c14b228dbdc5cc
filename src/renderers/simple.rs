// Copyright @yucwang 2026

use crate::core::integrator::Integrator;
use crate::core::rng::PathRng;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{ Float, Vector2f };
use crate::math::spectrum::RGBSpectrum;
use indicatif::{ ProgressBar, ProgressStyle };
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::mpsc;
use std::thread;

pub use super::renderer::Renderer;

const BLOCK_SIZE: usize = 32;

struct Block {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
    pixels: Vec<RGBSpectrum>,
}

/// Averages `samples_per_pixel` integrator samples per pixel, splitting the
/// image into square blocks handed out to one worker per core.
pub struct SimpleRenderer {
    integrator: Box<dyn Integrator>,
    seed: u64,
    threads: Option<usize>,
    show_progress: bool,
}

impl SimpleRenderer {
    pub fn new(integrator: Box<dyn Integrator>, seed: u64) -> Self {
        Self {
            integrator,
            seed,
            threads: None,
            show_progress: true,
        }
    }

    /// Fixes the worker count instead of using every available core.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn render_block(&self,
                    scene: &Scene,
                    sensor: &dyn Sensor,
                    block_index: usize,
                    blocks_x: usize,
                    spp: u32,
                    dropped: &AtomicUsize) -> Block {
        let (width, height) = (sensor.width(), sensor.height());
        let x0 = (block_index % blocks_x) * BLOCK_SIZE;
        let y0 = (block_index / blocks_x) * BLOCK_SIZE;
        let x1 = (x0 + BLOCK_SIZE).min(width);
        let y1 = (y0 + BLOCK_SIZE).min(height);
        let inv_spp = 1.0 / spp as Float;

        let mut pixels = Vec::with_capacity((x1 - x0) * (y1 - y0));
        for y in y0..y1 {
            for x in x0..x1 {
                let pixel = Vector2f::new(x as Float, y as Float);
                let mut rng = PathRng::for_pixel(self.seed, x, y);
                let mut color = RGBSpectrum::zero();
                for _ in 0..spp {
                    let radiance = self.integrator.trace_ray_forward(scene, sensor, pixel, &mut rng);
                    if radiance.is_finite() {
                        color += radiance;
                    } else {
                        dropped.fetch_add(1, Ordering::Relaxed);
                    }
                }
                pixels.push(color * inv_spp);
            }
        }

        Block { x0, y0, x1, y1, pixels }
    }
}

impl Renderer for SimpleRenderer {
    fn render(&self, scene: &Scene, sensor: &dyn Sensor) -> Bitmap {
        let (width, height) = (sensor.width(), sensor.height());
        let mut bitmap = Bitmap::new(width, height);
        if width == 0 || height == 0 {
            log::warn!("Sensor has an empty film, nothing to render.");
            return bitmap;
        }
        let spp = self.integrator.samples_per_pixel().max(1);

        let blocks_x = (width + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let blocks_y = (height + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let total_blocks = blocks_x * blocks_y;
        let thread_count = self.threads.unwrap_or_else(|| {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        });
        log::info!("Rendering {}x{} at {} spp on {} threads ({}).",
                   width, height, spp, thread_count, sensor.describe());

        let progress = if self.show_progress {
            ProgressBar::new(total_blocks as u64)
        } else {
            ProgressBar::hidden()
        };
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} blocks")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let next_block = AtomicUsize::new(0);
        let dropped = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<Block>();

        thread::scope(|scope| {
            for _ in 0..thread_count {
                let tx = tx.clone();
                let next_block = &next_block;
                let dropped = &dropped;
                scope.spawn(move || loop {
                    let block_index = next_block.fetch_add(1, Ordering::Relaxed);
                    if block_index >= total_blocks {
                        break;
                    }
                    let block = self.render_block(scene, sensor, block_index, blocks_x, spp, dropped);
                    if tx.send(block).is_err() {
                        break;
                    }
                });
            }

            drop(tx);
            for block in rx.iter() {
                let block_width = block.x1 - block.x0;
                for y in block.y0..block.y1 {
                    for x in block.x0..block.x1 {
                        bitmap[(x, y)] = block.pixels[(x - block.x0) + block_width * (y - block.y0)];
                    }
                }
                progress.inc(1);
            }
        });
        progress.finish_and_clear();

        let dropped = dropped.load(Ordering::Relaxed);
        if dropped > 0 {
            log::warn!("Discarded {} non-finite radiance samples.", dropped);
        }
        bitmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::Vector3f;
    use crate::math::ray::Ray3f;

    struct Gradient;

    impl Sensor for Gradient {
        fn sample_ray(&self, u: &Vector2f) -> Ray3f {
            Ray3f::new(Vector3f::new(u.x, u.y, 0.0), Vector3f::new(0.0, 0.0, 1.0), None, None)
        }

        fn width(&self) -> usize {
            37
        }

        fn height(&self) -> usize {
            70
        }
    }

    /// Returns the pixel coordinates, ignoring the scene.
    struct PixelId;

    impl Integrator for PixelId {
        fn trace_ray_forward(&self, _scene: &Scene, _sensor: &dyn Sensor, pixel: Vector2f, rng: &mut PathRng) -> RGBSpectrum {
            RGBSpectrum::new(pixel.x, pixel.y, rng.next_f32())
        }

        fn samples_per_pixel(&self) -> u32 {
            4
        }
    }

    fn scene() -> Scene {
        use crate::core::scene::{ SceneBuilder, SceneObject };
        use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
        use crate::shapes::sphere::Sphere;
        use std::sync::Arc;

        let mut builder = SceneBuilder::new();
        builder.add_object(SceneObject::new(
            Arc::new(Sphere::new(Vector3f::zeros(), 1.0)),
            Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::zero()).with_emission(RGBSpectrum::splat(1.0)))));
        builder.build().unwrap()
    }

    #[test]
    fn test_every_pixel_is_written_once() {
        let renderer = SimpleRenderer::new(Box::new(PixelId), 3).with_threads(3).with_progress(false);
        let image = renderer.render(&scene(), &Gradient);

        assert_eq!((image.width(), image.height()), (37, 70));
        for y in 0..70 {
            for x in 0..37 {
                let px = image[(x, y)];
                assert_eq!(px[0], x as Float);
                assert_eq!(px[1], y as Float);
                assert!(px[2] >= 0.0 && px[2] < 1.0);
            }
        }
    }

    #[test]
    fn test_render_is_deterministic_for_a_seed() {
        let scene = scene();
        let a = SimpleRenderer::new(Box::new(PixelId), 11).with_threads(4).with_progress(false)
            .render(&scene, &Gradient);
        let b = SimpleRenderer::new(Box::new(PixelId), 11).with_threads(1).with_progress(false)
            .render(&scene, &Gradient);
        assert_eq!(a.pixels(), b.pixels());
    }
}

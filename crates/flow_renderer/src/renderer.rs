//! Tiled parallel rendering.
//!
//! The image is split into buckets that run on a bounded rayon pool. Each
//! bucket owns its RNG and pixel buffer; the [`Film`] is assembled after all
//! buckets join.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use rand::RngCore;
use rayon::prelude::*;
use thiserror::Error;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::film::Film;
use crate::material::Color;
use crate::random::{bucket_rng, gen_f32};
use crate::scene::Scene;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// Seed for reproducible renders; `None` seeds from OS entropy
    pub seed: Option<u64>,
    /// Worker threads (0 = rayon default)
    pub threads: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: None,
            threads: 0,
        }
    }
}

impl RenderConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_bucket_size(mut self, bucket_size: u32) -> Self {
        self.bucket_size = bucket_size;
        self
    }
}

/// Errors that stop a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render cancelled")]
    Cancelled,

    #[error("bucket size must be at least 1")]
    InvalidBucketSize,

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Render the scene to a film.
pub fn render(scene: &Scene, config: &RenderConfig) -> Result<Film, RenderError> {
    render_with_cancel(scene, config, &AtomicBool::new(false))
}

/// Render the scene, stopping with [`RenderError::Cancelled`] once `cancel`
/// is set.
pub fn render_with_cancel(
    scene: &Scene,
    config: &RenderConfig,
    cancel: &AtomicBool,
) -> Result<Film, RenderError> {
    if config.bucket_size == 0 {
        return Err(RenderError::InvalidBucketSize);
    }

    let buckets = generate_buckets(scene.width, scene.height, config.bucket_size);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    log::info!(
        "Rendering {}x{} @ {} spp, {} bounces ({:?}): {} buckets on {} threads",
        scene.width,
        scene.height,
        scene.samples,
        scene.bounces,
        scene.integrator,
        buckets.len(),
        pool.current_num_threads()
    );

    let start = Instant::now();
    let completed = AtomicUsize::new(0);
    let total = buckets.len();

    let results: Vec<BucketResult> = pool.install(|| {
        buckets
            .par_iter()
            .map(|bucket| -> Result<BucketResult, RenderError> {
                let mut rng = bucket_rng(config.seed, bucket.x, bucket.y);
                let result = render_bucket(bucket, scene, &mut rng, cancel)?;
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                log::debug!(
                    "Bucket {} at ({}, {}) done [{}/{}]",
                    bucket.index,
                    bucket.x,
                    bucket.y,
                    done,
                    total
                );
                Ok(result)
            })
            .collect::<Result<Vec<_>, RenderError>>()
    })?;

    let mut film = Film::new(scene.width, scene.height);
    for result in &results {
        film.write_bucket(&result.bucket, &result.pixels);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    Ok(film)
}

/// Average `scene.samples` jittered samples for pixel `(x, y)`.
pub fn render_pixel(scene: &Scene, x: u32, y: u32, rng: &mut dyn RngCore) -> Color {
    let width = scene.width as f32;
    let height = scene.height as f32;
    let mut pixel_color = Color::ZERO;

    for _ in 0..scene.samples {
        let s = (x as f32 + gen_f32(rng)) / width * 2.0 - 1.0;
        let t = 1.0 - (y as f32 + gen_f32(rng)) / height * 2.0;
        let ray = scene.camera.get_ray(s, t);
        pixel_color += scene.integrator.li(&ray, scene, rng);
    }

    pixel_color / scene.samples.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::integrator::Integrator;
    use crate::material::Material;
    use crate::mesh::Mesh;
    use flow_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn backdrop_scene(width: u32, height: u32) -> Scene {
        let camera = Camera::look_at(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y, 45.0, 1.0);
        let mut scene = Scene::new(camera, width, height)
            .with_integrator(Integrator::Normal)
            .with_quality(2, 1);
        scene.add(
            Mesh::new(
                vec![
                    Vec3::new(-10.0, -10.0, 0.0),
                    Vec3::new(10.0, -10.0, 0.0),
                    Vec3::new(10.0, 10.0, 0.0),
                    Vec3::new(-10.0, 10.0, 0.0),
                ],
                vec![0, 1, 2, 2, 3, 0],
                Material::lambertian(Vec3::ONE),
            )
            .unwrap(),
        );
        scene
    }

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.bucket_size, 64);
        assert_eq!(config.seed, None);
        assert_eq!(config.threads, 0);

        let config = config.with_seed(9).with_threads(2).with_bucket_size(16);
        assert_eq!(config, RenderConfig { bucket_size: 16, seed: Some(9), threads: 2 });
    }

    #[test]
    fn test_render_pixel() {
        let scene = backdrop_scene(10, 10);
        let mut rng = StdRng::seed_from_u64(42);

        let color = render_pixel(&scene, 5, 5, &mut rng);
        assert!((color - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_render_fills_film() {
        let scene = backdrop_scene(20, 12);
        let config = RenderConfig::default().with_bucket_size(8).with_threads(2);
        let film = render(&scene, &config).unwrap();

        assert_eq!((film.width(), film.height()), (20, 12));
        assert!(film.pixels().iter().all(|p| (*p - Vec3::Z).length() < 1e-5));
    }

    #[test]
    fn test_cancelled_render() {
        let scene = backdrop_scene(8, 8);
        let cancel = AtomicBool::new(true);
        let result = render_with_cancel(&scene, &RenderConfig::default(), &cancel);
        assert!(matches!(result, Err(RenderError::Cancelled)));
    }

    #[test]
    fn test_zero_bucket_size() {
        let scene = backdrop_scene(8, 8);
        let result = render(&scene, &RenderConfig::default().with_bucket_size(0));
        assert!(matches!(result, Err(RenderError::InvalidBucketSize)));
    }
}

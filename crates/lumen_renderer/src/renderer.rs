//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with configurable depth
//! - Anti-aliasing via jittered multi-sampling
//! - One job per scanline on a fixed worker pool

use crate::buffer::{AccumulationBuffer, BufferError, ImageBuffer};
use crate::material::Scatter;
use crate::random::gen_f32;
use crate::settings::{ConfigError, RenderSettings};
use crate::thread_pool::ThreadPool;
use crate::{Camera, Color, Hittable};
use lumen_math::{Interval, Ray};
use parking_lot::Mutex;
use rand::RngCore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Ray parameter below which hits are ignored, to avoid shadow acne.
pub const T_MIN: f32 = 0.001;

/// How often progress is logged while waiting for the pool.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Errors that abort a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("{0} scanline job(s) panicked")]
    JobsPanicked(usize),

    #[error("accumulation buffer: {0}")]
    Buffer(#[from] BufferError),
}

/// Compute the color seen by a ray.
///
/// Terminates when the depth budget is spent, the ray escapes, the
/// surface absorbs it, or it reaches a light.
pub fn ray_color(ray: &Ray, world: &dyn Hittable, depth: u32, rng: &mut dyn RngCore) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::from_min(T_MIN)) else {
        return sky_gradient(ray);
    };

    match rec.material.scatter(ray, &rec, rng) {
        // Emitters end the path
        Some(result) if rec.material.is_light() => result.attenuation,
        Some(result) => result.attenuation * ray_color(&result.scattered, world, depth - 1, rng),
        None => Color::ZERO,
    }
}

/// Compute sky gradient background.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Sum `samples_per_pixel` jittered samples for pixel `(x, y)`,
/// y = 0 being the top row. The sum is not averaged.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> Color {
    // Viewport t runs bottom to top; rows past the image clamp to the bottom
    let j = settings.height.saturating_sub(1).saturating_sub(y);
    let s_scale = 1.0 / settings.width.saturating_sub(1).max(1) as f32;
    let t_scale = 1.0 / settings.height.saturating_sub(1).max(1) as f32;

    let mut pixel_color = Color::ZERO;
    for _ in 0..settings.samples_per_pixel {
        let s = (x as f32 + gen_f32(rng)) * s_scale;
        let t = (j as f32 + gen_f32(rng)) * t_scale;
        let ray = camera.get_ray(s, t, rng);
        pixel_color += ray_color(&ray, world, settings.max_depth, rng);
    }
    pixel_color
}

/// Render every pixel of one scanline. Rows outside the image yield an
/// empty scanline.
pub fn render_scanline(
    row: u32,
    camera: &Camera,
    world: &dyn Hittable,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> Vec<Color> {
    if row >= settings.height {
        log::warn!("Scanline {} is outside a {} row image", row, settings.height);
        return Vec::new();
    }

    (0..settings.width)
        .map(|x| render_pixel(camera, world, x, row, settings, rng))
        .collect()
}

/// Render the entire scene on a worker pool.
///
/// Submits one job per scanline, waits until the pool has drained and
/// returns raw per-pixel sums.
pub fn render(
    world: Arc<dyn Hittable>,
    camera: Arc<Camera>,
    settings: &RenderSettings,
) -> Result<ImageBuffer, RenderError> {
    settings.validate()?;

    let mut pool = ThreadPool::new(settings.num_threads);
    log::info!(
        "Rendering {}x{} @ {} spp, max depth {}, {} threads",
        settings.width,
        settings.height,
        settings.samples_per_pixel,
        settings.max_depth,
        pool.num_threads()
    );

    let start = Instant::now();
    pool.start()?;

    let buffer = Arc::new(AccumulationBuffer::new(settings.width, settings.height));
    let write_errors = Arc::new(Mutex::new(Vec::new()));
    let job_settings = Arc::new(settings.clone());

    for row in 0..settings.height {
        let buffer = Arc::clone(&buffer);
        let write_errors = Arc::clone(&write_errors);
        let world = Arc::clone(&world);
        let camera = Arc::clone(&camera);
        let settings = Arc::clone(&job_settings);

        pool.submit(move || {
            let mut rng = rand::thread_rng();
            let pixels = render_scanline(row, &camera, world.as_ref(), &settings, &mut rng);
            if let Err(err) = buffer.write_row(row, pixels) {
                write_errors.lock().push(err);
            }
        });
    }

    while !pool.wait_idle_timeout(PROGRESS_INTERVAL) {
        log::info!("Scanlines remaining: {}", pool.pending_count() + pool.in_flight());
    }
    pool.stop();
    log::info!("Rendered in {:.2?}", start.elapsed());

    let panicked = pool.panicked_jobs();
    if panicked > 0 {
        return Err(RenderError::JobsPanicked(panicked));
    }
    if let Some(err) = write_errors.lock().drain(..).next() {
        return Err(err.into());
    }

    Ok(ImageBuffer::from_accumulation(&buffer, settings.samples_per_pixel)?)
}

//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with configurable depth
//! - Gamma correction
//! - Anti-aliasing via multi-sampling

use std::ops::Range;
use std::path::Path;

use crate::hittable::Hittable;
use crate::material::ScatterResult;
use crate::Camera;
use lumen_core::Color;
use lumen_math::{Interval, Ray};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Lower bound of the ray window, keeps a bounce from re-hitting its origin.
pub const SHADOW_EPSILON: f32 = 0.001;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth, capped at `MAX_DEPTH_LIMIT` when rendering
    pub max_depth: u32,
    /// Background color when ray doesn't hit anything
    pub background: Color,
    /// Base seed for the per-row generators; random when unset
    pub seed: Option<u64>,
    /// Upper bound on worker threads; hardware parallelism when unset
    pub threads: Option<usize>,
    /// Smallest block of rows handed to one worker
    pub min_rows_per_worker: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::ZERO,
            seed: None,
            threads: None,
            min_rows_per_worker: crate::scheduler::MIN_ROWS_PER_WORKER,
        }
    }
}

/// Compute the color seen by a ray.
///
/// `depth` counts bounces taken so far. Once it reaches
/// `config.max_depth` a hit contributes only its emission.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let rec = match world.hit(ray, Interval::new(SHADOW_EPSILON, f32::INFINITY), rng) {
        Some(rec) => rec,
        None => return config.background,
    };

    let emission = rec.material.emitted(rec.u, rec.v, rec.p);
    if depth >= config.max_depth {
        return emission;
    }

    match rec.material.scatter(ray, &rec, rng) {
        Some(ScatterResult {
            attenuation,
            scattered,
        }) => emission + attenuation * ray_color(&scattered, world, depth + 1, config, rng),
        None => emission,
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Convert a linear color to gamma-encoded 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let quantize = |c: f32| (255.99 * clamp_01(linear_to_gamma(c))) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = config.samples_per_pixel.max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        // Camera.get_ray already adds random offset for anti-aliasing
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, world, 0, config, rng);
    }

    // Average the samples
    pixel_color / samples as f32
}

/// Independent generator for one image row.
///
/// Seeding per row makes the image independent of how rows are split across
/// workers.
pub fn row_rng(base_seed: u64, row: u32) -> StdRng {
    StdRng::seed_from_u64(base_seed.wrapping_add(u64::from(row)))
}

/// Render `rows` into `out`, which holds exactly those rows as packed RGB8.
pub fn render_rows(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    rows: Range<u32>,
    out: &mut [u8],
    base_seed: u64,
) {
    let row_bytes = camera.image_width as usize * 3;
    debug_assert_eq!(out.len(), (rows.end - rows.start) as usize * row_bytes);

    for (y, row) in rows.zip(out.chunks_exact_mut(row_bytes)) {
        let mut rng = row_rng(base_seed, y);
        for (x, pixel) in (0..camera.image_width).zip(row.chunks_exact_mut(3)) {
            let color = render_pixel(camera, world, x, y, config, &mut rng);
            pixel.copy_from_slice(&color_to_rgb8(color));
        }
    }
}

/// Row-major RGB8 image, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Encode to disk; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        let path = path.as_ref();
        image::save_buffer(
            path,
            &self.pixels,
            self.width,
            self.height,
            image::ColorType::Rgb8,
        )?;
        log::info!("Wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiffuseLight, HitRecord, Lambertian, Material, Sphere};
    use lumen_math::{Aabb, Vec3};

    /// Hits every ray at t = 1.
    struct Everywhere<M: Material> {
        material: M,
    }

    impl<M: Material + 'static> Hittable for Everywhere<M> {
        fn hit<'a>(
            &'a self,
            ray: &Ray,
            _ray_t: Interval,
            _rng: &mut dyn RngCore,
        ) -> Option<HitRecord<'a>> {
            Some(HitRecord {
                t: 1.0,
                p: ray.at(1.0),
                normal: -ray.direction().normalize(),
                material: &self.material,
                u: 0.0,
                v: 0.0,
            })
        }

        fn bounding_box(&self, _time: Interval) -> Option<Aabb> {
            None
        }
    }

    /// Emits one unit per bounce and always scatters without loss.
    struct GlowingMirror;

    impl Material for GlowingMirror {
        fn scatter(
            &self,
            ray_in: &Ray,
            rec: &HitRecord,
            _rng: &mut dyn RngCore,
        ) -> Option<ScatterResult> {
            Some(ScatterResult {
                attenuation: Color::ONE,
                scattered: Ray::new(rec.p, ray_in.direction(), ray_in.time()),
            })
        }

        fn emitted(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
            Color::ONE
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::splat(4.0)), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::new(0.25, -1.0, f32::NAN)), [127, 0, 0]);
    }

    #[test]
    fn test_miss_returns_background() {
        let world = crate::HittableList::new();
        let config = RenderConfig {
            background: Color::new(0.1, 0.2, 0.3),
            ..RenderConfig::default()
        };
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        assert_eq!(ray_color(&ray, &world, 0, &config, &mut rng()), config.background);
    }

    #[test]
    fn test_endless_scattering_stops_at_max_depth() {
        let world = Everywhere {
            material: GlowingMirror,
        };
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);

        let config = RenderConfig::default();
        let color = ray_color(&ray, &world, 0, &config, &mut rng());
        assert!(color.is_finite());
        // Emission at depths 0 through 50 inclusive
        assert_eq!(color, Color::splat(51.0));

        let shallow = RenderConfig {
            max_depth: 0,
            ..RenderConfig::default()
        };
        assert_eq!(ray_color(&ray, &world, 0, &shallow, &mut rng()), Color::ONE);
    }

    #[test]
    fn test_light_contributes_emission_only() {
        let world = Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, DiffuseLight::new(Color::new(4.0, 2.0, 1.0)));
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let color = ray_color(&ray, &world, 0, &RenderConfig::default(), &mut rng());
        assert_eq!(color, Color::new(4.0, 2.0, 1.0));
    }

    #[test]
    fn test_render_pixel() {
        // Create a simple scene with one sphere
        let world = Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Lambertian::new(Color::new(0.5, 0.5, 0.5)),
        );

        // Create a camera
        let mut camera = Camera::new().with_resolution(10, 10);
        camera.initialize();

        let config = RenderConfig {
            samples_per_pixel: 4,
            max_depth: 5,
            background: Color::new(0.5, 0.7, 1.0),
            ..RenderConfig::default()
        };

        let mut rng = rng();

        // Render center pixel (should hit the sphere)
        let color = render_pixel(&camera, &world, 5, 5, &config, &mut rng);

        // Darker than the sky because half the bounces are absorbed
        assert!(color.length() > 0.0);
        assert!(color.z < config.background.z);
    }

    #[test]
    fn test_render_rows_is_reproducible() {
        let world = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, Lambertian::new(Color::splat(0.5)));
        let mut camera = Camera::new().with_resolution(8, 4);
        camera.initialize();
        let config = RenderConfig {
            samples_per_pixel: 3,
            background: Color::ONE,
            ..RenderConfig::default()
        };

        let mut all = vec![0u8; 8 * 4 * 3];
        render_rows(&camera, &world, &config, 0..4, &mut all, 9);

        // Rendering rows 2..4 on their own gives the same bytes
        let mut tail = vec![0u8; 8 * 2 * 3];
        render_rows(&camera, &world, &config, 2..4, &mut tail, 9);
        assert_eq!(&all[8 * 2 * 3..], &tail[..]);
    }

    #[test]
    fn test_image_buffer_layout() {
        let mut image = ImageBuffer::new(4, 2);
        assert_eq!(image.as_bytes().len(), 24);

        let i = (4 + 3) * 3;
        image.pixels[i..i + 3].copy_from_slice(&[1, 2, 3]);
        assert_eq!(image.get(3, 1), [1, 2, 3]);
        assert_eq!(image.get(0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "samples_per_pixel": 8, "seed": 7 }"#).unwrap();
        assert_eq!(config.samples_per_pixel, 8);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_depth, 50);
        assert_eq!(config.background, Color::ZERO);

        let round_trip: RenderConfig =
            serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(round_trip, config);
    }
}

//! Textures: colour as a function of surface coordinates and position.
//!
//! Materials hold textures behind `Arc<dyn Texture>` so one texture can back
//! many materials. Every texture is immutable after construction, which is
//! what lets render threads sample them without locks.

use std::path::Path;
use std::sync::Arc;

use lumen_math::Vec3;
use thiserror::Error;

use crate::perlin::Perlin;

/// Linear RGB colour.
pub type Color = Vec3;

/// Errors that can occur while building a texture.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("RGB data is {actual} bytes, expected {expected} for {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Anything that can be sampled for a colour.
pub trait Texture: Send + Sync {
    /// Colour at surface coordinates `(u, v)` and world position `p`.
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// The same colour everywhere.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(Color::new(r, g, b))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.color
    }
}

/// 3D checker pattern. The sign of `sin(10x) sin(10y) sin(10z)` picks between
/// the two sub-textures, so the pattern is solid rather than painted on the
/// surface.
pub struct CheckerTexture {
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl CheckerTexture {
    pub fn new(even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self { even, odd }
    }

    pub fn from_colors(even: Color, odd: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(even)), Arc::new(SolidColor::new(odd)))
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let sines = (10.0 * p.x).sin() * (10.0 * p.y).sin() * (10.0 * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Grey-scale Perlin noise.
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
}

impl NoiseTexture {
    pub fn new(noise: Perlin, scale: f32) -> Self {
        Self { noise, scale }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        Color::ONE * self.noise.noise(p * self.scale)
    }
}

/// Nearest-neighbour lookup into an 8-bit RGB raster.
///
/// `v = 1` is the top row of the image. Coordinates outside `[0, 1]` clamp to
/// the border instead of wrapping.
#[derive(Clone)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    /// Row-major RGB, 3 bytes per pixel
    data: Vec<u8>,
}

impl ImageTexture {
    /// Wrap already-decoded RGB bytes.
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> TextureResult<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(TextureError::DimensionMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decode an image file into an RGB texture.
    pub fn open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();

        log::debug!(
            "Loaded image texture: {} ({}x{}, {:.1} KB)",
            path.display(),
            width,
            height,
            (width * height * 3) as f32 / 1024.0
        );

        Self::from_rgb8(width, height, rgb.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        if self.width == 0 || self.height == 0 {
            return Color::ZERO;
        }

        let nx = self.width as i64;
        let ny = self.height as i64;
        let i = ((u * nx as f32) as i64).clamp(0, nx - 1);
        let j = (((1.0 - v) * ny as f32 - 0.001) as i64).clamp(0, ny - 1);

        let idx = (3 * (i + nx * j)) as usize;
        let texel = &self.data[idx..idx + 3];
        Color::new(
            texel[0] as f32 / 255.0,
            texel[1] as f32 / 255.0,
            texel[2] as f32 / 255.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_solid_color_ignores_inputs() {
        let tex = SolidColor::rgb(1.0, 0.5, 0.0);
        assert_eq!(tex.value(0.3, 0.9, Vec3::new(4.0, 5.0, 6.0)), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_checker_alternates() {
        let tex = CheckerTexture::from_colors(Color::ONE, Color::ZERO);
        let step = std::f32::consts::PI / 10.0;

        // sin(10x) flips sign every pi/10 along x.
        let a = tex.value(0.0, 0.0, Vec3::splat(step * 0.5));
        let b = tex.value(0.0, 0.0, Vec3::new(step * 1.5, step * 0.5, step * 0.5));
        assert_eq!(a, Color::ONE);
        assert_eq!(b, Color::ZERO);
    }

    #[test]
    fn test_noise_texture_is_grey() {
        let mut rng = StdRng::seed_from_u64(42);
        let tex = NoiseTexture::new(Perlin::new(&mut rng), 4.0);
        let c = tex.value(0.0, 0.0, Vec3::new(0.3, 1.7, -2.2));
        assert_eq!(c.x, c.y);
        assert_eq!(c.y, c.z);
        assert!((0.0..=1.0).contains(&c.x));
    }

    fn two_by_two() -> ImageTexture {
        // Top row red, green. Bottom row blue, white.
        let data = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        ImageTexture::from_rgb8(2, 2, data).unwrap()
    }

    #[test]
    fn test_image_texture_lookup() {
        let tex = two_by_two();
        assert_eq!((tex.width(), tex.height()), (2, 2));
        // v = 1 is the top of the image.
        assert_eq!(tex.value(0.25, 0.75, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(0.75, 0.75, Vec3::ZERO), Color::new(0.0, 1.0, 0.0));
        assert_eq!(tex.value(0.25, 0.25, Vec3::ZERO), Color::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_image_texture_clamps_out_of_range() {
        let tex = two_by_two();
        assert_eq!(tex.value(-3.0, 9.0, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(5.0, -2.0, Vec3::ZERO), Color::ONE);
    }

    #[test]
    fn test_image_texture_rejects_bad_length() {
        assert!(matches!(
            ImageTexture::from_rgb8(4, 4, vec![0; 10]),
            Err(TextureError::DimensionMismatch { expected: 48, actual: 10, .. })
        ));
    }

    #[test]
    fn test_empty_image_samples_black() {
        let tex = ImageTexture::from_rgb8(0, 0, Vec::new()).unwrap();
        assert_eq!((tex.width(), tex.height()), (0, 0));
        assert_eq!(tex.value(0.5, 0.5, Vec3::ONE), Color::ZERO);
    }

    #[test]
    fn test_open_missing_file_is_error() {
        let _ = env_logger::builder().is_test(true).try_init();
        assert!(ImageTexture::open("does/not/exist.png").is_err());
    }
}

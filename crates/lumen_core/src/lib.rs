//! Lumen Core - surface colour sources for the Lumen path tracer.
//!
//! This crate provides the texture model materials sample from:
//!
//! - **Solid colours** and **3D checkers**
//! - **Perlin noise**, with an explicitly constructed, seedable lattice
//! - **Image textures**, nearest-neighbour lookups into RGB rasters
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{ImageTexture, Texture};
//!
//! let earth = ImageTexture::open("textures/earth.jpg")?;
//! let color = earth.value(0.5, 0.5, Vec3::ZERO);
//! ```

pub mod perlin;
pub mod texture;

// Re-export commonly used types
pub use perlin::Perlin;
pub use texture::{
    CheckerTexture, Color, ImageTexture, NoiseTexture, SolidColor, Texture, TextureError,
    TextureResult,
};

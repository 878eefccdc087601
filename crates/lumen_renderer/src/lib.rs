//! Lumen renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer for physically-based rendering: geometry and
//! transform wrappers, a BVH, scattering materials, the recursive integrator
//! and a row-parallel scheduler built on scoped threads.

mod aa_box;
mod bvh;
mod camera;
mod hittable;
mod material;
mod medium;
mod rect;
mod renderer;
pub mod sampling;
mod scene;
pub mod scheduler;
mod sphere;
mod transform;

pub use aa_box::AaBox;
pub use bvh::{BvhError, BvhNode};
pub use camera::Camera;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{
    reflect, refract, schlick, Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal,
    ScatterResult,
};
pub use medium::ConstantMedium;
pub use rect::{AaRect, Plane};
pub use renderer::{
    color_to_rgb8, linear_to_gamma, ray_color, render_pixel, render_rows, row_rng, ImageBuffer,
    RenderConfig, SHADOW_EPSILON,
};
pub use scene::{render_scene, Scene};
pub use scheduler::{plan_row_blocks, MAX_DEPTH_LIMIT, MIN_ROWS_PER_WORKER};
pub use sphere::{MovingSphere, Sphere};
pub use transform::{FlipNormals, RotateY, Translate};

/// Re-export the texture model and math types used in public signatures
pub use lumen_core::{Color, Texture};
pub use lumen_math::{Aabb, Interval, Ray, Vec3};

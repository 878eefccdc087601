//! Lumen math types.
//!
//! Vectors come from glam; this crate adds the small value types the
//! renderer needs on top of them: rays, intervals and bounding boxes.

pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

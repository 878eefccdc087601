//! Instancing wrappers that move, rotate or turn a child inside out.
//!
//! Each wrapper maps the incoming ray into the child's frame, delegates, and
//! maps the hit point and normal back. The child is never modified.

use crate::hittable::{HitRecord, Hittable};
use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Offsets a child by a fixed vector.
pub struct Translate<H: Hittable> {
    object: H,
    offset: Vec3,
}

impl<H: Hittable> Translate<H> {
    pub fn new(object: H, offset: Vec3) -> Self {
        Self { object, offset }
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }
}

impl<H: Hittable> Hittable for Translate<H> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let moved = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());
        let mut rec = self.object.hit(&moved, ray_t, rng)?;
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self, time: Interval) -> Option<Aabb> {
        self.object
            .bounding_box(time)
            .map(|bbox| bbox.translate(self.offset))
    }
}

/// Rotates a child about the Y axis.
pub struct RotateY<H: Hittable> {
    object: H,
    sin_theta: f32,
    cos_theta: f32,
}

impl<H: Hittable> RotateY<H> {
    /// Rotation by `angle` degrees, counter-clockwise looking down -Y.
    pub fn new(object: H, angle: f32) -> Self {
        let (sin_theta, cos_theta) = angle.to_radians().sin_cos();
        Self {
            object,
            sin_theta,
            cos_theta,
        }
    }

    /// World frame to object frame.
    #[inline]
    fn to_object(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x - self.sin_theta * v.z,
            v.y,
            self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }

    /// Object frame to world frame.
    #[inline]
    fn to_world(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x + self.sin_theta * v.z,
            v.y,
            -self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }
}

impl<H: Hittable> Hittable for RotateY<H> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let rotated = Ray::new(
            self.to_object(ray.origin()),
            self.to_object(ray.direction()),
            ray.time(),
        );
        let mut rec = self.object.hit(&rotated, ray_t, rng)?;
        rec.p = self.to_world(rec.p);
        rec.normal = self.to_world(rec.normal);
        Some(rec)
    }

    fn bounding_box(&self, time: Interval) -> Option<Aabb> {
        let child = self.object.bounding_box(time)?;
        let corners = child.corners().map(|c| self.to_world(c));

        let (min, max) = corners
            .iter()
            .fold((Vec3::INFINITY, Vec3::NEG_INFINITY), |(lo, hi), &c| {
                (lo.min(c), hi.max(c))
            });
        Some(Aabb::from_points(min, max))
    }
}

/// Negates the child's normal, turning a surface to face the other way.
pub struct FlipNormals<H: Hittable> {
    object: H,
}

impl<H: Hittable> FlipNormals<H> {
    pub fn new(object: H) -> Self {
        Self { object }
    }
}

impl<H: Hittable> Hittable for FlipNormals<H> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let mut rec = self.object.hit(ray, ray_t, rng)?;
        rec.normal = -rec.normal;
        Some(rec)
    }

    fn bounding_box(&self, time: Interval) -> Option<Aabb> {
        self.object.bounding_box(time)
    }
}

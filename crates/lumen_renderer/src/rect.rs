//! Axis-aligned rectangles.
//!
//! A rectangle lies in a plane perpendicular to one coordinate axis at offset
//! `k`, bounded on the other two axes. It has zero thickness; its bounding
//! box is padded along the fixed axis.

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Half-thickness given to the bounding box along the fixed axis.
const PLANE_PAD: f32 = 0.0001;

/// Orientation of an [`AaRect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// Spans X and Y, fixed Z
    XY,
    /// Spans X and Z, fixed Y
    XZ,
    /// Spans Y and Z, fixed X
    YZ,
}

impl Plane {
    /// `(first spanned axis, second spanned axis, fixed axis)`
    #[inline]
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::XY => (0, 1, 2),
            Plane::XZ => (0, 2, 1),
            Plane::YZ => (1, 2, 0),
        }
    }
}

/// An axis-aligned rectangle `[a0, a1] x [b0, b1]` at `k` on the fixed axis.
pub struct AaRect<M: Material> {
    plane: Plane,
    a0: f32,
    a1: f32,
    b0: f32,
    b1: f32,
    k: f32,
    material: M,
}

impl<M: Material> AaRect<M> {
    pub fn new(plane: Plane, a0: f32, a1: f32, b0: f32, b1: f32, k: f32, material: M) -> Self {
        Self {
            plane,
            a0,
            a1,
            b0,
            b1,
            k,
            material,
        }
    }

    /// Rectangle in the plane `z = k`.
    pub fn xy(x0: f32, x1: f32, y0: f32, y1: f32, k: f32, material: M) -> Self {
        Self::new(Plane::XY, x0, x1, y0, y1, k, material)
    }

    /// Rectangle in the plane `y = k`.
    pub fn xz(x0: f32, x1: f32, z0: f32, z1: f32, k: f32, material: M) -> Self {
        Self::new(Plane::XZ, x0, x1, z0, z1, k, material)
    }

    /// Rectangle in the plane `x = k`.
    pub fn yz(y0: f32, y1: f32, z0: f32, z1: f32, k: f32, material: M) -> Self {
        Self::new(Plane::YZ, y0, y1, z0, z1, k, material)
    }

    pub fn plane(&self) -> Plane {
        self.plane
    }
}

impl<M: Material + 'static> Hittable for AaRect<M> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let (a_axis, b_axis, k_axis) = self.plane.axes();
        let origin = ray.origin();
        let direction = ray.direction();

        // Parallel rays give an infinite or NaN t, which never surrounds.
        let t = (self.k - origin[k_axis]) / direction[k_axis];
        if !ray_t.surrounds(t) {
            return None;
        }

        let a = origin[a_axis] + t * direction[a_axis];
        let b = origin[b_axis] + t * direction[b_axis];
        if a < self.a0 || a > self.a1 || b < self.b0 || b > self.b1 {
            return None;
        }

        let mut normal = Vec3::ZERO;
        normal[k_axis] = 1.0;

        Some(HitRecord {
            t,
            p: ray.at(t),
            normal,
            material: &self.material,
            u: (a - self.a0) / (self.a1 - self.a0),
            v: (b - self.b0) / (self.b1 - self.b0),
        })
    }

    fn bounding_box(&self, _time: Interval) -> Option<Aabb> {
        let (a_axis, b_axis, k_axis) = self.plane.axes();
        let mut min = Vec3::ZERO;
        let mut max = Vec3::ZERO;
        min[a_axis] = self.a0;
        max[a_axis] = self.a1;
        min[b_axis] = self.b0;
        max[b_axis] = self.b1;
        min[k_axis] = self.k - PLANE_PAD;
        max[k_axis] = self.k + PLANE_PAD;
        Some(Aabb::from_points(min, max))
    }
}

use crate::{Interval, Ray, Vec3};

/// Minimum thickness of any box axis. Flat geometry (rectangles) gets padded
/// to this so the slab test never divides a zero-width slab.
const MIN_AXIS_EXTENT: f32 = 0.0001;

/// Axis-aligned bounding box, one [`Interval`] per axis.
///
/// Boxes built through [`Aabb::new`] or [`Aabb::from_points`] always satisfy
/// `min[i] <= max[i]` on every axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Box spanned by two opposite corners, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self::new(
            Interval::new(a.x.min(b.x), a.x.max(b.x)),
            Interval::new(a.y.min(b.y), a.y.max(b.y)),
            Interval::new(a.z.min(b.z), a.z.max(b.z)),
        )
    }

    /// Tightest box containing both boxes. Commutative and associative, so
    /// child boxes can be folded upward in any order.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Interval for axis `n` (0 = X, 1 = Y, 2 = Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Slab test against the ray over `ray_t`.
    ///
    /// A zero direction component produces infinite slab distances, which
    /// compare correctly. A ray origin lying exactly on such a slab yields
    /// NaN, which `f32::max`/`f32::min` ignore, so the window is left as is
    /// and the box is never falsely missed.
    pub fn hit(&self, ray: &Ray, mut ray_t: Interval) -> bool {
        let origin = ray.origin();
        let direction = ray.direction();

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let inv_d = 1.0 / direction[axis];
            let mut t0 = (slab.min - origin[axis]) * inv_d;
            let mut t1 = (slab.max - origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if !(ray_t.max > ray_t.min) {
                return false;
            }
        }

        true
    }

    /// The box moved by `offset`.
    pub fn translate(&self, offset: Vec3) -> Aabb {
        Aabb::new(
            self.x.add_scalar(offset.x),
            self.y.add_scalar(offset.y),
            self.z.add_scalar(offset.z),
        )
    }

    /// The eight corners, in `(i, j, k)` bit order of (x, y, z) max/min.
    pub fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::ZERO; 8];
        for (n, corner) in corners.iter_mut().enumerate() {
            *corner = Vec3::new(
                if n & 1 == 0 { self.x.min } else { self.x.max },
                if n & 2 == 0 { self.y.min } else { self.y.max },
                if n & 4 == 0 { self.z.min } else { self.z.max },
            );
        }
        corners
    }

    fn pad_to_minimums(&mut self) {
        if self.x.size() < MIN_AXIS_EXTENT {
            self.x = self.x.expand(MIN_AXIS_EXTENT);
        }
        if self.y.size() < MIN_AXIS_EXTENT {
            self.y = self.y.expand(MIN_AXIS_EXTENT);
        }
        if self.z.size() < MIN_AXIS_EXTENT {
            self.z = self.z.expand(MIN_AXIS_EXTENT);
        }
    }
}

//! Sphere primitives, static and moving.

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A sphere primitive.
pub struct Sphere<M: Material> {
    center: Vec3,
    radius: f32,
    material: M,
}

impl<M: Material> Sphere<M> {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: M) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }
}

impl<M: Material + 'static> Hittable for Sphere<M> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        hit_sphere(self.center, self.radius, &self.material, ray, ray_t)
    }

    fn bounding_box(&self, _time: Interval) -> Option<Aabb> {
        Some(sphere_box(self.center, self.radius))
    }
}

/// A sphere whose center moves linearly from `center0` at `time0` to
/// `center1` at `time1`. Rays sample the position at their own time.
pub struct MovingSphere<M: Material> {
    center0: Vec3,
    center1: Vec3,
    time0: f32,
    time1: f32,
    radius: f32,
    material: M,
}

impl<M: Material> MovingSphere<M> {
    pub fn new(
        center0: Vec3,
        center1: Vec3,
        time0: f32,
        time1: f32,
        radius: f32,
        material: M,
    ) -> Self {
        Self {
            center0,
            center1,
            time0,
            time1,
            radius: radius.max(0.0),
            material,
        }
    }

    /// Center at `time`. Extrapolates outside `[time0, time1]`.
    pub fn center(&self, time: f32) -> Vec3 {
        let span = self.time1 - self.time0;
        if span.abs() < f32::EPSILON {
            return self.center0;
        }
        self.center0 + ((time - self.time0) / span) * (self.center1 - self.center0)
    }
}

impl<M: Material + 'static> Hittable for MovingSphere<M> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        hit_sphere(self.center(ray.time()), self.radius, &self.material, ray, ray_t)
    }

    fn bounding_box(&self, time: Interval) -> Option<Aabb> {
        let box0 = sphere_box(self.center(time.min), self.radius);
        let box1 = sphere_box(self.center(time.max), self.radius);
        Some(Aabb::surrounding(&box0, &box1))
    }
}

fn sphere_box(center: Vec3, radius: f32) -> Aabb {
    let rvec = Vec3::splat(radius);
    Aabb::from_points(center - rvec, center + rvec)
}

/// Solve `|origin + t dir - center|^2 = r^2` and keep the nearer root inside
/// `ray_t`, falling back to the farther one.
fn hit_sphere<'a>(
    center: Vec3,
    radius: f32,
    material: &'a dyn Material,
    ray: &Ray,
    ray_t: Interval,
) -> Option<HitRecord<'a>> {
    let oc = center - ray.origin();
    let a = ray.direction().length_squared();
    let h = ray.direction().dot(oc);
    let c = oc.length_squared() - radius * radius;

    // Tangent rays and NaN both miss
    let discriminant = h * h - a * c;
    if !(discriminant > 0.0) {
        return None;
    }
    let sqrtd = discriminant.sqrt();

    let mut root = (h - sqrtd) / a;
    if !ray_t.surrounds(root) {
        root = (h + sqrtd) / a;
        if !ray_t.surrounds(root) {
            return None;
        }
    }

    let p = ray.at(root);
    let normal = (p - center) / radius;
    let (u, v) = sphere_uv(normal);

    Some(HitRecord {
        t: root,
        p,
        normal,
        material,
        u,
        v,
    })
}

/// Surface coordinates of a point on the unit sphere.
///
/// u runs around the Y axis, v from the south pole (0) to the north pole (1).
fn sphere_uv(p: Vec3) -> (f32, f32) {
    let phi = p.z.atan2(p.x);
    let theta = p.y.clamp(-1.0, 1.0).asin();
    let u = 1.0 - (phi + PI) / (2.0 * PI);
    let v = (theta + PI / 2.0) / PI;
    (u, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray() -> Lambertian {
        Lambertian::new(Vec3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray());
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rng = StdRng::seed_from_u64(42);

        let rec = sphere
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 0.5).abs() < 0.001);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray());
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 0.0);
        let mut rng = StdRng::seed_from_u64(42);

        assert!(sphere
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .is_none());
    }

    #[test]
    fn test_sphere_picks_nearer_root_then_farther() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, gray());
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X, 0.0);
        let mut rng = StdRng::seed_from_u64(42);

        // Roots at t = 4 and t = 6.
        let near = sphere.hit(&ray, Interval::new(0.001, 100.0), &mut rng).unwrap();
        assert!((near.t - 4.0).abs() < 1e-5);
        assert!((near.normal + Vec3::X).length() < 1e-5);

        let far = sphere.hit(&ray, Interval::new(4.5, 100.0), &mut rng).unwrap();
        assert!((far.t - 6.0).abs() < 1e-5);
        // Normal stays outward from the inside.
        assert!((far.normal - Vec3::X).length() < 1e-5);

        assert!(sphere.hit(&ray, Interval::new(4.5, 5.5), &mut rng).is_none());
        // Open interval: a root exactly on the bound is rejected.
        assert!(sphere.hit(&ray, Interval::new(0.0, 4.0), &mut rng).is_none());
    }

    #[test]
    fn test_tangent_ray_misses() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, gray());
        let ray = Ray::new(Vec3::new(-5.0, 1.0, 0.0), Vec3::X, 0.0);
        let mut rng = StdRng::seed_from_u64(42);
        assert!(sphere.hit(&ray, Interval::UNIVERSE, &mut rng).is_none());
    }

    #[test]
    fn test_sphere_uv() {
        let (u, v) = sphere_uv(Vec3::Y);
        assert!((v - 1.0).abs() < 1e-6);
        assert!((0.0..=1.0).contains(&u));

        let (_, v) = sphere_uv(-Vec3::Y);
        assert!(v.abs() < 1e-6);

        let (u, v) = sphere_uv(-Vec3::X);
        assert!((v - 0.5).abs() < 1e-6);
        assert!(u.abs() < 1e-6 || (u - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_moving_sphere_follows_time() {
        let sphere = MovingSphere::new(
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::new(2.0, 0.0, -5.0),
            0.0,
            1.0,
            0.5,
            gray(),
        );
        let mut rng = StdRng::seed_from_u64(42);

        assert_eq!(sphere.center(0.5), Vec3::new(1.0, 0.0, -5.0));

        let at_start = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let at_end = Ray::new(Vec3::ZERO, -Vec3::Z, 1.0);
        assert!(sphere.hit(&at_start, Interval::new(0.001, 100.0), &mut rng).is_some());
        assert!(sphere.hit(&at_end, Interval::new(0.001, 100.0), &mut rng).is_none());
    }

    #[test]
    fn test_moving_sphere_uv_relative_to_current_center() {
        let sphere = MovingSphere::new(
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::new(2.0, 0.0, -5.0),
            0.0,
            1.0,
            0.5,
            gray(),
        );
        let mut rng = StdRng::seed_from_u64(42);

        // Hits the +Z pole of the sphere at its end position.
        let ray = Ray::new(Vec3::new(2.0, 0.0, 0.0), -Vec3::Z, 1.0);
        let rec = sphere.hit(&ray, Interval::new(0.001, 100.0), &mut rng).unwrap();
        assert!((rec.p - Vec3::new(2.0, 0.0, -4.5)).length() < 1e-5);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);

        let (u, v) = sphere_uv(Vec3::Z);
        assert!((rec.u - u).abs() < 1e-5);
        assert!((rec.v - v).abs() < 1e-5);
        assert!((rec.u - 0.25).abs() < 1e-5);
        assert!((rec.v - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_moving_sphere_box_covers_shutter() {
        let sphere = MovingSphere::new(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), 0.0, 1.0, 1.0, gray());
        let bbox = sphere.bounding_box(Interval::new(0.0, 1.0)).unwrap();
        assert_eq!(bbox.min(), Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(bbox.max(), Vec3::new(5.0, 1.0, 1.0));
    }
}

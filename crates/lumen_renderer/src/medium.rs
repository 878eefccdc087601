//! Constant-density participating medium (fog, smoke).

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    sampling::gen_f32,
    Isotropic,
};
use lumen_core::{Color, Texture};
use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Gap between the entry hit and the search for the exit hit.
const EXIT_SEARCH_OFFSET: f32 = 0.0001;

/// A volume of uniform density filling a closed boundary shape.
///
/// A ray that crosses the boundary travels an exponentially distributed
/// free-flight distance before scattering; if that distance is longer than
/// the chord through the volume the ray passes straight through.
pub struct ConstantMedium<H: Hittable> {
    boundary: H,
    neg_inv_density: f32,
    phase_function: Isotropic,
}

impl<H: Hittable> ConstantMedium<H> {
    pub fn new(boundary: H, density: f32, albedo: Arc<dyn Texture>) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function: Isotropic::from_texture(albedo),
        }
    }

    pub fn with_color(boundary: H, density: f32, albedo: Color) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function: Isotropic::new(albedo),
        }
    }
}

impl<H: Hittable> Hittable for ConstantMedium<H> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self.boundary.hit(
            ray,
            Interval::new(entry.t + EXIT_SEARCH_OFFSET, f32::INFINITY),
            rng,
        )?;

        let mut t_enter = entry.t.max(ray_t.min);
        let t_exit = exit.t.min(ray_t.max);
        if !(t_enter < t_exit) {
            return None;
        }
        t_enter = t_enter.max(0.0);

        let ray_length = ray.direction().length();
        let distance_inside = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * gen_f32(rng).ln();
        if !(hit_distance <= distance_inside) {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        Some(HitRecord {
            t,
            p: ray.at(t),
            // Arbitrary, the phase function ignores it
            normal: Vec3::X,
            material: &self.phase_function,
            u: 0.0,
            v: 0.0,
        })
    }

    fn bounding_box(&self, time: Interval) -> Option<Aabb> {
        self.boundary.bounding_box(time)
    }
}

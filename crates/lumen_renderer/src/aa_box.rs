//! Axis-aligned box built from six rectangles.

use crate::{
    hittable::{HitRecord, Hittable, HittableList},
    AaRect, FlipNormals, Material,
};
use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// A closed axis-aligned box. Faces on the minimum side of each axis are
/// flipped so every normal points out of the box.
pub struct AaBox {
    pmin: Vec3,
    pmax: Vec3,
    faces: HittableList,
}

impl AaBox {
    /// Box spanned by two opposite corners, in any order.
    pub fn new<M: Material + Clone + 'static>(p0: Vec3, p1: Vec3, material: M) -> Self {
        let pmin = p0.min(p1);
        let pmax = p0.max(p1);

        let mut faces = HittableList::new();
        faces.add(Box::new(AaRect::xy(pmin.x, pmax.x, pmin.y, pmax.y, pmax.z, material.clone())));
        faces.add(Box::new(FlipNormals::new(AaRect::xy(
            pmin.x,
            pmax.x,
            pmin.y,
            pmax.y,
            pmin.z,
            material.clone(),
        ))));
        faces.add(Box::new(AaRect::xz(pmin.x, pmax.x, pmin.z, pmax.z, pmax.y, material.clone())));
        faces.add(Box::new(FlipNormals::new(AaRect::xz(
            pmin.x,
            pmax.x,
            pmin.z,
            pmax.z,
            pmin.y,
            material.clone(),
        ))));
        faces.add(Box::new(AaRect::yz(pmin.y, pmax.y, pmin.z, pmax.z, pmax.x, material.clone())));
        faces.add(Box::new(FlipNormals::new(AaRect::yz(
            pmin.y, pmax.y, pmin.z, pmax.z, pmin.x, material,
        ))));

        Self { pmin, pmax, faces }
    }
}

impl Hittable for AaBox {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        self.faces.hit(ray, ray_t, rng)
    }

    fn bounding_box(&self, _time: Interval) -> Option<Aabb> {
        Some(Aabb::from_points(self.pmin, self.pmax))
    }
}

//! Material trait for surface scattering.

use std::sync::Arc;

use crate::hittable::HitRecord;
use crate::sampling::{gen_f32, random_in_unit_sphere};
use lumen_core::{Color, SolidColor, Texture};
use lumen_math::{Ray, Vec3};
use rand::RngCore;

/// Outcome of a successful scatter.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Per-channel throughput applied to the light arriving along `scattered`
    pub attenuation: Color,
    /// The continuation ray, starting at the hit point
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult>;

    /// Radiance emitted at the given surface coordinates and point.
    /// Most materials return black.
    fn emitted(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        Color::ZERO
    }
}

impl<M: Material + ?Sized> Material for Arc<M> {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        (**self).scatter(ray_in, rec, rng)
    }

    fn emitted(&self, u: f32, v: f32, p: Vec3) -> Color {
        (**self).emitted(u, v, p)
    }
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    /// Create a new Lambertian material with a constant albedo.
    pub fn new(albedo: Color) -> Self {
        Self::from_texture(Arc::new(SolidColor::new(albedo)))
    }

    pub fn from_texture(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        // Target point inside the unit sphere tangent to the surface at p
        let mut scatter_direction = rec.normal + random_in_unit_sphere(rng);

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, scatter_direction, ray_in.time()),
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, clamped to [0, 1]. 0.0 is a perfect mirror.
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let mut direction = reflect(ray_in.direction().normalize(), rec.normal);
        if self.fuzz > 0.0 {
            direction += self.fuzz * random_in_unit_sphere(rng);
        }

        // Perturbed below the surface: absorbed
        if direction.dot(rec.normal) > 0.0 {
            Some(ScatterResult {
                attenuation: self.albedo,
                scattered: Ray::new(rec.p, direction, ray_in.time()),
            })
        } else {
            None
        }
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Index of refraction
    ref_idx: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ref_idx`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ref_idx: f32) -> Self {
        Self { ref_idx }
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let direction = ray_in.direction();
        let reflected = reflect(direction, rec.normal);
        let d_dot_n = direction.dot(rec.normal);

        // Normals point outward, so a positive dot product means the ray is
        // leaving the medium.
        let (outward_normal, ni_over_nt, cosine) = if d_dot_n > 0.0 {
            (
                -rec.normal,
                self.ref_idx,
                (self.ref_idx * d_dot_n / direction.length()).min(1.0),
            )
        } else {
            (rec.normal, 1.0 / self.ref_idx, -d_dot_n / direction.length())
        };

        let scattered_dir = match refract(direction, outward_normal, ni_over_nt) {
            Some(refracted) if gen_f32(rng) >= schlick(cosine, self.ref_idx) => refracted,
            // Fresnel reflection, or total internal reflection
            _ => reflected,
        };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, scattered_dir, ray_in.time()),
        })
    }
}

/// Diffuse light emitter. Never scatters.
#[derive(Clone)]
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self::from_texture(Arc::new(SolidColor::new(emit)))
    }

    pub fn from_texture(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        None
    }

    fn emitted(&self, u: f32, v: f32, p: Vec3) -> Color {
        self.emit.value(u, v, p)
    }
}

/// Phase function for participating media: scatters uniformly, ignoring the
/// incoming direction and the (meaningless) normal.
#[derive(Clone)]
pub struct Isotropic {
    albedo: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(albedo: Color) -> Self {
        Self::from_texture(Arc::new(SolidColor::new(albedo)))
    }

    pub fn from_texture(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }
}

impl Material for Isotropic {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        Some(ScatterResult {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, random_in_unit_sphere(rng), ray_in.time()),
        })
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract `v` through a surface with normal `n` facing the incoming side.
///
/// Returns `None` on total internal reflection.
pub fn refract(v: Vec3, n: Vec3, ni_over_nt: f32) -> Option<Vec3> {
    let uv = v.normalize();
    let dt = uv.dot(n);
    let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
    if discriminant > 0.0 {
        Some(ni_over_nt * (uv - n * dt) - n * discriminant.sqrt())
    } else {
        None
    }
}

/// Schlick's approximation for reflectance
#[inline]
pub fn schlick(cosine: f32, ref_idx: f32) -> f32 {
    let r0 = ((1.0 - ref_idx) / (1.0 + ref_idx)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record<'a>(material: &'a dyn Material, normal: Vec3) -> HitRecord<'a> {
        HitRecord {
            t: 1.0,
            p: Vec3::ZERO,
            normal,
            material,
            u: 0.5,
            v: 0.5,
        }
    }

    #[test]
    fn test_lambertian_always_scatters() {
        let mat = Lambertian::new(Color::new(0.8, 0.3, 0.1));
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y, 0.3);

        for n in 0..500 {
            let normal = Vec3::new((n as f32).sin(), (n as f32).cos(), 0.5).normalize();
            let rec = record(&mat, normal);
            let result = mat.scatter(&ray, &rec, &mut rng).expect("lambertian absorbed");
            assert_eq!(result.attenuation, Color::new(0.8, 0.3, 0.1));
            assert_eq!(result.scattered.time(), 0.3);
            assert!(result.scattered.direction().length_squared() > 0.0);
        }
    }

    #[test]
    fn test_metal_without_fuzz_is_mirror() {
        let mat = Metal::new(Color::ONE, 0.0);
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), 0.0);
        let rec = record(&mat, Vec3::Y);

        let result = mat.scatter(&ray, &rec, &mut rng).unwrap();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((result.scattered.direction() - expected).length() < 1e-6);
    }

    #[test]
    fn test_metal_fuzz_is_clamped() {
        let mat = Metal::new(Color::ONE, 7.0);
        assert_eq!(mat.fuzz, 1.0);
    }

    #[test]
    fn test_metal_absorbs_below_surface() {
        let mat = Metal::new(Color::ONE, 0.0);
        let mut rng = StdRng::seed_from_u64(42);
        // Ray travelling with the normal: the mirror direction points into
        // the surface.
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 1.0), 0.0);
        let rec = record(&mat, Vec3::Y);
        assert!(mat.scatter(&ray, &rec, &mut rng).is_none());
    }

    #[test]
    fn test_dielectric_is_neutral() {
        let mat = Dielectric::new(1.5);
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.3, -1.0, 0.0), 0.0);
        let rec = record(&mat, Vec3::Y);

        for _ in 0..100 {
            let result = mat.scatter(&ray, &rec, &mut rng).unwrap();
            assert_eq!(result.attenuation, Color::ONE);
        }
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let mat = Dielectric::new(1.5);
        let mut rng = StdRng::seed_from_u64(42);
        // Leaving glass at a grazing angle, well past the critical angle.
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.2, 0.0), 0.0);
        let rec = record(&mat, Vec3::Y);

        for _ in 0..50 {
            let result = mat.scatter(&ray, &rec, &mut rng).unwrap();
            let expected = reflect(ray.direction(), Vec3::Y);
            assert!((result.scattered.direction() - expected).length() < 1e-6);
        }
    }

    #[test]
    fn test_dielectric_head_on_mostly_refracts() {
        let mat = Dielectric::new(1.5);
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y, 0.0);
        let rec = record(&mat, Vec3::Y);

        let refracted = (0..1000)
            .filter(|_| {
                let result = mat.scatter(&ray, &rec, &mut rng).unwrap();
                result.scattered.direction().y < 0.0
            })
            .count();

        // Normal incidence reflectance for n = 1.5 is 4%.
        assert!(refracted > 900, "refracted {} of 1000", refracted);
    }

    #[test]
    fn test_dielectric_exit_cosine_is_clamped() {
        let mat = Dielectric::new(1.5);
        let mut rng = StdRng::seed_from_u64(7);
        // Leaving glass head on: ref_idx * cos = 1.5, clamped to 1 so the
        // Fresnel term stays at its normal-incidence value of 4%.
        let ray = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);
        let rec = record(&mat, Vec3::Y);

        let refracted = (0..2000)
            .filter(|_| {
                let result = mat.scatter(&ray, &rec, &mut rng).unwrap();
                result.scattered.direction().y > 0.0
            })
            .count();

        // Unclamped, reflectance drops to about 1%.
        assert!((1860..=1960).contains(&refracted), "refracted {} of 2000", refracted);
        assert!((schlick(1.0, 1.5) - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_diffuse_light_emits_and_absorbs() {
        let mat = DiffuseLight::new(Color::new(4.0, 4.0, 4.0));
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::Y, -Vec3::Y, 0.0);
        let rec = record(&mat, Vec3::Y);

        assert!(mat.scatter(&ray, &rec, &mut rng).is_none());
        assert_eq!(mat.emitted(0.0, 0.0, Vec3::ZERO), Color::splat(4.0));
        assert_eq!(Lambertian::new(Color::ONE).emitted(0.0, 0.0, Vec3::ZERO), Color::ZERO);
    }

    #[test]
    fn test_isotropic_ignores_normal() {
        let mat = Isotropic::new(Color::splat(0.9));
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 0.0);
        let rec = record(&mat, Vec3::X);

        let mut behind = 0;
        for _ in 0..1000 {
            let result = mat.scatter(&ray, &rec, &mut rng).unwrap();
            assert!(result.scattered.direction().length_squared() < 1.0);
            if result.scattered.direction().dot(Vec3::X) < 0.0 {
                behind += 1;
            }
        }
        assert!(behind > 350 && behind < 650, "behind = {}", behind);
    }

    #[test]
    fn test_schlick_bounds() {
        assert!((schlick(1.0, 1.5) - 0.04).abs() < 1e-6);
        assert!((schlick(0.0, 1.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_shared_material_through_arc() {
        let shared = Arc::new(DiffuseLight::new(Color::ONE));
        let alias = Arc::clone(&shared);
        assert_eq!(alias.emitted(0.0, 0.0, Vec3::ZERO), Color::ONE);
    }
}

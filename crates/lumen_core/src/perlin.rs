//! Value noise on a hashed lattice, smoothed with a Hermite cubic.

use lumen_math::Vec3;
use rand::seq::SliceRandom;
use rand::Rng;

const POINT_COUNT: usize = 256;

/// Perlin noise generator.
///
/// Owns its random lattice values and three axis permutations, drawn from
/// the RNG passed to [`Perlin::new`].
#[derive(Clone)]
pub struct Perlin {
    ranfloat: [f32; POINT_COUNT],
    perm_x: [u8; POINT_COUNT],
    perm_y: [u8; POINT_COUNT],
    perm_z: [u8; POINT_COUNT],
}

impl Perlin {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut ranfloat = [0.0; POINT_COUNT];
        for value in ranfloat.iter_mut() {
            *value = rng.gen::<f32>();
        }

        Self {
            ranfloat,
            perm_x: generate_perm(rng),
            perm_y: generate_perm(rng),
            perm_z: generate_perm(rng),
        }
    }

    /// Noise value in `[0, 1)` at point `p`.
    pub fn noise(&self, p: Vec3) -> f32 {
        let floor = p.floor();
        let frac = p - floor;
        let (u, v, w) = (hermite(frac.x), hermite(frac.y), hermite(frac.z));

        let i = floor.x as i32;
        let j = floor.y as i32;
        let k = floor.z as i32;

        let mut c = [[[0.0f32; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let hash = self.perm_x[lattice(i, di)]
                        ^ self.perm_y[lattice(j, dj)]
                        ^ self.perm_z[lattice(k, dk)];
                    *cell = self.ranfloat[hash as usize];
                }
            }
        }

        trilinear_interp(&c, u, v, w)
    }
}

fn generate_perm<R: Rng + ?Sized>(rng: &mut R) -> [u8; POINT_COUNT] {
    let mut perm = [0u8; POINT_COUNT];
    for (i, slot) in perm.iter_mut().enumerate() {
        *slot = i as u8;
    }
    perm.shuffle(rng);
    perm
}

#[inline]
fn lattice(base: i32, offset: usize) -> usize {
    (base.wrapping_add(offset as i32) & 255) as usize
}

#[inline]
fn hermite(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn trilinear_interp(c: &[[[f32; 2]; 2]; 2], u: f32, v: f32, w: f32) -> f32 {
    let mut accum = 0.0;
    for (i, plane) in c.iter().enumerate() {
        let fi = i as f32;
        for (j, row) in plane.iter().enumerate() {
            let fj = j as f32;
            for (k, value) in row.iter().enumerate() {
                let fk = k as f32;
                accum += (fi * u + (1.0 - fi) * (1.0 - u))
                    * (fj * v + (1.0 - fj) * (1.0 - v))
                    * (fk * w + (1.0 - fk) * (1.0 - w))
                    * value;
            }
        }
    }
    accum
}

//! Coherent noise generation.
//!
//! [`generate_perlin_noise_3d`] builds a lattice of random unit gradients and
//! blends the eight corner contributions of every output cell with the
//! quintic fade curve. The result is smooth across lattice boundaries and
//! stays roughly inside `[-1, 1]`.
//!
//! [`generate_random_noise_3d`] fills the grid with independent uniform
//! values instead. It has the same signature shape so it can stand in for
//! the coherent generator when debugging a field.
//!
//! # Example
//!
//! ```
//! use flowswarm::noise::{generate_perlin_noise_3d, seeded_rng};
//! use flowswarm::UVec3;
//!
//! let mut rng = seeded_rng(7);
//! let grid = generate_perlin_noise_3d(UVec3::new(32, 32, 32), UVec3::splat(4), &mut rng);
//! assert_eq!(grid.len(), 32 * 32 * 32);
//! ```

use crate::grid::NoiseGrid;
use glam::{UVec3, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::ops::Range;

/// RNG used for all noise generation.
pub type NoiseRng = SmallRng;

/// Create a deterministic RNG from a seed.
pub fn seeded_rng(seed: u64) -> NoiseRng {
    SmallRng::seed_from_u64(seed)
}

/// Create an RNG seeded from OS entropy (runs differ).
pub fn entropy_rng() -> NoiseRng {
    SmallRng::from_entropy()
}

/// Which generator fills a velocity channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Smooth gradient noise.
    #[default]
    Perlin,
    /// Independent uniform values in `[-1, 1)`, no spatial coherence.
    Uniform,
}

impl NoiseKind {
    /// Generate one channel with this generator.
    ///
    /// `resolution` is ignored by [`NoiseKind::Uniform`].
    pub fn generate<R: Rng>(&self, dims: UVec3, resolution: UVec3, rng: &mut R) -> NoiseGrid {
        match self {
            NoiseKind::Perlin => generate_perlin_noise_3d(dims, resolution, rng),
            NoiseKind::Uniform => generate_random_noise_3d(dims, -1.0..1.0, rng),
        }
    }
}

/// Quintic smoothstep `6t⁵ − 15t⁴ + 10t³`.
///
/// First and second derivatives vanish at 0 and 1, which keeps the noise
/// continuous across lattice cells.
#[inline]
pub fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Random unit vector, uniform on the sphere.
fn random_unit_vector<R: Rng>(rng: &mut R) -> Vec3 {
    let theta = rng.gen_range(0.0..TAU);
    let z: f32 = rng.gen_range(-1.0..1.0);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Gradient lattice with one extra control point per axis.
struct GradientLattice {
    size: UVec3,
    gradients: Vec<Vec3>,
}

impl GradientLattice {
    fn random<R: Rng>(resolution: UVec3, rng: &mut R) -> Self {
        let size = resolution + UVec3::ONE;
        let count = size.x as usize * size.y as usize * size.z as usize;
        let gradients = (0..count).map(|_| random_unit_vector(&mut *rng)).collect();
        Self { size, gradients }
    }

    #[inline]
    fn at(&self, i: UVec3) -> Vec3 {
        let idx = (i.x as usize * self.size.y as usize + i.y as usize) * self.size.z as usize + i.z as usize;
        self.gradients[idx]
    }

    /// Noise value at a point given in lattice coordinates.
    fn sample(&self, p: Vec3) -> f32 {
        let max_base = self.size - UVec3::splat(2);
        let base = p.floor().as_uvec3().min(max_base);
        let f = p - base.as_vec3();

        // Dot product of each corner gradient with the offset to the point.
        let corner = |dx: u32, dy: u32, dz: u32| {
            let offset = UVec3::new(dx, dy, dz);
            self.at(base + offset).dot(f - offset.as_vec3())
        };

        let n000 = corner(0, 0, 0);
        let n100 = corner(1, 0, 0);
        let n010 = corner(0, 1, 0);
        let n110 = corner(1, 1, 0);
        let n001 = corner(0, 0, 1);
        let n101 = corner(1, 0, 1);
        let n011 = corner(0, 1, 1);
        let n111 = corner(1, 1, 1);

        let u = fade(f.x);
        let v = fade(f.y);
        let w = fade(f.z);

        let nx00 = lerp(n000, n100, u);
        let nx10 = lerp(n010, n110, u);
        let nx01 = lerp(n001, n101, u);
        let nx11 = lerp(n011, n111, u);
        let nxy0 = lerp(nx00, nx10, v);
        let nxy1 = lerp(nx01, nx11, v);
        lerp(nxy0, nxy1, w)
    }
}

/// Generate a grid of 3D gradient noise.
///
/// * `dims` - output grid size, normally the simulation bounds
/// * `resolution` - number of lattice periods per axis (8×8×8 by default)
///
/// Cell `c` is evaluated at lattice coordinate `c * resolution / dims`, so
/// cell 0 sits exactly on a control point. Dimensions need not be multiples
/// of the resolution. A zero resolution on any axis is treated as 1.
pub fn generate_perlin_noise_3d<R: Rng>(dims: UVec3, resolution: UVec3, rng: &mut R) -> NoiseGrid {
    let resolution = resolution.max(UVec3::ONE);
    let lattice = GradientLattice::random(resolution, rng);
    let step = resolution.as_vec3() / dims.max(UVec3::ONE).as_vec3();

    NoiseGrid::from_fn(dims, |cell| lattice.sample(cell.as_vec3() * step))
}

/// Generate a grid of independent uniform noise in `range`.
pub fn generate_random_noise_3d<R: Rng>(dims: UVec3, range: Range<f32>, rng: &mut R) -> NoiseGrid {
    NoiseGrid::from_fn(dims, |_| rng.gen_range(range.clone()))
}

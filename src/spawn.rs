//! Spawn helpers for placing agents.
//!
//! Agents start on random integer cells drawn uniformly inside the volume.

use crate::agent::{BoundaryPolicy, Insect};
use glam::{UVec3, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seeded randomness for agent placement.
///
/// ```
/// use flowswarm::spawn::SpawnContext;
/// use flowswarm::UVec3;
///
/// let mut ctx = SpawnContext::seeded(3);
/// let bugs = ctx.spawn_insects(10, UVec3::splat(16));
/// assert_eq!(bugs.len(), 10);
/// assert!(bugs.iter().all(|b| b.in_bounds()));
/// ```
pub struct SpawnContext {
    rng: SmallRng,
    policy: BoundaryPolicy,
}

impl SpawnContext {
    /// Context with a fixed seed (reproducible placement).
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    /// Context seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Context drawing from an existing RNG.
    pub fn with_rng(rng: SmallRng) -> Self {
        Self {
            rng,
            policy: BoundaryPolicy::default(),
        }
    }

    /// Boundary policy given to spawned agents.
    pub fn with_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Random u32 in `[0, max)`; 0 when `max` is 0.
    #[inline]
    pub fn random_uint(&mut self, max: u32) -> u32 {
        if max == 0 {
            0
        } else {
            self.rng.gen_range(0..max)
        }
    }

    /// Random integer cell with every coordinate in `[0, bound - 1]`.
    pub fn random_cell(&mut self, bounds: UVec3) -> UVec3 {
        UVec3::new(
            self.random_uint(bounds.x),
            self.random_uint(bounds.y),
            self.random_uint(bounds.z),
        )
    }

    /// Spawn `count` agents named `"0"`, `"1"`, ... on random cells.
    pub fn spawn_insects(&mut self, count: usize, bounds: UVec3) -> Vec<Insect> {
        (0..count)
            .map(|i| {
                let start: Vec3 = self.random_cell(bounds).as_vec3();
                Insect::new(i.to_string(), start, bounds).with_policy(self.policy)
            })
            .collect()
    }
}

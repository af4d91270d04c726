//! Point agents drifting through a bounded volume.
//!
//! An [`Insect`] holds a continuous position inside `[0, bound - 1]` on each
//! axis and moves by adding a displacement. Moves that would leave the
//! volume are mirrored per axis: the offending axis steps backwards instead.

use glam::{UVec3, Vec3};
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an out-of-range move is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Reverse the offending axis and accept the result unchecked.
    ///
    /// If the displacement is larger than the distance to both walls the
    /// reversed position is also outside and the agent leaves the volume.
    Reflect,
    /// Reverse the offending axis, then clamp into the volume if the
    /// reversed position is still outside.
    #[default]
    ReflectThenClamp,
}

/// A single agent of the swarm.
#[derive(Clone, Debug, PartialEq)]
pub struct Insect {
    name: String,
    position: Vec3,
    bounds: Vec3,
    policy: BoundaryPolicy,
}

impl Insect {
    /// Create an agent at `start` inside a volume of `bounds` cells.
    pub fn new(name: impl Into<String>, start: Vec3, bounds: UVec3) -> Self {
        Self {
            name: name.into(),
            position: start,
            bounds: bounds.as_vec3(),
            policy: BoundaryPolicy::default(),
        }
    }

    /// Use a different boundary policy.
    pub fn with_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn bounds(&self) -> Vec3 {
        self.bounds
    }

    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    /// Largest valid coordinate on each axis.
    #[inline]
    fn upper(&self) -> Vec3 {
        self.bounds - Vec3::ONE
    }

    /// Whether the position satisfies `0 <= coord <= bound - 1` on every axis.
    pub fn in_bounds(&self) -> bool {
        self.position.cmpge(Vec3::ZERO).all() && self.position.cmple(self.upper()).all()
    }

    /// Advance by `displacement`, reflecting per axis at the walls.
    pub fn move_by(&mut self, displacement: Vec3) {
        let upper = self.upper();
        let mut next = self.position + displacement;

        for i in 0..3 {
            if next[i] < 0.0 || next[i] > upper[i] {
                next[i] = self.position[i] - displacement[i];
            }
        }

        if self.policy == BoundaryPolicy::ReflectThenClamp {
            let clamped = next.clamp(Vec3::ZERO, upper.max(Vec3::ZERO));
            if clamped != next {
                if displacement.abs().cmplt(self.bounds).all() {
                    trace!("Bug {} clamped from {} to {}", self.name, next, clamped);
                } else {
                    warn!(
                        "Bug {} displacement {} exceeds the volume, clamped to {}",
                        self.name, displacement, clamped
                    );
                }
                next = clamped;
            }
        }

        self.position = next;
    }

    /// Grid cell containing the agent, truncating toward zero.
    ///
    /// Negative coordinates (reachable only under [`BoundaryPolicy::Reflect`])
    /// saturate to 0.
    #[inline]
    pub fn cell(&self) -> UVec3 {
        self.position.max(Vec3::ZERO).as_uvec3()
    }
}

impl fmt::Display for Insect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bug {}: {:.2}, {:.2}, {:.2}",
            self.name, self.position.x, self.position.y, self.position.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn bug_at(x: f32, y: f32, z: f32, bound: u32) -> Insect {
        Insect::new("test", Vec3::new(x, y, z), UVec3::splat(bound))
    }

    // ========== Reflection ==========

    #[test]
    fn test_free_move() {
        let mut bug = bug_at(5.0, 5.0, 5.0, 10);
        bug.move_by(Vec3::new(1.5, -2.0, 0.25));
        assert_eq!(bug.position(), Vec3::new(6.5, 3.0, 5.25));
    }

    #[test]
    fn test_reflect_at_lower_wall() {
        let mut bug = bug_at(0.0, 0.0, 0.0, 10);
        bug.move_by(Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bug.position(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_reflect_at_upper_wall() {
        let mut bug = bug_at(9.0, 4.0, 4.0, 10);
        bug.move_by(Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(bug.position(), Vec3::new(8.5, 4.0, 4.0));
    }

    #[test]
    fn test_axes_reflect_independently() {
        let mut bug = bug_at(0.5, 8.5, 4.0, 10);
        bug.move_by(Vec3::new(-1.0, 1.0, 2.0));
        assert_eq!(bug.position(), Vec3::new(1.5, 7.5, 6.0));
    }

    #[test]
    fn test_upper_limit_is_inclusive() {
        let mut bug = bug_at(8.0, 0.0, 0.0, 10);
        bug.move_by(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(bug.position().x, 9.0);
    }

    // ========== Boundary Policies ==========

    #[test]
    fn test_reflect_only_can_escape() {
        let mut bug = bug_at(0.0, 0.0, 0.0, 10).with_policy(BoundaryPolicy::Reflect);
        bug.move_by(Vec3::new(-12.0, 0.0, 0.0));
        assert_eq!(bug.position().x, 12.0);
        assert!(!bug.in_bounds());
    }

    #[test]
    fn test_clamp_catches_double_miss() {
        let mut bug = bug_at(0.0, 0.0, 0.0, 10);
        bug.move_by(Vec3::new(-12.0, 0.0, 0.0));
        assert_eq!(bug.position().x, 9.0);
        assert!(bug.in_bounds());
    }

    #[test]
    fn test_clamp_when_both_directions_miss() {
        // Forward lands at -0.5, reversed at 9.5: neither is inside [0, 9].
        let mut bug = bug_at(4.5, 4.0, 4.0, 10);
        bug.move_by(Vec3::new(-5.0, 0.0, 0.0));
        assert!(bug.in_bounds());
        assert_eq!(bug.position().x, 9.0);
    }

    #[test]
    fn test_random_walk_stays_inside() {
        let mut rng = SmallRng::seed_from_u64(77);
        let bound = 12u32;
        for policy in [BoundaryPolicy::Reflect, BoundaryPolicy::ReflectThenClamp] {
            let mut bug = bug_at(6.0, 6.0, 6.0, bound).with_policy(policy);
            for _ in 0..5_000 {
                // Magnitudes below half the volume keep plain reflection valid too.
                let d = Vec3::new(
                    rng.gen_range(-5.5..5.5),
                    rng.gen_range(-5.5..5.5),
                    rng.gen_range(-5.5..5.5),
                );
                bug.move_by(d);
                assert!(bug.in_bounds(), "{:?} escaped to {}", policy, bug.position());
            }
        }
    }

    #[test]
    fn test_clamped_walk_with_large_steps() {
        let mut rng = SmallRng::seed_from_u64(78);
        let bound = 8u32;
        let mut bug = bug_at(3.0, 3.0, 3.0, bound);
        for _ in 0..5_000 {
            let d = Vec3::new(
                rng.gen_range(-7.9..7.9),
                rng.gen_range(-7.9..7.9),
                rng.gen_range(-7.9..7.9),
            );
            bug.move_by(d);
            assert!(bug.in_bounds());
        }
    }

    // ========== Cells ==========

    #[test]
    fn test_cell_truncates() {
        let bug = bug_at(3.99, 0.2, 7.5, 10);
        assert_eq!(bug.cell(), UVec3::new(3, 0, 7));
    }

    #[test]
    fn test_cell_saturates_negative() {
        let mut bug = bug_at(0.0, 0.0, 0.0, 4).with_policy(BoundaryPolicy::Reflect);
        bug.position = Vec3::new(-0.5, 1.0, 2.0);
        assert_eq!(bug.cell(), UVec3::new(0, 1, 2));
    }

    #[test]
    fn test_display() {
        let bug = Insect::new("7", Vec3::new(1.0, 2.345, 3.0), UVec3::splat(8));
        assert_eq!(bug.to_string(), "Bug 7: 1.00, 2.35, 3.00");
    }
}

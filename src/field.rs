//! Noise-driven velocity fields.
//!
//! A [`VelocityField`] owns three noise grids, one per axis. Sampling a cell
//! reads the three channels independently and shapes each raw value with
//! the gain model described on [`FieldParams`].
//!
//! # Example
//!
//! ```
//! use flowswarm::field::{FieldParams, VelocityField};
//! use flowswarm::grid::NoiseGrid;
//! use flowswarm::UVec3;
//!
//! let dims = UVec3::splat(8);
//! let field = VelocityField::new(
//!     NoiseGrid::filled(dims, 0.5),
//!     NoiseGrid::filled(dims, 0.0),
//!     NoiseGrid::filled(dims, -0.5),
//!     FieldParams::new().with_gain(2.0),
//! )
//! .unwrap();
//!
//! let v = field.sample(UVec3::new(3, 4, 5));
//! assert!(v.x > 0.0 && v.y == 0.0 && v.z < 0.0);
//! ```

use crate::error::ConfigError;
use crate::grid::{Axis, NoiseGrid};
use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Tuning scalars that turn raw noise into per-step displacement.
///
/// Each channel value `n` becomes
///
/// ```text
/// alpha(n) = d0 + (1 - d0) * |n|
/// v        = p_gain * alpha(n) * n
/// ```
///
/// `d0` sets how much weak currents still move agents: at `d0 = 1` the
/// response is linear, at `d0 = 0` weak noise is suppressed quadratically so
/// only strong currents carry agents far. `p_gain` scales everything; zero
/// gain freezes the swarm. It must not be negative, so that more gain always
/// means more motion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    /// Base response to weak noise (`D_0`).
    pub d0: f32,
    /// Overall displacement gain (`P_GAIN`).
    pub p_gain: f32,
}

impl FieldParams {
    /// Default parameters: `d0 = 0.5`, `p_gain = 1.5`.
    pub fn new() -> Self {
        Self { d0: 0.5, p_gain: 1.5 }
    }

    /// Set the base response `D_0`.
    pub fn with_d0(mut self, d0: f32) -> Self {
        self.d0 = d0;
        self
    }

    /// Set the gain `P_GAIN`.
    pub fn with_gain(mut self, p_gain: f32) -> Self {
        self.p_gain = p_gain;
        self
    }

    /// Response ramp applied to a raw noise value.
    #[inline]
    pub fn alpha(&self, n: f32) -> f32 {
        self.d0 + (1.0 - self.d0) * n.abs()
    }

    /// Displacement produced by one raw channel value.
    #[inline]
    pub fn shape(&self, n: f32) -> f32 {
        self.p_gain * self.alpha(n) * n
    }

    /// Reject NaN or infinite tuning values and a negative gain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.d0.is_finite() {
            return Err(ConfigError::NonFinite { name: "D_0" });
        }
        if !self.p_gain.is_finite() {
            return Err(ConfigError::NonFinite { name: "P_GAIN" });
        }
        if self.p_gain < 0.0 {
            return Err(ConfigError::NegativeGain { p_gain: self.p_gain });
        }
        Ok(())
    }
}

impl Default for FieldParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Three noise channels interpreted as a per-cell displacement.
#[derive(Clone, Debug)]
pub struct VelocityField {
    p_x: NoiseGrid,
    p_y: NoiseGrid,
    p_z: NoiseGrid,
    params: FieldParams,
}

impl VelocityField {
    /// Build a field from its three channels.
    ///
    /// All channels must share the same dimensions, which become the field
    /// bounds.
    pub fn new(p_x: NoiseGrid, p_y: NoiseGrid, p_z: NoiseGrid, params: FieldParams) -> Result<Self, ConfigError> {
        params.validate()?;
        if p_x.dims() != p_y.dims() || p_x.dims() != p_z.dims() {
            return Err(ConfigError::ChannelMismatch {
                x: p_x.dims().to_array(),
                y: p_y.dims().to_array(),
                z: p_z.dims().to_array(),
            });
        }
        Ok(Self { p_x, p_y, p_z, params })
    }

    /// Field bounds (the shared channel dimensions).
    #[inline]
    pub fn bounds(&self) -> UVec3 {
        self.p_x.dims()
    }

    /// Tuning parameters.
    pub fn params(&self) -> FieldParams {
        self.params
    }

    /// The noise channel driving `axis`.
    pub fn channel(&self, axis: Axis) -> &NoiseGrid {
        match axis {
            Axis::X => &self.p_x,
            Axis::Y => &self.p_y,
            Axis::Z => &self.p_z,
        }
    }

    /// Whether `cell` can be sampled.
    #[inline]
    pub fn contains(&self, cell: UVec3) -> bool {
        self.p_x.contains(cell)
    }

    /// Raw channel values at `cell`, before the gain model.
    #[inline]
    pub fn raw(&self, cell: UVec3) -> Vec3 {
        Vec3::new(self.p_x.get(cell), self.p_y.get(cell), self.p_z.get(cell))
    }

    /// Displacement for an agent occupying `cell`.
    ///
    /// `cell` must lie inside [`bounds`](Self::bounds); agents clamp their
    /// positions before sampling.
    #[inline]
    pub fn sample(&self, cell: UVec3) -> Vec3 {
        let raw = self.raw(cell);
        Vec3::new(
            self.params.shape(raw.x),
            self.params.shape(raw.y),
            self.params.shape(raw.z),
        )
    }

    // ========== Diagnostics ==========

    /// `(n, alpha(n))` pairs over `[-1, 1]`, for tuning `D_0`.
    pub fn alpha_ramp(&self, steps: usize) -> Vec<(f32, f32)> {
        let steps = steps.max(2);
        (0..steps)
            .map(|i| {
                let n = -1.0 + 2.0 * i as f32 / (steps - 1) as f32;
                (n, self.params.alpha(n))
            })
            .collect()
    }

    /// Sampled displacements on a coarse lattice with spacing `stride`.
    ///
    /// Returns `(cell, velocity)` pairs in row-major order, suitable for a
    /// quiver plot of the field.
    pub fn vector_samples(&self, stride: u32) -> Vec<(UVec3, Vec3)> {
        let stride = stride.max(1) as usize;
        let bounds = self.bounds();
        let mut out = Vec::new();
        for x in (0..bounds.x).step_by(stride) {
            for y in (0..bounds.y).step_by(stride) {
                for z in (0..bounds.z).step_by(stride) {
                    let cell = UVec3::new(x, y, z);
                    out.push((cell, self.sample(cell)));
                }
            }
        }
        out
    }
}

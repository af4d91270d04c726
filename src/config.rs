//! Run configuration.
//!
//! [`SimConfig`] gathers every parameter of a run. It round-trips through
//! JSON so a run can be repeated exactly, and [`SimConfig::validate`] rejects
//! anything the core cannot work with before a single field is generated.

use crate::agent::BoundaryPolicy;
use crate::error::ConfigError;
use crate::field::FieldParams;
use crate::grid::Axis;
use crate::noise::NoiseKind;
use glam::UVec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Parameters of a flowswarm run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of frames to produce.
    pub frames: u32,
    /// Volume size in cells per axis.
    pub bounds: UVec3,
    /// Number of agents.
    pub bugs: usize,
    /// Gradient lattice resolution per axis.
    pub noise_resolution: UVec3,
    /// Generator used for every channel.
    pub noise_kind: NoiseKind,
    /// Number of independently generated velocity fields.
    pub number_perlin_fields: usize,
    /// Switch to the next field after this many frames.
    pub switch_fields_every_frame: u32,
    /// Gain model parameters shared by all fields.
    pub field: FieldParams,
    /// How agents handle moves that leave the volume.
    pub boundary: BoundaryPolicy,
    /// Fixed seed for noise and spawning; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Stop after the first frame (debugging).
    pub single_frame: bool,
    /// Directory to look for cached noise channels in.
    pub perlin_load_path: Option<PathBuf>,
    /// Directory to save generated noise channels to.
    pub perlin_save_path: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            frames: 150,
            bounds: UVec3::splat(128),
            bugs: 10,
            noise_resolution: UVec3::splat(8),
            noise_kind: NoiseKind::Perlin,
            number_perlin_fields: 1,
            switch_fields_every_frame: 10,
            field: FieldParams::default(),
            boundary: BoundaryPolicy::default(),
            seed: None,
            single_frame: false,
            perlin_load_path: None,
            perlin_save_path: None,
        }
    }
}

impl SimConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frames(mut self, frames: u32) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_bounds(mut self, bounds: UVec3) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_bugs(mut self, bugs: usize) -> Self {
        self.bugs = bugs;
        self
    }

    pub fn with_noise_resolution(mut self, resolution: UVec3) -> Self {
        self.noise_resolution = resolution;
        self
    }

    pub fn with_noise_kind(mut self, kind: NoiseKind) -> Self {
        self.noise_kind = kind;
        self
    }

    /// Set the pool size and how often to rotate through it.
    pub fn with_field_pool(mut self, fields: usize, switch_every: u32) -> Self {
        self.number_perlin_fields = fields;
        self.switch_fields_every_frame = switch_every;
        self
    }

    pub fn with_field_params(mut self, params: FieldParams) -> Self {
        self.field = params;
        self
    }

    pub fn with_boundary(mut self, policy: BoundaryPolicy) -> Self {
        self.boundary = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_single_frame(mut self, single_frame: bool) -> Self {
        self.single_frame = single_frame;
        self
    }

    /// Check every parameter the core relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for axis in Axis::ALL {
            let bound = axis.of(self.bounds);
            let res = axis.of(self.noise_resolution);
            if bound == 0 {
                return Err(ConfigError::ZeroBound { axis: axis.letter() });
            }
            if res == 0 {
                return Err(ConfigError::ZeroResolution { axis: axis.letter() });
            }
            if res > bound {
                return Err(ConfigError::ResolutionExceedsBound {
                    axis: axis.letter(),
                    resolution: res,
                    bound,
                });
            }
        }
        if self.frames == 0 {
            return Err(ConfigError::NoFrames);
        }
        if self.number_perlin_fields == 0 {
            return Err(ConfigError::EmptyFieldPool);
        }
        if self.switch_fields_every_frame == 0 {
            return Err(ConfigError::ZeroSwitchInterval);
        }
        self.field.validate()
    }

    /// Number of frames the run will actually produce.
    pub fn effective_frames(&self) -> u32 {
        if self.single_frame {
            self.frames.min(1)
        } else {
            self.frames
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let json = fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }
}

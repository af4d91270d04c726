//! # flowswarm - noise-driven flow fields for point swarms
//!
//! flowswarm synthesizes a 3D velocity field from coherent gradient noise
//! and lets a swarm of point agents ("insects") drift through it inside a
//! bounded volume. Each frame yields an occupancy grid of the cells the
//! swarm touched, ready for an external renderer.
//!
//! ## Quick Start
//!
//! ```
//! use flowswarm::prelude::*;
//!
//! let config = SimConfig::new()
//!     .with_frames(10)
//!     .with_bounds(UVec3::splat(32))
//!     .with_noise_resolution(UVec3::splat(4))
//!     .with_bugs(50)
//!     .with_seed(7);
//!
//! let mut sim = Simulation::from_config(config).unwrap();
//! while let Some(frame) = sim.step() {
//!     assert!(frame.occupancy.count() <= 50);
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Noise Grids
//!
//! A [`NoiseGrid`] is a dense 3D array of `f32` values. Gradient (Perlin)
//! noise is generated from a coarse lattice of random unit vectors, so
//! neighbouring cells vary smoothly. See [`noise`].
//!
//! ### Velocity Fields
//!
//! A [`VelocityField`] combines three independent grids, one per axis, and
//! shapes raw noise into displacement with two scalars:
//!
//! - `D_0` - how strongly weak currents still move agents
//! - `P_GAIN` - overall speed; zero freezes the swarm
//!
//! ### Field Rotation
//!
//! A run can precompute several fields. The [`FieldPool`] switches to the
//! next one every `switch_fields_every_frame` frames, wrapping around.
//!
//! ### Boundaries
//!
//! Agents reflect off the walls of the volume per axis. Under the default
//! [`BoundaryPolicy::ReflectThenClamp`] they are additionally clamped if a
//! very large step overshoots both walls, so they never leave the volume.
//!
//! ## Noise Cache
//!
//! Generating large grids is the slowest part of setup. With
//! `perlin_save_path` set, generated channels are written to disk; with
//! `perlin_load_path` set, matching channels are read back instead of being
//! generated. See [`store`].

pub mod agent;
pub mod config;
pub mod error;
pub mod external;
pub mod field;
pub mod grid;
pub mod noise;
pub mod occupancy;
pub mod pool;
pub mod simulation;
pub mod spawn;
pub mod store;

pub use agent::{BoundaryPolicy, Insect};
pub use config::SimConfig;
pub use error::{ConfigError, ExternalToolError, FlowError, GridFormatError};
pub use external::ExternalCommand;
pub use field::{FieldParams, VelocityField};
pub use glam::{UVec3, Vec3};
pub use grid::{Axis, NoiseGrid};
pub use noise::NoiseKind;
pub use occupancy::OccupancyGrid;
pub use pool::{CacheReport, FieldPool};
pub use simulation::{Frame, Simulation};
pub use spawn::SpawnContext;
pub use store::{ChannelKey, NoiseStore};

/// Convenient re-exports for common usage.
///
/// ```
/// use flowswarm::prelude::*;
/// ```
///
/// This imports:
/// - [`Simulation`] and [`SimConfig`] - the runner and its parameters
/// - [`FieldParams`], [`VelocityField`], [`FieldPool`] - the flow field
/// - [`Insect`], [`BoundaryPolicy`] - the agents
/// - [`NoiseGrid`], [`NoiseKind`] - noise channels
/// - [`Vec3`], [`UVec3`] - glam vector types
pub mod prelude {
    pub use crate::agent::{BoundaryPolicy, Insect};
    pub use crate::config::SimConfig;
    pub use crate::field::{FieldParams, VelocityField};
    pub use crate::grid::{Axis, NoiseGrid};
    pub use crate::noise::NoiseKind;
    pub use crate::occupancy::OccupancyGrid;
    pub use crate::pool::FieldPool;
    pub use crate::simulation::{Frame, Simulation};
    pub use crate::spawn::SpawnContext;
    pub use glam::{UVec3, Vec3};
}

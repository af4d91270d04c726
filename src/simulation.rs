//! Simulation builder and runner.
//!
//! A [`Simulation`] owns the field pool and the swarm. Each call to
//! [`Simulation::step`] produces one [`Frame`]: every agent's current cell
//! is marked in a fresh occupancy grid, then the agent samples the active
//! field there and moves. After the frame the pool cursor advances if the
//! switch interval has elapsed.
//!
//! ```
//! use flowswarm::{SimConfig, Simulation, UVec3};
//!
//! let config = SimConfig::new()
//!     .with_frames(3)
//!     .with_bounds(UVec3::splat(16))
//!     .with_noise_resolution(UVec3::splat(2))
//!     .with_bugs(5)
//!     .with_seed(1);
//!
//! let mut sim = Simulation::from_config(config).unwrap();
//! let mut frames = Vec::new();
//! sim.run(|frame| -> Result<(), ()> {
//!     frames.push(frame.index);
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(frames, [0, 1, 2]);
//! ```

use crate::agent::Insect;
use crate::config::SimConfig;
use crate::error::FlowError;
use crate::noise::{entropy_rng, seeded_rng};
use crate::occupancy::OccupancyGrid;
use crate::pool::{CacheReport, FieldPool};
use crate::spawn::SpawnContext;
use glam::Vec3;
use log::{debug, info, warn};

/// Output of one simulation step.
#[derive(Clone, Debug)]
pub struct Frame {
    /// 0-based frame number, strictly increasing without gaps.
    pub index: u32,
    /// Pool index of the field that moved the agents this frame.
    pub field_index: usize,
    /// Cells that held an agent at the start of the frame.
    pub occupancy: OccupancyGrid,
}

/// A swarm of agents drifting through a rotating pool of velocity fields.
///
/// Use method chaining to configure, then drive with [`step`](Self::step)
/// or [`run`](Self::run).
pub struct Simulation {
    config: SimConfig,
    pool: Option<FieldPool>,
    insects: Vec<Insect>,
    frames_done: u32,
    cache_report: CacheReport,
}

impl Simulation {
    /// Empty simulation; supply a pool and agents with the `with_*` methods.
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            pool: None,
            insects: Vec::new(),
            frames_done: 0,
            cache_report: CacheReport::default(),
        }
    }

    /// Use a prebuilt field pool.
    pub fn with_pool(mut self, pool: FieldPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Use a prepared swarm instead of spawning one.
    pub fn with_insects(mut self, insects: Vec<Insect>) -> Self {
        self.insects = insects;
        self
    }

    /// Validate `config`, build its field pool and spawn its agents.
    ///
    /// With a seed the whole run is reproducible: noise is drawn from
    /// `seed` and spawn positions from `seed + 1`.
    pub fn from_config(config: SimConfig) -> Result<Self, FlowError> {
        config.validate()?;

        let (pool, report) = match config.seed {
            Some(seed) => FieldPool::build(&config, &mut seeded_rng(seed))?,
            None => FieldPool::build(&config, &mut entropy_rng())?,
        };
        info!(
            "Field pool ready: {} field(s), {} channel(s) loaded, {} generated",
            pool.len(),
            report.loaded,
            report.generated
        );

        let spawner = match config.seed {
            Some(seed) => SpawnContext::seeded(seed.wrapping_add(1)),
            None => SpawnContext::from_entropy(),
        };
        let insects = spawner
            .with_policy(config.boundary)
            .spawn_insects(config.bugs, config.bounds);

        let mut sim = Self::new(config).with_pool(pool).with_insects(insects);
        sim.cache_report = report;
        Ok(sim)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn insects(&self) -> &[Insect] {
        &self.insects
    }

    pub fn pool(&self) -> Option<&FieldPool> {
        self.pool.as_ref()
    }

    /// Number of frames produced so far.
    pub fn frames_done(&self) -> u32 {
        self.frames_done
    }

    /// How the pool's channels were obtained (all zero for a prebuilt pool).
    pub fn cache_report(&self) -> CacheReport {
        self.cache_report
    }

    /// Whether every frame has been produced.
    pub fn is_finished(&self) -> bool {
        self.frames_done >= self.config.effective_frames()
    }

    /// Advance one frame.
    ///
    /// Returns `None` once the run is over, or if no field pool was given.
    pub fn step(&mut self) -> Option<Frame> {
        if self.is_finished() {
            return None;
        }
        let Some(pool) = self.pool.as_mut() else {
            warn!("Simulation stepped without a field pool");
            return None;
        };

        let index = self.frames_done;
        let field_index = pool.current_index();
        let field = pool.active();
        let mut occupancy = OccupancyGrid::new(self.config.bounds);

        for insect in &mut self.insects {
            let cell = insect.cell();
            occupancy.mark(cell);
            let velocity = if field.contains(cell) {
                field.sample(cell)
            } else {
                warn!("{} is outside the field, holding position", insect);
                Vec3::ZERO
            };
            insect.move_by(velocity);
        }

        self.frames_done += 1;
        if pool.on_frame_complete(self.frames_done) {
            debug!("Switched to field {} after frame {}", pool.current_index(), index);
        }
        debug!(
            "Frame {} done: field {}, {} occupied cell(s)",
            index,
            field_index,
            occupancy.count()
        );

        Some(Frame {
            index,
            field_index,
            occupancy,
        })
    }

    /// Produce every remaining frame, handing each to `on_frame` in order.
    ///
    /// Stops at the first error from `on_frame`. Returns the number of
    /// frames produced by this call.
    pub fn run<F, E>(&mut self, mut on_frame: F) -> Result<u32, E>
    where
        F: FnMut(Frame) -> Result<(), E>,
    {
        let mut produced = 0;
        while let Some(frame) = self.step() {
            produced += 1;
            on_frame(frame)?;
        }
        Ok(produced)
    }
}

//! The pool of velocity fields a run rotates through.
//!
//! Fields are generated (or loaded from the noise cache) once at startup.
//! During the run the active field changes only on a frame counter: after
//! every `switch_every` completed frames the cursor moves to the next field,
//! wrapping at the end of the pool.

use crate::config::SimConfig;
use crate::error::{ConfigError, FlowError};
use crate::field::VelocityField;
use crate::grid::{Axis, NoiseGrid};
use crate::store::{ChannelKey, NoiseStore};
use log::{info, warn};
use rand::Rng;

/// Index of the field active during `frame` (0-based).
///
/// ```
/// use flowswarm::pool::field_index_for_frame;
///
/// assert_eq!(field_index_for_frame(9, 10, 3), 0);
/// assert_eq!(field_index_for_frame(10, 10, 3), 1);
/// assert_eq!(field_index_for_frame(30, 10, 3), 0);
/// ```
pub fn field_index_for_frame(frame: u32, switch_every: u32, pool_len: usize) -> usize {
    if pool_len == 0 || switch_every == 0 {
        return 0;
    }
    (frame / switch_every) as usize % pool_len
}

/// Where the channels of a freshly built pool came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheReport {
    /// Channels read from the load directory.
    pub loaded: usize,
    /// Channels generated from noise.
    pub generated: usize,
    /// Channels written to the save directory.
    pub saved: usize,
}

/// Load one channel from `load`, or generate it and write it to `save`.
fn obtain_channel<R: Rng>(
    config: &SimConfig,
    key: ChannelKey,
    load: Option<&NoiseStore>,
    save: Option<&NoiseStore>,
    rng: &mut R,
    report: &mut CacheReport,
) -> Result<NoiseGrid, FlowError> {
    let name = key.axis.channel_name();
    if let Some(store) = load {
        match store.load(&key, config.bounds) {
            Ok(Some(grid)) => {
                info!("Loaded {} for field {} from cache", name, key.field_index);
                report.loaded += 1;
                return Ok(grid);
            }
            Ok(None) => info!("Could not load {} for field {}, creating", name, key.field_index),
            Err(e) => warn!("Could not read cached {} for field {}: {}", name, key.field_index, e),
        }
    }

    let grid = config.noise_kind.generate(config.bounds, config.noise_resolution, rng);
    info!("Generated {} for field {}", name, key.field_index);
    report.generated += 1;

    if let Some(store) = save {
        let path = store.save(&key, &grid)?;
        info!("Saved {} to {}", name, path.display());
        report.saved += 1;
    }
    Ok(grid)
}

/// An ordered set of velocity fields with a rotation cursor.
#[derive(Clone, Debug)]
pub struct FieldPool {
    fields: Vec<VelocityField>,
    current: usize,
    switch_every: u32,
}

impl FieldPool {
    /// Pool over `fields`, switching every `switch_every` frames.
    pub fn new(fields: Vec<VelocityField>, switch_every: u32) -> Result<Self, ConfigError> {
        if fields.is_empty() {
            return Err(ConfigError::EmptyFieldPool);
        }
        if switch_every == 0 {
            return Err(ConfigError::ZeroSwitchInterval);
        }
        Ok(Self {
            fields,
            current: 0,
            switch_every,
        })
    }

    /// Generate or load every field the configuration asks for.
    ///
    /// For each field and axis, a cached channel is used when the load
    /// directory has one with matching dimensions; otherwise the channel is
    /// generated with `rng`. Every channel that was not loaded is written to
    /// the save directory, if one is configured.
    pub fn build<R: Rng>(config: &SimConfig, rng: &mut R) -> Result<(Self, CacheReport), FlowError> {
        config.validate()?;

        let load = config.perlin_load_path.as_ref().map(NoiseStore::new);
        let save = config.perlin_save_path.as_ref().map(NoiseStore::new);
        let mut report = CacheReport::default();
        let mut fields = Vec::with_capacity(config.number_perlin_fields);

        for index in 0..config.number_perlin_fields {
            let mut channel = |axis: Axis| {
                let key = ChannelKey::new(axis, config.bounds, index);
                obtain_channel(config, key, load.as_ref(), save.as_ref(), &mut *rng, &mut report)
            };
            let p_x = channel(Axis::X)?;
            let p_y = channel(Axis::Y)?;
            let p_z = channel(Axis::Z)?;
            fields.push(VelocityField::new(p_x, p_y, p_z, config.field)?);
        }

        let pool = Self::new(fields, config.switch_fields_every_frame)?;
        Ok((pool, report))
    }

    /// The field agents are currently sampling.
    #[inline]
    pub fn active(&self) -> &VelocityField {
        &self.fields[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn switch_every(&self) -> u32 {
        self.switch_every
    }

    pub fn fields(&self) -> &[VelocityField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false`; a pool holds at least one field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Record that `frames_done` frames are now complete.
    ///
    /// Advances the cursor when `frames_done` is a multiple of the switch
    /// interval and returns whether it moved.
    pub fn on_frame_complete(&mut self, frames_done: u32) -> bool {
        if frames_done > 0 && frames_done % self.switch_every == 0 {
            self.current = (self.current + 1) % self.fields.len();
            true
        } else {
            false
        }
    }
}

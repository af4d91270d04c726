//! Error types for flowswarm.
//!
//! Setup problems (bad configuration, corrupt cached grids) and failures of
//! the external hand-off process each get their own enum so callers can tell
//! them apart. A missing cache file is not an error: loaders return `Ok(None)`.

use std::fmt;
use std::process::ExitStatus;
use std::time::Duration;

/// Errors raised while validating simulation parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// One of the volume bounds is zero.
    ZeroBound { axis: char },
    /// Noise lattice resolution is zero on some axis.
    ZeroResolution { axis: char },
    /// Noise lattice is finer than the grid it is sampled onto.
    ResolutionExceedsBound { axis: char, resolution: u32, bound: u32 },
    /// Frame count is zero.
    NoFrames,
    /// The field pool would be empty.
    EmptyFieldPool,
    /// Field switch interval is zero.
    ZeroSwitchInterval,
    /// The three noise channels of a velocity field disagree in size.
    ChannelMismatch { x: [u32; 3], y: [u32; 3], z: [u32; 3] },
    /// A tuning scalar is NaN or infinite.
    NonFinite { name: &'static str },
    /// `P_GAIN` is negative.
    NegativeGain { p_gain: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroBound { axis } => write!(f, "Bound on the {} axis must be positive", axis),
            ConfigError::ZeroResolution { axis } => {
                write!(f, "Noise resolution on the {} axis must be positive", axis)
            }
            ConfigError::ResolutionExceedsBound { axis, resolution, bound } => write!(
                f,
                "Noise resolution {} on the {} axis exceeds the bound {}",
                resolution, axis, bound
            ),
            ConfigError::NoFrames => write!(f, "Frame count must be positive"),
            ConfigError::EmptyFieldPool => write!(f, "At least one velocity field is required"),
            ConfigError::ZeroSwitchInterval => write!(f, "Field switch interval must be positive"),
            ConfigError::ChannelMismatch { x, y, z } => write!(
                f,
                "Velocity channels differ in size: p_x {:?}, p_y {:?}, p_z {:?}",
                x, y, z
            ),
            ConfigError::NonFinite { name } => write!(f, "{} must be a finite number", name),
            ConfigError::NegativeGain { p_gain } => write!(f, "P_GAIN must not be negative, got {}", p_gain),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur while reading or writing a persisted noise grid.
#[derive(Debug)]
pub enum GridFormatError {
    /// Failed to read or write the underlying file.
    Io(std::io::Error),
    /// File does not start with the grid magic bytes.
    BadMagic,
    /// Element type tag is not one this build understands.
    UnsupportedElement(u8),
    /// Payload length disagrees with the header dimensions.
    LengthMismatch { expected: usize, found: usize },
    /// Header dimensions describe more values than can be addressed.
    DimsOverflow { dims: [u32; 3] },
}

impl fmt::Display for GridFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridFormatError::Io(e) => write!(f, "Failed to access noise grid file: {}", e),
            GridFormatError::BadMagic => write!(f, "Not a noise grid file (bad magic)"),
            GridFormatError::UnsupportedElement(tag) => {
                write!(f, "Unsupported noise grid element type {}", tag)
            }
            GridFormatError::LengthMismatch { expected, found } => write!(
                f,
                "Noise grid payload holds {} values, header declares {}",
                found, expected
            ),
            GridFormatError::DimsOverflow { dims } => {
                write!(f, "Noise grid dimensions {:?} are too large", dims)
            }
        }
    }
}

impl std::error::Error for GridFormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GridFormatError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GridFormatError {
    fn from(e: std::io::Error) -> Self {
        GridFormatError::Io(e)
    }
}

/// Errors reported by the external hand-off process.
#[derive(Debug)]
pub enum ExternalToolError {
    /// The program could not be started at all.
    Unavailable { program: String, source: std::io::Error },
    /// The program ran but exited unsuccessfully.
    Failed { program: String, status: ExitStatus },
    /// The program did not finish within its bounded wait and was killed.
    TimedOut { program: String, timeout: Duration },
    /// Waiting on the child process failed.
    Wait { program: String, source: std::io::Error },
}

impl fmt::Display for ExternalToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalToolError::Unavailable { program, source } => {
                write!(f, "External tool '{}' is unavailable: {}", program, source)
            }
            ExternalToolError::Failed { program, status } => {
                write!(f, "External tool '{}' failed with {}", program, status)
            }
            ExternalToolError::TimedOut { program, timeout } => write!(
                f,
                "External tool '{}' did not finish within {:.1}s",
                program,
                timeout.as_secs_f32()
            ),
            ExternalToolError::Wait { program, source } => {
                write!(f, "Failed to wait on external tool '{}': {}", program, source)
            }
        }
    }
}

impl std::error::Error for ExternalToolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExternalToolError::Unavailable { source, .. } => Some(source),
            ExternalToolError::Wait { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Any failure the flowswarm core can surface.
#[derive(Debug)]
pub enum FlowError {
    /// Invalid parameters, detected before any frame is produced.
    Config(ConfigError),
    /// A cached noise grid could not be read or written.
    Grid(GridFormatError),
    /// The external hand-off process failed.
    External(ExternalToolError),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::Config(e) => write!(f, "Configuration error: {}", e),
            FlowError::Grid(e) => write!(f, "Noise grid error: {}", e),
            FlowError::External(e) => write!(f, "External tool error: {}", e),
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlowError::Config(e) => Some(e),
            FlowError::Grid(e) => Some(e),
            FlowError::External(e) => Some(e),
        }
    }
}

impl From<ConfigError> for FlowError {
    fn from(e: ConfigError) -> Self {
        FlowError::Config(e)
    }
}

impl From<GridFormatError> for FlowError {
    fn from(e: GridFormatError) -> Self {
        FlowError::Grid(e)
    }
}

impl From<ExternalToolError> for FlowError {
    fn from(e: ExternalToolError) -> Self {
        FlowError::External(e)
    }
}

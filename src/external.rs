//! Hand-off to external tools after a run.
//!
//! Frames are written as numbered artifacts that an external encoder picks
//! up in sequence order. The encoder runs synchronously with a bounded wait:
//! if it cannot be started, fails, or overruns its timeout the caller gets a
//! distinct [`ExternalToolError`].

use crate::config::SimConfig;
use crate::error::ExternalToolError;
use log::{debug, info};
use std::ffi::OsString;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A program run once with a deadline.
#[derive(Clone, Debug)]
pub struct ExternalCommand {
    program: String,
    args: Vec<OsString>,
    timeout: Duration,
}

impl ExternalCommand {
    /// Command running `program` with a 60 second timeout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run to completion, killing the process if it overruns the timeout.
    pub fn run(&self) -> Result<(), ExternalToolError> {
        info!("Running '{}' with {} argument(s)", self.program, self.args.len());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| ExternalToolError::Unavailable {
                program: self.program.clone(),
                source,
            })?;

        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => {
                    debug!("'{}' finished", self.program);
                    return Ok(());
                }
                Ok(Some(status)) => {
                    return Err(ExternalToolError::Failed {
                        program: self.program.clone(),
                        status,
                    });
                }
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ExternalToolError::TimedOut {
                        program: self.program.clone(),
                        timeout: self.timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    let _ = child.kill();
                    return Err(ExternalToolError::Wait {
                        program: self.program.clone(),
                        source,
                    });
                }
            }
        }
    }
}

/// Append the run parameters to `base`, for naming encoded output.
///
/// ```
/// use flowswarm::external::output_name;
/// use flowswarm::{SimConfig, UVec3};
///
/// let config = SimConfig::new().with_bounds(UVec3::new(64, 32, 16)).with_bugs(3);
/// assert_eq!(
///     output_name("out", &config),
///     "out-bugs-3-dim-64x32x16-fields-1-d_0-0.5-P_GAIN-1.5"
/// );
/// ```
pub fn output_name(base: &str, config: &SimConfig) -> String {
    format!(
        "{}-bugs-{}-dim-{}x{}x{}-fields-{}-d_0-{:?}-P_GAIN-{:?}",
        base,
        config.bugs,
        config.bounds.x,
        config.bounds.y,
        config.bounds.z,
        config.number_perlin_fields,
        config.field.d0,
        config.field.p_gain
    )
}

/// File name of frame `index` in a run of `total` frames.
///
/// Indices are zero padded to the width of `total` so that lexical and
/// numeric order agree.
pub fn frame_file_name(index: u32, total: u32) -> String {
    let width = total.to_string().len();
    format!("frame-{:0width$}.txt", index, width = width)
}

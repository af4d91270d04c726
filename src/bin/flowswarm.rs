use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use flowswarm::external::{frame_file_name, output_name, ExternalCommand};
use flowswarm::{BoundaryPolicy, FieldPool, NoiseKind, SimConfig, Simulation};
use log::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum NoiseArg {
    /// Smooth gradient noise.
    Perlin,
    /// Independent uniform values (debugging).
    Uniform,
}

impl From<NoiseArg> for NoiseKind {
    fn from(arg: NoiseArg) -> Self {
        match arg {
            NoiseArg::Perlin => NoiseKind::Perlin,
            NoiseArg::Uniform => NoiseKind::Uniform,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum BoundaryArg {
    /// Mirror the move at the walls only; large steps can leave the volume.
    Reflect,
    /// Mirror, then clamp anything still outside.
    ReflectThenClamp,
}

impl From<BoundaryArg> for BoundaryPolicy {
    fn from(arg: BoundaryArg) -> Self {
        match arg {
            BoundaryArg::Reflect => BoundaryPolicy::Reflect,
            BoundaryArg::ReflectThenClamp => BoundaryPolicy::ReflectThenClamp,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "flowswarm",
    version,
    about = "Drive a swarm of insects through a noise-generated flow field"
)]
struct Cli {
    /// JSON configuration to start from; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the per-frame occupancy files are written to.
    #[arg(short, long, default_value = "frames")]
    output: PathBuf,

    /// Append the run parameters to the output directory name.
    #[arg(long)]
    append_params_to_name: bool,

    /// How many frames to generate.
    #[arg(long)]
    frames: Option<u32>,

    /// How many bugs to simulate.
    #[arg(long)]
    bugs: Option<usize>,

    /// Size of the X axis.
    #[arg(long)]
    dim_x: Option<u32>,

    /// Size of the Y axis.
    #[arg(long)]
    dim_y: Option<u32>,

    /// Size of the Z axis.
    #[arg(long)]
    dim_z: Option<u32>,

    /// Noise lattice resolution along X.
    #[arg(long)]
    noise_res_x: Option<u32>,

    /// Noise lattice resolution along Y.
    #[arg(long)]
    noise_res_y: Option<u32>,

    /// Noise lattice resolution along Z.
    #[arg(long)]
    noise_res_z: Option<u32>,

    /// Generator used for every velocity channel.
    #[arg(long, value_enum)]
    noise_kind: Option<NoiseArg>,

    /// How bugs are kept inside the volume.
    #[arg(long, value_enum)]
    boundary: Option<BoundaryArg>,

    /// How many velocity fields to rotate through.
    #[arg(long)]
    number_perlin_fields: Option<usize>,

    /// Switch to the next field every N frames.
    #[arg(long)]
    switch_fields_every_frame: Option<u32>,

    /// Base response to weak currents (D_0).
    #[arg(long)]
    d0: Option<f32>,

    /// Overall displacement gain (P_GAIN).
    #[arg(long)]
    p_gain: Option<f32>,

    /// Seed for reproducible runs.
    #[arg(long, env = "FLOWSWARM_SEED")]
    seed: Option<u64>,

    /// Produce a single frame, print the bugs and quit (debugging).
    #[arg(long)]
    one_frame: bool,

    /// Folder to look for cached noise channels in.
    #[arg(long)]
    perlin_load_path: Option<PathBuf>,

    /// Folder to save generated noise channels in.
    #[arg(long)]
    perlin_save_path: Option<PathBuf>,

    /// Print the alpha ramp of the gain model, then quit.
    #[arg(long)]
    plot_alpha: bool,

    /// Print sampled vectors of the last field on a lattice of this stride, then quit.
    #[arg(long, value_name = "STRIDE")]
    plot_vec_field: Option<u32>,

    /// Program to run after all frames are written; receives the output directory last.
    #[arg(long)]
    post_command: Option<String>,

    /// Extra argument for the post command (repeatable).
    #[arg(long = "post-arg", allow_hyphen_values = true)]
    post_args: Vec<String>,

    /// Seconds to wait for the post command before killing it.
    #[arg(long, default_value_t = 300)]
    post_timeout_secs: u64,
}

impl Cli {
    fn to_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)
                .map_err(|e| anyhow!("failed to load config {}: {}", path.display(), e))?,
            None => SimConfig::default(),
        };

        if let Some(frames) = self.frames {
            config.frames = frames;
        }
        if let Some(bugs) = self.bugs {
            config.bugs = bugs;
        }
        if let Some(x) = self.dim_x {
            config.bounds.x = x;
        }
        if let Some(y) = self.dim_y {
            config.bounds.y = y;
        }
        if let Some(z) = self.dim_z {
            config.bounds.z = z;
        }
        if let Some(x) = self.noise_res_x {
            config.noise_resolution.x = x;
        }
        if let Some(y) = self.noise_res_y {
            config.noise_resolution.y = y;
        }
        if let Some(z) = self.noise_res_z {
            config.noise_resolution.z = z;
        }
        if let Some(kind) = self.noise_kind {
            config.noise_kind = kind.into();
        }
        if let Some(boundary) = self.boundary {
            config.boundary = boundary.into();
        }
        if let Some(fields) = self.number_perlin_fields {
            config.number_perlin_fields = fields;
        }
        if let Some(every) = self.switch_fields_every_frame {
            config.switch_fields_every_frame = every;
        }
        if let Some(d0) = self.d0 {
            config.field.d0 = d0;
        }
        if let Some(p_gain) = self.p_gain {
            config.field.p_gain = p_gain;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.one_frame {
            config.single_frame = true;
        }
        if self.perlin_load_path.is_some() {
            config.perlin_load_path = self.perlin_load_path.clone();
        }
        if self.perlin_save_path.is_some() {
            config.perlin_save_path = self.perlin_save_path.clone();
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    fn output_dir(&self, config: &SimConfig) -> PathBuf {
        if self.append_params_to_name {
            PathBuf::from(output_name(&self.output.to_string_lossy(), config))
        } else {
            self.output.clone()
        }
    }
}

fn print_diagnostics(cli: &Cli, pool: &FieldPool) {
    let Some(field) = pool.fields().last() else {
        return;
    };
    if cli.plot_alpha {
        for (n, alpha) in field.alpha_ramp(21) {
            println!("{:>6.2} {:.4}", n, alpha);
        }
    }
    if let Some(stride) = cli.plot_vec_field {
        for (cell, v) in field.vector_samples(stride) {
            println!("{} {} {} {:.4} {:.4} {:.4}", cell.x, cell.y, cell.z, v.x, v.y, v.z);
        }
    }
}

fn main() -> Result<()> {
    use env_logger::Env;
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.to_config()?;
    let total = config.effective_frames();

    let mut sim = Simulation::from_config(config).context("failed to set up the simulation")?;

    if cli.plot_alpha || cli.plot_vec_field.is_some() {
        if let Some(pool) = sim.pool() {
            print_diagnostics(&cli, pool);
        }
        return Ok(());
    }

    let out_dir = cli.output_dir(sim.config());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    let written = sim.run(|frame| -> Result<()> {
        let path = out_dir.join(frame_file_name(frame.index, total));
        fs::write(&path, frame.occupancy.to_text())
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    })?;
    info!("Wrote {} frame(s) to {}", written, out_dir.display());

    if sim.config().single_frame {
        for insect in sim.insects() {
            println!("{}", insect);
        }
        return Ok(());
    }

    if let Some(program) = &cli.post_command {
        ExternalCommand::new(program.as_str())
            .args(&cli.post_args)
            .arg(out_dir.as_os_str())
            .with_timeout(Duration::from_secs(cli.post_timeout_secs))
            .run()
            .with_context(|| format!("post command '{}' failed", program))?;
    }

    println!("{}", out_dir.display());
    Ok(())
}

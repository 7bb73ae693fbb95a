use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use flow_core::{IntegratorKind, SceneDescription};
use flow_renderer::{RenderConfig, DEFAULT_BUCKET_SIZE};
use log::LevelFilter;

/// Log levels accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IntegratorArg {
    Path,
    Normal,
}

impl From<IntegratorArg> for IntegratorKind {
    fn from(arg: IntegratorArg) -> Self {
        match arg {
            IntegratorArg::Path => IntegratorKind::Path,
            IntegratorArg::Normal => IntegratorKind::Normal,
        }
    }
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "flow", version)]
#[command(about = "Offline Monte Carlo path tracer")]
pub struct Args {
    /// Scene file to render: pbrt (`.pbrt`) or Mitsuba XML (`.xml`)
    #[arg(long, required_unless_present = "builtin", conflicts_with = "builtin")]
    pub scene: Option<PathBuf>,

    /// Render a built-in scene instead of a file
    #[arg(long, value_parser = ["cornell", "triangle"])]
    pub builtin: Option<String>,

    /// Output file (.png is gamma corrected 8-bit, .exr and .hdr are linear float)
    #[arg(short, long, default_value = "render.png")]
    pub output: PathBuf,

    /// Image width in pixels (overrides the scene)
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels (overrides the scene)
    #[arg(long)]
    pub height: Option<u32>,

    /// Samples per pixel (overrides the scene)
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Maximum path length (overrides the scene)
    #[arg(long)]
    pub bounces: Option<u32>,

    /// Integrator (overrides the scene)
    #[arg(long, value_enum)]
    pub integrator: Option<IntegratorArg>,

    /// Seed for a reproducible render
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads (0 uses every core)
    #[arg(short = 'j', long, default_value_t = 0)]
    pub threads: usize,

    /// Bucket edge length in pixels
    #[arg(long, default_value_t = DEFAULT_BUCKET_SIZE)]
    pub bucket_size: u32,

    /// Set the logging level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Args {
    /// Apply command line overrides to a loaded scene.
    pub fn apply_overrides(&self, desc: &mut SceneDescription) {
        if let Some(width) = self.width {
            desc.width = width;
        }
        if let Some(height) = self.height {
            desc.height = height;
        }
        if let Some(samples) = self.samples {
            desc.samples = samples;
        }
        if let Some(bounces) = self.bounces {
            desc.max_depth = bounces;
        }
        if let Some(integrator) = self.integrator {
            desc.integrator = integrator.into();
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            bucket_size: self.bucket_size,
            seed: self.seed,
            threads: self.threads,
        }
    }
}

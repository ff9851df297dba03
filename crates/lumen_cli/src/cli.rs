use clap::{Parser, ValueEnum};
use log::LevelFilter;
use lumen_renderer::{hardware_concurrency, ReflectancePolicy, RenderSettings};
use std::path::PathBuf;

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
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

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "lumen", version)]
#[command(about = "Multithreaded CPU path tracer for sphere scenes")]
pub struct Args {
    /// Image width in pixels
    #[arg(long, default_value_t = 400)]
    pub width: u32,

    /// Image height in pixels (defaults to a 16:9 image)
    #[arg(long)]
    pub height: Option<u32>,

    /// Samples per pixel
    #[arg(long, short = 's', default_value_t = 100)]
    pub samples: u32,

    /// Maximum bounce depth
    #[arg(long, short = 'd', default_value_t = 50)]
    pub depth: u32,

    /// Worker threads (defaults to hardware concurrency)
    #[arg(long, short = 'j')]
    pub threads: Option<usize>,

    /// Built-in scene (small, random, single) or path to a JSON scene
    #[arg(long, default_value = "small")]
    pub scene: String,

    /// Output image path; the extension picks the format
    #[arg(long, short = 'o', default_value = "rendering.png")]
    pub output: PathBuf,

    /// Let dielectrics reflect with Schlick's probability
    #[arg(long)]
    pub schlick: bool,

    /// Logging level (overrides RUST_LOG)
    #[arg(long)]
    pub log_level: Option<LogLevel>,
}

impl Args {
    pub fn render_settings(&self) -> RenderSettings {
        let height = self
            .height
            .unwrap_or_else(|| ((self.width as f32 * 9.0 / 16.0) as u32).max(1));

        RenderSettings::default()
            .with_resolution(self.width, height)
            .with_quality(self.samples, self.depth)
            .with_threads(self.threads.unwrap_or_else(hardware_concurrency))
    }

    pub fn reflectance_override(&self) -> Option<ReflectancePolicy> {
        self.schlick.then_some(ReflectancePolicy::Schlick)
    }
}

//! Command-line interface

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::SceneConfig;

#[derive(Parser, Debug)]
#[command(name = "cybertree")]
#[command(about = "A particle Christmas tree in your terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Number of particles to generate
    #[arg(short = 'n', long, default_value_t = 2500, allow_negative_numbers = true)]
    pub particles: i64,

    /// Seed for the layout; a random seed is chosen and logged when omitted
    #[arg(short, long, env = "CYBERTREE_SEED")]
    pub seed: Option<u64>,

    /// Particle interpolation speed
    #[arg(long, default_value_t = 2.0)]
    pub speed: f32,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// Newline-delimited JSON hand landmark feed (file or FIFO)
    #[arg(long, env = "CYBERTREE_HAND_FEED")]
    pub hand_feed: Option<PathBuf>,

    /// Milliseconds after which an unrefreshed hand signal counts as lost
    #[arg(long, default_value_t = 500)]
    pub stale_ms: u64,

    /// Write log output to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print a summary of the generated layout and exit
    #[arg(long)]
    pub summary: bool,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Scene configuration with the command-line overrides applied
    pub fn scene_config(&self) -> SceneConfig {
        SceneConfig {
            particle_count: self.particles,
            animation_speed: self.speed,
            ..SceneConfig::default()
        }
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_ms)
    }

    /// Time budget of one frame
    pub fn frame_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000u64 / self.fps.max(1) as u64)
    }
}

//! Command-line interface for headless mask generation

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use tracing::info;

use crate::algorithm::executor::QuantizedEffect;
use crate::algorithm::strategy::{CrossStrategy, DualSpineStrategy, GrowthStrategy};
use crate::io::configuration::{
    DEFAULT_FADE_FRAMES, DEFAULT_FADE_IN_FRAMES, DEFAULT_GRID_SIZE, DEFAULT_PIXEL_PITCH,
    DEFAULT_SEED, DEFAULT_TICKS, EffectConfig, GIF_FRAME_DELAY_MS,
};
use crate::io::error::Result;
use crate::io::image::export_surface_as_png;
use crate::io::progress::TickProgress;
use crate::io::visualization::FrameCapture;
use crate::math::probability::SeededRandom;

/// Spine layout selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyChoice {
    /// West and north spines
    Dual,
    /// Spines in all four cardinal directions
    Cross,
}

impl StrategyChoice {
    /// Boxed strategy for the effect
    pub fn build(self) -> Box<dyn GrowthStrategy> {
        match self {
            Self::Dual => Box::new(DualSpineStrategy),
            Self::Cross => Box::new(CrossStrategy),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "quantmask")]
#[command(
    author,
    version,
    about = "Grow a quantized block mask and export it as PNG"
)]
/// Command-line arguments for the mask generator
// CLI tools commonly need multiple boolean flags
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Output PNG path
    #[arg(short, long, value_name = "FILE", default_value = "mask.png")]
    pub output: PathBuf,

    /// Block grid width
    #[arg(short = 'w', long, default_value_t = DEFAULT_GRID_SIZE)]
    pub width: usize,

    /// Block grid height
    #[arg(short = 'H', long, default_value_t = DEFAULT_GRID_SIZE)]
    pub height: usize,

    /// Visible block columns (defaults to the grid width)
    #[arg(long)]
    pub viewport_width: Option<usize>,

    /// Visible block rows (defaults to the grid height)
    #[arg(long)]
    pub viewport_height: Option<usize>,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = DEFAULT_TICKS)]
    pub ticks: u32,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Ticks over which added cells fade in
    #[arg(long, default_value_t = DEFAULT_FADE_IN_FRAMES)]
    pub fade_in: u32,

    /// Ticks over which erased cells fade out
    #[arg(long, default_value_t = DEFAULT_FADE_FRAMES)]
    pub fade: u32,

    /// Render every op at full opacity
    #[arg(long)]
    pub no_fades: bool,

    /// Pixels per block edge
    #[arg(short, long, default_value_t = DEFAULT_PIXEL_PITCH)]
    pub pitch: usize,

    /// Spine layout
    #[arg(long, value_enum, default_value_t = StrategyChoice::Dual)]
    pub strategy: StrategyChoice,

    /// Also export every tick as an animated GIF next to the output
    #[arg(short, long)]
    pub gif: bool,

    /// Write the final state as a JSON snapshot
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Effect configuration described by the arguments
    pub fn config(&self) -> EffectConfig {
        EffectConfig::new(self.width, self.height)
            .with_viewport(
                self.viewport_width.unwrap_or(self.width),
                self.viewport_height.unwrap_or(self.height),
            )
            .with_fades(self.fade_in, self.fade)
            .with_fades_disabled(self.no_fades)
            .with_pixel_pitch(self.pitch)
    }

    /// Path of the animated GIF derived from the output path
    pub fn gif_path(&self) -> PathBuf {
        self.output.with_extension("gif")
    }
}

/// Outcome of a headless run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks that were run
    pub ticks: u32,
    /// Final op log size
    pub ops: usize,
    /// Branches finished by the end of the run
    pub finished_branches: usize,
    /// Files written
    pub outputs: Vec<PathBuf>,
}

/// Runs an effect for the requested ticks and writes the outputs
#[derive(Debug)]
pub struct Driver {
    cli: Cli,
}

impl Driver {
    /// Create a driver for parsed arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run every tick and export the results
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, or if any export fails
    pub fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let strategy = self.cli.strategy.build();
        let label = strategy.name();
        let mut effect =
            QuantizedEffect::new(self.cli.config(), strategy, SeededRandom::new(self.cli.seed))?;

        let progress = if self.cli.should_show_progress() {
            TickProgress::new(self.cli.ticks, label)
        } else {
            TickProgress::hidden(self.cli.ticks)
        };
        let mut capture = self
            .cli
            .gif
            .then(|| FrameCapture::with_capacity(self.cli.ticks as usize));

        for tick in 1..=self.cli.ticks {
            effect.tick()?;
            if let Some(capture) = capture.as_mut() {
                capture.record(effect.surface());
            }
            progress.update(tick, effect.state().ops.len());
        }
        effect.compact_ops();
        progress.finish();

        let mut outputs = Vec::new();
        export_surface_as_png(effect.surface(), &self.cli.output)?;
        outputs.push(self.cli.output.clone());

        if let Some(capture) = capture.as_ref() {
            let gif_path = self.cli.gif_path();
            capture.export_gif(&gif_path, GIF_FRAME_DELAY_MS)?;
            outputs.push(gif_path);
        }

        if let Some(path) = &self.cli.snapshot {
            effect.snapshot().save(path)?;
            outputs.push(path.clone());
        }

        info!(
            ticks = self.cli.ticks,
            ops = effect.state().ops.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "run complete"
        );

        Ok(RunSummary {
            ticks: self.cli.ticks,
            ops: effect.state().ops.len(),
            finished_branches: effect.state().finished.len(),
            outputs,
        })
    }
}

//! Effect constants and runtime configuration defaults

use crate::io::error::{Result, invalid_parameter};

/// Number of parallel occupancy layers (foundation plus two leaders)
pub const LAYER_COUNT: usize = 3;

/// Probability that a growing branch extends on a given tick
pub const GROWTH_CHANCE: f64 = 0.66;

/// Probability that a growing wing retracts its outermost cell on a given tick
pub const REVERSION_CHANCE: f64 = 0.15;

// A branch is finished once its frontier reaches visible radius + FINISH_MARGIN
/// Cells past the visible radius at which a branch terminates
pub const FINISH_MARGIN: i32 = 1;

// Must stay above FINISH_MARGIN so in-flight bursts cannot overshoot unbounded
/// Cells past the visible radius beyond which nothing is ever spawned
pub const GROWTH_MARGIN: i32 = 3;

/// Margin around the visible radius scanned by the integrity maintainer
pub const SCAN_MARGIN: i32 = 2;

/// Distance beyond which interior cells are hidden from the mask
pub const CLEAN_INNER_DISTANCE: u16 = 4;

/// Saturating value for cells never reached by the distance transform
pub const DISTANCE_SENTINEL: u16 = 999;

/// Aspect bias above which bursts may exceed a single cell
pub const BURST_BIAS_THRESHOLD: f64 = 1.2;

/// Maximum cells added by one growth burst
pub const MAX_BURST: usize = 3;

/// Default raster pixels per block edge
pub const DEFAULT_PIXEL_PITCH: usize = 8;

/// Default fade-in duration in ticks
pub const DEFAULT_FADE_IN_FRAMES: u32 = 5;

/// Default fade-out duration in ticks
pub const DEFAULT_FADE_FRAMES: u32 = 15;

// Default values for the headless driver
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Default number of ticks the driver runs
pub const DEFAULT_TICKS: u32 = 120;

/// Default block grid width and height for the driver
pub const DEFAULT_GRID_SIZE: usize = 48;

// Snapshot cache settings
/// Ticks between cached snapshots
pub const SNAPSHOT_INTERVAL: i32 = 5;
/// Snapshots retained before the oldest is evicted
pub const MAX_SNAPSHOTS: usize = 100;

// Output settings
/// Delay between GIF animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 40;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 20;

/// Runtime parameters for a single effect instance
///
/// Grid dimensions describe the addressable block space; the viewport is the
/// visible portion centered on the origin and drives finish limits, the
/// integrity scan window and the aspect bias of growth bursts.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectConfig {
    /// Addressable block columns
    pub grid_width: usize,
    /// Addressable block rows
    pub grid_height: usize,
    /// Visible block columns
    pub viewport_width: usize,
    /// Visible block rows
    pub viewport_height: usize,
    /// Ticks over which added cells ramp to full opacity (0 = immediate)
    pub fade_in_frames: u32,
    /// Ticks over which erased cells ramp to full erasure (0 = immediate)
    pub fade_frames: u32,
    /// Number of occupancy layers, must equal [`LAYER_COUNT`]
    pub layer_count: usize,
    /// Debug switch pinning every fade to full opacity
    pub debug_disable_fades: bool,
    /// Raster pixels per block edge
    pub pixel_pitch: usize,
    /// Distance cutoff for the visible set
    pub clean_inner_distance: u16,
    /// Per-tick extension probability of a growing branch
    pub growth_chance: f64,
    /// Per-tick retraction probability of a growing wing
    pub reversion_chance: f64,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE, DEFAULT_GRID_SIZE)
    }
}

impl EffectConfig {
    /// Create a configuration whose viewport covers the whole grid
    pub const fn new(grid_width: usize, grid_height: usize) -> Self {
        Self {
            grid_width,
            grid_height,
            viewport_width: grid_width,
            viewport_height: grid_height,
            fade_in_frames: DEFAULT_FADE_IN_FRAMES,
            fade_frames: DEFAULT_FADE_FRAMES,
            layer_count: LAYER_COUNT,
            debug_disable_fades: false,
            pixel_pitch: DEFAULT_PIXEL_PITCH,
            clean_inner_distance: CLEAN_INNER_DISTANCE,
            growth_chance: GROWTH_CHANCE,
            reversion_chance: REVERSION_CHANCE,
        }
    }

    /// Set the visible block area
    #[must_use]
    pub const fn with_viewport(mut self, width: usize, height: usize) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set fade-in and fade-out durations
    #[must_use]
    pub const fn with_fades(mut self, fade_in_frames: u32, fade_frames: u32) -> Self {
        self.fade_in_frames = fade_in_frames;
        self.fade_frames = fade_frames;
        self
    }

    /// Toggle the debug fade suppression
    #[must_use]
    pub const fn with_fades_disabled(mut self, disabled: bool) -> Self {
        self.debug_disable_fades = disabled;
        self
    }

    /// Set the raster pitch
    #[must_use]
    pub const fn with_pixel_pitch(mut self, pitch: usize) -> Self {
        self.pixel_pitch = pitch;
        self
    }

    /// True when any grid or viewport dimension is zero
    ///
    /// Degenerate configurations are accepted; their ticks are no-ops.
    pub const fn is_degenerate(&self) -> bool {
        self.grid_width == 0
            || self.grid_height == 0
            || self.viewport_width == 0
            || self.viewport_height == 0
    }

    /// Visible radius along each axis, in blocks from the origin
    pub const fn visible_radius(&self) -> (i32, i32) {
        (
            self.viewport_width.div_ceil(2) as i32,
            self.viewport_height.div_ceil(2) as i32,
        )
    }

    /// Validate parameter ranges
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `layer_count` differs from [`LAYER_COUNT`]
    /// - `pixel_pitch` is zero
    /// - either probability lies outside `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        if self.layer_count != LAYER_COUNT {
            return Err(invalid_parameter(
                "layer_count",
                &self.layer_count,
                &format!("the effect operates on exactly {LAYER_COUNT} layers"),
            ));
        }
        if self.pixel_pitch == 0 {
            return Err(invalid_parameter(
                "pixel_pitch",
                &self.pixel_pitch,
                &"pitch must be at least one pixel",
            ));
        }
        for (parameter, value) in [
            ("growth_chance", self.growth_chance),
            ("reversion_chance", self.reversion_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid_parameter(
                    parameter,
                    &value,
                    &"probability must lie within [0, 1]",
                ));
            }
        }
        Ok(())
    }
}

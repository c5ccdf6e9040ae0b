//! Tick-driven effect executor
//!
//! [`QuantizedEffect`] owns one [`EffectState`] and runs the fixed per-tick
//! cycle: growth, integrity repair, render refresh, distance field, compositing.

use tracing::{debug, warn};

use crate::algorithm::growth::{GrowthReport, GrowthScheduler};
use crate::algorithm::integrity::{IntegrityReport, StructuralIntegrityMaintainer};
use crate::algorithm::state::EffectState;
use crate::algorithm::strategy::{DualSpineStrategy, GrowthStrategy};
use crate::io::configuration::EffectConfig;
use crate::io::error::{Result, invalid_parameter};
use crate::io::snapshot::{EffectSnapshot, SnapshotCache};
use crate::mask::compositor::{CompositeStats, MaskCompositor};
use crate::mask::ops::MaskOp;
use crate::mask::surface::MaskSurface;
use crate::math::probability::{RandomSource, SeededRandom};
use crate::spatial::distance::{DistanceFieldComputer, DistanceMap};
use crate::spatial::grid::{BlockCoord, Tick};
use crate::spatial::render::Refresh;

/// Summary of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Tick that was run
    pub tick: Tick,
    /// Growth pass results
    pub growth: GrowthReport,
    /// Integrity repair results
    pub repair: IntegrityReport,
    /// How the render grid was brought up to date
    pub refresh: Refresh,
    /// Compositing results
    pub composite: CompositeStats,
}

impl TickReport {
    fn idle(tick: Tick) -> Self {
        Self {
            tick,
            growth: GrowthReport::default(),
            repair: IntegrityReport::default(),
            refresh: Refresh::Clean,
            composite: CompositeStats::default(),
        }
    }
}

/// A single quantized growth effect instance
#[derive(Debug)]
pub struct QuantizedEffect<R: RandomSource = SeededRandom> {
    config: EffectConfig,
    state: EffectState,
    strategy: Box<dyn GrowthStrategy>,
    scheduler: GrowthScheduler,
    integrity: StructuralIntegrityMaintainer,
    distance: DistanceFieldComputer,
    compositor: MaskCompositor,
    surface: MaskSurface,
    snapshots: SnapshotCache,
    rng: R,
}

impl QuantizedEffect<SeededRandom> {
    /// Dual-spine effect with a seeded random source
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or allocation fails
    pub fn seeded(config: EffectConfig, seed: u64) -> Result<Self> {
        Self::new(config, Box::new(DualSpineStrategy), SeededRandom::new(seed))
    }
}

impl<R: RandomSource> QuantizedEffect<R> {
    /// Validate `config`, allocate all grids and seed the origin
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration fails validation
    /// - The grids or the surface cannot be allocated
    pub fn new(config: EffectConfig, strategy: Box<dyn GrowthStrategy>, rng: R) -> Result<Self> {
        config.validate()?;
        let state = EffectState::try_new(&config)?;
        let surface = MaskSurface::try_new(state.grid.frame(), config.pixel_pitch)?;
        Ok(Self {
            scheduler: GrowthScheduler::new(&config),
            integrity: StructuralIntegrityMaintainer::new(&config),
            distance: DistanceFieldComputer::new(config.clean_inner_distance),
            compositor: MaskCompositor::from_config(&config),
            config,
            state,
            strategy,
            surface,
            snapshots: SnapshotCache::default(),
            rng,
        })
    }

    /// Run the cycle for the tick after the current one
    ///
    /// # Errors
    ///
    /// Returns an error if a recorded mask op fails validation
    pub fn tick(&mut self) -> Result<TickReport> {
        self.advance(self.state.current_tick.saturating_add(1))
    }

    /// Run the cycle for an explicit tick
    ///
    /// # Errors
    ///
    /// Returns an error if `tick` does not exceed the current tick, or if a
    /// recorded mask op fails validation
    #[tracing::instrument(level = "debug", skip(self), fields(strategy = self.strategy.name()))]
    pub fn advance(&mut self, tick: Tick) -> Result<TickReport> {
        if tick <= self.state.current_tick {
            return Err(invalid_parameter(
                "tick",
                &tick,
                &format!("ticks must increase past {}", self.state.current_tick),
            ));
        }
        self.state.current_tick = tick;

        if self.config.is_degenerate() {
            warn!(
                width = self.config.grid_width,
                height = self.config.grid_height,
                "degenerate dimensions, skipping tick"
            );
            return Ok(TickReport::idle(tick));
        }

        let growth = self
            .scheduler
            .run(&mut self.state, self.strategy.as_ref(), &mut self.rng)?;
        let repair = self.integrity.repair(&mut self.state)?;
        let refresh = self.state.render.refresh(&self.state.grid);
        let distance = self.distance.compute(&self.state.render);
        let composite = self.compositor.composite(
            &self.state.ops,
            &self.state.render,
            &distance,
            tick,
            &mut self.surface,
        );

        if self.snapshots.is_due(tick) {
            self.snapshots.store(EffectSnapshot::capture(&self.state));
        }

        debug!(
            tick,
            spawned = growth.spawned,
            reverted = growth.reverted,
            finished = self.state.finished.len(),
            welded = repair.holes_welded,
            pruned = repair.islands_pruned,
            ops = self.state.ops.len(),
            "tick complete"
        );

        Ok(TickReport {
            tick,
            growth,
            repair,
            refresh,
            composite,
        })
    }

    /// Repaint the surface from the current state without growing
    pub fn composite(&mut self) -> CompositeStats {
        self.state.render.refresh(&self.state.grid);
        let distance = self.distance.compute(&self.state.render);
        self.compositor.composite(
            &self.state.ops,
            &self.state.render,
            &distance,
            self.state.current_tick,
            &mut self.surface,
        )
    }

    /// Distance field of the current render grid
    pub fn distance_map(&mut self) -> DistanceMap {
        self.state.render.refresh(&self.state.grid);
        self.distance.compute(&self.state.render)
    }

    /// Explicitly remove the leader layers at `coord`
    ///
    /// The foundation is left untouched. Returns the number of cleared layers.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal op fails validation
    pub fn remove_block(&mut self, coord: BlockCoord) -> Result<usize> {
        let tick = self.state.current_tick;
        self.state.remove_block(coord, tick)
    }

    /// Append a paint or erase op from outside the growth cycle
    ///
    /// The op takes part in every composite from its start tick on.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::InvalidOp`] if the op fails validation
    pub fn push_op(&mut self, op: MaskOp) -> Result<()> {
        self.state.push_op(op)?;
        debug!(kind = op.kind().name(), start = op.start(), "op pushed");
        Ok(())
    }

    /// Drop ops whose effect a later settled duplicate reproduces
    pub fn compact_ops(&mut self) -> usize {
        self.state.ops.compact(
            self.state.current_tick,
            self.compositor.fade_in_frames(),
            self.compositor.fade_frames(),
        )
    }

    /// Reallocate every grid and start over from tick 0
    ///
    /// # Errors
    ///
    /// Returns an error if allocation fails
    pub fn reset(&mut self) -> Result<()> {
        self.state = EffectState::try_new(&self.config)?;
        self.surface = MaskSurface::try_new(self.state.grid.frame(), self.config.pixel_pitch)?;
        self.snapshots.clear();
        debug!("effect reset");
        Ok(())
    }

    /// Capture the full serializable state
    pub fn snapshot(&self) -> EffectSnapshot {
        EffectSnapshot::capture(&self.state)
    }

    /// Replace the current state with a snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot's dimensions differ from the configuration
    pub fn restore(&mut self, snapshot: &EffectSnapshot) -> Result<()> {
        if (snapshot.width, snapshot.height) != (self.config.grid_width, self.config.grid_height) {
            return Err(invalid_parameter(
                "snapshot",
                &format!("{}x{}", snapshot.width, snapshot.height),
                &format!(
                    "effect grid is {}x{}",
                    self.config.grid_width, self.config.grid_height
                ),
            ));
        }
        self.state = snapshot.to_state()?;
        self.snapshots.invalidate_from(snapshot.current_tick + 1);
        Ok(())
    }

    /// Return to the latest cached snapshot at or before `tick`
    ///
    /// Snapshots are cached every [`crate::io::configuration::SNAPSHOT_INTERVAL`]
    /// ticks. The random source is not rewound, so replayed ticks may diverge.
    /// Returns the tick the effect now stands at.
    ///
    /// # Errors
    ///
    /// Returns an error if no snapshot at or before `tick` is cached
    pub fn rewind(&mut self, tick: Tick) -> Result<Tick> {
        let snapshot = self.snapshots.nearest(tick).cloned().ok_or_else(|| {
            invalid_parameter("tick", &tick, &"no cached snapshot at or before this tick")
        })?;
        self.state = snapshot.to_state()?;
        self.snapshots.invalidate_from(snapshot.current_tick + 1);
        debug!(requested = tick, restored = snapshot.current_tick, "effect rewound");
        Ok(snapshot.current_tick)
    }

    /// Number of cached rewind points
    pub fn cached_snapshots(&self) -> usize {
        self.snapshots.len()
    }

    /// Current effect state
    pub const fn state(&self) -> &EffectState {
        &self.state
    }

    /// Last painted surface
    pub const fn surface(&self) -> &MaskSurface {
        &self.surface
    }

    /// Active configuration
    pub const fn config(&self) -> &EffectConfig {
        &self.config
    }

    /// Last tick run
    pub const fn current_tick(&self) -> Tick {
        self.state.current_tick
    }
}

//! Explicit effect state shared by every stage of a tick
//!
//! All grid mutations go through [`EffectState`] so that the op log, the
//! active block list and the render grid's dirty tracking never drift from the
//! layered grid.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::io::configuration::{EffectConfig, LAYER_COUNT};
use crate::io::error::Result;
use crate::mask::ops::{MaskOp, MaskOpLog};
use crate::spatial::grid::{BlockCoord, FOUNDATION_LAYER, Face, LayeredLogicGrid, Tick};
use crate::spatial::render::RenderGrid;

/// Identifier of a growth ray
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BranchId {
    /// Spine growing from the origin in the given direction
    Spine(Face),
    /// Wing rooted on a spine cell
    Wing {
        /// Direction of the parent spine
        spine: Face,
        /// Distance of the root cell from the origin along the spine
        offset: i32,
    },
}

/// Monotonic set of branches that reached their finish boundary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinishedBranches(BTreeSet<BranchId>);

impl FinishedBranches {
    /// Record a branch as finished, returning true the first time
    pub fn insert(&mut self, branch: BranchId) -> bool {
        self.0.insert(branch)
    }

    /// True once `branch` has finished
    pub fn contains(&self, branch: BranchId) -> bool {
        self.0.contains(&branch)
    }

    /// Number of finished branches
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no branch has finished
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Finished branches in order
    pub fn iter(&self) -> impl Iterator<Item = &BranchId> {
        self.0.iter()
    }
}

impl FromIterator<BranchId> for FinishedBranches {
    fn from_iter<I: IntoIterator<Item = BranchId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Occupancy record mirroring a single active grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBlock {
    /// Cell position
    pub coord: BlockCoord,
    /// Layer the cell is active on
    pub layer: usize,
    /// Activation tick
    pub tick: Tick,
}

/// Everything one effect instance owns between ticks
#[derive(Debug, Clone, PartialEq)]
pub struct EffectState {
    /// Layered occupancy
    pub grid: LayeredLogicGrid,
    /// Recorded mask operations
    pub ops: MaskOpLog,
    /// Terminated branches
    pub finished: FinishedBranches,
    /// Active cells in spawn order
    pub active_blocks: Vec<ActiveBlock>,
    /// Derived display and presence grids
    pub render: RenderGrid,
    /// Last tick run
    pub current_tick: Tick,
}

impl EffectState {
    /// Allocate grids for `config` and seed the origin on every layer at tick 0
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::GridAllocation`] if the grids cannot be allocated
    pub fn try_new(config: &EffectConfig) -> Result<Self> {
        let mut state = Self {
            grid: LayeredLogicGrid::try_new(config.grid_width, config.grid_height)?,
            ops: MaskOpLog::new(),
            finished: FinishedBranches::default(),
            active_blocks: Vec::new(),
            render: RenderGrid::try_new(config.grid_width, config.grid_height)?,
            current_tick: 0,
        };
        for layer in 0..LAYER_COUNT {
            state.spawn_block(BlockCoord::ORIGIN, layer, 0)?;
        }
        Ok(state)
    }

    /// Activate an empty cell and record an `AddSmart` op
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::InvalidOp`] if `layer` is not a grid layer
    pub fn spawn_block(&mut self, coord: BlockCoord, layer: usize, tick: Tick) -> Result<bool> {
        let op = MaskOp::add_smart(coord, layer, tick)?;
        if !self.grid.spawn(coord, layer, tick) {
            return Ok(false);
        }
        self.ops.push(op);
        self.active_blocks.push(ActiveBlock { coord, layer, tick });
        self.render.mark_cell(coord);
        Ok(true)
    }

    /// Clear a cell unless the foundation holds it, recording a `RemoveBlock` op
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::InvalidOp`] if `layer` is not a grid layer
    pub fn retract_block(&mut self, coord: BlockCoord, layer: usize, tick: Tick) -> Result<bool> {
        let op = MaskOp::remove_block(coord, layer, tick)?;
        if !self.grid.clear(coord, layer) {
            return Ok(false);
        }
        self.record_removal(op, coord, layer);
        Ok(true)
    }

    /// Clear both leader layers at `coord`, even above an active foundation
    ///
    /// Layer 0 is never touched. Returns the number of layers cleared; one
    /// `RemoveBlock` op is recorded per cleared layer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::InvalidOp`] if the op cannot be constructed
    pub fn remove_block(&mut self, coord: BlockCoord, tick: Tick) -> Result<usize> {
        let mut cleared = 0;
        for layer in (FOUNDATION_LAYER + 1)..LAYER_COUNT {
            let op = MaskOp::remove_block(coord, layer, tick)?;
            if self.grid.retract_leader(coord, layer) {
                self.record_removal(op, coord, layer);
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    /// Record an externally built op without touching the logic grid
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::InvalidOp`] if the op fails validation
    pub fn push_op(&mut self, op: MaskOp) -> Result<()> {
        op.validate()?;
        self.render.mark_rect(op.region());
        self.ops.push(op);
        Ok(())
    }

    fn record_removal(&mut self, op: MaskOp, coord: BlockCoord, layer: usize) {
        self.ops.push(op);
        self.active_blocks
            .retain(|block| !(block.coord == coord && block.layer == layer));
        self.render.mark_cell(coord);
    }
}

//! Derived per-tick display and presence grids
//!
//! The render grid is a read model of the layered grid: a cell is *present* when
//! any layer is active there and *displayed* with layer 0's activation tick.
//! Mutations mark either the whole grid or individual rectangles dirty; a
//! refresh then rebuilds everything or patches only the dirty rectangles.

use bitvec::prelude::{BitVec, bitvec};
use ndarray::Array2;

use crate::io::error::Result;
use crate::spatial::grid::{
    BlockCoord, BlockRect, EMPTY, FOUNDATION_LAYER, GridFrame, LayeredLogicGrid, OUT_OF_BOUNDS,
    Tick, try_alloc_plane,
};

/// How the last refresh brought the render grid up to date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Every cell was recomputed
    Full,
    /// Only the listed number of dirty rectangles were recomputed
    Partial(usize),
    /// Nothing was dirty
    Clean,
}

/// Display ticks and presence bits derived from a [`LayeredLogicGrid`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderGrid {
    display: Array2<Tick>,
    presence: BitVec,
    frame: GridFrame,
    full_rebuild: bool,
    dirty_rects: Vec<BlockRect>,
}

impl RenderGrid {
    /// Allocate a render grid that starts out needing a full rebuild
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::GridAllocation`] if the display plane cannot be allocated
    pub fn try_new(width: usize, height: usize) -> Result<Self> {
        Ok(Self {
            display: try_alloc_plane(width, height, EMPTY)?,
            presence: bitvec![0; width * height],
            frame: GridFrame { width, height },
            full_rebuild: true,
            dirty_rects: Vec::new(),
        })
    }

    /// Request a full rebuild on the next refresh
    pub const fn mark_dirty(&mut self) {
        self.full_rebuild = true;
    }

    /// Request that `rect` be recomputed on the next refresh
    pub fn mark_rect(&mut self, rect: BlockRect) {
        if !self.full_rebuild {
            self.dirty_rects.push(rect);
        }
    }

    /// Request that a single cell be recomputed on the next refresh
    pub fn mark_cell(&mut self, coord: BlockCoord) {
        self.mark_rect(BlockRect::cell(coord));
    }

    /// True when a refresh would change something
    pub const fn needs_refresh(&self) -> bool {
        self.full_rebuild || !self.dirty_rects.is_empty()
    }

    /// Bring the derived grids in line with `grid`
    pub fn refresh(&mut self, grid: &LayeredLogicGrid) -> Refresh {
        if self.full_rebuild {
            self.full_rebuild = false;
            self.dirty_rects.clear();
            for row in 0..self.frame.height {
                for col in 0..self.frame.width {
                    self.update_cell(grid, self.frame.coord([row, col]));
                }
            }
            return Refresh::Full;
        }
        if self.dirty_rects.is_empty() {
            return Refresh::Clean;
        }
        let rects = std::mem::take(&mut self.dirty_rects);
        for rect in &rects {
            for coord in rect.cells() {
                self.update_cell(grid, coord);
            }
        }
        Refresh::Partial(rects.len())
    }

    fn update_cell(&mut self, grid: &LayeredLogicGrid, coord: BlockCoord) {
        let Some(index) = self.frame.index(coord) else {
            return;
        };
        let tick = grid.get(FOUNDATION_LAYER, coord);
        if let Some(cell) = self.display.get_mut(index) {
            *cell = if tick >= 0 { tick } else { EMPTY };
        }
        let linear = index[0] * self.frame.width + index[1];
        self.presence.set(linear, grid.any_active(coord));
    }

    /// Layer-0 activation tick at `coord`, [`EMPTY`] or [`OUT_OF_BOUNDS`]
    pub fn display_tick(&self, coord: BlockCoord) -> Tick {
        self.frame
            .index(coord)
            .and_then(|index| self.display.get(index))
            .copied()
            .unwrap_or(OUT_OF_BOUNDS)
    }

    /// True when layer 0 is active at `coord`
    pub fn is_displayed(&self, coord: BlockCoord) -> bool {
        self.display_tick(coord) >= 0
    }

    /// True when any layer is active at `coord`
    pub fn is_present(&self, coord: BlockCoord) -> bool {
        self.frame.index(coord).is_some_and(|index| {
            let linear = index[0] * self.frame.width + index[1];
            self.presence.get(linear).is_some_and(|bit| *bit)
        })
    }

    /// Coordinate mapping shared with the layered grid
    pub const fn frame(&self) -> GridFrame {
        self.frame
    }

    /// Raw display plane indexed `[row, col]`
    pub const fn display(&self) -> &Array2<Tick> {
        &self.display
    }
}

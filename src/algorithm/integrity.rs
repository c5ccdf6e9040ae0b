//! Hole welding and island pruning on the leader layers
//!
//! The maintainer works on the union of layers 1 and 2 inside a window around
//! the origin. Empty cells that cannot reach the window border are holes and
//! get welded on every layer; leader cells without a same-layer neighbour are
//! islands and get retracted. Both repairs repeat until nothing changes, so a
//! second run on the same state is a no-op.

use std::collections::VecDeque;

use ndarray::Array2;
use tracing::trace;

use crate::algorithm::state::EffectState;
use crate::io::configuration::{EffectConfig, LAYER_COUNT, SCAN_MARGIN};
use crate::io::error::Result;
use crate::spatial::grid::{BlockCoord, BlockRect, FOUNDATION_LAYER, Face};

/// Repairs performed by one maintainer run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    /// Enclosed empty cells that were filled
    pub holes_welded: usize,
    /// Isolated leader cells that were removed
    pub islands_pruned: usize,
}

impl IntegrityReport {
    /// True when the run changed nothing
    pub const fn is_clean(&self) -> bool {
        self.holes_welded == 0 && self.islands_pruned == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reach {
    Unknown,
    Outside,
    Block,
}

/// BFS-based topology repair over a fixed scan window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralIntegrityMaintainer {
    window: BlockRect,
}

impl StructuralIntegrityMaintainer {
    /// Scan window covering the visible radius plus [`SCAN_MARGIN`]
    pub const fn new(config: &EffectConfig) -> Self {
        let (vis_x, vis_y) = config.visible_radius();
        let rx = vis_x + SCAN_MARGIN;
        let ry = vis_y + SCAN_MARGIN;
        Self {
            window: BlockRect {
                min: BlockCoord::new(-rx, -ry),
                max: BlockCoord::new(rx, ry),
            },
        }
    }

    /// Cells inspected by each run
    pub const fn window(&self) -> BlockRect {
        self.window
    }

    /// Weld holes and prune islands until the window is stable
    ///
    /// # Errors
    ///
    /// Returns an error if a recorded mask op fails validation
    pub fn repair(&self, state: &mut EffectState) -> Result<IntegrityReport> {
        let mut report = IntegrityReport::default();
        let cells = self.window.cells().count();
        for _ in 0..=cells {
            let welded = self.weld_holes(state)?;
            let pruned = self.prune_islands(state)?;
            report.holes_welded += welded;
            report.islands_pruned += pruned;
            if welded == 0 && pruned == 0 {
                break;
            }
        }
        if !report.is_clean() {
            trace!(?report, tick = state.current_tick, "integrity repaired");
        }
        Ok(report)
    }

    fn local_index(&self, coord: BlockCoord) -> Option<[usize; 2]> {
        self.window.contains(coord).then(|| {
            [
                (coord.y - self.window.min.y) as usize,
                (coord.x - self.window.min.x) as usize,
            ]
        })
    }

    fn weld_holes(&self, state: &mut EffectState) -> Result<usize> {
        let rows = (self.window.max.y - self.window.min.y + 1) as usize;
        let cols = (self.window.max.x - self.window.min.x + 1) as usize;
        let mut reach = Array2::from_elem((rows, cols), Reach::Unknown);
        for coord in self.window.cells() {
            if state.grid.any_leader(coord)
                && let Some(cell) = self.local_index(coord).and_then(|i| reach.get_mut(i))
            {
                *cell = Reach::Block;
            }
        }

        let mut queue = VecDeque::new();
        let visit = |coord: BlockCoord, reach: &mut Array2<Reach>, queue: &mut VecDeque<BlockCoord>| {
            if let Some(cell) = self.local_index(coord).and_then(|i| reach.get_mut(i))
                && *cell == Reach::Unknown
            {
                *cell = Reach::Outside;
                queue.push_back(coord);
            }
        };
        for coord in self.window.cells() {
            let border = Face::ALL.iter().any(|&face| self.window.on_edge(coord, face));
            if border {
                visit(coord, &mut reach, &mut queue);
            }
        }
        while let Some(coord) = queue.pop_front() {
            for face in Face::ALL {
                visit(coord.neighbor(face), &mut reach, &mut queue);
            }
        }

        let tick = state.current_tick;
        let mut welded = 0;
        for coord in self.window.cells() {
            let enclosed = self
                .local_index(coord)
                .and_then(|i| reach.get(i))
                .is_some_and(|cell| *cell == Reach::Unknown);
            if !enclosed || !state.grid.contains(coord) {
                continue;
            }
            let mut spawned = false;
            for layer in 0..LAYER_COUNT {
                spawned |= state.spawn_block(coord, layer, tick)?;
            }
            if spawned {
                welded += 1;
            }
        }
        Ok(welded)
    }

    fn prune_islands(&self, state: &mut EffectState) -> Result<usize> {
        let tick = state.current_tick;
        let mut pruned = 0;
        for layer in (FOUNDATION_LAYER + 1)..LAYER_COUNT {
            for coord in self.window.cells() {
                if coord.is_origin() || !state.grid.is_active(layer, coord) {
                    continue;
                }
                let isolated = Face::ALL
                    .iter()
                    .all(|&face| !state.grid.is_active(layer, coord.neighbor(face)));
                if isolated && state.retract_block(coord, layer, tick)? {
                    pruned += 1;
                }
            }
        }
        Ok(pruned)
    }
}

//! Two-pass chamfer distance transform over the render grid
//!
//! Displayed cells start at [`DISTANCE_SENTINEL`], everything else at zero. A
//! forward row-major pass relaxes from the north and west neighbours, a backward
//! pass from the east and south. Out-of-grid neighbours contribute nothing, so a
//! fully displayed grid keeps the sentinel everywhere.

use ndarray::Array2;

use crate::io::configuration::{CLEAN_INNER_DISTANCE, DISTANCE_SENTINEL};
use crate::spatial::grid::{BlockCoord, GridFrame};
use crate::spatial::render::RenderGrid;

/// Per-cell distance from a displayed cell to the nearest undisplayed cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMap {
    distances: Array2<u16>,
    frame: GridFrame,
    threshold: u16,
}

impl DistanceMap {
    /// Distance at `coord`; out-of-grid coordinates report zero
    pub fn get(&self, coord: BlockCoord) -> u16 {
        self.frame
            .index(coord)
            .and_then(|index| self.distances.get(index))
            .copied()
            .unwrap_or(0)
    }

    /// True for displayed cells within the visibility cutoff
    pub fn is_visible(&self, coord: BlockCoord) -> bool {
        let distance = self.get(coord);
        distance > 0 && distance <= self.threshold
    }

    /// Visibility cutoff used by [`Self::is_visible`]
    pub const fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Raw distances indexed `[row, col]`
    pub const fn distances(&self) -> &Array2<u16> {
        &self.distances
    }
}

/// Computes [`DistanceMap`]s with a fixed visibility cutoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceFieldComputer {
    threshold: u16,
}

impl Default for DistanceFieldComputer {
    fn default() -> Self {
        Self::new(CLEAN_INNER_DISTANCE)
    }
}

impl DistanceFieldComputer {
    /// Create a computer hiding cells farther than `threshold` from an edge
    pub const fn new(threshold: u16) -> Self {
        Self { threshold }
    }

    /// Run the forward and backward passes over `render`
    pub fn compute(&self, render: &RenderGrid) -> DistanceMap {
        let mut distances = render.display().mapv(|tick| {
            if tick >= 0 {
                DISTANCE_SENTINEL
            } else {
                0
            }
        });
        let (rows, cols) = distances.dim();

        for row in 0..rows {
            for col in 0..cols {
                if distances.get([row, col]).copied() == Some(0) {
                    continue;
                }
                let north = row
                    .checked_sub(1)
                    .and_then(|r| distances.get([r, col]))
                    .copied();
                let west = col
                    .checked_sub(1)
                    .and_then(|c| distances.get([row, c]))
                    .copied();
                relax(&mut distances, [row, col], north.into_iter().chain(west));
            }
        }

        for row in (0..rows).rev() {
            for col in (0..cols).rev() {
                if distances.get([row, col]).copied() == Some(0) {
                    continue;
                }
                let south = distances.get([row + 1, col]).copied();
                let east = distances.get([row, col + 1]).copied();
                relax(&mut distances, [row, col], south.into_iter().chain(east));
            }
        }

        DistanceMap {
            distances,
            frame: render.frame(),
            threshold: self.threshold,
        }
    }
}

fn relax(distances: &mut Array2<u16>, index: [usize; 2], neighbors: impl Iterator<Item = u16>) {
    let Some(best) = neighbors.min() else {
        return;
    };
    let candidate = best.saturating_add(1).min(DISTANCE_SENTINEL);
    if let Some(cell) = distances.get_mut(index)
        && candidate < *cell
    {
        *cell = candidate;
    }
}

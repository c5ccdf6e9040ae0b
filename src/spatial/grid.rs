//! Layered occupancy grids over a bounded block space
//!
//! Three parallel planes record, per block, the tick at which the block became
//! active. Layer 0 is the permanent foundation; layers 1 and 2 are leader layers
//! that drive growth and may retract. Coordinates are relative to a fixed center
//! origin so growth code never deals with raw indices.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::io::configuration::LAYER_COUNT;
use crate::io::error::{Result, allocation_error};

/// Tick counter value, also stored per cell as its activation time
pub type Tick = i32;

/// Cell value for an empty block
pub const EMPTY: Tick = -1;

/// Lookup value for coordinates outside the addressable space
pub const OUT_OF_BOUNDS: Tick = -2;

/// Permanent foundation layer
pub const FOUNDATION_LAYER: usize = 0;

/// Block position relative to the grid's center origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockCoord {
    /// Horizontal offset, negative toward the west
    pub x: i32,
    /// Vertical offset, negative toward the north
    pub y: i32,
}

impl BlockCoord {
    /// The center origin
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a coordinate
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate `steps` blocks away in the direction of `face`
    #[must_use]
    pub const fn step(self, face: Face, steps: i32) -> Self {
        let (dx, dy) = face.delta();
        Self {
            x: self.x + dx * steps,
            y: self.y + dy * steps,
        }
    }

    /// Orthogonal neighbor across `face`
    #[must_use]
    pub const fn neighbor(self, face: Face) -> Self {
        self.step(face, 1)
    }

    /// True for the center origin
    pub const fn is_origin(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// One side of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Face {
    /// Toward negative y
    North,
    /// Toward positive y
    South,
    /// Toward positive x
    East,
    /// Toward negative x
    West,
}

impl Face {
    /// All faces in bitmask order
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// Unit step (dx, dy) across this face
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }

    /// Bit used in per-cell face masks (N=1, S=2, E=4, W=8)
    pub const fn bit(self) -> u8 {
        match self {
            Self::North => 1,
            Self::South => 2,
            Self::East => 4,
            Self::West => 8,
        }
    }

    /// The face on the other side of the block
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    /// True for east and west
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::East | Self::West)
    }
}

/// Inclusive rectangle of block coordinates, always normalized (min <= max)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRect {
    /// Top-left corner (inclusive)
    pub min: BlockCoord,
    /// Bottom-right corner (inclusive)
    pub max: BlockCoord,
}

impl BlockRect {
    /// Rectangle spanning two corners in any order
    pub fn new(a: BlockCoord, b: BlockCoord) -> Self {
        Self {
            min: BlockCoord::new(a.x.min(b.x), a.y.min(b.y)),
            max: BlockCoord::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Single-cell rectangle
    pub const fn cell(coord: BlockCoord) -> Self {
        Self {
            min: coord,
            max: coord,
        }
    }

    /// Check if a coordinate lies inside the rectangle
    pub const fn contains(&self, coord: BlockCoord) -> bool {
        coord.x >= self.min.x
            && coord.x <= self.max.x
            && coord.y >= self.min.y
            && coord.y <= self.max.y
    }

    /// True when the rectangle covers exactly one block
    pub const fn is_single_cell(&self) -> bool {
        self.min.x == self.max.x && self.min.y == self.max.y
    }

    /// Row-major iterator over every covered coordinate
    pub fn cells(&self) -> impl Iterator<Item = BlockCoord> + use<> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| BlockCoord::new(x, y)))
    }

    /// True when `coord` sits on the rectangle edge facing `face`
    pub const fn on_edge(&self, coord: BlockCoord, face: Face) -> bool {
        match face {
            Face::North => coord.y == self.min.y,
            Face::South => coord.y == self.max.y,
            Face::West => coord.x == self.min.x,
            Face::East => coord.x == self.max.x,
        }
    }
}

/// Allocate a `height x width` plane, reporting allocation failure instead of aborting
pub(crate) fn try_alloc_plane<T: Clone>(width: usize, height: usize, fill: T) -> Result<Array2<T>> {
    let len = width
        .checked_mul(height)
        .ok_or_else(|| allocation_error(width, height, &"cell count overflows usize"))?;
    let mut cells = Vec::new();
    cells
        .try_reserve_exact(len)
        .map_err(|e| allocation_error(width, height, &e))?;
    cells.resize(len, fill);
    Array2::from_shape_vec((height, width), cells).map_err(|e| allocation_error(width, height, &e))
}

/// Maps center-relative coordinates onto `(row, col)` plane indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridFrame {
    /// Block columns
    pub width: usize,
    /// Block rows
    pub height: usize,
}

impl GridFrame {
    /// Plane index of the origin: `(floor(w/2), floor(h/2))` as (col, row)
    pub const fn center(&self) -> (i32, i32) {
        ((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// Convert a relative coordinate to `[row, col]`, `None` when outside the grid
    pub const fn index(&self, coord: BlockCoord) -> Option<[usize; 2]> {
        let (cx, cy) = self.center();
        let gx = cx + coord.x;
        let gy = cy + coord.y;
        if gx < 0 || gy < 0 || gx as usize >= self.width || gy as usize >= self.height {
            None
        } else {
            Some([gy as usize, gx as usize])
        }
    }

    /// Convert `[row, col]` back to a relative coordinate
    pub const fn coord(&self, index: [usize; 2]) -> BlockCoord {
        let (cx, cy) = self.center();
        BlockCoord::new(index[1] as i32 - cx, index[0] as i32 - cy)
    }
}

/// Three parallel occupancy layers storing activation ticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayeredLogicGrid {
    layers: Vec<Array2<Tick>>,
    frame: GridFrame,
}

impl LayeredLogicGrid {
    /// Allocate empty layers for a `width x height` block space
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::GridAllocation`] if the planes cannot be allocated
    pub fn try_new(width: usize, height: usize) -> Result<Self> {
        let mut layers = Vec::with_capacity(LAYER_COUNT);
        for _ in 0..LAYER_COUNT {
            layers.push(try_alloc_plane(width, height, EMPTY)?);
        }
        Ok(Self {
            layers,
            frame: GridFrame { width, height },
        })
    }

    /// Rebuild a grid from row-major layer values
    ///
    /// # Errors
    ///
    /// Returns an error if the layer count or any layer length does not match the dimensions
    pub fn from_layers(width: usize, height: usize, values: Vec<Vec<Tick>>) -> Result<Self> {
        if values.len() != LAYER_COUNT {
            return Err(allocation_error(
                width,
                height,
                &format!("expected {LAYER_COUNT} layers, found {}", values.len()),
            ));
        }
        let mut layers = Vec::with_capacity(LAYER_COUNT);
        for cells in values {
            let plane = Array2::from_shape_vec((height, width), cells)
                .map_err(|e| allocation_error(width, height, &e))?;
            layers.push(plane);
        }
        Ok(Self {
            layers,
            frame: GridFrame { width, height },
        })
    }

    /// Row-major copy of one layer
    pub fn layer_values(&self, layer: usize) -> Vec<Tick> {
        self.layers
            .get(layer)
            .map(|plane| plane.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Coordinate mapping of this grid
    pub const fn frame(&self) -> GridFrame {
        self.frame
    }

    /// Block columns
    pub const fn width(&self) -> usize {
        self.frame.width
    }

    /// Block rows
    pub const fn height(&self) -> usize {
        self.frame.height
    }

    /// Check if a coordinate is addressable
    pub const fn contains(&self, coord: BlockCoord) -> bool {
        self.frame.index(coord).is_some()
    }

    /// Activation tick at a cell
    ///
    /// Returns [`OUT_OF_BOUNDS`] outside the addressable space (or for an unknown
    /// layer) and [`EMPTY`] for inactive cells.
    pub fn get(&self, layer: usize, coord: BlockCoord) -> Tick {
        let Some(index) = self.frame.index(coord) else {
            return OUT_OF_BOUNDS;
        };
        self.layers
            .get(layer)
            .and_then(|plane| plane.get(index))
            .copied()
            .unwrap_or(OUT_OF_BOUNDS)
    }

    /// True when the layer holds an activation tick at `coord`
    pub fn is_active(&self, layer: usize, coord: BlockCoord) -> bool {
        self.get(layer, coord) >= 0
    }

    /// True when either leader layer is active at `coord`
    pub fn any_leader(&self, coord: BlockCoord) -> bool {
        (1..LAYER_COUNT).any(|layer| self.is_active(layer, coord))
    }

    /// True when any layer is active at `coord`
    pub fn any_active(&self, coord: BlockCoord) -> bool {
        (0..LAYER_COUNT).any(|layer| self.is_active(layer, coord))
    }

    /// Activate an empty cell, recording `tick`
    ///
    /// Occupied and out-of-bounds cells are left untouched. Returns whether the
    /// cell was written.
    pub fn spawn(&mut self, coord: BlockCoord, layer: usize, tick: Tick) -> bool {
        let Some(index) = self.frame.index(coord) else {
            return false;
        };
        match self.layers.get_mut(layer).and_then(|plane| plane.get_mut(index)) {
            Some(cell) if *cell == EMPTY => {
                *cell = tick.max(0);
                true
            }
            _ => false,
        }
    }

    /// Empty a cell unless the foundation is active there
    ///
    /// Fails silently and returns false when layer 0 holds the coordinate; this
    /// is the enforcement point of foundation permanence.
    pub fn clear(&mut self, coord: BlockCoord, layer: usize) -> bool {
        if self.is_active(FOUNDATION_LAYER, coord) {
            return false;
        }
        self.write_empty(coord, layer)
    }

    /// Empty a leader-layer cell regardless of the foundation beneath it
    ///
    /// Refuses layer 0 outright, so the foundation is never touched.
    pub fn retract_leader(&mut self, coord: BlockCoord, layer: usize) -> bool {
        if layer == FOUNDATION_LAYER {
            return false;
        }
        self.write_empty(coord, layer)
    }

    fn write_empty(&mut self, coord: BlockCoord, layer: usize) -> bool {
        let Some(index) = self.frame.index(coord) else {
            return false;
        };
        match self.layers.get_mut(layer).and_then(|plane| plane.get_mut(index)) {
            Some(cell) if *cell != EMPTY => {
                *cell = EMPTY;
                true
            }
            _ => false,
        }
    }

    /// Count of active cells on one layer
    pub fn active_count(&self, layer: usize) -> usize {
        self.layers
            .get(layer)
            .map_or(0, |plane| plane.iter().filter(|&&tick| tick >= 0).count())
    }
}

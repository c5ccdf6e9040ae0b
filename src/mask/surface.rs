//! Coverage raster painted by the compositor
//!
//! Each block maps to a `pitch x pitch` pixel square. Pixels hold coverage in
//! `[0, 1]`; painting is source-over and erasing is destination-out, both with
//! a uniform source alpha.

use std::ops::Range;

use ndarray::{Array2, AxisDescription, Slice};

use crate::io::error::{Result, invalid_parameter};
use crate::spatial::grid::{BlockCoord, Face, GridFrame, try_alloc_plane};

/// How a paint call combines with existing coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Source-over: `c = a + c * (1 - a)`
    Paint,
    /// Destination-out: `c = c * (1 - a)`
    Erase,
}

impl BlendMode {
    fn apply(self, current: f32, alpha: f32) -> f32 {
        match self {
            Self::Paint => current.mul_add(1.0 - alpha, alpha),
            Self::Erase => current * (1.0 - alpha),
        }
    }
}

/// One corner of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    /// North and west faces meet here
    NorthWest,
    /// North and east faces meet here
    NorthEast,
    /// South and west faces meet here
    SouthWest,
    /// South and east faces meet here
    SouthEast,
}

impl Corner {
    /// Corners whose two faces are both set in a N=1, S=2, E=4, W=8 mask
    pub fn from_face_mask(mask: u8) -> impl Iterator<Item = Self> {
        let n = mask & Face::North.bit() != 0;
        let s = mask & Face::South.bit() != 0;
        let e = mask & Face::East.bit() != 0;
        let w = mask & Face::West.bit() != 0;
        [
            (n && w, Self::NorthWest),
            (n && e, Self::NorthEast),
            (s && w, Self::SouthWest),
            (s && e, Self::SouthEast),
        ]
        .into_iter()
        .filter_map(|(set, corner)| set.then_some(corner))
    }
}

/// Row and column ranges as a per-axis slice of a 2D raster
fn window(rows: Range<usize>, cols: Range<usize>) -> impl Fn(AxisDescription) -> Slice {
    move |axis| match axis.axis.index() {
        0 => Slice::from(rows.clone()),
        _ => Slice::from(cols.clone()),
    }
}

/// Raster coverage mask over the block grid
#[derive(Debug, Clone, PartialEq)]
pub struct MaskSurface {
    coverage: Array2<f32>,
    frame: GridFrame,
    pitch: usize,
}

impl MaskSurface {
    /// Allocate a fully transparent surface
    ///
    /// # Errors
    ///
    /// Returns an error if `pitch` is zero or the raster cannot be allocated
    pub fn try_new(frame: GridFrame, pitch: usize) -> Result<Self> {
        if pitch == 0 {
            return Err(invalid_parameter(
                "pixel_pitch",
                &pitch,
                &"pitch must be at least one pixel",
            ));
        }
        let width = frame.width.saturating_mul(pitch);
        let height = frame.height.saturating_mul(pitch);
        Ok(Self {
            coverage: try_alloc_plane(width, height, 0.0)?,
            frame,
            pitch,
        })
    }

    /// Clear every pixel back to transparent
    pub fn reset(&mut self) {
        self.coverage.fill(0.0);
    }

    /// Pixels per block edge
    pub const fn pitch(&self) -> usize {
        self.pitch
    }

    /// Face strip width in pixels
    pub fn line_width(&self) -> usize {
        (self.pitch / 4).max(1)
    }

    /// Raster size as (width, height) in pixels
    pub fn dimensions(&self) -> (usize, usize) {
        let (rows, cols) = self.coverage.dim();
        (cols, rows)
    }

    /// Raw coverage indexed `[row, col]`
    pub const fn coverage(&self) -> &Array2<f32> {
        &self.coverage
    }

    /// Coverage of a single pixel, zero outside the raster
    pub fn pixel(&self, x: usize, y: usize) -> f32 {
        self.coverage.get([y, x]).copied().unwrap_or(0.0)
    }

    /// Mean coverage over a block's pixels, zero outside the grid
    pub fn cell_coverage(&self, coord: BlockCoord) -> f32 {
        let Some((row, col)) = self.origin_px(coord) else {
            return 0.0;
        };
        let block = self.coverage.slice_each_axis(window(
            row..row + self.pitch,
            col..col + self.pitch,
        ));
        block.mean().unwrap_or(0.0)
    }

    fn origin_px(&self, coord: BlockCoord) -> Option<(usize, usize)> {
        self.frame
            .index(coord)
            .map(|[row, col]| (row * self.pitch, col * self.pitch))
    }

    fn blend_px(&mut self, rows: (usize, usize), cols: (usize, usize), alpha: f32, mode: BlendMode) {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let (max_rows, max_cols) = self.coverage.dim();
        let rows = (rows.0.min(max_rows), rows.1.min(max_rows));
        let cols = (cols.0.min(max_cols), cols.1.min(max_cols));
        self.coverage
            .slice_each_axis_mut(window(rows.0..rows.1, cols.0..cols.1))
            .mapv_inplace(|c| mode.apply(c, alpha));
    }

    /// Blend a whole block
    pub fn paint_cell(&mut self, coord: BlockCoord, alpha: f32, mode: BlendMode) {
        if let Some((row, col)) = self.origin_px(coord) {
            let p = self.pitch;
            self.blend_px((row, row + p), (col, col + p), alpha, mode);
        }
    }

    /// Blend the strip along one face of a block, `width` pixels deep
    pub fn paint_face(&mut self, coord: BlockCoord, face: Face, width: usize, alpha: f32, mode: BlendMode) {
        let Some((row, col)) = self.origin_px(coord) else {
            return;
        };
        let p = self.pitch;
        let w = width.clamp(1, p);
        let (rows, cols) = match face {
            Face::North => ((row, row + w), (col, col + p)),
            Face::South => ((row + p - w, row + p), (col, col + p)),
            Face::West => ((row, row + p), (col, col + w)),
            Face::East => ((row, row + p), (col + p - w, col + p)),
        };
        self.blend_px(rows, cols, alpha, mode);
    }

    /// Blend a line-width square in one corner of a block
    pub fn paint_corner(&mut self, coord: BlockCoord, corner: Corner, alpha: f32, mode: BlendMode) {
        let Some((row, col)) = self.origin_px(coord) else {
            return;
        };
        let p = self.pitch;
        let w = self.line_width().min(p);
        let rows = match corner {
            Corner::NorthWest | Corner::NorthEast => (row, row + w),
            Corner::SouthWest | Corner::SouthEast => (row + p - w, row + p),
        };
        let cols = match corner {
            Corner::NorthWest | Corner::SouthWest => (col, col + w),
            Corner::NorthEast | Corner::SouthEast => (col + p - w, col + p),
        };
        self.blend_px(rows, cols, alpha, mode);
    }
}

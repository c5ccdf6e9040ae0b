//! Spatial data structures for the block space
//!
//! This module contains:
//! - Layered occupancy grids and block coordinates
//! - The derived render grid
//! - The chamfer distance transform

/// Two-pass chamfer distance transform and visibility cutoff
pub mod distance;
/// Layered occupancy grids, coordinates, faces and rectangles
pub mod grid;
/// Display and presence grids derived from the layered grid
pub mod render;

pub use grid::{BlockCoord, BlockRect, Face, LayeredLogicGrid, Tick};

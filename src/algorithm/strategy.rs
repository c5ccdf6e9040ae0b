//! Pluggable spine and wing layouts for the growth scheduler
//!
//! A strategy only enumerates rays: which directions grow from the origin, on
//! which layers, which layer decides termination, and where the perpendicular
//! wings go. The scheduler owns all growth rules.

use std::fmt;

use crate::spatial::grid::Face;

/// One spine and the wings hanging off it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpineSpec {
    /// Direction the spine grows from the origin
    pub direction: Face,
    /// Leader layers the spine grows on
    pub growth_layers: [usize; 2],
    /// Growth layer whose frontier decides when the spine is finished
    pub leader_layer: usize,
    /// Direction wings grow from each spine cell
    pub wing_direction: Face,
    /// Layer wings grow on
    pub wing_layer: usize,
}

impl SpineSpec {
    /// Spine growing on both leader layers
    pub const fn new(direction: Face, leader_layer: usize, wing_direction: Face, wing_layer: usize) -> Self {
        Self {
            direction,
            growth_layers: [1, 2],
            leader_layer,
            wing_direction,
            wing_layer,
        }
    }
}

/// Enumerates the spines grown each tick
pub trait GrowthStrategy: fmt::Debug {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Spines in the order they are grown
    fn spines(&self) -> &[SpineSpec];
}

const DUAL_SPINES: [SpineSpec; 2] = [
    SpineSpec::new(Face::West, 2, Face::North, 1),
    SpineSpec::new(Face::North, 1, Face::West, 2),
];

const CROSS_SPINES: [SpineSpec; 4] = [
    SpineSpec::new(Face::West, 2, Face::North, 1),
    SpineSpec::new(Face::North, 1, Face::West, 2),
    SpineSpec::new(Face::East, 2, Face::South, 1),
    SpineSpec::new(Face::South, 1, Face::East, 2),
];

/// West spine led by layer 2 with northern wings on layer 1, north spine led by
/// layer 1 with western wings on layer 2
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DualSpineStrategy;

impl GrowthStrategy for DualSpineStrategy {
    fn name(&self) -> &'static str {
        "dual-spine"
    }

    fn spines(&self) -> &[SpineSpec] {
        &DUAL_SPINES
    }
}

/// Four cardinal spines, each pair mirroring [`DualSpineStrategy`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrossStrategy;

impl GrowthStrategy for CrossStrategy {
    fn name(&self) -> &'static str {
        "cross"
    }

    fn spines(&self) -> &[SpineSpec] {
        &CROSS_SPINES
    }
}

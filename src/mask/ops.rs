//! Timestamped mask operations and the per-effect operation log
//!
//! Every growth or repair decision that should become visible is recorded as a
//! [`MaskOp`]. The compositor replays the whole log each tick, so ops are
//! immutable once constructed and the log only grows, apart from explicit
//! compaction of ops whose effect is fully reproduced by a later duplicate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::io::configuration::LAYER_COUNT;
use crate::io::error::{Result, invalid_op};
use crate::spatial::grid::{BlockCoord, BlockRect, Face, Tick};

/// Discriminant of a [`MaskOp`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaskOpKind {
    /// Paint whole cells with a fade-in ramp
    Add,
    /// Paint whole cells that are visible and have a visible neighbour
    AddSmart,
    /// Erase one face strip of each cell
    Remove,
    /// Erase one face strip, ordered with other line ops
    RemoveLine,
    /// Paint one face strip, ordered with other line ops
    AddLine,
    /// Erase whole cells with a fade-out ramp
    RemoveBlock,
}

impl MaskOpKind {
    /// Name used in error messages
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::AddSmart => "AddSmart",
            Self::Remove => "Remove",
            Self::RemoveLine => "RemoveLine",
            Self::AddLine => "AddLine",
            Self::RemoveBlock => "RemoveBlock",
        }
    }

    /// True for kinds that paint rather than erase
    pub const fn is_additive(self) -> bool {
        matches!(self, Self::Add | Self::AddSmart | Self::AddLine)
    }
}

/// A single paint or erase instruction over a block region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MaskOp {
    /// Paint every cell of `region`
    Add {
        /// Covered cells
        region: BlockRect,
        /// Layer the cells were spawned on
        layer: usize,
        /// Tick the op takes effect
        start: Tick,
    },
    /// Paint cells of `region` that are visible with a visible neighbour
    AddSmart {
        /// Covered cells
        region: BlockRect,
        /// Layer the cells were spawned on
        layer: usize,
        /// Tick the op takes effect
        start: Tick,
    },
    /// Erase the `face` strip of every cell of `region`
    Remove {
        /// Covered cells
        region: BlockRect,
        /// Face strip to erase
        face: Face,
        /// Layer the op refers to
        layer: usize,
        /// Tick the op takes effect
        start: Tick,
        /// Include the region's own bounding edge in corner cleanup
        force: bool,
    },
    /// Erase the `face` strip of every cell of `region` in line order
    RemoveLine {
        /// Covered cells
        region: BlockRect,
        /// Face strip to erase
        face: Face,
        /// Layer the op refers to
        layer: usize,
        /// Tick the op takes effect
        start: Tick,
        /// Include the region's own bounding edge in corner cleanup
        force: bool,
    },
    /// Paint the `face` strip of every visible cell of `region` in line order
    AddLine {
        /// Covered cells
        region: BlockRect,
        /// Face strip to paint
        face: Face,
        /// Layer the op refers to
        layer: usize,
        /// Tick the op takes effect
        start: Tick,
    },
    /// Erase every cell of `region`
    RemoveBlock {
        /// Covered cells
        region: BlockRect,
        /// Layer the cells were removed from
        layer: usize,
        /// Tick the op takes effect
        start: Tick,
    },
}

fn check_common(kind: MaskOpKind, layer: usize, start: Tick) -> Result<()> {
    if layer >= LAYER_COUNT {
        return Err(invalid_op(
            kind.name(),
            &format!("layer {layer} outside 0..{LAYER_COUNT}"),
        ));
    }
    if start < 0 {
        return Err(invalid_op(
            kind.name(),
            &format!("start tick {start} is negative"),
        ));
    }
    Ok(())
}

impl MaskOp {
    /// Whole-cell paint op
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::InvalidOp`] for an unknown layer or negative start
    pub fn add(region: BlockRect, layer: usize, start: Tick) -> Result<Self> {
        check_common(MaskOpKind::Add, layer, start)?;
        Ok(Self::Add {
            region,
            layer,
            start,
        })
    }

    /// Visibility-gated paint op for a single spawned cell
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::InvalidOp`] for an unknown layer or negative start
    pub fn add_smart(coord: BlockCoord, layer: usize, start: Tick) -> Result<Self> {
        check_common(MaskOpKind::AddSmart, layer, start)?;
        Ok(Self::AddSmart {
            region: BlockRect::cell(coord),
            layer,
            start,
        })
    }

    /// Face erasure op
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::InvalidOp`] for an unknown layer or negative start
    pub fn remove(
        region: BlockRect,
        face: Face,
        layer: usize,
        start: Tick,
        force: bool,
    ) -> Result<Self> {
        check_common(MaskOpKind::Remove, layer, start)?;
        Ok(Self::Remove {
            region,
            face,
            layer,
            start,
            force,
        })
    }

    /// Ordered face erasure op
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::InvalidOp`] for an unknown layer or negative start
    pub fn remove_line(
        region: BlockRect,
        face: Face,
        layer: usize,
        start: Tick,
        force: bool,
    ) -> Result<Self> {
        check_common(MaskOpKind::RemoveLine, layer, start)?;
        Ok(Self::RemoveLine {
            region,
            face,
            layer,
            start,
            force,
        })
    }

    /// Ordered face paint op
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::InvalidOp`] for an unknown layer or negative start
    pub fn add_line(region: BlockRect, face: Face, layer: usize, start: Tick) -> Result<Self> {
        check_common(MaskOpKind::AddLine, layer, start)?;
        Ok(Self::AddLine {
            region,
            face,
            layer,
            start,
        })
    }

    /// Whole-cell erasure op for a single retracted cell
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::InvalidOp`] for an unknown layer or negative start
    pub fn remove_block(coord: BlockCoord, layer: usize, start: Tick) -> Result<Self> {
        check_common(MaskOpKind::RemoveBlock, layer, start)?;
        Ok(Self::RemoveBlock {
            region: BlockRect::cell(coord),
            layer,
            start,
        })
    }

    /// Re-check layer and start tick, for ops that bypassed the constructors
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::InvalidOp`] for an unknown layer or negative start
    pub fn validate(&self) -> Result<()> {
        check_common(self.kind(), self.layer(), self.start())
    }

    /// Variant discriminant
    pub const fn kind(&self) -> MaskOpKind {
        match self {
            Self::Add { .. } => MaskOpKind::Add,
            Self::AddSmart { .. } => MaskOpKind::AddSmart,
            Self::Remove { .. } => MaskOpKind::Remove,
            Self::RemoveLine { .. } => MaskOpKind::RemoveLine,
            Self::AddLine { .. } => MaskOpKind::AddLine,
            Self::RemoveBlock { .. } => MaskOpKind::RemoveBlock,
        }
    }

    /// Covered cells
    pub const fn region(&self) -> BlockRect {
        match self {
            Self::Add { region, .. }
            | Self::AddSmart { region, .. }
            | Self::Remove { region, .. }
            | Self::RemoveLine { region, .. }
            | Self::AddLine { region, .. }
            | Self::RemoveBlock { region, .. } => *region,
        }
    }

    /// Layer the op refers to
    pub const fn layer(&self) -> usize {
        match self {
            Self::Add { layer, .. }
            | Self::AddSmart { layer, .. }
            | Self::Remove { layer, .. }
            | Self::RemoveLine { layer, .. }
            | Self::AddLine { layer, .. }
            | Self::RemoveBlock { layer, .. } => *layer,
        }
    }

    /// Tick the op takes effect
    pub const fn start(&self) -> Tick {
        match self {
            Self::Add { start, .. }
            | Self::AddSmart { start, .. }
            | Self::Remove { start, .. }
            | Self::RemoveLine { start, .. }
            | Self::AddLine { start, .. }
            | Self::RemoveBlock { start, .. } => *start,
        }
    }

    /// Face of face-carrying kinds
    pub const fn face(&self) -> Option<Face> {
        match self {
            Self::Remove { face, .. } | Self::RemoveLine { face, .. } | Self::AddLine { face, .. } => {
                Some(*face)
            }
            _ => None,
        }
    }

    /// Force flag of removal kinds, false otherwise
    pub const fn force(&self) -> bool {
        match self {
            Self::Remove { force, .. } | Self::RemoveLine { force, .. } => *force,
            _ => false,
        }
    }

    /// True once `now` has reached the op's start tick
    pub const fn has_started(&self, now: Tick) -> bool {
        self.start() <= now
    }

    /// Ramp length governing this op's opacity
    const fn ramp_frames(&self, fade_in_frames: u32, fade_frames: u32) -> u32 {
        if self.kind().is_additive() {
            fade_in_frames
        } else {
            fade_frames
        }
    }

    /// Opacity of the op at `now`, ramping linearly from its start tick
    ///
    /// Additive kinds ramp over `fade_in_frames`, erasing kinds over
    /// `fade_frames`; a zero ramp means full opacity immediately.
    pub fn opacity(&self, now: Tick, fade_in_frames: u32, fade_frames: u32) -> f32 {
        ramp(now - self.start(), self.ramp_frames(fade_in_frames, fade_frames))
    }

    /// True when the op has reached full opacity at `now`
    pub fn is_settled(&self, now: Tick, fade_in_frames: u32, fade_frames: u32) -> bool {
        let frames = self.ramp_frames(fade_in_frames, fade_frames);
        i64::from(now) - i64::from(self.start()) >= i64::from(frames)
    }

    /// True when both ops would paint identically at full opacity
    fn duplicates(&self, other: &Self) -> bool {
        self.kind() == other.kind()
            && self.region() == other.region()
            && self.layer() == other.layer()
            && self.face() == other.face()
            && self.force() == other.force()
    }
}

/// Linear 0..1 ramp of `elapsed` ticks over `frames`
pub fn ramp(elapsed: Tick, frames: u32) -> f32 {
    if frames == 0 {
        return 1.0;
    }
    (elapsed as f32 / frames as f32).clamp(0.0, 1.0)
}

/// Append-only log of mask operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaskOpLog {
    ops: Vec<MaskOp>,
}

impl MaskOpLog {
    /// Empty log
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Append an op
    pub fn push(&mut self, op: MaskOp) {
        self.ops.push(op);
    }

    /// Ops in append order
    pub fn iter(&self) -> std::slice::Iter<'_, MaskOp> {
        self.ops.iter()
    }

    /// Number of recorded ops
    pub const fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when nothing has been recorded
    pub const fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Ops whose start tick has been reached
    pub fn elapsed(&self, now: Tick) -> impl Iterator<Item = &MaskOp> {
        self.ops.iter().filter(move |op| op.has_started(now))
    }

    /// Index of the latest additive start per cell among elapsed ops
    pub fn coverage(&self, now: Tick) -> CoverageIndex {
        let mut latest: HashMap<(BlockCoord, Option<Face>), Tick> = HashMap::new();
        for op in self.elapsed(now) {
            let face = match op.kind() {
                MaskOpKind::Add | MaskOpKind::AddSmart => None,
                MaskOpKind::AddLine => op.face(),
                _ => continue,
            };
            for coord in op.region().cells() {
                let start = latest.entry((coord, face)).or_insert(op.start());
                *start = (*start).max(op.start());
            }
        }
        CoverageIndex { latest }
    }

    /// Drop settled ops that a later settled duplicate fully reproduces
    ///
    /// Returns the number of removed ops. Compositing the compacted log at `now`
    /// or any later tick yields the same surface as the full log.
    pub fn compact(&mut self, now: Tick, fade_in_frames: u32, fade_frames: u32) -> usize {
        let before = self.ops.len();
        let settled: Vec<bool> = self
            .ops
            .iter()
            .map(|op| op.is_settled(now, fade_in_frames, fade_frames))
            .collect();
        let mut keep = vec![true; self.ops.len()];
        for (i, op) in self.ops.iter().enumerate() {
            if !settled.get(i).copied().unwrap_or(false) {
                continue;
            }
            let superseded = self
                .ops
                .iter()
                .enumerate()
                .skip(i + 1)
                .any(|(j, later)| {
                    settled.get(j).copied().unwrap_or(false)
                        && later.start() >= op.start()
                        && later.duplicates(op)
                });
            if superseded && let Some(flag) = keep.get_mut(i) {
                *flag = false;
            }
        }
        let mut flags = keep.into_iter();
        self.ops.retain(|_| flags.next().unwrap_or(true));
        before - self.ops.len()
    }
}

/// Latest additive start tick per cell, built once per composite
#[derive(Debug, Clone, Default)]
pub struct CoverageIndex {
    latest: HashMap<(BlockCoord, Option<Face>), Tick>,
}

impl CoverageIndex {
    /// True when an additive op started strictly after `after` covers `coord`
    ///
    /// Whole-cell adds cover every face; line adds only cover their own face.
    pub fn is_covered_after(&self, coord: BlockCoord, face: Option<Face>, after: Tick) -> bool {
        let later = |key: (BlockCoord, Option<Face>)| {
            self.latest.get(&key).is_some_and(|&start| start > after)
        };
        later((coord, None)) || face.is_some_and(|f| later((coord, Some(f))))
    }
}

impl<'a> IntoIterator for &'a MaskOpLog {
    type Item = &'a MaskOp;
    type IntoIter = std::slice::Iter<'a, MaskOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

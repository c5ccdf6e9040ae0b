//! Seven-pass mask compositing
//!
//! The compositor replays the op log onto a cleared surface every tick:
//!
//! 1. base adds with fade-in
//! 2. visibility-gated smart adds
//! 3. whole-block erasure with fade-out
//! 4. face erasure
//! 5. perimeter stroke against physically present neighbours
//! 6. directional line ops in start-tick order
//! 7. corner cleanup from accumulated removal faces
//!
//! Each pass starts from full paint opacity. The result depends only on the op
//! log, the render grid, the distance map and the current tick.

use std::collections::BTreeMap;

use tracing::trace;

use crate::io::configuration::EffectConfig;
use crate::mask::ops::{CoverageIndex, MaskOp, MaskOpKind, MaskOpLog, ramp};
use crate::mask::surface::{BlendMode, Corner, MaskSurface};
use crate::spatial::distance::DistanceMap;
use crate::spatial::grid::{BlockCoord, Face, Tick};
use crate::spatial::render::RenderGrid;

/// Per-pass counts from a single composite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeStats {
    /// Whole cells painted by passes 1 and 2
    pub cells_painted: usize,
    /// Whole cells erased by pass 3
    pub cells_erased: usize,
    /// Face strips erased by pass 4
    pub faces_erased: usize,
    /// Border strips stroked by pass 5
    pub perimeter_strokes: usize,
    /// Line ops applied per cell by pass 6
    pub line_cells: usize,
    /// Corners erased by pass 7
    pub corners_erased: usize,
}

/// Read-only inputs shared by all passes
struct PassContext<'a> {
    ops: &'a MaskOpLog,
    render: &'a RenderGrid,
    distance: &'a DistanceMap,
    coverage: CoverageIndex,
    now: Tick,
}

impl PassContext<'_> {
    fn started(&self, kind: MaskOpKind) -> impl Iterator<Item = &MaskOp> {
        self.ops
            .elapsed(self.now)
            .filter(move |op| op.kind() == kind)
    }

    fn has_visible_neighbor(&self, coord: BlockCoord) -> bool {
        Face::ALL
            .iter()
            .any(|&face| self.distance.is_visible(coord.neighbor(face)))
    }
}

/// Paints a [`MaskSurface`] from the op log and the current grids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskCompositor {
    fade_in_frames: u32,
    fade_frames: u32,
}

impl MaskCompositor {
    /// Compositor with explicit ramp lengths
    pub const fn new(fade_in_frames: u32, fade_frames: u32) -> Self {
        Self {
            fade_in_frames,
            fade_frames,
        }
    }

    /// Compositor honoring the config's fade settings and debug override
    pub const fn from_config(config: &EffectConfig) -> Self {
        if config.debug_disable_fades {
            Self::new(0, 0)
        } else {
            Self::new(config.fade_in_frames, config.fade_frames)
        }
    }

    /// Fade-in ramp length in ticks
    pub const fn fade_in_frames(&self) -> u32 {
        self.fade_in_frames
    }

    /// Fade-out ramp length in ticks
    pub const fn fade_frames(&self) -> u32 {
        self.fade_frames
    }

    fn opacity(&self, op: &MaskOp, now: Tick) -> f32 {
        op.opacity(now, self.fade_in_frames, self.fade_frames)
    }

    /// Clear `surface` and run all seven passes at tick `now`
    #[tracing::instrument(level = "debug", skip_all, fields(now = now, ops = ops.len()))]
    pub fn composite(
        &self,
        ops: &MaskOpLog,
        render: &RenderGrid,
        distance: &DistanceMap,
        now: Tick,
        surface: &mut MaskSurface,
    ) -> CompositeStats {
        let ctx = PassContext {
            ops,
            render,
            distance,
            coverage: ops.coverage(now),
            now,
        };
        let mut stats = CompositeStats::default();
        surface.reset();

        self.base_add(&ctx, surface, &mut stats);
        self.smart_perimeter(&ctx, surface, &mut stats);
        self.block_erasure(&ctx, surface, &mut stats);
        self.face_erasure(&ctx, surface, &mut stats);
        self.perimeter_stroke(&ctx, surface, &mut stats);
        self.directional_lines(&ctx, surface, &mut stats);
        Self::corner_cleanup(&ctx, surface, &mut stats);

        trace!(?stats, "composite finished");
        stats
    }

    fn base_add(&self, ctx: &PassContext<'_>, surface: &mut MaskSurface, stats: &mut CompositeStats) {
        for op in ctx.started(MaskOpKind::Add) {
            let alpha = self.opacity(op, ctx.now);
            for coord in op.region().cells() {
                surface.paint_cell(coord, alpha, BlendMode::Paint);
                stats.cells_painted += 1;
            }
        }
    }

    // Isolated single cells never flash in
    fn smart_perimeter(&self, ctx: &PassContext<'_>, surface: &mut MaskSurface, stats: &mut CompositeStats) {
        for op in ctx.started(MaskOpKind::AddSmart) {
            let alpha = self.opacity(op, ctx.now);
            for coord in op.region().cells() {
                if ctx.distance.is_visible(coord) && ctx.has_visible_neighbor(coord) {
                    surface.paint_cell(coord, alpha, BlendMode::Paint);
                    stats.cells_painted += 1;
                }
            }
        }
    }

    fn block_erasure(&self, ctx: &PassContext<'_>, surface: &mut MaskSurface, stats: &mut CompositeStats) {
        for op in ctx.started(MaskOpKind::RemoveBlock) {
            let alpha = self.opacity(op, ctx.now);
            for coord in op.region().cells() {
                if ctx.coverage.is_covered_after(coord, None, op.start()) {
                    continue;
                }
                surface.paint_cell(coord, alpha, BlendMode::Erase);
                stats.cells_erased += 1;
            }
        }
    }

    fn face_erasure(&self, ctx: &PassContext<'_>, surface: &mut MaskSurface, stats: &mut CompositeStats) {
        let width = surface.line_width();
        for op in ctx.started(MaskOpKind::Remove) {
            let Some(face) = op.face() else { continue };
            let alpha = self.opacity(op, ctx.now);
            for coord in op.region().cells() {
                if ctx.coverage.is_covered_after(coord, Some(face), op.start()) {
                    continue;
                }
                surface.paint_face(coord, face, width, alpha, BlendMode::Erase);
                stats.faces_erased += 1;
            }
        }
    }

    // Presence, not visibility, decides where a border is drawn
    fn perimeter_stroke(&self, ctx: &PassContext<'_>, surface: &mut MaskSurface, stats: &mut CompositeStats) {
        let width = surface.line_width() * 2;
        let frame = ctx.render.frame();
        for ((row, col), &tick) in ctx.render.display().indexed_iter() {
            let coord = frame.coord([row, col]);
            if !ctx.distance.is_visible(coord) {
                continue;
            }
            let alpha = ramp(ctx.now - tick, self.fade_in_frames);
            for face in Face::ALL {
                if !ctx.render.is_present(coord.neighbor(face)) {
                    surface.paint_face(coord, face, width, alpha, BlendMode::Paint);
                    stats.perimeter_strokes += 1;
                }
            }
        }
    }

    fn directional_lines(&self, ctx: &PassContext<'_>, surface: &mut MaskSurface, stats: &mut CompositeStats) {
        let width = surface.line_width();
        let mut lines: Vec<&MaskOp> = ctx
            .ops
            .elapsed(ctx.now)
            .filter(|op| matches!(op.kind(), MaskOpKind::AddLine | MaskOpKind::RemoveLine))
            .collect();
        lines.sort_by_key(|op| op.start());

        for op in lines {
            let Some(face) = op.face() else { continue };
            let alpha = self.opacity(op, ctx.now);
            for coord in op.region().cells() {
                if op.kind() == MaskOpKind::AddLine {
                    if !ctx.distance.is_visible(coord) {
                        continue;
                    }
                    surface.paint_face(coord, face, width, alpha, BlendMode::Paint);
                } else {
                    if ctx.coverage.is_covered_after(coord, Some(face), op.start()) {
                        continue;
                    }
                    surface.paint_face(coord, face, width, alpha, BlendMode::Erase);
                }
                stats.line_cells += 1;
            }
        }
    }

    fn corner_cleanup(ctx: &PassContext<'_>, surface: &mut MaskSurface, stats: &mut CompositeStats) {
        let mut masks: BTreeMap<BlockCoord, u8> = BTreeMap::new();
        let removals = ctx
            .ops
            .elapsed(ctx.now)
            .filter(|op| matches!(op.kind(), MaskOpKind::Remove | MaskOpKind::RemoveLine));
        for op in removals {
            let Some(face) = op.face() else { continue };
            let region = op.region();
            for coord in region.cells() {
                if !op.force() && region.on_edge(coord, face) {
                    continue;
                }
                if ctx.coverage.is_covered_after(coord, None, op.start()) {
                    continue;
                }
                *masks.entry(coord).or_default() |= face.bit();
            }
        }

        for (coord, mask) in masks {
            for corner in Corner::from_face_mask(mask) {
                surface.paint_corner(coord, corner, 1.0, BlendMode::Erase);
                stats.corners_erased += 1;
            }
        }
    }
}

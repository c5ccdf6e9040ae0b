//! Per-tick spine, wing and follower growth
//!
//! Each spine grows outward from the origin on its leader layers until the
//! designated leader layer reaches the finish boundary or leaves the grid. Every
//! occupied spine cell roots a perpendicular wing on the wing layer; wings grow
//! by the same rule and occasionally retract their tip. A follower pass then
//! lets the permanent foundation catch up behind the leaders.
//!
//! Branches move `Growing -> Finished` exactly once and are never grown or
//! reverted afterwards.

use tracing::trace;

use crate::algorithm::state::{BranchId, EffectState};
use crate::algorithm::strategy::{GrowthStrategy, SpineSpec};
use crate::io::configuration::{EffectConfig, FINISH_MARGIN, GROWTH_MARGIN};
use crate::io::error::Result;
use crate::math::probability::{RandomSource, aspect_biases, burst_size};
use crate::spatial::grid::{BlockCoord, EMPTY, FOUNDATION_LAYER, Face, OUT_OF_BOUNDS};

/// Cells changed by one growth pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrowthReport {
    /// Cells activated on any layer
    pub spawned: usize,
    /// Wing tips retracted
    pub reverted: usize,
    /// Branches that finished during this pass
    pub finished: usize,
}

/// Limits along one axis
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisLimits {
    finish: i32,
    growth: i32,
    bias: f64,
}

/// One outward ray on one layer
#[derive(Debug, Clone, Copy)]
struct Ray {
    root: BlockCoord,
    direction: Face,
    layer: usize,
}

impl Ray {
    const fn at(&self, distance: i32) -> BlockCoord {
        self.root.step(self.direction, distance)
    }
}

/// Frontier scan outcome
enum Frontier {
    /// First empty cell at this distance, strictly inside the finish limit
    Open(i32),
    /// The ray hit the finish limit or left the grid
    Closed,
}

/// Runs spine, wing and follower growth against an [`EffectState`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthScheduler {
    horizontal: AxisLimits,
    vertical: AxisLimits,
    growth_chance: f64,
    reversion_chance: f64,
}

impl GrowthScheduler {
    /// Derive limits and biases from the viewport of `config`
    pub fn new(config: &EffectConfig) -> Self {
        let (vis_x, vis_y) = config.visible_radius();
        let (bias_x, bias_y) = aspect_biases(config.viewport_width, config.viewport_height);
        Self {
            horizontal: AxisLimits {
                finish: vis_x + FINISH_MARGIN,
                growth: vis_x + GROWTH_MARGIN,
                bias: bias_x,
            },
            vertical: AxisLimits {
                finish: vis_y + FINISH_MARGIN,
                growth: vis_y + GROWTH_MARGIN,
                bias: bias_y,
            },
            growth_chance: config.growth_chance,
            reversion_chance: config.reversion_chance,
        }
    }

    const fn limits(&self, direction: Face) -> AxisLimits {
        if direction.is_horizontal() {
            self.horizontal
        } else {
            self.vertical
        }
    }

    /// Distance at which a ray along `direction` finishes
    pub const fn finish_limit(&self, direction: Face) -> i32 {
        self.limits(direction).finish
    }

    /// Distance beyond which nothing is spawned along `direction`
    pub const fn growth_limit(&self, direction: Face) -> i32 {
        self.limits(direction).growth
    }

    /// Run one growth pass for every spine of `strategy`
    ///
    /// # Errors
    ///
    /// Returns an error if a recorded mask op fails validation
    pub fn run<R: RandomSource + ?Sized>(
        &self,
        state: &mut EffectState,
        strategy: &dyn GrowthStrategy,
        rng: &mut R,
    ) -> Result<GrowthReport> {
        let mut report = GrowthReport::default();
        let bursts = (
            burst_size(self.horizontal.bias, rng),
            burst_size(self.vertical.bias, rng),
        );
        let burst_for = |direction: Face| {
            if direction.is_horizontal() {
                bursts.0
            } else {
                bursts.1
            }
        };

        for spine in strategy.spines() {
            self.grow_spine(state, spine, burst_for(spine.direction), rng, &mut report)?;
        }
        for spine in strategy.spines() {
            let layers = spine.growth_layers;
            let ray = Ray {
                root: BlockCoord::ORIGIN,
                direction: spine.direction,
                layer: spine.leader_layer,
            };
            let limit = self.growth_limit(spine.direction);
            self.follow(state, ray, &layers, limit, burst_for(spine.direction), rng, &mut report)?;
        }
        for spine in strategy.spines() {
            self.grow_wings(state, spine, burst_for(spine.wing_direction), rng, &mut report)?;
        }
        Ok(report)
    }

    fn grow_spine<R: RandomSource + ?Sized>(
        &self,
        state: &mut EffectState,
        spine: &SpineSpec,
        burst: usize,
        rng: &mut R,
        report: &mut GrowthReport,
    ) -> Result<()> {
        let branch = BranchId::Spine(spine.direction);
        if state.finished.contains(branch) {
            return Ok(());
        }
        let mut finished = false;
        for &layer in &spine.growth_layers {
            let ray = Ray {
                root: BlockCoord::ORIGIN,
                direction: spine.direction,
                layer,
            };
            match self.frontier(state, ray) {
                Frontier::Closed => finished |= layer == spine.leader_layer,
                Frontier::Open(free) => {
                    if rng.chance(self.growth_chance) {
                        report.spawned += self.extend(state, ray, free, burst)?;
                    }
                }
            }
        }
        if finished {
            Self::finish(state, branch, report);
        }
        Ok(())
    }

    fn grow_wings<R: RandomSource + ?Sized>(
        &self,
        state: &mut EffectState,
        spine: &SpineSpec,
        burst: usize,
        rng: &mut R,
        report: &mut GrowthReport,
    ) -> Result<()> {
        let growth_limit = self.growth_limit(spine.wing_direction);
        for offset in 1.. {
            let root = BlockCoord::ORIGIN.step(spine.direction, offset);
            if !state.grid.contains(root) || !state.grid.any_leader(root) {
                break;
            }
            let branch = BranchId::Wing {
                spine: spine.direction,
                offset,
            };
            let ray = Ray {
                root,
                direction: spine.wing_direction,
                layer: spine.wing_layer,
            };

            let mut reach = growth_limit;
            if !state.finished.contains(branch) {
                match self.frontier(state, ray) {
                    Frontier::Closed => Self::finish(state, branch, report),
                    Frontier::Open(free) => {
                        if rng.chance(self.growth_chance) {
                            report.spawned += self.extend(state, ray, free, burst)?;
                        }
                        if self.revert_tip(state, ray, rng)? {
                            report.reverted += 1;
                        }
                        reach = free;
                    }
                }
            }
            self.follow(state, ray, &[spine.wing_layer], reach, burst, rng, report)?;
        }
        Ok(())
    }

    /// Scan a ray from distance 1 for its first empty cell
    fn frontier(&self, state: &EffectState, ray: Ray) -> Frontier {
        let finish = self.finish_limit(ray.direction);
        let mut distance = 1;
        loop {
            if distance >= finish {
                return Frontier::Closed;
            }
            match state.grid.get(ray.layer, ray.at(distance)) {
                OUT_OF_BOUNDS => return Frontier::Closed,
                EMPTY => return Frontier::Open(distance),
                _ => distance += 1,
            }
        }
    }

    /// Spawn up to `burst` contiguous cells starting at distance `free`
    fn extend(&self, state: &mut EffectState, ray: Ray, free: i32, burst: usize) -> Result<usize> {
        let limit = self.growth_limit(ray.direction);
        let tick = state.current_tick;
        let mut spawned = 0;
        for step in 0..burst as i32 {
            let distance = free + step;
            let coord = ray.at(distance);
            if distance > limit || state.grid.get(ray.layer, coord) != EMPTY {
                break;
            }
            state.spawn_block(coord, ray.layer, tick)?;
            spawned += 1;
        }
        Ok(spawned)
    }

    /// Possibly retract the outermost occupied cell of a wing
    fn revert_tip<R: RandomSource + ?Sized>(&self, state: &mut EffectState, ray: Ray, rng: &mut R) -> Result<bool> {
        if ray.layer == FOUNDATION_LAYER || !rng.chance(self.reversion_chance) {
            return Ok(false);
        }
        let mut tip = None;
        let mut distance = 1;
        while state.grid.is_active(ray.layer, ray.at(distance)) {
            tip = Some(ray.at(distance));
            distance += 1;
        }
        match tip {
            Some(coord) if !coord.is_origin() => {
                let tick = state.current_tick;
                state.retract_block(coord, ray.layer, tick)
            }
            _ => Ok(false),
        }
    }

    /// Fill the foundation behind the leaders of a ray
    ///
    /// The first cell within `reach` whose foundation is empty while a leader
    /// is active there gets filled only if a leader is also active one cell
    /// further out, so the foundation always trails the frontier.
    fn follow<R: RandomSource + ?Sized>(
        &self,
        state: &mut EffectState,
        ray: Ray,
        leaders: &[usize],
        reach: i32,
        burst: usize,
        rng: &mut R,
        report: &mut GrowthReport,
    ) -> Result<()> {
        let led = |state: &EffectState, coord: BlockCoord| {
            leaders.iter().any(|&layer| state.grid.is_active(layer, coord))
        };
        let trails = |state: &EffectState, distance: i32| {
            let coord = ray.at(distance);
            state.grid.get(FOUNDATION_LAYER, coord) == EMPTY
                && led(state, coord)
                && led(state, ray.at(distance + 1))
        };

        for distance in 1..=reach {
            let coord = ray.at(distance);
            if !state.grid.contains(coord) {
                break;
            }
            if state.grid.get(FOUNDATION_LAYER, coord) != EMPTY || !led(state, coord) {
                continue;
            }
            if trails(state, distance) && rng.chance(self.growth_chance) {
                let tick = state.current_tick;
                for step in 0..burst as i32 {
                    if !trails(state, distance + step) {
                        break;
                    }
                    if state.spawn_block(ray.at(distance + step), FOUNDATION_LAYER, tick)? {
                        report.spawned += 1;
                    }
                }
            }
            break;
        }
        Ok(())
    }

    fn finish(state: &mut EffectState, branch: BranchId, report: &mut GrowthReport) {
        if state.finished.insert(branch) {
            trace!(?branch, tick = state.current_tick, "branch finished");
            report.finished += 1;
        }
    }
}

//! Tests for spine, wing and follower growth

#[cfg(test)]
mod tests {
    use quantmask::Result;
    use quantmask::algorithm::growth::GrowthScheduler;
    use quantmask::algorithm::state::{BranchId, EffectState};
    use quantmask::algorithm::strategy::DualSpineStrategy;
    use quantmask::io::configuration::EffectConfig;
    use quantmask::math::probability::{RandomSource, SeededRandom};
    use quantmask::spatial::grid::{BlockCoord, EMPTY, Face};

    struct Always(f64);

    impl RandomSource for Always {
        fn next_unit(&mut self) -> f64 {
            self.0
        }
    }

    fn setup(config: &EffectConfig) -> Result<(GrowthScheduler, EffectState)> {
        Ok((GrowthScheduler::new(config), EffectState::try_new(config)?))
    }

    fn run_ticks(
        scheduler: &GrowthScheduler,
        state: &mut EffectState,
        rng: &mut impl RandomSource,
        ticks: i32,
    ) -> Result<()> {
        for tick in 1..=ticks {
            state.current_tick = tick;
            scheduler.run(state, &DualSpineStrategy, rng)?;
        }
        Ok(())
    }

    // Tests limits derive from the visible radius on each axis
    // Verified by using the grid size instead of the viewport
    #[test]
    fn test_limits_follow_viewport() {
        let square = GrowthScheduler::new(&EffectConfig::new(10, 10));
        assert_eq!(square.finish_limit(Face::West), 6);
        assert_eq!(square.growth_limit(Face::North), 8);

        let wide = GrowthScheduler::new(&EffectConfig::new(30, 30).with_viewport(8, 4));
        assert_eq!(wide.finish_limit(Face::East), 5);
        assert_eq!(wide.finish_limit(Face::South), 3);
        assert_eq!(wide.growth_limit(Face::North), 5);
    }

    // Tests failed growth draws leave the state untouched
    #[test]
    fn test_no_growth_when_draws_fail() -> Result<()> {
        let config = EffectConfig::new(10, 10);
        let (scheduler, mut state) = setup(&config)?;
        let before = state.clone();
        state.current_tick = 1;

        let report = scheduler.run(&mut state, &DualSpineStrategy, &mut Always(0.999))?;
        assert_eq!(report.spawned, 0);
        assert_eq!(report.reverted, 0);
        assert_eq!(state.ops, before.ops);
        assert_eq!(state.grid, before.grid);
        Ok(())
    }

    // Tests the first tick grows spines on both leader layers but not the foundation
    // Verified by letting the follower fill cells without a leader further out
    #[test]
    fn test_first_tick_leaves_foundation_unwritten() -> Result<()> {
        let config = EffectConfig::new(10, 10);
        let (scheduler, mut state) = setup(&config)?;
        state.current_tick = 1;

        let report = scheduler.run(&mut state, &DualSpineStrategy, &mut Always(0.0))?;

        for coord in [BlockCoord::new(-1, 0), BlockCoord::new(0, -1)] {
            assert_eq!(state.grid.get(1, coord), 1);
            assert_eq!(state.grid.get(2, coord), 1);
            assert_eq!(state.grid.get(0, coord), EMPTY);
        }
        assert_eq!(state.grid.active_count(0), 1);
        // Wings sprout and retract within the same tick
        assert_eq!(state.grid.get(1, BlockCoord::new(-1, -1)), EMPTY);
        assert_eq!(state.grid.get(2, BlockCoord::new(-1, -1)), EMPTY);
        assert_eq!(report.spawned, 6);
        assert_eq!(report.reverted, 2);
        assert_eq!(report.finished, 0);
        assert!(state.finished.is_empty());
        Ok(())
    }

    // Tests wing reversion never retracts a tip the foundation holds
    // Verified by clearing wing tips without checking layer 0
    #[test]
    fn test_reversion_spares_foundation_tip() -> Result<()> {
        let mut config = EffectConfig::new(10, 10);
        config.growth_chance = 0.0;
        config.reversion_chance = 1.0;
        let scheduler = GrowthScheduler::new(&config);
        let root = BlockCoord::new(-1, 0);
        let tip = BlockCoord::new(-1, -1);

        let wing_state = |founded: bool| -> Result<EffectState> {
            let mut state = EffectState::try_new(&config)?;
            state.current_tick = 1;
            state.spawn_block(root, 1, 1)?;
            state.spawn_block(root, 2, 1)?;
            state.spawn_block(tip, 1, 1)?;
            if founded {
                state.spawn_block(tip, 0, 1)?;
            }
            state.current_tick = 2;
            Ok(state)
        };

        let mut founded = wing_state(true)?;
        let ops_before = founded.ops.len();
        let report = scheduler.run(&mut founded, &DualSpineStrategy, &mut Always(0.0))?;
        assert_eq!(report.reverted, 0);
        assert_eq!(founded.grid.get(1, tip), 1);
        assert_eq!(founded.ops.len(), ops_before);

        let mut bare = wing_state(false)?;
        let report = scheduler.run(&mut bare, &DualSpineStrategy, &mut Always(0.0))?;
        assert_eq!(report.reverted, 1);
        assert_eq!(bare.grid.get(1, tip), EMPTY);
        Ok(())
    }

    // Tests the foundation trails one cell behind the leaders
    // Verified by filling the foundation up to the frontier
    #[test]
    fn test_foundation_trails_leaders() -> Result<()> {
        let config = EffectConfig::new(10, 10);
        let (scheduler, mut state) = setup(&config)?;
        run_ticks(&scheduler, &mut state, &mut Always(0.0), 2)?;

        assert_eq!(state.grid.get(2, BlockCoord::new(-2, 0)), 2);
        assert_eq!(state.grid.get(0, BlockCoord::new(-1, 0)), 2);
        assert_eq!(state.grid.get(0, BlockCoord::new(-2, 0)), EMPTY);
        assert_eq!(state.grid.get(0, BlockCoord::new(0, -1)), 2);
        Ok(())
    }

    // Tests spines finish at the viewport edge and stay finished
    // Verified by re-opening finished spines on later ticks
    #[test]
    fn test_spines_finish_at_boundary() -> Result<()> {
        let config = EffectConfig::new(10, 10);
        let (scheduler, mut state) = setup(&config)?;
        run_ticks(&scheduler, &mut state, &mut Always(0.0), 8)?;

        assert!(state.finished.contains(BranchId::Spine(Face::West)));
        assert!(state.finished.contains(BranchId::Spine(Face::North)));
        assert_eq!(state.grid.get(2, BlockCoord::new(-5, 0)), 5);

        let finished = state.finished.clone();
        state.current_tick = 9;
        let report = scheduler.run(&mut state, &DualSpineStrategy, &mut Always(0.0))?;
        assert_eq!(report.finished, 0);
        assert!(finished.iter().all(|&branch| state.finished.contains(branch)));
        Ok(())
    }

    // Tests a finished spine is never extended
    #[test]
    fn test_finished_spine_is_frozen() -> Result<()> {
        let config = EffectConfig::new(10, 10);
        let (scheduler, mut state) = setup(&config)?;
        state.finished.insert(BranchId::Spine(Face::West));
        run_ticks(&scheduler, &mut state, &mut Always(0.0), 3)?;

        assert_eq!(state.grid.get(1, BlockCoord::new(-1, 0)), EMPTY);
        assert_eq!(state.grid.get(2, BlockCoord::new(-1, 0)), EMPTY);
        assert_eq!(state.grid.get(1, BlockCoord::new(0, -1)), 1);
        Ok(())
    }

    // Tests nothing is spawned past the growth limit
    // Verified by dropping the limit check in extend
    #[test]
    fn test_growth_respects_limit() -> Result<()> {
        let config = EffectConfig::new(20, 20).with_viewport(6, 6);
        let (scheduler, mut state) = setup(&config)?;
        run_ticks(&scheduler, &mut state, &mut SeededRandom::new(3), 60)?;

        let limit = scheduler.growth_limit(Face::West);
        assert_eq!(limit, 6);
        assert!(
            state
                .active_blocks
                .iter()
                .all(|block| block.coord.x.abs() <= limit && block.coord.y.abs() <= limit)
        );
        assert!(state.grid.active_count(0) > 1);
        Ok(())
    }
}

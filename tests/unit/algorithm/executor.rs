//! Tests for the tick cycle, explicit removal and state lifecycle

#[cfg(test)]
mod tests {
    use quantmask::algorithm::executor::QuantizedEffect;
    use quantmask::algorithm::strategy::CrossStrategy;
    use quantmask::io::configuration::EffectConfig;
    use quantmask::mask::ops::MaskOp;
    use quantmask::math::probability::SeededRandom;
    use quantmask::spatial::grid::{BlockCoord, BlockRect, Face};
    use quantmask::spatial::render::Refresh;
    use quantmask::{EffectError, Result};

    fn effect(size: usize) -> Result<QuantizedEffect> {
        QuantizedEffect::seeded(EffectConfig::new(size, size), 42)
    }

    // Tests invalid configurations are rejected up front
    #[test]
    fn test_new_validates_config() {
        let result = QuantizedEffect::seeded(EffectConfig::new(8, 8).with_pixel_pitch(0), 1);
        assert!(matches!(
            result,
            Err(EffectError::InvalidParameter {
                parameter: "pixel_pitch",
                ..
            })
        ));
    }

    // Tests ticks must strictly increase
    // Verified by accepting a repeated tick
    #[test]
    fn test_ticks_are_monotonic() -> Result<()> {
        let mut effect = effect(12)?;
        assert_eq!(effect.tick()?.tick, 1);
        assert_eq!(effect.advance(4)?.tick, 4);
        assert_eq!(effect.current_tick(), 4);
        assert!(effect.advance(4).is_err());
        assert!(effect.advance(2).is_err());
        assert_eq!(effect.tick()?.tick, 5);
        Ok(())
    }

    // Tests degenerate dimensions turn every tick into a no-op
    // Verified by running growth on a zero-width grid
    #[test]
    fn test_degenerate_config_is_idle() -> Result<()> {
        let mut effect = QuantizedEffect::seeded(EffectConfig::new(0, 10), 9)?;
        for _ in 0..3 {
            let report = effect.tick()?;
            assert_eq!(report.growth.spawned, 0);
            assert_eq!(report.refresh, Refresh::Clean);
        }
        assert!(effect.state().ops.is_empty());
        assert_eq!(effect.surface().dimensions().0, 0);
        Ok(())
    }

    // Tests a tick paints the perimeter of the seeded origin
    #[test]
    fn test_tick_paints_surface() -> Result<()> {
        let mut effect = effect(16)?;
        let report = effect.tick()?;
        assert!(report.composite.perimeter_strokes > 0);
        assert!(effect.surface().coverage().iter().any(|&c| c > 0.0));
        Ok(())
    }

    // Tests explicit removal clears the leaders but keeps the foundation
    // Verified by removing through the guarded retraction
    #[test]
    fn test_remove_block_keeps_foundation() -> Result<()> {
        let mut effect = effect(12)?;
        effect.tick()?;
        assert_eq!(effect.remove_block(BlockCoord::ORIGIN)?, 2);
        assert!(effect.state().grid.is_active(0, BlockCoord::ORIGIN));
        assert!(!effect.state().grid.any_leader(BlockCoord::ORIGIN));
        assert_eq!(effect.remove_block(BlockCoord::new(30, 30))?, 0);
        Ok(())
    }

    // Tests pushed ops join the log and invalid ones are refused
    // Verified by appending decoded ops without validation
    #[test]
    fn test_push_op() -> Result<()> {
        let mut effect = effect(12)?;
        let before = effect.state().ops.len();
        let op = MaskOp::add_line(BlockRect::cell(BlockCoord::ORIGIN), Face::East, 0, 1)?;
        effect.push_op(op)?;
        assert_eq!(effect.state().ops.len(), before + 1);
        assert_eq!(effect.state().ops.iter().next_back(), Some(&op));

        let bad: MaskOp = serde_json::from_str(
            r#"{"kind":"RemoveBlock","region":{"min":{"x":0,"y":0},"max":{"x":0,"y":0}},"layer":3,"start":1}"#,
        )?;
        assert!(matches!(effect.push_op(bad), Err(EffectError::InvalidOp { .. })));
        assert_eq!(effect.state().ops.len(), before + 1);
        Ok(())
    }

    // Tests compaction never changes the painted surface
    // Verified by dropping ops that are still fading
    #[test]
    fn test_compaction_preserves_surface() -> Result<()> {
        let mut effect = effect(16)?;
        for _ in 0..40 {
            effect.tick()?;
        }
        effect.composite();
        let before = effect.surface().clone();
        let ops_before = effect.state().ops.len();

        let removed = effect.compact_ops();
        effect.composite();
        assert_eq!(effect.state().ops.len(), ops_before - removed);
        assert_eq!(effect.surface(), &before);
        Ok(())
    }

    // Tests reset returns to the seeded origin at tick 0
    #[test]
    fn test_reset() -> Result<()> {
        let mut effect = effect(12)?;
        for _ in 0..5 {
            effect.tick()?;
        }
        effect.reset()?;
        assert_eq!(effect.current_tick(), 0);
        assert_eq!(effect.state().ops.len(), 3);
        assert!(effect.state().finished.is_empty());
        Ok(())
    }

    // Tests restore rejects snapshots of a different grid size
    #[test]
    fn test_restore_checks_dimensions() -> Result<()> {
        let small = effect(8)?;
        let mut large = effect(12)?;
        assert!(matches!(
            large.restore(&small.snapshot()),
            Err(EffectError::InvalidParameter {
                parameter: "snapshot",
                ..
            })
        ));
        Ok(())
    }

    // Tests the cross strategy grows in all four directions
    #[test]
    fn test_cross_strategy_grows_everywhere() -> Result<()> {
        let config = EffectConfig::new(16, 16);
        let mut effect = QuantizedEffect::new(config, Box::new(CrossStrategy), SeededRandom::new(5))?;
        for _ in 0..30 {
            effect.tick()?;
        }
        let grid = &effect.state().grid;
        for face in Face::ALL {
            let coord = BlockCoord::ORIGIN.neighbor(face);
            assert!(grid.any_leader(coord) || grid.is_active(0, coord));
        }
        Ok(())
    }

    // Tests rewinding restores the latest cached tick and drops later snapshots
    // Verified by keeping snapshots past the rewind point
    #[test]
    fn test_rewind_to_cached_snapshot() -> Result<()> {
        let mut effect = effect(12)?;
        for _ in 0..12 {
            effect.tick()?;
        }
        assert_eq!(effect.cached_snapshots(), 2);

        assert_eq!(effect.rewind(12)?, 10);
        assert_eq!(effect.current_tick(), 10);
        assert_eq!(effect.rewind(7)?, 5);
        assert_eq!(effect.cached_snapshots(), 1);
        assert!(effect.rewind(3).is_err());

        assert_eq!(effect.tick()?.tick, 6);
        Ok(())
    }
}

//! Tests for the derived render grid and its dirty tracking

#[cfg(test)]
mod tests {
    use quantmask::Result;
    use quantmask::spatial::grid::{BlockCoord, BlockRect, EMPTY, LayeredLogicGrid, OUT_OF_BOUNDS};
    use quantmask::spatial::render::{Refresh, RenderGrid};

    // Tests the first refresh rebuilds everything
    // Verified by starting with a clean dirty flag
    #[test]
    fn test_initial_refresh_is_full() -> Result<()> {
        let mut grid = LayeredLogicGrid::try_new(5, 5)?;
        grid.spawn(BlockCoord::new(1, 0), 0, 4);
        grid.spawn(BlockCoord::new(-1, 0), 2, 4);

        let mut render = RenderGrid::try_new(5, 5)?;
        assert!(render.needs_refresh());
        assert_eq!(render.refresh(&grid), Refresh::Full);
        assert_eq!(render.refresh(&grid), Refresh::Clean);

        assert_eq!(render.display_tick(BlockCoord::new(1, 0)), 4);
        assert!(render.is_present(BlockCoord::new(1, 0)));
        Ok(())
    }

    // Tests presence covers all layers while display follows layer 0 only
    // Verified by deriving display from any active layer
    #[test]
    fn test_presence_versus_display() -> Result<()> {
        let mut grid = LayeredLogicGrid::try_new(5, 5)?;
        let leader_only = BlockCoord::new(-1, 0);
        grid.spawn(leader_only, 2, 1);

        let mut render = RenderGrid::try_new(5, 5)?;
        render.refresh(&grid);

        assert!(render.is_present(leader_only));
        assert!(!render.is_displayed(leader_only));
        assert_eq!(render.display_tick(leader_only), EMPTY);
        assert_eq!(render.display_tick(BlockCoord::new(9, 9)), OUT_OF_BOUNDS);
        assert!(!render.is_present(BlockCoord::new(9, 9)));
        Ok(())
    }

    // Tests dirty rectangles patch only the marked cells
    // Verified by rebuilding unmarked cells on partial refresh
    #[test]
    fn test_partial_refresh_patches_marked_cells() -> Result<()> {
        let mut grid = LayeredLogicGrid::try_new(6, 6)?;
        let mut render = RenderGrid::try_new(6, 6)?;
        render.refresh(&grid);

        let marked = BlockCoord::new(0, 1);
        let unmarked = BlockCoord::new(2, 2);
        grid.spawn(marked, 0, 3);
        grid.spawn(unmarked, 0, 3);
        render.mark_rect(BlockRect::cell(marked));

        assert_eq!(render.refresh(&grid), Refresh::Partial(1));
        assert!(render.is_displayed(marked));
        assert!(!render.is_displayed(unmarked));

        render.mark_dirty();
        assert_eq!(render.refresh(&grid), Refresh::Full);
        assert!(render.is_displayed(unmarked));
        Ok(())
    }

    // Tests clearing a cell propagates after marking it
    #[test]
    fn test_cleared_cell_drops_presence() -> Result<()> {
        let mut grid = LayeredLogicGrid::try_new(4, 4)?;
        let coord = BlockCoord::new(1, 1);
        grid.spawn(coord, 1, 0);
        let mut render = RenderGrid::try_new(4, 4)?;
        render.refresh(&grid);
        assert!(render.is_present(coord));

        grid.clear(coord, 1);
        render.mark_cell(coord);
        render.refresh(&grid);
        assert!(!render.is_present(coord));
        Ok(())
    }
}

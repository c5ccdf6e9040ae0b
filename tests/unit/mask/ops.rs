//! Tests for mask op validation, fade ramps and log compaction

#[cfg(test)]
mod tests {
    use quantmask::mask::ops::{MaskOp, MaskOpKind, MaskOpLog, ramp};
    use quantmask::spatial::grid::{BlockCoord, BlockRect, Face};
    use quantmask::{EffectError, Result};

    fn cell(x: i32, y: i32) -> BlockRect {
        BlockRect::cell(BlockCoord::new(x, y))
    }

    // Tests constructors reject unknown layers and negative ticks
    // Verified by skipping the layer check
    #[test]
    fn test_constructor_validation() {
        assert!(matches!(
            MaskOp::add(cell(0, 0), 3, 0),
            Err(EffectError::InvalidOp { kind: "Add", .. })
        ));
        assert!(matches!(
            MaskOp::remove_line(cell(0, 0), Face::North, 0, -1, false),
            Err(EffectError::InvalidOp {
                kind: "RemoveLine",
                ..
            })
        ));
        assert!(MaskOp::remove_block(BlockCoord::ORIGIN, 2, 0).is_ok());
    }

    // Tests deserialized ops are re-checked against the layer range
    // Verified by trusting ops that bypassed the constructors
    #[test]
    fn test_validate_decoded_ops() -> Result<()> {
        let cell = r#"{"min":{"x":0,"y":0},"max":{"x":0,"y":0}}"#;
        let bad: MaskOp =
            serde_json::from_str(&format!(r#"{{"kind":"Add","region":{cell},"layer":5,"start":0}}"#))?;
        assert!(matches!(bad.validate(), Err(EffectError::InvalidOp { kind: "Add", .. })));

        let good: MaskOp =
            serde_json::from_str(&format!(r#"{{"kind":"Add","region":{cell},"layer":2,"start":4}}"#))?;
        good.validate()?;
        assert_eq!(good, MaskOp::add(BlockRect::cell(BlockCoord::ORIGIN), 2, 4)?);
        Ok(())
    }

    // Tests accessors expose only the fields a kind carries
    #[test]
    fn test_accessors() -> Result<()> {
        let remove = MaskOp::remove(cell(1, 1), Face::West, 1, 4, true)?;
        assert_eq!(remove.kind(), MaskOpKind::Remove);
        assert_eq!(remove.face(), Some(Face::West));
        assert!(remove.force());
        assert_eq!(remove.start(), 4);

        let smart = MaskOp::add_smart(BlockCoord::new(2, 0), 2, 9)?;
        assert_eq!(smart.face(), None);
        assert!(!smart.force());
        assert_eq!(smart.region(), cell(2, 0));
        assert_eq!(smart.layer(), 2);
        Ok(())
    }

    // Tests a zero fade length gives full opacity on the first elapsed tick
    // Verified by dividing by a clamped fade length of one
    #[test]
    fn test_opacity_ramps() -> Result<()> {
        let add = MaskOp::add(cell(0, 0), 0, 10)?;
        assert!((add.opacity(10, 0, 8) - 1.0).abs() < f32::EPSILON);
        assert!(add.opacity(10, 4, 8).abs() < f32::EPSILON);
        assert!((add.opacity(12, 4, 8) - 0.5).abs() < f32::EPSILON);
        assert!((add.opacity(40, 4, 8) - 1.0).abs() < f32::EPSILON);

        let erase = MaskOp::remove_block(BlockCoord::ORIGIN, 1, 10)?;
        assert!((erase.opacity(12, 4, 8) - 0.25).abs() < f32::EPSILON);
        assert!(erase.is_settled(18, 4, 8));
        assert!(!erase.is_settled(17, 4, 8));

        assert!((ramp(-3, 5)).abs() < f32::EPSILON);
        Ok(())
    }

    // Tests coverage only counts strictly later additive ops over the cell
    // Verified by accepting adds with an equal start tick
    #[test]
    fn test_coverage_index() -> Result<()> {
        let mut log = MaskOpLog::new();
        log.push(MaskOp::add_smart(BlockCoord::new(1, 0), 1, 5)?);
        log.push(MaskOp::add_line(cell(2, 0), Face::North, 1, 6)?);
        log.push(MaskOp::add(cell(1, 0), 0, 2)?);

        let index = log.coverage(10);
        assert!(index.is_covered_after(BlockCoord::new(1, 0), Some(Face::East), 4));
        assert!(!index.is_covered_after(BlockCoord::new(1, 0), None, 5));
        assert!(index.is_covered_after(BlockCoord::new(2, 0), Some(Face::North), 3));
        assert!(!index.is_covered_after(BlockCoord::new(2, 0), Some(Face::South), 3));
        assert!(!index.is_covered_after(BlockCoord::new(2, 0), None, 3));

        // Ops that have not started yet cover nothing
        let early = log.coverage(4);
        assert!(!early.is_covered_after(BlockCoord::new(1, 0), None, 4));
        assert!(early.is_covered_after(BlockCoord::new(1, 0), None, 1));
        Ok(())
    }

    // Tests compaction drops only settled ops with a settled later duplicate
    // Verified by dropping duplicates that are still fading
    #[test]
    fn test_compact_keeps_fading_ops() -> Result<()> {
        let mut log = MaskOpLog::new();
        log.push(MaskOp::add(cell(0, 0), 0, 1)?);
        log.push(MaskOp::add(cell(0, 0), 0, 3)?);
        log.push(MaskOp::add(cell(0, 0), 0, 9)?);
        log.push(MaskOp::add(cell(1, 0), 0, 1)?);

        // At tick 10 with a 4-tick fade only the first two duplicates have settled
        let removed = log.compact(10, 4, 4);
        assert_eq!(removed, 1);
        assert_eq!(log.len(), 3);
        assert_eq!(log.iter().map(MaskOp::start).collect::<Vec<_>>(), vec![3, 9, 1]);

        assert_eq!(log.compact(10, 4, 4), 0);
        assert_eq!(log.compact(20, 4, 4), 1);
        Ok(())
    }

    // Tests the log serializes as a tagged op list
    #[test]
    fn test_log_serializes_tagged_ops() -> Result<()> {
        let mut log = MaskOpLog::new();
        log.push(MaskOp::remove_block(BlockCoord::new(-2, 1), 1, 3)?);
        let json = serde_json::to_string(&log)?;
        assert!(json.starts_with('['));
        assert!(json.contains("\"kind\":\"RemoveBlock\""));
        let back: MaskOpLog = serde_json::from_str(&json)?;
        assert_eq!(back, log);
        Ok(())
    }
}

//! Tests for effect constants and configuration validation

#[cfg(test)]
mod tests {
    use quantmask::EffectError;
    use quantmask::io::configuration::{
        CLEAN_INNER_DISTANCE, DEFAULT_FADE_FRAMES, DEFAULT_FADE_IN_FRAMES, DISTANCE_SENTINEL,
        EffectConfig, FINISH_MARGIN, GROWTH_CHANCE, GROWTH_MARGIN, LAYER_COUNT,
        REVERSION_CHANCE, SCAN_MARGIN,
    };

    // Tests growth constants hold their tuned values
    // Verified by changing constant values
    #[test]
    fn test_growth_constants() {
        assert!((GROWTH_CHANCE - 0.66).abs() < f64::EPSILON);
        assert!((REVERSION_CHANCE - 0.15).abs() < f64::EPSILON);
        assert_eq!(LAYER_COUNT, 3);
        assert_eq!(CLEAN_INNER_DISTANCE, 4);
        assert!(DISTANCE_SENTINEL > CLEAN_INNER_DISTANCE);
    }

    // Tests the growth margin leaves room past the finish boundary
    #[test]
    fn test_margins_are_ordered() {
        assert_eq!(FINISH_MARGIN, 1);
        assert_eq!(GROWTH_MARGIN, 3);
        assert_eq!(SCAN_MARGIN, 2);
        assert!(GROWTH_MARGIN > FINISH_MARGIN);
    }

    // Tests the viewport defaults to the grid and rounds the radius up
    // Verified by using floor division for the radius
    #[test]
    fn test_visible_radius() {
        let config = EffectConfig::new(10, 10);
        assert_eq!(config.visible_radius(), (5, 5));
        assert_eq!(config.with_viewport(7, 4).visible_radius(), (4, 2));
    }

    // Tests builders set fields without touching the others
    #[test]
    fn test_builders() {
        let config = EffectConfig::new(12, 8)
            .with_fades(2, 3)
            .with_fades_disabled(true)
            .with_pixel_pitch(6);
        assert_eq!((config.fade_in_frames, config.fade_frames), (2, 3));
        assert!(config.debug_disable_fades);
        assert_eq!(config.pixel_pitch, 6);
        assert_eq!((config.viewport_width, config.viewport_height), (12, 8));

        let defaults = EffectConfig::default();
        assert_eq!(defaults.fade_in_frames, DEFAULT_FADE_IN_FRAMES);
        assert_eq!(defaults.fade_frames, DEFAULT_FADE_FRAMES);
    }

    // Tests zero dimensions are degenerate but still valid
    #[test]
    fn test_degenerate_dimensions() {
        let config = EffectConfig::new(0, 5);
        assert!(config.is_degenerate());
        assert!(config.validate().is_ok());
        assert!(EffectConfig::new(5, 5).with_viewport(5, 0).is_degenerate());
        assert!(!EffectConfig::new(1, 1).is_degenerate());
    }

    // Tests validation rejects a wrong layer count and out-of-range chances
    // Verified by skipping the probability range check
    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EffectConfig::new(8, 8);
        config.layer_count = 2;
        assert!(matches!(
            config.validate(),
            Err(EffectError::InvalidParameter {
                parameter: "layer_count",
                ..
            })
        ));

        let mut config = EffectConfig::new(8, 8);
        config.reversion_chance = 1.5;
        assert!(matches!(
            config.validate(),
            Err(EffectError::InvalidParameter {
                parameter: "reversion_chance",
                ..
            })
        ));

        assert!(EffectConfig::new(8, 8).with_pixel_pitch(0).validate().is_err());
    }
}

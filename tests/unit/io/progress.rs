//! Tests for the tick progress bar

#[cfg(test)]
mod tests {
    use quantmask::io::progress::TickProgress;

    // Tests updates move the bar to the reported tick
    // Verified by incrementing instead of setting the position
    #[test]
    fn test_update_sets_position() {
        let progress = TickProgress::hidden(10);
        progress.update(3, 12);
        assert_eq!(progress.position(), 3);
        progress.update(7, 40);
        assert_eq!(progress.position(), 7);
        progress.finish();
    }

    // Tests a labelled bar accepts updates past its length
    #[test]
    fn test_visible_bar_lifecycle() {
        let progress = TickProgress::new(2, "dual-spine");
        progress.update(1, 3);
        progress.update(5, 9);
        assert_eq!(progress.position(), 5);
        progress.finish();
    }
}

//! Terminal progress display for headless runs

use std::sync::LazyLock;

use indicatif::{ProgressBar, ProgressStyle};

static TICK_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {prefix} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Progress bar counting effect ticks
#[derive(Debug)]
pub struct TickProgress {
    bar: ProgressBar,
}

impl TickProgress {
    /// Visible bar for `total` ticks labelled with the strategy name
    pub fn new(total: u32, label: &str) -> Self {
        let bar = ProgressBar::new(u64::from(total));
        bar.set_style(TICK_STYLE.clone());
        bar.set_prefix(label.to_string());
        Self { bar }
    }

    /// Bar that draws nothing, for quiet runs and tests
    pub fn hidden(total: u32) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(u64::from(total));
        Self { bar }
    }

    /// Report a completed tick and the op log size
    pub fn update(&self, tick: u32, ops: usize) {
        self.bar.set_position(u64::from(tick));
        self.bar.set_message(format!("{ops} ops"));
    }

    /// Current position
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Finish and clear the bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

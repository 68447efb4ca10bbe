//! Terminal progress display for streaming aggregation

use indicatif::{ProgressBar, ProgressStyle};

use crate::aggregate::StreamUpdate;

/// Resolution of the progress bar
const PROGRESS_STEPS: u64 = 1000;

/// Longest feed name shown next to the bar
const MAX_NAME_LEN: usize = 48;

/// Progress bar fed with [`StreamUpdate`]s
pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(PROGRESS_STEPS))
    }

    /// Display that draws nowhere, for tests and non-interactive output
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_length(PROGRESS_STEPS);
        if let Ok(style) =
            ProgressStyle::default_bar().template("[{bar:40.cyan/blue}] {percent:>3}% {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }

    /// Reflect one streaming update
    pub fn update(&self, update: &StreamUpdate) {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_precision_loss,
            clippy::cast_sign_loss
        )]
        let position = (update.progress.clamp(0.0, 1.0) * PROGRESS_STEPS as f64).round() as u64;
        self.bar.set_position(position);

        let name = update.current_feed_display_name.as_deref().unwrap_or_default();
        let name = if name.chars().count() > MAX_NAME_LEN {
            let tail: String = name.chars().take(MAX_NAME_LEN - 3).collect();
            format!("{}...", tail)
        } else {
            name.to_string()
        };
        self.bar
            .set_message(format!("{} apps {}", update.result.apps.len(), name));
    }

    /// Current position in `0..=1000`
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn message(&self) -> String {
        self.bar.message().to_string()
    }

    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Abandon on error
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new()
    }
}

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK: Duration = Duration::from_millis(80);

/// Spinner on stderr, hidden automatically when stderr is not a terminal.
pub fn create_spinner(message: String) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .map(|s| s.tick_strings(&["⠋", "⠙", "⠸", "⠴", "⠦", "⠇", "✓"]))
        .unwrap_or_else(|_| ProgressStyle::default_spinner());

    let spinner = ProgressBar::new_spinner().with_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(TICK);
    spinner
}

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/"])
        .template("{msg} {spinner}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Show a spinner while `work` runs against the backend.
pub async fn with_spinner<F: Future>(message: impl Into<String>, work: F) -> F::Output {
    let spinner = create_spinner(message);
    let output = work.await;
    spinner.finish_and_clear();
    output
}

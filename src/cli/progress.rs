//! Spinners shown on stderr while the client waits for the server.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars(TICK_CHARS)
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(style("{spinner:.cyan} {msg}"));
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn finish_success(pb: &ProgressBar, msg: &str) {
    pb.set_style(style("  {msg}"));
    pb.finish_with_message(format!("✓ {}", msg));
}

pub fn finish_error(pb: &ProgressBar, msg: &str) {
    pb.set_style(style("  {msg}"));
    pb.finish_with_message(format!("✗ {}", msg));
}

/// Icon for a document or subscription status.
pub fn status_icon(status: &str) -> &'static str {
    match status {
        "completed" | "active" => "✓",
        "draft" => "✎",
        "canceled" | "expired" | "past_due" => "✗",
        _ => "?",
    }
}

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::StatusSink;

/// Format one status line: `[<timestamp>] <marker> <message>`.
pub fn format_status_line(at: DateTime<Utc>, message: &str, succeeded: bool) -> String {
    let marker = if succeeded { '✓' } else { '✗' };
    format!(
        "[{}] {marker} {message}",
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Status sink that writes timestamped outcome lines through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusLogger;

impl StatusSink for StatusLogger {
    fn record(&self, message: &str, succeeded: bool) {
        let line = format_status_line(Utc::now(), message, succeeded);
        if succeeded {
            tracing::info!(succeeded, "{line}");
        } else {
            tracing::warn!(succeeded, "{line}");
        }
    }
}

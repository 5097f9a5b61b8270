//! Time formatting helpers.

/// Format a remaining duration in milliseconds as a countdown label.
///
/// Partial seconds round up so a countdown never shows `0s` while time remains.
pub fn format_countdown(millis: u64) -> String {
    let secs = millis.div_ceil(1000);
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

//! Timestamp formatting for player surfaces

/// Format a position as `MM:SS`, or `HH:MM:SS` past the hour
///
/// Fractions are truncated; negative and non-finite input renders as `00:00`.
///
/// ```
/// use podcue_core::time::format_timestamp;
///
/// assert_eq!(format_timestamp(65.0), "01:05");
/// assert_eq!(format_timestamp(3661.0), "01:01:01");
/// ```
pub fn format_timestamp(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Human readable length, e.g. `1 hr 5 min` or `1 min 3 sec`
///
/// Seconds are only shown for durations under an hour.
pub fn format_duration_label(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours} hr"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes} min"));
    }
    if hours == 0 && secs > 0 {
        parts.push(format!("{secs} sec"));
    }

    if parts.is_empty() {
        "0 sec".to_string()
    } else {
        parts.join(" ")
    }
}

fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}

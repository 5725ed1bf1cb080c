//! Timestamp display and the elapsed-time cursor.

use chrono::{DateTime, Local};

/// Shown when a record's timestamp is missing or unparsable.
pub const PLACEHOLDER_TIME: &str = "00:00:00";

/// Timestamp of the most recently rendered record.
///
/// Owned by the caller and threaded through every render call, so only
/// records that are actually rendered move it forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingCursor {
    previous: Option<DateTime<Local>>,
}

impl TimingCursor {
    /// A cursor that has not seen any record yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Format `raw` as `HH:MM:SS`, optionally followed by the time since the
    /// previous record, and advance the cursor.
    ///
    /// Unparsable timestamps render as [`PLACEHOLDER_TIME`] and leave the
    /// cursor untouched.
    pub fn stamp(&mut self, raw: Option<&str>, show_elapsed: bool) -> String {
        let Some(local) = raw.and_then(parse_timestamp) else {
            return PLACEHOLDER_TIME.to_string();
        };

        let clock = local.format("%H:%M:%S").to_string();
        let stamped = match self.previous {
            Some(previous) if show_elapsed => {
                format!("{} {}", clock, format_elapsed(local - previous))
            }
            _ => clock,
        };

        self.previous = Some(local);
        stamped
    }
}

/// Parse an RFC 3339 timestamp (fractional seconds allowed) into local time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Local))
}

/// `+{ms}ms` below one second, `+{s.s}s` below one minute, else `+{m}m{s}s`.
pub fn format_elapsed(elapsed: chrono::Duration) -> String {
    let millis = elapsed.num_milliseconds();
    if millis < 1_000 {
        format!("+{}ms", millis)
    } else if millis < 60_000 {
        format!("+{:.1}s", millis as f64 / 1_000.0)
    } else {
        let secs = elapsed.num_seconds();
        format!("+{}m{}s", secs / 60, secs % 60)
    }
}

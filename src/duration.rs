//! Elapsed-time labels for the active task

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, Utc};

/// Rendered in place of a duration when the start instant can't be parsed.
pub const INVALID_DURATION: &str = "--:-- h";

/// The service sends offsets as `+0000`; RFC 3339 wants `+00:00`.
fn normalize_offset(raw: &str) -> Cow<'_, str> {
    let raw = raw.trim();
    let bytes = raw.as_bytes();
    if bytes.len() < 5 {
        return Cow::Borrowed(raw);
    }
    let tail = &bytes[bytes.len() - 5..];
    let is_compact_offset = matches!(tail[0], b'+' | b'-')
        && tail[1..].iter().all(u8::is_ascii_digit)
        && raw.contains('T');
    if !is_compact_offset {
        return Cow::Borrowed(raw);
    }
    let (head, offset) = raw.split_at(raw.len() - 5);
    Cow::Owned(format!("{}{}:{}", head, &offset[..3], &offset[3..]))
}

pub fn parse_start(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(&normalize_offset(raw)).ok()
}

/// Format the time elapsed between `start` and `now` as "H:M h".
///
/// Minutes are minutes past the hour and are not zero-padded ("1:5 h").
/// Unparseable input yields [`INVALID_DURATION`]; a start in the future
/// counts as zero elapsed.
pub fn format_elapsed(start: &str, now: DateTime<Utc>) -> String {
    let Some(start) = parse_start(start) else {
        log::debug!("unparseable start instant {start:?}");
        return INVALID_DURATION.to_string();
    };
    let seconds = (now - start.with_timezone(&Utc)).num_seconds().max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{}:{} h", hours, minutes)
}

/// [`format_elapsed`] against the current clock
pub fn format(start: &str) -> String {
    format_elapsed(start, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(raw: &str) -> DateTime<Utc> {
        parse_start(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn two_and_a_half_hours() {
        let now = at("2024-01-01T12:30:00+0000");
        assert_eq!(format_elapsed("2024-01-01T10:00:00+0000", now), "2:30 h");
    }

    #[test]
    fn minutes_are_not_padded() {
        let now = at("2024-01-01T11:05:59+0000");
        assert_eq!(format_elapsed("2024-01-01T10:00:00+0000", now), "1:5 h");
    }

    #[test]
    fn hours_keep_counting_past_a_day() {
        let now = at("2024-01-02T12:00:00+0000");
        assert_eq!(format_elapsed("2024-01-01T10:15:00+0000", now), "25:45 h");
    }

    #[test]
    fn offsets_are_honoured() {
        // 10:00 in Berlin is 09:00 UTC
        let now = at("2024-01-01T10:00:00+0000");
        assert_eq!(format_elapsed("2024-01-01T10:00:00+0100", now), "1:0 h");
    }

    #[test]
    fn already_valid_rfc3339_is_accepted() {
        let now = at("2024-01-01T12:30:00Z");
        assert_eq!(format_elapsed("2024-01-01T10:00:00+00:00", now), "2:30 h");
        assert_eq!(format_elapsed("2024-01-01T10:00:00Z", now), "2:30 h");
    }

    #[test]
    fn malformed_input_renders_sentinel() {
        let now = Utc::now();
        assert_eq!(format_elapsed("", now), INVALID_DURATION);
        assert_eq!(format_elapsed("yesterday", now), INVALID_DURATION);
        assert_eq!(format_elapsed("2024-13-01T10:00:00+0000", now), INVALID_DURATION);
        assert_eq!(format_elapsed("2024-01-01 10:00", now), INVALID_DURATION);
    }

    #[test]
    fn future_start_counts_as_zero() {
        let now = at("2024-01-01T10:00:00+0000");
        assert_eq!(format_elapsed("2024-01-01T10:30:00+0000", now), "0:0 h");
    }

    #[test]
    fn normalize_only_touches_compact_offsets() {
        assert_eq!(
            normalize_offset("2024-01-01T10:00:00+0000"),
            "2024-01-01T10:00:00+00:00"
        );
        assert_eq!(
            normalize_offset("2024-01-01T10:00:00-0530"),
            "2024-01-01T10:00:00-05:30"
        );
        assert_eq!(
            normalize_offset("2024-01-01T10:00:00+00:00"),
            "2024-01-01T10:00:00+00:00"
        );
        assert_eq!(normalize_offset("+0000"), "+0000");
    }
}

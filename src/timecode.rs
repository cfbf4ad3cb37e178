//! Timestamp parsing and formatting.
//!
//! Converts between the textual timestamp forms used by the script file,
//! the export formats, and the study display, and a numeric seconds value.
//! Pure functions, no state.

/// Parse a timestamp of the form `HH:MM:SS.mmm`, `MM:SS.mmm`, or `MM:SS`
/// into seconds. Returns `None` for anything else.
pub fn parse_timestamp(text: &str) -> Option<f64> {
    let parts: Vec<&str> = text.trim().split(':').collect();

    let fields: Vec<f64> = parts
        .iter()
        .map(|p| p.parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;

    match fields.as_slice() {
        [hours, minutes, seconds] => Some(hours * 3600.0 + minutes * 60.0 + seconds),
        [minutes, seconds] => Some(minutes * 60.0 + seconds),
        _ => None,
    }
}

/// Format seconds in the script-file form `HH:MM:SS.mmm`.
///
/// Hours are always present so the form round-trips through
/// [`parse_timestamp`] without ambiguity.
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let hours = (seconds / 3600.0) as u32;
    let minutes = ((seconds % 3600.0) / 60.0) as u32;
    let secs = seconds % 60.0;

    format!("{:02}:{:02}:{:06.3}", hours, minutes, secs)
}

/// Format seconds for compact display (`M:SS`), as used in the sync list.
pub fn format_clock(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u32;
    let minutes = total_seconds / 60;
    let secs = total_seconds % 60;

    format!("{}:{:02}", minutes, secs)
}

/// Format a timestamp for SRT export (`HH:MM:SS,mmm`).
pub fn format_srt_timestamp(seconds: f64) -> String {
    let (hours, minutes, secs, millis) = split_millis(seconds);
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Format a timestamp for WebVTT export (`HH:MM:SS.mmm`).
pub fn format_vtt_timestamp(seconds: f64) -> String {
    let (hours, minutes, secs, millis) = split_millis(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

fn split_millis(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    (hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_form() {
        assert_eq!(parse_timestamp("00:00:00.000"), Some(0.0));
        assert_eq!(parse_timestamp("00:01:05.500"), Some(65.5));
        assert_eq!(parse_timestamp("01:01:05.250"), Some(3665.25));
    }

    #[test]
    fn test_parse_short_forms() {
        assert_eq!(parse_timestamp("1:05"), Some(65.0));
        assert_eq!(parse_timestamp("2:03.5"), Some(123.5));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("42"), None);
        assert_eq!(parse_timestamp("a:b:c"), None);
        assert_eq!(parse_timestamp("1:2:3:4"), None);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00:00.000");
        assert_eq!(format_timestamp(65.5), "00:01:05.500");
        assert_eq!(format_timestamp(3665.25), "01:01:05.250");
    }

    #[test]
    fn test_round_trip() {
        for &secs in &[0.0, 1.25, 59.999, 61.5, 3599.0, 3661.123] {
            let formatted = format_timestamp(secs);
            let parsed = parse_timestamp(&formatted).unwrap();
            assert!((parsed - secs).abs() < 0.001, "round trip failed for {}", secs);
        }
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(65.0), "1:05");
        assert_eq!(format_clock(605.9), "10:05");
    }

    #[test]
    fn test_export_timestamps() {
        assert_eq!(format_srt_timestamp(61.5), "00:01:01,500");
        assert_eq!(format_vtt_timestamp(3661.123), "01:01:01.123");
    }
}

//! Caption acquisition.
//!
//! Fetches caption tracks for a video and normalizes them into clean,
//! non-overlapping cues ready to be written as a script file.

pub mod youtube;

pub use youtube::{extract_video_id, fetch_video, VideoMetadata};

use regex::Regex;

/// A single raw caption cue.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionCue {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Cue text, entity-decoded and newline-flattened.
    pub text: String,
}

/// Decode the HTML entities YouTube caption tracks carry.
///
/// `&amp;` is decoded first so double-encoded entities like `&amp;#39;`
/// resolve fully.
pub fn decode_html_entities(text: &str) -> String {
    let mut decoded = text.replace("&amp;", "&");

    for (entity, replacement) in [
        ("&#39;", "'"),
        ("&#x27;", "'"),
        ("&quot;", "\""),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&nbsp;", " "),
    ] {
        decoded = decoded.replace(entity, replacement);
    }

    let numeric = Regex::new(r"&#(\d+);").expect("valid regex");
    numeric
        .replace_all(&decoded, |caps: &regex::Captures| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Eliminate overlapping cue intervals.
///
/// Each cue's end is clamped to the next cue's start: the previous line
/// always yields to the next.
pub fn clamp_overlaps(cues: &mut [CaptionCue]) {
    for i in 0..cues.len().saturating_sub(1) {
        let next_start = cues[i + 1].start;
        if cues[i].end > next_start {
            cues[i].end = next_start;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_named_entities() {
        assert_eq!(decode_html_entities("it&#39;s &quot;fine&quot;"), "it's \"fine\"");
        assert_eq!(decode_html_entities("a &lt;b&gt; c&nbsp;d"), "a <b> c d");
    }

    #[test]
    fn test_decode_double_encoded() {
        assert_eq!(decode_html_entities("don&amp;#39;t"), "don't");
        assert_eq!(decode_html_entities("salt &amp; pepper"), "salt & pepper");
    }

    #[test]
    fn test_decode_numeric_entities() {
        assert_eq!(decode_html_entities("caf&#233;"), "café");
        // Unparseable codepoints are left as-is.
        assert_eq!(decode_html_entities("&#4294967295;"), "&#4294967295;");
    }

    #[test]
    fn test_clamp_overlaps() {
        let mut cues = vec![
            CaptionCue { start: 0.0, end: 3.5, text: "one".to_string() },
            CaptionCue { start: 2.0, end: 5.0, text: "two".to_string() },
            CaptionCue { start: 5.0, end: 7.0, text: "three".to_string() },
        ];

        clamp_overlaps(&mut cues);

        assert_eq!(cues[0].end, 2.0);
        assert_eq!(cues[1].end, 5.0);
        assert_eq!(cues[2].end, 7.0);
    }

    #[test]
    fn test_clamp_overlaps_empty_and_single() {
        let mut empty: Vec<CaptionCue> = vec![];
        clamp_overlaps(&mut empty);

        let mut single = vec![CaptionCue { start: 0.0, end: 2.0, text: "only".to_string() }];
        clamp_overlaps(&mut single);
        assert_eq!(single[0].end, 2.0);
    }
}

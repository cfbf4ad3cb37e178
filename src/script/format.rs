//! Parsers and writers for the per-video flat-file formats, plus export
//! formats (JSON, SRT, VTT).
//!
//! The textual formats are round-trip compatible with the external
//! translation/analysis tooling:
//!
//! - Script file: `[HH:MM:SS.mmm --> HH:MM:SS.mmm] <text>`, one line per
//!   subtitle, file order = line number order.
//! - Translation file: `[<lineNumber>] <translation>`; anything else is
//!   explanatory prose and is skipped.
//! - Analysis file: a JSON array of per-line entries, possibly surrounded
//!   by prose.

use super::models::{AnalysisEntry, LineCollection, ScriptLine, TranslationLine};
use crate::error::Result;
use crate::timecode;
use regex::Regex;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Json,
    Srt,
    Vtt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            _ => Err(format!("Unknown format: {}. Use json, srt, or vtt.", s)),
        }
    }
}

/// Parse a script file into ordered lines.
///
/// Line numbers are assigned from file order, 1-based. A line that doesn't
/// match the timestamp form degrades to a zero-interval line carrying the
/// raw text instead of failing the whole parse.
pub fn parse_script(content: &str) -> Vec<ScriptLine> {
    let pattern = Regex::new(r"^\[([\d:.]+)\s*-->\s*([\d:.]+)\]\s*(.*)$").expect("valid regex");

    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .enumerate()
        .map(|(index, raw)| {
            let line = index as u32 + 1;

            let parsed = pattern.captures(raw).and_then(|caps| {
                let start = timecode::parse_timestamp(&caps[1])?;
                let end = timecode::parse_timestamp(&caps[2])?;
                Some(ScriptLine {
                    line,
                    start_time: start,
                    end_time: end,
                    text: caps[3].to_string(),
                })
            });

            parsed.unwrap_or_else(|| ScriptLine {
                line,
                start_time: 0.0,
                end_time: 0.0,
                text: raw.to_string(),
            })
        })
        .collect()
}

/// Render script lines back into the script-file form.
pub fn write_script(lines: &[ScriptLine]) -> String {
    lines
        .iter()
        .map(|l| {
            format!(
                "[{} --> {}] {}",
                timecode::format_timestamp(l.start_time),
                timecode::format_timestamp(l.end_time),
                l.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a translation file.
///
/// Only `[<n>] <text>` lines are kept; the external translation step often
/// surrounds them with explanatory prose, which is skipped silently.
pub fn parse_translations(content: &str) -> Vec<TranslationLine> {
    let pattern = Regex::new(r"^\[(\d+)\]\s*(.*)$").expect("valid regex");

    content
        .lines()
        .filter_map(|raw| {
            let caps = pattern.captures(raw)?;
            let line = caps[1].parse::<u32>().ok()?;
            Some(TranslationLine {
                line,
                translation: caps[2].to_string(),
            })
        })
        .collect()
}

/// Parse an analysis file.
///
/// The JSON array is located between the first `[` and the last `]` so that
/// prose before or after it is tolerated. No bracket pair means no analysis
/// (empty result); malformed JSON between the brackets is an error.
pub fn parse_analysis(content: &str) -> Result<Vec<AnalysisEntry>> {
    let start = content.find('[');
    let end = content.rfind(']');

    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            let entries = serde_json::from_str(&content[start..=end])?;
            Ok(entries)
        }
        _ => Ok(Vec::new()),
    }
}

/// Format a merged collection for export.
pub fn format_collection(collection: &LineCollection, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(collection.lines())?),
        OutputFormat::Srt => Ok(format_srt(collection)),
        OutputFormat::Vtt => Ok(format_vtt(collection)),
    }
}

fn format_srt(collection: &LineCollection) -> String {
    let mut output = String::new();

    for line in collection.lines() {
        output.push_str(&format!("{}\n", line.line));
        output.push_str(&format!(
            "{} --> {}\n",
            timecode::format_srt_timestamp(line.start_time),
            timecode::format_srt_timestamp(line.end_time)
        ));
        output.push_str(&line.text);
        if !line.translation.is_empty() {
            output.push('\n');
            output.push_str(&line.translation);
        }
        output.push_str("\n\n");
    }

    output
}

fn format_vtt(collection: &LineCollection) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for line in collection.lines() {
        output.push_str(&format!("{}\n", line.line));
        output.push_str(&format!(
            "{} --> {}\n",
            timecode::format_vtt_timestamp(line.start_time),
            timecode::format_vtt_timestamp(line.end_time)
        ));
        output.push_str(&line.text);
        if !line.translation.is_empty() {
            output.push('\n');
            output.push_str(&line.translation);
        }
        output.push_str("\n\n");
    }

    output
}

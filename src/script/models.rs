//! Data models for subtitle lines and the merged study collection.
//!
//! Wire names (camelCase, `expression`, `highlightColor`) are kept
//! bit-compatible with the files produced and consumed by the external
//! translation/analysis tooling.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One line of a script file: a single spoken sentence with its interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptLine {
    /// 1-based line number, assigned from file order.
    pub line: u32,
    /// Start time in seconds.
    pub start_time: f64,
    /// End time in seconds.
    pub end_time: f64,
    /// Source-language sentence text.
    pub text: String,
}

/// One line of a translation file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationLine {
    pub line: u32,
    pub translation: String,
}

/// Highlight color for an annotated expression.
///
/// Green marks key expressions, yellow marks idioms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    Green,
    Yellow,
}

/// An annotated expression from the analysis file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expression {
    /// The phrase as it appears in the sentence.
    #[serde(rename = "expression")]
    pub phrase: String,
    /// Target-language meaning.
    pub meaning: String,
    /// Usage explanation.
    #[serde(default)]
    pub explanation: String,
    /// Example sentence.
    #[serde(default)]
    pub example: String,
    #[serde(rename = "highlightColor")]
    pub highlight: Highlight,
}

/// Per-line entry of the analysis file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisEntry {
    pub line: u32,
    #[serde(default)]
    pub key_expressions: Vec<Expression>,
    #[serde(default)]
    pub idioms: Vec<Expression>,
}

/// The merged study record for one subtitle line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleLine {
    pub line: u32,
    /// Start time in seconds.
    pub start_time: f64,
    /// End time in seconds.
    pub end_time: f64,
    pub text: String,
    /// Target-language text; empty until the translation step has run.
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub key_expressions: Vec<Expression>,
    #[serde(default)]
    pub idioms: Vec<Expression>,
}

impl SubtitleLine {
    /// All annotated expressions of this line, key expressions first.
    pub fn expressions(&self) -> Vec<&Expression> {
        self.key_expressions.iter().chain(self.idioms.iter()).collect()
    }
}

/// The full ordered line sequence for one video.
///
/// Loaded once per study session and read-only thereafter. Line numbers are
/// contiguous from 1 by construction of the loader, but lookups tolerate
/// gaps defensively.
#[derive(Debug, Clone, Default)]
pub struct LineCollection {
    lines: Vec<SubtitleLine>,
}

impl LineCollection {
    pub fn new(lines: Vec<SubtitleLine>) -> Self {
        Self { lines }
    }

    /// Merge the three independently-sourced record sets into one collection.
    ///
    /// A left-outer join keyed by line number: the script side is
    /// authoritative for order and count, translation and analysis are
    /// optional overlays with empty defaults.
    pub fn merge(
        script: Vec<ScriptLine>,
        translations: Vec<TranslationLine>,
        analysis: Vec<AnalysisEntry>,
    ) -> Self {
        let translations: HashMap<u32, String> = translations
            .into_iter()
            .map(|t| (t.line, t.translation))
            .collect();

        let mut analysis: HashMap<u32, AnalysisEntry> =
            analysis.into_iter().map(|a| (a.line, a)).collect();

        let lines = script
            .into_iter()
            .map(|s| {
                let entry = analysis.remove(&s.line);
                let (key_expressions, idioms) = entry
                    .map(|a| (a.key_expressions, a.idioms))
                    .unwrap_or_default();

                SubtitleLine {
                    line: s.line,
                    start_time: s.start_time,
                    end_time: s.end_time,
                    text: s.text,
                    translation: translations.get(&s.line).cloned().unwrap_or_default(),
                    key_expressions,
                    idioms,
                }
            })
            .collect();

        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[SubtitleLine] {
        &self.lines
    }

    /// Look up a line by number.
    ///
    /// Contiguous numbering makes the direct index the common case; a linear
    /// scan covers collections with gaps.
    pub fn get(&self, line: u32) -> Option<&SubtitleLine> {
        if line == 0 {
            return None;
        }

        if let Some(found) = self.lines.get(line as usize - 1) {
            if found.line == line {
                return Some(found);
            }
        }

        self.lines.iter().find(|l| l.line == line)
    }

    /// The first line (in ascending order) whose `[start_time, end_time)`
    /// interval contains the given instant.
    ///
    /// Intervals are non-overlapping by construction, so at most one line
    /// matches.
    pub fn line_at(&self, seconds: f64) -> Option<&SubtitleLine> {
        self.lines
            .iter()
            .find(|l| seconds >= l.start_time && seconds < l.end_time)
    }
}

//! Expression highlighting for rendered subtitle lines.
//!
//! Splits a sentence into plain and highlighted spans by scanning for
//! annotated phrases. The scan is greedy, ASCII-case-insensitive, and
//! non-overlapping: candidates are tried longest first, and the first
//! candidate found anywhere in the remaining text wins at its leftmost
//! occurrence ("longest first, leftmost available").

use crate::script::{Expression, Highlight};

/// One rendered span of a subtitle line.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSpan {
    pub text: String,
    /// `None` for plain text between highlighted phrases.
    pub highlight: Option<Highlight>,
}

impl HighlightSpan {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            highlight: None,
        }
    }

    fn marked(text: &str, highlight: Highlight) -> Self {
        Self {
            text: text.to_string(),
            highlight: Some(highlight),
        }
    }
}

/// Split `text` into spans, highlighting the given expressions.
pub fn highlight_spans(text: &str, expressions: &[&Expression]) -> Vec<HighlightSpan> {
    if expressions.is_empty() {
        if text.is_empty() {
            return Vec::new();
        }
        return vec![HighlightSpan::plain(text)];
    }

    // Longer phrases first so a contained shorter phrase can't shadow them.
    // The sort is stable: equal lengths keep their input order.
    let mut candidates: Vec<&Expression> = expressions.to_vec();
    candidates.sort_by(|a, b| b.phrase.len().cmp(&a.phrase.len()));

    let mut spans = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let matched = candidates.iter().find_map(|expr| {
            find_ascii_ignore_case(remaining, &expr.phrase).map(|index| (index, *expr))
        });

        match matched {
            Some((index, expr)) => {
                if index > 0 {
                    spans.push(HighlightSpan::plain(&remaining[..index]));
                }
                let end = index + expr.phrase.len();
                spans.push(HighlightSpan::marked(&remaining[index..end], expr.highlight));
                remaining = &remaining[end..];
            }
            None => {
                spans.push(HighlightSpan::plain(remaining));
                break;
            }
        }
    }

    spans
}

/// Leftmost ASCII-case-insensitive occurrence of `needle` in `haystack`,
/// aligned to char boundaries.
fn find_ascii_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }

    haystack
        .as_bytes()
        .windows(needle.len())
        .enumerate()
        .find(|(index, window)| {
            haystack.is_char_boundary(*index)
                && haystack.is_char_boundary(index + needle.len())
                && window.eq_ignore_ascii_case(needle.as_bytes())
        })
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expression(phrase: &str, highlight: Highlight) -> Expression {
        Expression {
            phrase: phrase.to_string(),
            meaning: "meaning".to_string(),
            explanation: String::new(),
            example: String::new(),
            highlight,
        }
    }

    fn rendered(spans: &[HighlightSpan]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_no_expressions() {
        let spans = highlight_spans("Just a sentence.", &[]);
        assert_eq!(spans, vec![HighlightSpan::plain("Just a sentence.")]);
    }

    #[test]
    fn test_single_match_with_surroundings() {
        let expr = expression("figure out", Highlight::Green);
        let spans = highlight_spans("Let me figure out the plan.", &[&expr]);

        assert_eq!(
            spans,
            vec![
                HighlightSpan::plain("Let me "),
                HighlightSpan::marked("figure out", Highlight::Green),
                HighlightSpan::plain(" the plan."),
            ]
        );
    }

    #[test]
    fn test_case_insensitive_keeps_original_casing() {
        let expr = expression("under the weather", Highlight::Yellow);
        let spans = highlight_spans("I'm Under The Weather today.", &[&expr]);

        assert_eq!(spans[1].text, "Under The Weather");
        assert_eq!(spans[1].highlight, Some(Highlight::Yellow));
    }

    #[test]
    fn test_longest_phrase_wins() {
        // "out" occurs earlier in the text, but the longer phrase is tried
        // first and wins at its own leftmost occurrence.
        let short = expression("out", Highlight::Yellow);
        let long = expression("figure it out", Highlight::Green);
        let spans = highlight_spans("About to figure it out now.", &[&short, &long]);

        let highlighted: Vec<&HighlightSpan> =
            spans.iter().filter(|s| s.highlight.is_some()).collect();
        assert_eq!(highlighted.len(), 1);
        assert_eq!(highlighted[0].text, "figure it out");
        assert_eq!(highlighted[0].highlight, Some(Highlight::Green));
    }

    #[test]
    fn test_non_overlapping_repeated_matches() {
        let expr = expression("go", Highlight::Green);
        let spans = highlight_spans("go and go again", &[&expr]);

        assert_eq!(
            spans,
            vec![
                HighlightSpan::marked("go", Highlight::Green),
                HighlightSpan::plain(" and "),
                HighlightSpan::marked("go", Highlight::Green),
                HighlightSpan::plain(" again"),
            ]
        );
    }

    #[test]
    fn test_multiple_expressions() {
        let key = expression("break the ice", Highlight::Green);
        let idiom = expression("piece of cake", Highlight::Yellow);
        let spans = highlight_spans("Break the ice; it's a piece of cake.", &[&key, &idiom]);

        assert_eq!(rendered(&spans), "Break the ice; it's a piece of cake.");
        let marks: Vec<Option<Highlight>> = spans
            .iter()
            .filter(|s| s.highlight.is_some())
            .map(|s| s.highlight)
            .collect();
        assert_eq!(marks, vec![Some(Highlight::Green), Some(Highlight::Yellow)]);
    }

    #[test]
    fn test_no_match_leaves_text_plain() {
        let expr = expression("missing phrase", Highlight::Green);
        let spans = highlight_spans("Nothing to see here.", &[&expr]);
        assert_eq!(spans, vec![HighlightSpan::plain("Nothing to see here.")]);
    }

    #[test]
    fn test_spans_reassemble_original_text() {
        let exprs = [
            expression("the", Highlight::Green),
            expression("quick brown", Highlight::Yellow),
        ];
        let refs: Vec<&Expression> = exprs.iter().collect();
        let text = "The quick brown fox jumps over the lazy dog.";

        assert_eq!(rendered(&highlight_spans(text, &refs)), text);
    }

    #[test]
    fn test_multibyte_text_is_safe() {
        let expr = expression("cafe", Highlight::Green);
        let spans = highlight_spans("안녕 café cafe", &[&expr]);

        assert_eq!(rendered(&spans), "안녕 café cafe");
        let marked: Vec<&HighlightSpan> =
            spans.iter().filter(|s| s.highlight.is_some()).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].text, "cafe");
    }
}

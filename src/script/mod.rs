//! Subtitle line records, file formats, and the merged study collection.

mod format;
mod models;

pub use format::{
    format_collection, parse_analysis, parse_script, parse_translations, write_script,
    OutputFormat,
};
pub use models::{
    AnalysisEntry, Expression, Highlight, LineCollection, ScriptLine, SubtitleLine,
    TranslationLine,
};

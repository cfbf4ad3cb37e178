//! Caption ingestion pipeline.
//!
//! Coordinates the process step: resolve the video ID, fetch captions,
//! normalize them into non-overlapping script lines, and write the
//! per-video files. The translation and analysis overlays are produced by
//! an external step and only ever consumed here, so ingestion reports
//! whether they are still pending.

use crate::captions::{self, youtube};
use crate::error::{Result, TerpError};
use crate::library::VideoLibrary;
use crate::script::ScriptLine;
use tracing::{info, instrument};

/// Result of processing a video.
#[derive(Debug)]
pub struct IngestResult {
    /// Resolved video ID.
    pub video_id: String,
    /// Video title.
    pub title: String,
    /// Number of script lines written.
    pub line_count: usize,
    /// All files were already present; nothing was fetched.
    pub already_processed: bool,
    /// The external translation/analysis step has not produced its files yet.
    pub needs_translation: bool,
}

/// Process a video URL or ID: extract captions and write the script file.
///
/// Fetch failures are surfaced once and never retried automatically; the
/// caller resubmits if needed.
#[instrument(skip(library), fields(input = %input))]
pub async fn ingest_video(
    library: &VideoLibrary,
    input: &str,
    lang: &str,
    force: bool,
) -> Result<IngestResult> {
    let video_id = youtube::extract_video_id(input)
        .ok_or_else(|| TerpError::InvalidInput(format!("Not a YouTube URL or video ID: {}", input)))?;

    let status = library.status(&video_id);
    if status.is_complete() && !force {
        info!("video {} already fully processed, skipping", video_id);
        let title = library
            .load_metadata(&video_id)
            .map(|m| m.title)
            .unwrap_or_default();
        return Ok(IngestResult {
            video_id,
            title,
            line_count: 0,
            already_processed: true,
            needs_translation: false,
        });
    }

    info!("fetching captions for {}", video_id);
    let (metadata, mut cues) = youtube::fetch_video(&video_id, lang).await?;

    captions::clamp_overlaps(&mut cues);

    let lines: Vec<ScriptLine> = cues
        .into_iter()
        .enumerate()
        .map(|(index, cue)| ScriptLine {
            line: index as u32 + 1,
            start_time: cue.start,
            end_time: cue.end,
            text: cue.text,
        })
        .collect();

    library.save_script(&video_id, &lines)?;
    library.save_metadata(&metadata)?;
    info!("wrote {} script lines for {}", lines.len(), video_id);

    let status = library.status(&video_id);
    Ok(IngestResult {
        video_id,
        title: metadata.title,
        line_count: lines.len(),
        already_processed: false,
        needs_translation: !(status.translation && status.analysis),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_unparseable_input() {
        let dir = tempfile::tempdir().unwrap();
        let library = VideoLibrary::new(dir.path());

        let result = ingest_video(&library, "not a url", "en", false).await;
        assert!(matches!(result, Err(TerpError::InvalidInput(_))));
    }
}

//! Flat-file per-video data store.
//!
//! Each processed video owns one directory under `<data_dir>/videos`
//! holding the script, translation, and analysis files (round-trip
//! compatible with the external translation tooling) plus fetched
//! metadata. The merged collection is only ever produced from a complete
//! set of sources; a missing or unreadable source surfaces as "not found"
//! so the sync engine never sees partial data.

use crate::captions::VideoMetadata;
use crate::config::Settings;
use crate::error::{Result, TerpError};
use crate::script::{
    parse_analysis, parse_script, parse_translations, write_script, AnalysisEntry,
    LineCollection, ScriptLine, TranslationLine,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Which per-video files are present.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VideoStatus {
    pub script: bool,
    pub translation: bool,
    pub analysis: bool,
}

impl VideoStatus {
    /// All three sources present: the video is ready to study.
    pub fn is_complete(&self) -> bool {
        self.script && self.translation && self.analysis
    }
}

/// A library listing entry.
#[derive(Debug, Clone, Serialize)]
pub struct VideoEntry {
    pub video_id: String,
    pub title: Option<String>,
    pub duration_seconds: Option<u32>,
    pub status: VideoStatus,
}

/// The per-video file store.
pub struct VideoLibrary {
    root: PathBuf,
}

impl VideoLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Library rooted in the configured data directory.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.data_dir().join("videos"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn video_dir(&self, video_id: &str) -> PathBuf {
        self.root.join(video_id)
    }

    pub fn script_path(&self, video_id: &str) -> PathBuf {
        self.video_dir(video_id).join(format!("{}_script.txt", video_id))
    }

    pub fn translation_path(&self, video_id: &str) -> PathBuf {
        self.video_dir(video_id)
            .join(format!("{}_script_translate.txt", video_id))
    }

    pub fn analysis_path(&self, video_id: &str) -> PathBuf {
        self.video_dir(video_id)
            .join(format!("{}_script_analysis.json", video_id))
    }

    pub fn metadata_path(&self, video_id: &str) -> PathBuf {
        self.video_dir(video_id).join(format!("{}_meta.json", video_id))
    }

    pub fn status(&self, video_id: &str) -> VideoStatus {
        VideoStatus {
            script: self.script_path(video_id).exists(),
            translation: self.translation_path(video_id).exists(),
            analysis: self.analysis_path(video_id).exists(),
        }
    }

    pub fn is_complete(&self, video_id: &str) -> bool {
        self.status(video_id).is_complete()
    }

    /// Write the script file for a video, creating its directory.
    pub fn save_script(&self, video_id: &str, lines: &[ScriptLine]) -> Result<()> {
        std::fs::create_dir_all(self.video_dir(video_id))?;
        std::fs::write(self.script_path(video_id), write_script(lines))?;
        Ok(())
    }

    pub fn save_metadata(&self, metadata: &VideoMetadata) -> Result<()> {
        std::fs::create_dir_all(self.video_dir(&metadata.video_id))?;
        let content = serde_json::to_string_pretty(metadata)?;
        std::fs::write(self.metadata_path(&metadata.video_id), content)?;
        Ok(())
    }

    /// Load fetched metadata, if present and readable.
    pub fn load_metadata(&self, video_id: &str) -> Option<VideoMetadata> {
        let content = std::fs::read_to_string(self.metadata_path(video_id)).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn load_script(&self, video_id: &str) -> Result<Vec<ScriptLine>> {
        let content = std::fs::read_to_string(self.script_path(video_id))
            .map_err(|_| TerpError::VideoNotFound(format!("{}: script file missing", video_id)))?;
        Ok(parse_script(&content))
    }

    pub fn load_translations(&self, video_id: &str) -> Result<Vec<TranslationLine>> {
        let content = std::fs::read_to_string(self.translation_path(video_id)).map_err(|_| {
            TerpError::VideoNotFound(format!("{}: translation file missing", video_id))
        })?;
        Ok(parse_translations(&content))
    }

    pub fn load_analysis(&self, video_id: &str) -> Result<Vec<AnalysisEntry>> {
        let content = std::fs::read_to_string(self.analysis_path(video_id)).map_err(|_| {
            TerpError::VideoNotFound(format!("{}: analysis file missing", video_id))
        })?;
        parse_analysis(&content).map_err(|e| {
            TerpError::VideoNotFound(format!("{}: analysis file unreadable ({})", video_id, e))
        })
    }

    /// Load and merge all three sources into the study collection.
    ///
    /// Any missing or malformed source fails the whole load; callers never
    /// receive a partial collection.
    pub fn load_collection(&self, video_id: &str) -> Result<LineCollection> {
        let script = self.load_script(video_id)?;
        let translations = self.load_translations(video_id)?;
        let analysis = self.load_analysis(video_id)?;

        Ok(LineCollection::merge(script, translations, analysis))
    }

    /// List all videos in the library, sorted by ID.
    pub fn list(&self) -> Result<Vec<VideoEntry>> {
        let mut entries = Vec::new();

        if !self.root.exists() {
            return Ok(entries);
        }

        for dir_entry in std::fs::read_dir(&self.root)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_dir() {
                continue;
            }

            let video_id = dir_entry.file_name().to_string_lossy().to_string();
            let status = self.status(&video_id);
            if !status.script {
                continue;
            }

            let metadata = self.load_metadata(&video_id);
            entries.push(VideoEntry {
                video_id,
                title: metadata.as_ref().map(|m| m.title.clone()),
                duration_seconds: metadata.as_ref().and_then(|m| m.duration_seconds),
                status,
            });
        }

        entries.sort_by(|a, b| a.video_id.cmp(&b.video_id));
        Ok(entries)
    }
}

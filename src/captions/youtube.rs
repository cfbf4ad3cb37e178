//! YouTube caption source.
//!
//! Video metadata and caption track URLs come from `yt-dlp`; the track
//! itself is downloaded directly in the `json3` timed-text format.

use super::{decode_html_entities, CaptionCue};
use crate::error::{Result, TerpError};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Metadata for a processed video, persisted alongside its script file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// YouTube video ID.
    pub video_id: String,
    /// Video title.
    pub title: String,
    /// Channel name (if available).
    pub channel: Option<String>,
    /// Duration in seconds (if known).
    pub duration_seconds: Option<u32>,
    /// When the captions were fetched.
    pub fetched_at: DateTime<Utc>,
}

/// Extract a video ID from a YouTube URL or a bare 11-character ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    let bare = Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid regex");
    if bare.is_match(input) {
        return Some(input.to_string());
    }

    let url_form = Regex::new(
        r"(?:youtube\.com/(?:watch\?(?:[^#\s]*&)?v=|embed/|shorts/|v/)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .expect("valid regex");

    url_form.captures(input).map(|caps| caps[1].to_string())
}

/// The canonical watch URL for a video ID.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Fetch metadata and the caption cues for a video.
///
/// Manual subtitle tracks are preferred over automatic ones. Returns an
/// error when the video has no caption track for the requested language.
pub async fn fetch_video(video_id: &str, lang: &str) -> Result<(VideoMetadata, Vec<CaptionCue>)> {
    let url = watch_url(video_id);

    let output = tokio::process::Command::new("yt-dlp")
        .args(["--dump-json", "--no-download", "--no-warnings", &url])
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TerpError::ToolNotFound("yt-dlp".to_string())
            } else {
                TerpError::VideoSource(format!("Failed to run yt-dlp: {}", e))
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TerpError::VideoSource(format!(
            "Video {} not found or unavailable: {}",
            video_id,
            stderr.trim()
        )));
    }

    let json: serde_json::Value = serde_json::from_str(&String::from_utf8_lossy(&output.stdout))
        .map_err(|e| TerpError::VideoSource(format!("Failed to parse yt-dlp output: {}", e)))?;

    let metadata = VideoMetadata {
        video_id: video_id.to_string(),
        title: json["title"].as_str().unwrap_or("Unknown Title").to_string(),
        channel: json["channel"]
            .as_str()
            .or_else(|| json["uploader"].as_str())
            .map(|s| s.to_string()),
        duration_seconds: json["duration"].as_f64().map(|d| d as u32),
        fetched_at: Utc::now(),
    };

    let track_url = select_caption_track(&json, lang).ok_or_else(|| {
        TerpError::Captions(format!(
            "No '{}' caption track available for video {}",
            lang, video_id
        ))
    })?;

    let track_url = force_json3(&track_url)?;
    let body = reqwest::get(track_url).await?.error_for_status()?.text().await?;
    let cues = parse_json3(&body)?;

    if cues.is_empty() {
        return Err(TerpError::Captions(format!(
            "Caption track for video {} is empty",
            video_id
        )));
    }

    Ok((metadata, cues))
}

/// Pick a caption track URL for the requested language from yt-dlp output.
///
/// Manual `subtitles` win over `automatic_captions`; within a track list,
/// a `json3` entry wins over the first entry of any other format.
fn select_caption_track(json: &serde_json::Value, lang: &str) -> Option<String> {
    for section in ["subtitles", "automatic_captions"] {
        let tracks = match json[section].as_object() {
            Some(tracks) => tracks,
            None => continue,
        };

        let entries = tracks
            .iter()
            .find(|(key, _)| {
                key.as_str() == lang || key.starts_with(&format!("{}-", lang))
            })
            .and_then(|(_, value)| value.as_array());

        let entries = match entries {
            Some(entries) => entries,
            None => continue,
        };

        let chosen = entries
            .iter()
            .find(|e| e["ext"].as_str() == Some("json3"))
            .or_else(|| entries.first());

        if let Some(url) = chosen.and_then(|e| e["url"].as_str()) {
            return Some(url.to_string());
        }
    }

    None
}

/// Rewrite a timed-text URL to request the `json3` format.
fn force_json3(raw: &str) -> Result<String> {
    let mut url = Url::parse(raw)
        .map_err(|e| TerpError::Captions(format!("Bad caption track URL: {}", e)))?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "fmt")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("fmt", "json3");

    Ok(url.into())
}

#[derive(Debug, Deserialize)]
struct Json3Track {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parse a `json3` timed-text body into caption cues.
///
/// Newlines inside a cue are flattened to spaces, entities are decoded, and
/// cues without text (timing-only events) are dropped.
fn parse_json3(body: &str) -> Result<Vec<CaptionCue>> {
    let track: Json3Track = serde_json::from_str(body)?;

    Ok(track
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = decode_html_entities(&text.replace('\n', " "))
                .trim()
                .to_string();
            if text.is_empty() {
                return None;
            }

            Some(CaptionCue {
                start: event.start_ms as f64 / 1000.0,
                end: (event.start_ms + event.duration_ms) as f64 / 1000.0,
                text,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?list=PL123&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_extract_video_id_invalid() {
        assert_eq!(extract_video_id("not-a-video"), None);
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("https://example.com/watch?v=dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_select_caption_track_prefers_manual() {
        let json = serde_json::json!({
            "subtitles": {
                "en": [
                    { "ext": "vtt", "url": "https://example.com/manual.vtt" },
                    { "ext": "json3", "url": "https://example.com/manual.json3" }
                ]
            },
            "automatic_captions": {
                "en": [{ "ext": "json3", "url": "https://example.com/auto.json3" }]
            }
        });

        assert_eq!(
            select_caption_track(&json, "en"),
            Some("https://example.com/manual.json3".to_string())
        );
    }

    #[test]
    fn test_select_caption_track_falls_back_to_automatic() {
        let json = serde_json::json!({
            "subtitles": {},
            "automatic_captions": {
                "en-orig": [{ "ext": "json3", "url": "https://example.com/auto.json3" }]
            }
        });

        assert_eq!(
            select_caption_track(&json, "en"),
            Some("https://example.com/auto.json3".to_string())
        );
        assert_eq!(select_caption_track(&json, "ko"), None);
    }

    #[test]
    fn test_force_json3() {
        let rewritten = force_json3("https://example.com/timedtext?v=abc&fmt=vtt").unwrap();
        let url = Url::parse(&rewritten).unwrap();
        let fmts: Vec<String> = url
            .query_pairs()
            .filter(|(k, _)| k == "fmt")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(fmts, vec!["json3"]);

        let added = force_json3("https://example.com/timedtext?v=abc").unwrap();
        assert!(added.contains("fmt=json3"));
    }

    #[test]
    fn test_parse_json3() {
        let body = r#"{
            "events": [
                { "tStartMs": 0, "dDurationMs": 2500, "segs": [{ "utf8": "Hello " }, { "utf8": "world" }] },
                { "tStartMs": 2500, "dDurationMs": 1000 },
                { "tStartMs": 3500, "dDurationMs": 1500, "segs": [{ "utf8": "it&#39;s\na test" }] }
            ]
        }"#;

        let cues = parse_json3(body).unwrap();

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].start, 0.0);
        assert_eq!(cues[0].end, 2.5);
        assert_eq!(cues[0].text, "Hello world");
        assert_eq!(cues[1].text, "it's a test");
        assert_eq!(cues[1].start, 3.5);
        assert_eq!(cues[1].end, 5.0);
    }
}

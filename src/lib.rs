//! Terp - Sentence-by-Sentence Video Language Study
//!
//! A local-first CLI tool for studying YouTube videos one subtitle line at a
//! time, with synchronized playback, per-line repeat looping, and a
//! user-adjustable sync offset.
//!
//! The name "Terp" comes from the Norwegian "terpe" — to drill or rehearse.
//!
//! # Overview
//!
//! Terp allows you to:
//! - Extract English captions from a YouTube video into a flat script file
//! - Overlay per-line translations and expression analysis produced by an
//!   external translation step
//! - Study the video sentence-by-sentence in the terminal while mpv plays it
//! - Export the merged study data as JSON, SRT, or WebVTT
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `timecode` - Timestamp parsing and formatting
//! - `script` - Subtitle line records, file formats, and the merged collection
//! - `captions` - Caption acquisition from YouTube
//! - `library` - Flat-file per-video data store
//! - `player` - Playback clock adapter (mpv)
//! - `sync` - Subtitle synchronization engine and polling driver
//! - `highlight` - Expression highlighting for rendered lines
//! - `ingest` - Caption ingestion pipeline
//!
//! # Example
//!
//! ```rust,no_run
//! use terp::config::Settings;
//! use terp::ingest::ingest_video;
//! use terp::library::VideoLibrary;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let library = VideoLibrary::from_settings(&settings);
//!
//!     // Extract captions for a video
//!     let result = ingest_video(&library, "dQw4w9WgXcQ", "en", false).await?;
//!     println!("Extracted {} lines", result.line_count);
//!
//!     Ok(())
//! }
//! ```

pub mod captions;
pub mod cli;
pub mod config;
pub mod error;
pub mod highlight;
pub mod ingest;
pub mod library;
pub mod player;
pub mod script;
pub mod sync;
pub mod timecode;

pub use error::{Result, TerpError};

//! CLI module for Terp.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Terp - Sentence-by-Sentence Video Language Study
///
/// A local-first CLI tool for studying YouTube videos one subtitle line at a
/// time. The name "Terp" comes from the Norwegian "terpe" — to drill or
/// rehearse.
#[derive(Parser, Debug)]
#[command(name = "terp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Terp and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Extract captions from a YouTube video into the library
    Process {
        /// YouTube URL or video ID
        input: String,

        /// Re-fetch captions even if the video is already processed
        #[arg(short, long)]
        force: bool,
    },

    /// List videos in the library and their processing status
    List,

    /// Study a video sentence-by-sentence with synchronized playback
    Study {
        /// Video ID (see 'terp list')
        video_id: String,
    },

    /// Export merged study data for a video
    Export {
        /// Video ID to export
        video_id: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (json, srt, vtt)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Start HTTP API server for integration with other front-ends
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "player.offset_step")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

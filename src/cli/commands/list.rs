//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::library::VideoLibrary;
use anyhow::Result;

/// Run the list command.
pub fn run_list(settings: Settings) -> Result<()> {
    let library = VideoLibrary::from_settings(&settings);

    let entries = match library.list() {
        Ok(entries) => entries,
        Err(e) => {
            Output::error(&format!("Failed to list videos: {}", e));
            return Err(e.into());
        }
    };

    if entries.is_empty() {
        Output::info("No videos yet. Use 'terp process <url>' to extract captions.");
        return Ok(());
    }

    Output::header(&format!("Videos ({})", entries.len()));
    println!();

    for entry in &entries {
        Output::video_entry(
            entry.title.as_deref().unwrap_or(&entry.video_id),
            &entry.video_id,
            &entry.status,
            entry.duration_seconds.map(|d| d as f64),
        );
    }

    let ready = entries.iter().filter(|e| e.status.is_complete()).count();
    println!();
    Output::kv("Total videos", &entries.len().to_string());
    Output::kv("Ready to study", &ready.to_string());

    Ok(())
}

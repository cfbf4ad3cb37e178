//! Export command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::library::VideoLibrary;
use crate::script::{format_collection, OutputFormat};
use anyhow::Result;

/// Run the export command.
pub fn run_export(
    video_id: &str,
    output: Option<String>,
    format: &str,
    settings: Settings,
) -> Result<()> {
    let output_format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let library = VideoLibrary::from_settings(&settings);

    let collection = match library.load_collection(video_id) {
        Ok(collection) => collection,
        Err(e) => {
            Output::error(&format!("Nothing to export: {}", e));
            Output::info("Use 'terp list' to see which videos are complete.");
            return Err(e.into());
        }
    };

    let content = format_collection(&collection, output_format)?;

    match output {
        Some(path) if path != "-" => {
            std::fs::write(&path, &content)?;
            Output::success(&format!(
                "Exported '{}' to {} ({} lines)",
                video_id,
                path,
                collection.len()
            ));
        }
        _ => {
            println!("{}", content);
        }
    }

    Ok(())
}

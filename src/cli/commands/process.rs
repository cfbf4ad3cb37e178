//! Process command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::ingest::ingest_video;
use crate::library::VideoLibrary;
use anyhow::Result;
use console::style;

/// Run the process command.
pub async fn run_process(input: &str, force: bool, settings: Settings) -> Result<()> {
    preflight::check(Operation::Process)?;

    let library = VideoLibrary::from_settings(&settings);

    let spinner = Output::spinner("Fetching captions...");
    let result = ingest_video(&library, input, &settings.captions.language, force).await;
    spinner.finish_and_clear();

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            Output::error(&format!("Processing failed: {}", e));
            return Err(e.into());
        }
    };

    if result.already_processed {
        Output::info(&format!(
            "'{}' is already fully processed.",
            result.video_id
        ));
        Output::kv("Study it with", &format!("terp study {}", result.video_id));
        return Ok(());
    }

    Output::success(&format!(
        "Extracted {} lines from '{}'",
        result.line_count, result.title
    ));
    Output::kv("Video ID", &result.video_id);
    Output::kv(
        "Script file",
        &library.script_path(&result.video_id).display().to_string(),
    );

    if result.needs_translation {
        println!();
        Output::warning("Translation and analysis are still pending.");
        println!("  Run the external translation step on the script file, then place its output at:");
        Output::kv(
            "Translation",
            &library
                .translation_path(&result.video_id)
                .display()
                .to_string(),
        );
        Output::kv(
            "Analysis",
            &library
                .analysis_path(&result.video_id)
                .display()
                .to_string(),
        );
        println!();
        println!(
            "  Once both files exist: {}",
            style(format!("terp study {}", result.video_id)).cyan()
        );
    } else {
        Output::kv("Study it with", &format!("terp study {}", result.video_id));
    }

    Ok(())
}

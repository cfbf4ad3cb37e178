//! Pre-flight checks before expensive operations.
//!
//! Validates that required external tools are available before starting
//! operations that would otherwise fail midway.

use crate::error::{Result, TerpError};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Caption extraction requires yt-dlp.
    Process,
    /// A study session requires yt-dlp (stream resolution) and mpv.
    Study,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Process => {
            check_tool("yt-dlp")?;
        }
        Operation::Study => {
            check_tool("yt-dlp")?;
            check_tool("mpv")?;
        }
    }
    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(TerpError::ToolFailed(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TerpError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(TerpError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

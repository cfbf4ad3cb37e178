//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let mut settings = settings;
            set_value(&mut settings, key, value)?;
            settings.save()?;
            Output::success(&format!("Set {} = {}", key, value));
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            // Try to open in editor
            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Apply a dotted-key assignment to the settings.
fn set_value(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "general.data_dir" => settings.general.data_dir = value.to_string(),
        "general.log_level" => settings.general.log_level = value.to_string(),
        "captions.language" => settings.captions.language = value.to_string(),
        "player.poll_interval_ms" => {
            settings.player.poll_interval_ms = value
                .parse()
                .map_err(|_| anyhow::anyhow!("{} expects a whole number of milliseconds", key))?;
        }
        "player.offset_step" => {
            settings.player.offset_step = value
                .parse()
                .map_err(|_| anyhow::anyhow!("{} expects a number of seconds", key))?;
        }
        "player.mpv_binary" => settings.player.mpv_binary = value.to_string(),
        _ => anyhow::bail!(
            "Unknown configuration key: {}. See 'terp config show' for available keys.",
            key
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_known_keys() {
        let mut settings = Settings::default();

        set_value(&mut settings, "captions.language", "ko").unwrap();
        set_value(&mut settings, "player.poll_interval_ms", "100").unwrap();
        set_value(&mut settings, "player.offset_step", "0.25").unwrap();

        assert_eq!(settings.captions.language, "ko");
        assert_eq!(settings.player.poll_interval_ms, 100);
        assert_eq!(settings.player.offset_step, 0.25);
    }

    #[test]
    fn test_set_rejects_unknown_key_and_bad_values() {
        let mut settings = Settings::default();

        assert!(set_value(&mut settings, "no.such.key", "1").is_err());
        assert!(set_value(&mut settings, "player.poll_interval_ms", "fast").is_err());
    }
}

//! Configuration module for Terp.

mod settings;

pub use settings::{CaptionSettings, GeneralSettings, PlayerSettings, Settings};

//! Configuration module for templar.
//!
//! Handles the `templar.toml` settings file and the editors it describes.

mod settings;

pub use settings::{
    CompileSettings, CutRule, EditSettings, OutputSettings, SearchRule, Settings, SettingsError,
};

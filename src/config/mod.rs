pub mod builder;
pub mod defaults;
pub mod merge;
pub mod types;

pub use builder::ConfigBuilder;
pub use types::*;

use std::path::{Path, PathBuf};

use anyhow::Result;

/// Load a YAML config file, if present; an absent file resolves to an
/// all-`None` input rather than an error (every field has a default or a
/// CLI/env fallback).
pub fn load_config(config_file: &str) -> Result<(DriverConfigInput, PathBuf)> {
    let config_dir = Path::new(config_file).parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

    let config_input = if Path::new(config_file).exists() {
        let contents = std::fs::read_to_string(config_file)?;
        serde_yaml::from_str(&contents)?
    } else {
        DriverConfigInput::default()
    };

    Ok((config_input, config_dir))
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_path: Option<String>,
    pub song_data_dir: Option<String>,
    pub log_data_dir: Option<String>,
    pub extension: Option<String>,
    pub reset_schema: Option<bool>,
    pub skip_malformed_records: Option<bool>,
    pub continue_on_error: Option<bool>,
    pub progress_bar: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

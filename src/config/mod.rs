mod file_config;

pub use file_config::FileConfig;

use crate::etl::{PipelineOptions, RecordPolicy};
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub song_data_dir: PathBuf,
    pub log_data_dir: PathBuf,
    pub extension: String,
    pub reset_schema: bool,
    pub skip_malformed_records: bool,
    pub continue_on_error: bool,
    pub progress_bar: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub song_data_dir: PathBuf,
    pub log_data_dir: PathBuf,
    /// Without the leading dot.
    pub extension: String,
    pub reset_schema: bool,
    pub record_policy: RecordPolicy,
    pub continue_on_error: bool,
    pub progress_bar: bool,
}

fn validate_data_dir(kind: &str, dir: &Path) -> Result<()> {
    if !dir.exists() {
        bail!("{} data directory does not exist: {:?}", kind, dir);
    }
    if !dir.is_dir() {
        bail!("{} data path is not a directory: {:?}", kind, dir);
    }
    Ok(())
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_path.clone());
        if db_path.as_os_str().is_empty() {
            bail!("db_path must be specified via --db-path or in config file");
        }

        let song_data_dir = file
            .song_data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.song_data_dir.clone());
        validate_data_dir("Song", &song_data_dir)?;

        let log_data_dir = file
            .log_data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.log_data_dir.clone());
        validate_data_dir("Log", &log_data_dir)?;

        let extension = file.extension.unwrap_or_else(|| cli.extension.clone());
        let extension = extension.trim_start_matches('.').to_string();
        if extension.is_empty() {
            bail!("extension must not be empty");
        }

        let record_policy = if file
            .skip_malformed_records
            .unwrap_or(cli.skip_malformed_records)
        {
            RecordPolicy::Skip
        } else {
            RecordPolicy::Abort
        };

        Ok(AppConfig {
            db_path,
            song_data_dir,
            log_data_dir,
            extension,
            reset_schema: file.reset_schema.unwrap_or(cli.reset_schema),
            record_policy,
            continue_on_error: file.continue_on_error.unwrap_or(cli.continue_on_error),
            progress_bar: file.progress_bar.unwrap_or(cli.progress_bar),
        })
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            extension: self.extension.clone(),
            continue_on_error: self.continue_on_error,
            progress_bar: self.progress_bar,
        }
    }
}

use anyhow::{bail, Context, Result};
use clap::Parser;
use sparkify_etl::config::{AppConfig, CliConfig, FileConfig};
use sparkify_etl::{Database, LogFileTransformer, Pipeline, RunStats, SongFileTransformer};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "sparkify-etl")]
#[command(about = "Load Sparkify song and event log JSON files into a SQLite warehouse")]
struct CliArgs {
    /// Path to the SQLite warehouse database file, created if missing.
    #[clap(long, value_parser = parse_path, default_value = "sparkify.db")]
    pub db_path: PathBuf,

    /// Directory containing the song metadata files, searched recursively.
    #[clap(long, value_parser = parse_path, default_value = "data/song_data")]
    pub song_data_dir: PathBuf,

    /// Directory containing the event log files, searched recursively.
    #[clap(long, value_parser = parse_path, default_value = "data/log_data")]
    pub log_data_dir: PathBuf,

    /// Extension of the input files.
    #[clap(long, default_value = "json")]
    pub extension: String,

    /// Drop and recreate all warehouse tables before loading.
    #[clap(long)]
    pub reset_schema: bool,

    /// Skip malformed playback records with a warning instead of failing their file.
    #[clap(long)]
    pub skip_malformed_records: bool,

    /// Roll back a failing file and continue with the next one.
    #[clap(long)]
    pub continue_on_error: bool,

    /// Show a progress bar instead of one log line per file.
    #[clap(long)]
    pub progress_bar: bool,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            song_data_dir: self.song_data_dir.clone(),
            log_data_dir: self.log_data_dir.clone(),
            extension: self.extension.clone(),
            reset_schema: self.reset_schema,
            skip_malformed_records: self.skip_malformed_records,
            continue_on_error: self.continue_on_error,
            progress_bar: self.progress_bar,
        }
    }
}

fn log_summary(dataset: &str, stats: &RunStats) {
    info!("{} summary", dataset);
    info!(
        "  files: {} found, {} loaded, {} failed",
        stats.files_found, stats.files_processed, stats.files_failed
    );
    info!(
        "  records: {} read, {} loaded, {} skipped",
        stats.records, stats.loaded, stats.skipped
    );
    if stats.resolved + stats.unresolved > 0 {
        info!(
            "  songplays: {} matched a song, {} unmatched",
            stats.resolved, stats.unresolved
        );
    }
}

fn run(db: &mut Database, config: &AppConfig) -> Result<()> {
    let mut pipeline = Pipeline::new(db.connection_mut(), config.pipeline_options());

    let song_stats = pipeline
        .process_data(&config.song_data_dir, &SongFileTransformer)
        .context("Failed to load song files")?;
    log_summary("Song files", &song_stats);

    let log_stats = pipeline
        .process_data(
            &config.log_data_dir,
            &LogFileTransformer::new(config.record_policy),
        )
        .context("Failed to load log files")?;
    log_summary("Log files", &log_stats);

    info!("Warehouse contains:");
    for (table, count) in db.table_counts()? {
        info!("  {} {}", count, table);
    }

    let failed = song_stats.files_failed + log_stats.files_failed;
    if failed > 0 {
        bail!("{} files failed to load and were rolled back", failed);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Song data: {}", config.song_data_dir.display());
    info!("Log data: {}", config.log_data_dir.display());
    info!("Opening warehouse database at {:?}...", config.db_path);
    if config.reset_schema {
        warn!("Resetting warehouse schema, all existing rows are dropped");
    }
    let mut db = Database::open_with_reset(&config.db_path, config.reset_schema)?;

    // On error `db` is dropped here, which closes the connection.
    run(&mut db, &config)?;

    db.close()?;
    info!("ETL completed successfully!");
    Ok(())
}

//! Drives discovery, transformation and loading for one dataset directory.

use super::{FileStats, FileTransformer};
use crate::discovery::find_files;
use crate::error::EtlError;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Extension of the input files, without the leading dot.
    pub extension: String,
    /// Roll back a failing file and keep going instead of stopping the run.
    pub continue_on_error: bool,
    /// Show a progress bar instead of one log line per file.
    pub progress_bar: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            extension: "json".to_string(),
            continue_on_error: false,
            progress_bar: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub files_found: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub records: usize,
    pub loaded: usize,
    pub skipped: usize,
    pub resolved: usize,
    pub unresolved: usize,
}

impl RunStats {
    fn add_file(&mut self, file: &FileStats) {
        self.files_processed += 1;
        self.records += file.records;
        self.loaded += file.loaded;
        self.skipped += file.skipped;
        self.resolved += file.resolved;
        self.unresolved += file.unresolved;
    }
}

struct Progress {
    bar: Option<ProgressBar>,
    total: usize,
    position: usize,
}

impl Progress {
    fn new(total: usize, enabled: bool) -> Self {
        let bar = enabled.then(|| {
            let bar = ProgressBar::new(total as u64);
            if let Ok(style) =
                ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} files")
            {
                bar.set_style(style);
            }
            bar
        });
        Progress {
            bar,
            total,
            position: 0,
        }
    }

    /// Advances past a committed file. Returns the status line when it was
    /// logged rather than drawn on the bar.
    fn file_done(&mut self) -> Option<String> {
        self.position += 1;
        match &self.bar {
            Some(bar) => {
                bar.inc(1);
                None
            }
            None => {
                let status = format!("{}/{} files processed.", self.position, self.total);
                info!("{}", status);
                Some(status)
            }
        }
    }

    /// Advances past a rolled back file. The failure itself is logged by the caller.
    fn file_failed(&mut self) {
        self.position += 1;
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish();
        }
    }

    fn abandon(self) {
        if let Some(bar) = self.bar {
            bar.abandon();
        }
    }
}

/// Loads every file of a dataset directory, one transaction per file.
pub struct Pipeline<'a> {
    conn: &'a mut Connection,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(conn: &'a mut Connection, options: PipelineOptions) -> Self {
        Pipeline { conn, options }
    }

    /// Processes every matching file under `root` with `transformer`.
    ///
    /// Each file is committed on its own once all of its statements
    /// succeeded. On failure the file's transaction is rolled back and,
    /// unless `continue_on_error` is set, the error is returned without
    /// attempting the remaining files.
    pub fn process_data(
        &mut self,
        root: &Path,
        transformer: &dyn FileTransformer,
    ) -> Result<RunStats, EtlError> {
        let files = find_files(root, &self.options.extension)?;
        let total = files.len();
        info!("{} files found in {}", total, root.display());

        let mut progress = Progress::new(total, self.options.progress_bar);
        let mut stats = RunStats {
            files_found: total,
            ..Default::default()
        };

        for path in &files {
            match self.process_file(path, transformer) {
                Ok(file_stats) => {
                    stats.add_file(&file_stats);
                    progress.file_done();
                }
                Err(e) if self.options.continue_on_error => {
                    error!(
                        "Failed to load {} file {}, rolled back: {}",
                        transformer.name(),
                        path.display(),
                        e
                    );
                    stats.files_failed += 1;
                    progress.file_failed();
                }
                Err(e) => {
                    progress.abandon();
                    return Err(e);
                }
            }
        }

        progress.finish();
        Ok(stats)
    }

    fn process_file(
        &mut self,
        path: &Path,
        transformer: &dyn FileTransformer,
    ) -> Result<FileStats, EtlError> {
        // Dropping the transaction without committing rolls it back.
        let mut tx = self.conn.transaction()?;
        let stats = transformer.transform(path, &mut tx)?;
        tx.commit()?;
        Ok(stats)
    }
}

//! Extraction, transformation and loading of the song and log datasets.

mod loader;
mod log_file;
mod pipeline;
mod rows;
mod song_file;
mod time_parts;

pub use loader::{Loader, SongMatch};
pub use log_file::{LogFileTransformer, PlayEvent, NEXT_SONG_PAGE};
pub use pipeline::{Pipeline, PipelineOptions, RunStats};
pub use rows::{ArtistRow, InsertRow, LogArtistRow, SongRow, SongplayRow, TimeRow, UserRow};
pub use song_file::{SongFileTransformer, SongRecord};
pub use time_parts::decompose;

use crate::error::EtlError;
use std::path::Path;

/// What to do with a playback record that cannot be validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordPolicy {
    /// Fail the whole file, nothing from it is committed.
    #[default]
    Abort,
    /// Log a warning and continue with the next record.
    Skip,
}

/// Counters for a single processed file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStats {
    /// Non-blank records read.
    pub records: usize,
    /// Records that produced rows.
    pub loaded: usize,
    pub skipped: usize,
    /// Playbacks whose song and artist were found.
    pub resolved: usize,
    pub unresolved: usize,
}

/// Turns one input file into rows handed to a [`Loader`].
pub trait FileTransformer {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    fn transform(&self, path: &Path, loader: &mut dyn Loader) -> Result<FileStats, EtlError>;
}

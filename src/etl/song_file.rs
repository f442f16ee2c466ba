//! Song metadata files: one flat JSON object per file.

use super::loader::Loader;
use super::rows::{ArtistRow, SongRow};
use super::{FileStats, FileTransformer};
use crate::error::EtlError;
use serde::Deserialize;
use std::path::Path;

/// A song file as found in the dataset.
///
/// Every field is required. Location and coordinates must be present but
/// are often `null` in the dataset.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i64,
    pub duration: f64,
    pub artist_name: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub artist_location: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub artist_latitude: Option<f64>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub artist_longitude: Option<f64>,
}

impl SongRecord {
    pub fn read(path: &Path) -> Result<Self, EtlError> {
        let file_text =
            std::fs::read_to_string(path).map_err(|e| EtlError::file_system(path, e))?;
        serde_json::from_str(&file_text).map_err(|e| EtlError::malformed(path, None, e.to_string()))
    }

    pub fn song_row(&self) -> SongRow {
        SongRow {
            song_id: self.song_id.clone(),
            title: self.title.clone(),
            artist_id: self.artist_id.clone(),
            year: self.year,
            duration: self.duration,
        }
    }

    pub fn artist_row(&self) -> ArtistRow {
        ArtistRow {
            artist_id: self.artist_id.clone(),
            name: self.artist_name.clone(),
            location: self.artist_location.clone(),
            latitude: self.artist_latitude,
            longitude: self.artist_longitude,
        }
    }
}

/// Loads one song and its artist per file.
#[derive(Debug, Clone, Copy, Default)]
pub struct SongFileTransformer;

impl FileTransformer for SongFileTransformer {
    fn name(&self) -> &'static str {
        "song"
    }

    fn transform(&self, path: &Path, loader: &mut dyn Loader) -> Result<FileStats, EtlError> {
        let record = SongRecord::read(path)?;
        loader.insert(&record.song_row())?;
        loader.insert(&record.artist_row())?;
        Ok(FileStats {
            records: 1,
            loaded: 1,
            ..Default::default()
        })
    }
}

//! Event log files: newline-delimited JSON, one user event per line.
//!
//! Only `NextSong` events (actual playbacks) are loaded. Each of them yields,
//! in order, a time row, a user row, a songplay row and a log artist row.

use super::loader::Loader;
use super::rows::{LogArtistRow, SongplayRow, TimeRow, UserRow};
use super::time_parts::decompose;
use super::{FileStats, FileTransformer, RecordPolicy};
use crate::error::EtlError;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

pub const NEXT_SONG_PAGE: &str = "NextSong";

/// The source data encodes `userId` as a string, but numbers are accepted too.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum UserId {
    Number(i64),
    Text(String),
}

impl UserId {
    fn parse(&self) -> Result<i64, String> {
        match self {
            UserId::Number(id) => Ok(*id),
            UserId::Text(text) if text.trim().is_empty() => Err("empty userId".to_string()),
            UserId::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| format!("invalid userId {:?}", text)),
        }
    }
}

/// The fields of a NextSong line that end up in the warehouse.
///
/// Everything is optional here so that a missing or null field is reported
/// by name when converting into a [`PlayEvent`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLogRecord {
    ts: Option<i64>,
    user_id: Option<UserId>,
    first_name: Option<String>,
    last_name: Option<String>,
    gender: Option<String>,
    level: Option<String>,
    song: Option<String>,
    artist: Option<String>,
    length: Option<f64>,
    session_id: Option<i64>,
    location: Option<String>,
    user_agent: Option<String>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, String> {
    value.ok_or_else(|| format!("missing field `{}`", field))
}

/// A validated NextSong event.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    pub ts: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub level: String,
    pub song: String,
    pub artist: String,
    pub length: f64,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl TryFrom<RawLogRecord> for PlayEvent {
    type Error = String;

    fn try_from(raw: RawLogRecord) -> Result<Self, Self::Error> {
        Ok(PlayEvent {
            ts: required(raw.ts, "ts")?,
            user_id: required(raw.user_id, "userId")?.parse()?,
            first_name: required(raw.first_name, "firstName")?,
            last_name: required(raw.last_name, "lastName")?,
            gender: required(raw.gender, "gender")?,
            level: required(raw.level, "level")?,
            song: required(raw.song, "song")?,
            artist: required(raw.artist, "artist")?,
            length: required(raw.length, "length")?,
            session_id: required(raw.session_id, "sessionId")?,
            location: raw.location,
            user_agent: raw.user_agent,
        })
    }
}

impl PlayEvent {
    pub fn time_row(&self) -> Option<TimeRow> {
        decompose(self.ts)
    }

    pub fn user_row(&self) -> UserRow {
        UserRow {
            user_id: self.user_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender.clone(),
            level: self.level.clone(),
        }
    }

    pub fn songplay_row(
        &self,
        start_time: &str,
        song_id: Option<String>,
        artist_id: Option<String>,
    ) -> SongplayRow {
        SongplayRow {
            start_time: start_time.to_string(),
            user_id: self.user_id,
            level: self.level.clone(),
            song_id,
            artist_id,
            session_id: self.session_id,
            location: self.location.clone(),
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn log_artist_row(&self) -> LogArtistRow {
        LogArtistRow {
            artist_name: self.artist.clone(),
        }
    }
}

/// Parses one log line. Returns `Ok(None)` for events that are not playbacks.
fn parse_line(line: &str) -> Result<Option<(PlayEvent, TimeRow)>, String> {
    let value: serde_json::Value = serde_json::from_str(line).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("expected a JSON object".to_string());
    }
    // Other pages carry fields of any shape, only playbacks are typed.
    if value.get("page").and_then(|page| page.as_str()) != Some(NEXT_SONG_PAGE) {
        return Ok(None);
    }
    let raw: RawLogRecord = serde_json::from_value(value).map_err(|e| e.to_string())?;
    let event = PlayEvent::try_from(raw)?;
    let time_row = event
        .time_row()
        .ok_or_else(|| format!("timestamp {} is out of range", event.ts))?;
    Ok(Some((event, time_row)))
}

/// Loads all rows derived from one playback event.
/// Returns whether the song and artist were resolved.
fn load_event(
    event: &PlayEvent,
    time_row: &TimeRow,
    loader: &mut dyn Loader,
) -> Result<bool, EtlError> {
    loader.insert(time_row)?;
    loader.insert(&event.user_row())?;

    let (song_id, artist_id) = loader
        .find_song(&event.song, &event.artist, event.length)?
        .into_ids();
    let resolved = song_id.is_some();
    loader.insert(&event.songplay_row(&time_row.start_time, song_id, artist_id))?;

    loader.insert(&event.log_artist_row())?;
    Ok(resolved)
}

/// Loads the NextSong events of an event log file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFileTransformer {
    pub policy: RecordPolicy,
}

impl LogFileTransformer {
    pub fn new(policy: RecordPolicy) -> Self {
        LogFileTransformer { policy }
    }
}

impl FileTransformer for LogFileTransformer {
    fn name(&self) -> &'static str {
        "log"
    }

    fn transform(&self, path: &Path, loader: &mut dyn Loader) -> Result<FileStats, EtlError> {
        let file = File::open(path).map_err(|e| EtlError::file_system(path, e))?;
        let mut stats = FileStats::default();

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| EtlError::file_system(path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            stats.records += 1;

            let (event, time_row) = match parse_line(&line) {
                Ok(Some(parsed)) => parsed,
                Ok(None) => continue,
                Err(reason) => {
                    let err = EtlError::malformed(path, Some(index + 1), reason);
                    match self.policy {
                        RecordPolicy::Abort => return Err(err),
                        RecordPolicy::Skip => {
                            warn!("Skipping record: {}", err);
                            stats.skipped += 1;
                            continue;
                        }
                    }
                }
            };

            if load_event(&event, &time_row, loader)? {
                stats.resolved += 1;
            } else {
                stats.unresolved += 1;
            }
            stats.loaded += 1;
        }

        debug!(
            "{}: {} records, {} playbacks loaded",
            path.display(),
            stats.records,
            stats.loaded
        );
        Ok(stats)
    }
}

//! Typed rows for each warehouse table.
//!
//! Field order matches the positional placeholders of the corresponding
//! statement in [`crate::warehouse::queries`].

use crate::warehouse::queries::{
    ARTIST_TABLE_INSERT, LOG_ARTIST_TABLE_INSERT, SONGPLAY_TABLE_INSERT, SONG_TABLE_INSERT,
    TIME_TABLE_INSERT, USER_TABLE_INSERT,
};
use rusqlite::ToSql;

/// A row that knows its insert statement and positional parameters.
pub trait InsertRow {
    fn statement(&self) -> &'static str;
    fn params(&self) -> Vec<&dyn ToSql>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i64,
    pub duration: f64,
}

impl InsertRow for SongRow {
    fn statement(&self) -> &'static str {
        SONG_TABLE_INSERT
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.song_id,
            &self.title,
            &self.artist_id,
            &self.year,
            &self.duration,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl InsertRow for ArtistRow {
    fn statement(&self) -> &'static str {
        ARTIST_TABLE_INSERT
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.artist_id,
            &self.name,
            &self.location,
            &self.latitude,
            &self.longitude,
        ]
    }
}

/// Calendar decomposition of a playback timestamp, see [`super::time_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRow {
    pub start_time: String,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    /// 0 = Monday ... 6 = Sunday
    pub weekday: u32,
}

impl InsertRow for TimeRow {
    fn statement(&self) -> &'static str {
        TIME_TABLE_INSERT
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.start_time,
            &self.hour,
            &self.day,
            &self.week,
            &self.month,
            &self.year,
            &self.weekday,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub level: String,
}

impl InsertRow for UserRow {
    fn statement(&self) -> &'static str {
        USER_TABLE_INSERT
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.user_id,
            &self.first_name,
            &self.last_name,
            &self.gender,
            &self.level,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongplayRow {
    pub start_time: String,
    pub user_id: i64,
    pub level: String,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl InsertRow for SongplayRow {
    fn statement(&self) -> &'static str {
        SONGPLAY_TABLE_INSERT
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.start_time,
            &self.user_id,
            &self.level,
            &self.song_id,
            &self.artist_id,
            &self.session_id,
            &self.location,
            &self.user_agent,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogArtistRow {
    pub artist_name: String,
}

impl InsertRow for LogArtistRow {
    fn statement(&self) -> &'static str {
        LOG_ARTIST_TABLE_INSERT
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![&self.artist_name]
    }
}

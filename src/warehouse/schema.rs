//! SQLite schema definitions for the Sparkify analytics warehouse.
//!
//! A star schema: `songplays` is the fact table, `songs`, `artists`, `time`
//! and `users` are its dimensions. `log_artists` keeps the raw artist names
//! seen in the event logs, independently of whether they resolved to an
//! `artists` row.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, ForeignKey, SqlType, Table, VersionedSchema};

// =============================================================================
// Dimension Tables
// =============================================================================

/// Songs table - one row per song file
const SONGS_TABLE: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("song_id", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        // No foreign key: a song file inserts its song before its artist.
        sqlite_column!("artist_id", &SqlType::Text, non_null = true),
        sqlite_column!("year", &SqlType::Integer, non_null = true), // 0 when unknown
        sqlite_column!("duration", &SqlType::Real, non_null = true), // seconds
    ],
    indices: &[
        ("idx_songs_title", "title"),
        ("idx_songs_artist", "artist_id"),
    ],
};

/// Artists table - one row per distinct artist_id across song files
const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("artist_id", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("latitude", &SqlType::Real),
        sqlite_column!("longitude", &SqlType::Real),
    ],
    indices: &[("idx_artists_name", "name")],
};

/// Time table - calendar decomposition of every playback timestamp
const TIME_TABLE: Table = Table {
    name: "time",
    columns: &[
        // UTC, 'YYYY-MM-DD HH:MM:SS.mmm'
        sqlite_column!("start_time", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("hour", &SqlType::Integer, non_null = true),
        sqlite_column!("day", &SqlType::Integer, non_null = true),
        sqlite_column!("week", &SqlType::Integer, non_null = true), // ISO week
        sqlite_column!("month", &SqlType::Integer, non_null = true),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!("weekday", &SqlType::Integer, non_null = true), // 0=Monday
    ],
    indices: &[],
};

/// Users table - latest known profile and subscription level per user
const USERS_TABLE: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!("user_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("first_name", &SqlType::Text, non_null = true),
        sqlite_column!("last_name", &SqlType::Text, non_null = true),
        sqlite_column!("gender", &SqlType::Text, non_null = true),
        sqlite_column!("level", &SqlType::Text, non_null = true), // 'free', 'paid'
    ],
    indices: &[],
};

// =============================================================================
// Fact Tables
// =============================================================================

const TIME_FK: ForeignKey = ForeignKey {
    foreign_table: "time",
    foreign_column: "start_time",
};

const USER_FK: ForeignKey = ForeignKey {
    foreign_table: "users",
    foreign_column: "user_id",
};

const SONG_FK: ForeignKey = ForeignKey {
    foreign_table: "songs",
    foreign_column: "song_id",
};

const ARTIST_FK: ForeignKey = ForeignKey {
    foreign_table: "artists",
    foreign_column: "artist_id",
};

/// Songplays table - one row per NextSong event
const SONGPLAYS_TABLE: Table = Table {
    name: "songplays",
    columns: &[
        sqlite_column!("songplay_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "start_time",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&TIME_FK)
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("level", &SqlType::Text, non_null = true),
        sqlite_column!("song_id", &SqlType::Text, foreign_key = Some(&SONG_FK)),
        sqlite_column!("artist_id", &SqlType::Text, foreign_key = Some(&ARTIST_FK)),
        sqlite_column!("session_id", &SqlType::Integer, non_null = true),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("user_agent", &SqlType::Text),
    ],
    indices: &[
        ("idx_songplays_start_time", "start_time"),
        ("idx_songplays_user", "user_id"),
    ],
};

/// Raw artist names as they appeared in NextSong events
const LOG_ARTISTS_TABLE: Table = Table {
    name: "log_artists",
    columns: &[
        sqlite_column!("log_artist_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("artist_name", &SqlType::Text, non_null = true),
    ],
    indices: &[],
};

/// Names of the warehouse tables, in creation order.
pub const WAREHOUSE_TABLE_NAMES: &[&str] = &[
    "songs",
    "artists",
    "time",
    "users",
    "songplays",
    "log_artists",
];

pub const WAREHOUSE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        SONGS_TABLE,
        ARTISTS_TABLE,
        TIME_TABLE,
        USERS_TABLE,
        SONGPLAYS_TABLE,
        LOG_ARTISTS_TABLE,
    ],
}];

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn create_schema() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        WAREHOUSE_VERSIONED_SCHEMAS[0].create(&conn).unwrap();
        conn
    }

    #[test]
    fn test_schema_creates_and_validates() {
        let conn = create_schema();
        WAREHOUSE_VERSIONED_SCHEMAS[0].validate(&conn).unwrap();
    }

    #[test]
    fn test_table_names_match_schema() {
        let names: Vec<&str> = WAREHOUSE_VERSIONED_SCHEMAS[0]
            .tables
            .iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, WAREHOUSE_TABLE_NAMES);
    }

    #[test]
    fn test_songplay_requires_known_time_and_user() {
        let conn = create_schema();

        let result = conn.execute(
            "INSERT INTO songplays (start_time, user_id, level, session_id)
             VALUES ('2018-11-03 01:04:33.796', 26, 'free', 583)",
            [],
        );
        assert!(result.is_err());

        conn.execute(
            "INSERT INTO time VALUES ('2018-11-03 01:04:33.796', 1, 3, 44, 11, 2018, 5)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO users VALUES (26, 'Ryan', 'Smith', 'M', 'free')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO songplays (start_time, user_id, level, session_id)
             VALUES ('2018-11-03 01:04:33.796', 26, 'free', 583)",
            [],
        )
        .unwrap();
    }

    #[test]
    fn test_songplay_allows_null_song_and_artist() {
        let conn = create_schema();
        conn.execute(
            "INSERT INTO time VALUES ('2018-11-03 01:04:33.796', 1, 3, 44, 11, 2018, 5)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO users VALUES (26, 'Ryan', 'Smith', 'M', 'free')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id)
             VALUES ('2018-11-03 01:04:33.796', 26, 'free', NULL, NULL, 583)",
            [],
        )
        .unwrap();

        let songplay_id: i64 = conn
            .query_row("SELECT songplay_id FROM songplays", [], |r| r.get(0))
            .unwrap();
        assert_eq!(songplay_id, 1);
    }
}

//! Parameterized statements used by the loader.
//!
//! These are the only write path into the warehouse during an ETL run.
//! Placeholders are positional and follow the column order of each table.

pub const SONG_TABLE_INSERT: &str = "INSERT INTO songs (song_id, title, artist_id, year, duration)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT (song_id) DO NOTHING";

pub const ARTIST_TABLE_INSERT: &str =
    "INSERT INTO artists (artist_id, name, location, latitude, longitude)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT (artist_id) DO NOTHING";

pub const TIME_TABLE_INSERT: &str =
    "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
     ON CONFLICT (start_time) DO NOTHING";

// Later events carry the current subscription level, so they win.
pub const USER_TABLE_INSERT: &str =
    "INSERT INTO users (user_id, first_name, last_name, gender, level)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT (user_id) DO UPDATE SET
         first_name = excluded.first_name,
         last_name = excluded.last_name,
         gender = excluded.gender,
         level = excluded.level";

pub const SONGPLAY_TABLE_INSERT: &str = "INSERT INTO songplays
     (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

pub const LOG_ARTIST_TABLE_INSERT: &str = "INSERT INTO log_artists (artist_name) VALUES (?1)";

/// Finds the (song_id, artist_id) pairs matching a played song exactly.
/// At most two rows are fetched, which is enough to tell a unique match
/// from an ambiguous one.
pub const SONG_SELECT: &str = "SELECT songs.song_id, artists.artist_id
     FROM songs
     JOIN artists ON songs.artist_id = artists.artist_id
     WHERE songs.title = ?1 AND artists.name = ?2 AND songs.duration = ?3
     LIMIT 2";

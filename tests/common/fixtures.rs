//! Builders for song and event log datasets on disk

use super::constants::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub fn song_json(
    song_id: &str,
    title: &str,
    artist_id: &str,
    artist_name: &str,
    duration: f64,
) -> String {
    serde_json::json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": artist_name,
        "song_id": song_id,
        "title": title,
        "duration": duration,
        "year": 0
    })
    .to_string()
}

/// A NextSong event line for user 26.
pub fn play_json(song: &str, artist: &str, length: f64, ts: i64, session_id: i64) -> String {
    serde_json::json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": "Ryan",
        "gender": "M",
        "itemInSession": 0,
        "lastName": "Smith",
        "length": length,
        "level": "free",
        "location": "San Jose-Sunnyvale-Santa Clara, CA",
        "method": "PUT",
        "page": "NextSong",
        "registration": 1541016707796.0,
        "sessionId": session_id,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0 (X11; Linux x86_64)",
        "userId": USER_ID.to_string()
    })
    .to_string()
}

/// A navigation event, which carries no playback.
pub fn home_json(ts: i64) -> String {
    serde_json::json!({
        "artist": null,
        "auth": "Logged In",
        "firstName": "Ryan",
        "gender": "M",
        "itemInSession": 1,
        "lastName": "Smith",
        "length": null,
        "level": "free",
        "location": "San Jose-Sunnyvale-Santa Clara, CA",
        "method": "GET",
        "page": "Home",
        "registration": 1541016707796.0,
        "sessionId": 583,
        "song": null,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0 (X11; Linux x86_64)",
        "userId": USER_ID.to_string()
    })
    .to_string()
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Two song files in the nested layout of the dataset.
pub fn create_song_data() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "A/A/A/TRAAAAW128F429D538.json",
        &song_json(SONG_1_ID, SONG_1_TITLE, ARTIST_1_ID, ARTIST_1_NAME, SONG_1_DURATION),
    );
    write_file(
        dir.path(),
        "A/A/B/TRAABJL12903CDCF1A.json",
        &song_json(SONG_2_ID, SONG_2_TITLE, ARTIST_2_ID, ARTIST_2_NAME, SONG_2_DURATION),
    );
    dir
}

/// One log file: a matching play, a navigation event and an unmatched play.
pub fn create_log_data() -> TempDir {
    let dir = TempDir::new().unwrap();
    let lines = [
        play_json(SONG_1_TITLE, ARTIST_1_NAME, SONG_1_DURATION, PLAY_1_TS, 583),
        home_json(PLAY_1_TS + 1000),
        play_json("Unknown Song", "Unknown Artist", 180.0, PLAY_2_TS, 583),
    ];
    write_file(
        dir.path(),
        "2018/11/2018-11-03-events.json",
        &lines.join("\n"),
    );
    dir
}

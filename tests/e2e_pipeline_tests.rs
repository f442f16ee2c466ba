//! End-to-end tests for the song and log pipelines
//!
//! Runs both datasets against a real warehouse database and checks the
//! resulting tables.

mod common;

use common::{
    count, create_log_data, create_song_data, play_json, write_file, ARTIST_1_ID, ARTIST_1_NAME,
    PLAY_1_START_TIME, PLAY_1_TS, REJECTED_SESSION_ID, SONG_1_DURATION, SONG_1_ID, SONG_1_TITLE,
    USER_ID,
};
use sparkify_etl::etl::RecordPolicy;
use sparkify_etl::{
    Database, EtlError, LogFileTransformer, Pipeline, PipelineOptions, SongFileTransformer,
};
use tempfile::TempDir;

fn run_both(db: &mut Database, songs: &TempDir, logs: &TempDir) {
    let mut pipeline = Pipeline::new(db.connection_mut(), PipelineOptions::default());
    pipeline
        .process_data(songs.path(), &SongFileTransformer)
        .unwrap();
    pipeline
        .process_data(logs.path(), &LogFileTransformer::default())
        .unwrap();
}

// =============================================================================
// Full run
// =============================================================================

#[test]
fn test_full_run_populates_every_table() {
    let songs = create_song_data();
    let logs = create_log_data();
    let mut db = Database::open_in_memory().unwrap();

    run_both(&mut db, &songs, &logs);

    assert_eq!(count(&db, "songs"), 2);
    assert_eq!(count(&db, "artists"), 2);
    assert_eq!(count(&db, "time"), 2);
    assert_eq!(count(&db, "users"), 1);
    assert_eq!(count(&db, "songplays"), 2);
    assert_eq!(count(&db, "log_artists"), 2);
}

#[test]
fn test_matched_play_references_song_and_artist() {
    let songs = create_song_data();
    let logs = create_log_data();
    let mut db = Database::open_in_memory().unwrap();

    run_both(&mut db, &songs, &logs);

    let (song_id, artist_id, user_id, session_id): (Option<String>, Option<String>, i64, i64) = db
        .connection()
        .query_row(
            "SELECT song_id, artist_id, user_id, session_id FROM songplays WHERE start_time = ?1",
            [PLAY_1_START_TIME],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!(song_id.as_deref(), Some(SONG_1_ID));
    assert_eq!(artist_id.as_deref(), Some(ARTIST_1_ID));
    assert_eq!(user_id, USER_ID);
    assert_eq!(session_id, 583);

    let unmatched: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM songplays WHERE song_id IS NULL AND artist_id IS NULL",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(unmatched, 1);
}

#[test]
fn test_time_row_is_decomposed_in_utc() {
    let songs = create_song_data();
    let logs = create_log_data();
    let mut db = Database::open_in_memory().unwrap();

    run_both(&mut db, &songs, &logs);

    let parts: (i64, i64, i64, i64, i64, i64) = db
        .connection()
        .query_row(
            "SELECT hour, day, week, month, year, weekday FROM time WHERE start_time = ?1",
            [PLAY_1_START_TIME],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?)),
        )
        .unwrap();
    assert_eq!(parts, (1, 3, 44, 11, 2018, 5));
}

#[test]
fn test_rerun_on_file_database_adds_only_facts() {
    let songs = create_song_data();
    let logs = create_log_data();
    let db_dir = TempDir::new().unwrap();
    let db_path = db_dir.path().join("sparkify.db");

    let mut db = Database::open(&db_path).unwrap();
    run_both(&mut db, &songs, &logs);
    db.close().unwrap();

    let mut db = Database::open(&db_path).unwrap();
    run_both(&mut db, &songs, &logs);

    // Dimensions are deduplicated, facts are appended on every run
    assert_eq!(count(&db, "songs"), 2);
    assert_eq!(count(&db, "artists"), 2);
    assert_eq!(count(&db, "time"), 2);
    assert_eq!(count(&db, "users"), 1);
    assert_eq!(count(&db, "songplays"), 4);
    assert_eq!(count(&db, "log_artists"), 4);
}

#[test]
fn test_reset_empties_the_warehouse() {
    let songs = create_song_data();
    let logs = create_log_data();
    let mut db = Database::open_in_memory().unwrap();
    run_both(&mut db, &songs, &logs);

    db.reset().unwrap();

    for (table, rows) in db.table_counts().unwrap() {
        assert_eq!(rows, 0, "table {} not empty after reset", table);
    }
}

#[test]
fn test_logs_before_songs_leave_plays_unresolved() {
    let songs = create_song_data();
    let logs = create_log_data();
    let mut db = Database::open_in_memory().unwrap();

    let mut pipeline = Pipeline::new(db.connection_mut(), PipelineOptions::default());
    let log_stats = pipeline
        .process_data(logs.path(), &LogFileTransformer::default())
        .unwrap();
    pipeline
        .process_data(songs.path(), &SongFileTransformer)
        .unwrap();

    assert_eq!(log_stats.resolved, 0);
    assert_eq!(log_stats.unresolved, 2);
    let resolved: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM songplays WHERE song_id IS NOT NULL",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(resolved, 0);
}

// =============================================================================
// Failure handling
// =============================================================================

/// Three log files of ten plays each. The fourth play of the second file
/// uses the session id refused by `install_rejecting_trigger`.
fn create_log_data_with_rejected_play() -> TempDir {
    let dir = TempDir::new().unwrap();
    for (file_index, day) in ["2018-11-01", "2018-11-02", "2018-11-03"].iter().enumerate() {
        let lines: Vec<String> = (0..10)
            .map(|i| {
                let session_id = if file_index == 1 && i == 3 {
                    REJECTED_SESSION_ID
                } else {
                    100 + file_index as i64
                };
                let ts = PLAY_1_TS + (file_index as i64 * 10 + i) * 1000;
                play_json(SONG_1_TITLE, ARTIST_1_NAME, SONG_1_DURATION, ts, session_id)
            })
            .collect();
        write_file(dir.path(), &format!("{}-events.json", day), &lines.join("\n"));
    }
    dir
}

fn install_rejecting_trigger(db: &Database) {
    db.connection()
        .execute_batch(&format!(
            "CREATE TRIGGER reject_session BEFORE INSERT ON songplays
             WHEN NEW.session_id = {}
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            REJECTED_SESSION_ID
        ))
        .unwrap();
}

#[test]
fn test_failing_statement_rolls_back_file_and_stops_run() {
    let logs = create_log_data_with_rejected_play();
    let mut db = Database::open_in_memory().unwrap();
    install_rejecting_trigger(&db);

    let result = Pipeline::new(db.connection_mut(), PipelineOptions::default())
        .process_data(logs.path(), &LogFileTransformer::default());

    assert!(matches!(result, Err(EtlError::Statement(_))));
    // Only the first file is committed, its three predecessors in the
    // failing file are rolled back and the third file is never read
    assert_eq!(count(&db, "songplays"), 10);
    assert_eq!(count(&db, "time"), 10);
    assert_eq!(count(&db, "log_artists"), 10);
    let second_file_sessions: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM songplays WHERE session_id <> 100",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(second_file_sessions, 0);
}

#[test]
fn test_continue_on_error_skips_rejected_file() {
    let logs = create_log_data_with_rejected_play();
    let mut db = Database::open_in_memory().unwrap();
    install_rejecting_trigger(&db);

    let options = PipelineOptions {
        continue_on_error: true,
        ..Default::default()
    };
    let stats = Pipeline::new(db.connection_mut(), options)
        .process_data(logs.path(), &LogFileTransformer::default())
        .unwrap();

    assert_eq!(stats.files_found, 3);
    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.files_failed, 1);
    assert_eq!(count(&db, "songplays"), 20);
    let second_file_sessions: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM songplays WHERE session_id = 101",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(second_file_sessions, 0);
}

#[test]
fn test_malformed_record_policy() {
    let logs = TempDir::new().unwrap();
    let lines = [
        play_json(SONG_1_TITLE, ARTIST_1_NAME, SONG_1_DURATION, PLAY_1_TS, 7),
        r#"{"page":"NextSong","ts":1541207150796,"userId":"26"}"#.to_string(),
        play_json(SONG_1_TITLE, ARTIST_1_NAME, SONG_1_DURATION, PLAY_1_TS + 5000, 7),
    ];
    write_file(logs.path(), "events.json", &lines.join("\n"));

    let mut db = Database::open_in_memory().unwrap();
    let result = Pipeline::new(db.connection_mut(), PipelineOptions::default())
        .process_data(logs.path(), &LogFileTransformer::default());
    let err = result.unwrap_err();
    assert!(err.is_malformed_record());
    assert!(err.to_string().contains("line 2"));
    assert_eq!(count(&db, "songplays"), 0);

    let stats = Pipeline::new(db.connection_mut(), PipelineOptions::default())
        .process_data(logs.path(), &LogFileTransformer::new(RecordPolicy::Skip))
        .unwrap();
    assert_eq!(stats.records, 3);
    assert_eq!(stats.loaded, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(count(&db, "songplays"), 2);
}

#[test]
fn test_refuses_foreign_database() {
    let db_dir = TempDir::new().unwrap();
    let db_path = db_dir.path().join("other.db");
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute_batch("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT);")
        .unwrap();
    drop(conn);

    let err = Database::open(&db_path).err().unwrap();
    assert!(err.to_string().contains("not created by this tool"));
}

//! Shared constants for end-to-end tests
//!
//! The fixture datasets are built from these values, so tests can assert on
//! them without repeating literals.

// ============================================================================
// Song dataset
// ============================================================================

/// Song that the event log plays, with an exactly matching duration
pub const SONG_1_ID: &str = "SOUPIRU12A6D4FA1E1";
pub const SONG_1_TITLE: &str = "Der Kleine Dompfaff";
pub const SONG_1_DURATION: f64 = 152.92036;

/// Artist of song 1
pub const ARTIST_1_ID: &str = "ARJIE2Y1187B994AB7";
pub const ARTIST_1_NAME: &str = "Line Renaud";

/// Song that nobody plays
pub const SONG_2_ID: &str = "SOMZWCG12A8C13C480";
pub const SONG_2_TITLE: &str = "I Didn't Mean To";
pub const SONG_2_DURATION: f64 = 218.93179;

/// Artist of song 2
pub const ARTIST_2_ID: &str = "ARD7TVE1187B99BFB1";
pub const ARTIST_2_NAME: &str = "Casual";

// ============================================================================
// Log dataset
// ============================================================================

/// 2018-11-03 01:04:33.796 UTC
pub const PLAY_1_TS: i64 = 1541207073796;
pub const PLAY_1_START_TIME: &str = "2018-11-03 01:04:33.796";

/// 2018-11-03 01:05:50.796 UTC
pub const PLAY_2_TS: i64 = 1541207150796;

pub const USER_ID: i64 = 26;

/// Session id that the rejecting trigger refuses
pub const REJECTED_SESSION_ID: i64 = 999;

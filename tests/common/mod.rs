//! Common test infrastructure
//!
//! Builds song and event log datasets in temporary directories and reads
//! back what ended up in the warehouse. Tests should only import from this
//! module, not from internal submodules.

mod constants;
mod fixtures;

pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{
    create_log_data, create_song_data, home_json, play_json, song_json, write_file,
};

use sparkify_etl::Database;

/// Row count of one warehouse table.
#[allow(dead_code)]
pub fn count(db: &Database, table: &str) -> i64 {
    db.connection()
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .unwrap()
}

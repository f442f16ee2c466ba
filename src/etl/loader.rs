//! The write path into the warehouse.

use super::rows::InsertRow;
use crate::error::EtlError;
use crate::warehouse::queries::SONG_SELECT;
use rusqlite::{params, ToSql, Transaction};

/// Outcome of looking up a played song in the loaded songs and artists.
#[derive(Debug, Clone, PartialEq)]
pub enum SongMatch {
    Unique { song_id: String, artist_id: String },
    NotFound,
    /// More than one song matched; treated like no match.
    Ambiguous,
}

impl SongMatch {
    /// The (song_id, artist_id) pair to store on a songplay, both `None`
    /// unless the match was unique.
    pub fn into_ids(self) -> (Option<String>, Option<String>) {
        match self {
            SongMatch::Unique { song_id, artist_id } => (Some(song_id), Some(artist_id)),
            SongMatch::NotFound | SongMatch::Ambiguous => (None, None),
        }
    }
}

/// Executes statements inside a transaction owned by the caller.
///
/// Implementations never commit; the pipeline commits once per file.
pub trait Loader {
    /// Executes one parameterized statement, returning the number of changed rows.
    fn execute(&mut self, statement: &str, params: &[&dyn ToSql]) -> Result<usize, EtlError>;

    /// Exact-equality lookup on (song title, artist name, song duration).
    fn find_song(
        &mut self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<SongMatch, EtlError>;

    fn insert(&mut self, row: &dyn InsertRow) -> Result<usize, EtlError> {
        self.execute(row.statement(), &row.params())
    }
}

impl Loader for Transaction<'_> {
    fn execute(&mut self, statement: &str, params: &[&dyn ToSql]) -> Result<usize, EtlError> {
        let mut stmt = self.prepare_cached(statement)?;
        Ok(stmt.execute(params)?)
    }

    fn find_song(
        &mut self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<SongMatch, EtlError> {
        let mut stmt = self.prepare_cached(SONG_SELECT)?;
        let matches = stmt
            .query_map(params![title, artist_name, duration], |r| {
                Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut matches = matches.into_iter();
        Ok(match (matches.next(), matches.next()) {
            (None, _) => SongMatch::NotFound,
            (Some((song_id, artist_id)), None) => SongMatch::Unique { song_id, artist_id },
            (Some(_), Some(_)) => SongMatch::Ambiguous,
        })
    }
}

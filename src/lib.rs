//! Sparkify ETL Library
//!
//! Loads the song metadata and user event log datasets into a SQLite
//! analytics warehouse. Exposed as a library for the binary and for tests.

pub mod config;
pub mod discovery;
pub mod error;
pub mod etl;
pub mod sqlite_persistence;
pub mod warehouse;

pub use error::EtlError;
pub use etl::{LogFileTransformer, Pipeline, PipelineOptions, RunStats, SongFileTransformer};
pub use warehouse::Database;

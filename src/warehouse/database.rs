//! Owner of the warehouse SQLite connection.

use super::schema::{WAREHOUSE_TABLE_NAMES, WAREHOUSE_VERSIONED_SCHEMAS};
use crate::sqlite_persistence::{read_schema_version, VersionedSchema};
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// The warehouse database.
///
/// Opening it creates the schema on a brand new file and validates it on an
/// existing one. The connection is closed when the value is dropped, or
/// explicitly through [`Database::close`] to observe close errors.
pub struct Database {
    conn: Connection,
}

fn latest_schema() -> &'static VersionedSchema {
    &WAREHOUSE_VERSIONED_SCHEMAS[WAREHOUSE_VERSIONED_SCHEMAS.len() - 1]
}

/// Drops the warehouse tables, whatever their current shape, and creates the
/// latest schema. Foreign keys are off while dropping so that stale
/// constraints cannot block it.
fn rebuild_schema(conn: &mut Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", false)?;
    let rebuilt = drop_and_create(conn);
    conn.pragma_update(None, "foreign_keys", true)?;
    rebuilt
}

fn drop_and_create(conn: &mut Connection) -> Result<()> {
    let schema = latest_schema();
    let tx = conn.transaction()?;
    schema.drop(&tx)?;
    schema.create(&tx)?;
    tx.commit()?;
    info!("Warehouse schema rebuilt at version {}", schema.version);
    Ok(())
}

fn initialize_schema(conn: &mut Connection, reset: bool) -> Result<()> {
    if reset {
        return rebuild_schema(conn);
    }
    conn.pragma_update(None, "foreign_keys", true)?;

    let latest_schema = latest_schema();
    let latest_version = latest_schema.version;

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating warehouse schema at version {}", latest_version);
        let tx = conn.transaction()?;
        latest_schema.create(&tx)?;
        tx.commit()?;
        return Ok(());
    }

    match read_schema_version(conn)? {
        Some(version) if version == latest_version => {}
        Some(version) => bail!(
            "Warehouse schema version {} is not supported (expected {}), rerun with --reset-schema to rebuild it",
            version,
            latest_version
        ),
        None => bail!(
            "Database was not created by this tool, refusing to load into it (--reset-schema rebuilds the warehouse tables)"
        ),
    }

    latest_schema
        .validate(conn)
        .context("Warehouse schema validation failed, rerun with --reset-schema to rebuild it")?;
    debug!("Warehouse schema version {} validated", latest_version);
    Ok(())
}

impl Database {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        Self::open_with_reset(db_path, false)
    }

    /// Opens the warehouse, first dropping and recreating every warehouse
    /// table when `reset` is set. A reset skips the version check and
    /// validation, so it also recovers a stale or mismatched schema.
    pub fn open_with_reset<P: AsRef<Path>>(db_path: P, reset: bool) -> Result<Self> {
        let db_path = db_path.as_ref();
        let mut conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open warehouse database {:?}", db_path))?;
        initialize_schema(&mut conn, reset)?;
        Ok(Database { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        initialize_schema(&mut conn, false)?;
        Ok(Database { conn })
    }

    /// Drops every warehouse table and recreates the schema, empty.
    pub fn reset(&mut self) -> Result<()> {
        rebuild_schema(&mut self.conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Row count of each warehouse table, in creation order.
    pub fn table_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        WAREHOUSE_TABLE_NAMES
            .iter()
            .map(|name| {
                let count: i64 =
                    self.conn
                        .query_row(&format!("SELECT COUNT(*) FROM {}", name), [], |r| {
                            r.get(0)
                        })?;
                Ok((*name, count))
            })
            .collect()
    }

    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("Failed to close warehouse database")
    }
}

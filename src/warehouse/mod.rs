mod database;
pub mod queries;
mod schema;

pub use database::Database;
pub use schema::{WAREHOUSE_TABLE_NAMES, WAREHOUSE_VERSIONED_SCHEMAS};

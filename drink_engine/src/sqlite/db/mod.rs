//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! The interactions are plain functions that accept a `&mut SqliteConnection` argument. Callers can obtain a
//! connection from a pool, or open a transaction, and call through to the functions without any other changes.
use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod drinks;

/// Opens a connection pool. The database file is created if it does not exist yet.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

//! Melodex Storage
//!
//! `SQLite` persistence layer for the Melodex audio index.
//!
//! This crate owns the schema (tracks plus the derived albums/artists/genres
//! tables, playlists, and the artwork cache) and exposes one module per
//! feature, each with its own queries.
//!
//! # Architecture
//!
//! - **Single writer**: the pool is capped at one connection, so every
//!   statement and transaction is serialized through it
//! - **Vertical slicing**: each feature owns its own queries and logic
//! - **Derived tables**: albums, artists, and genres are rebuilt wholesale
//!   from the tracks table by [`aggregate::recompute`]
//!
//! # Example
//!
//! ```rust,no_run
//! use melodex_storage::{create_pool, init_schema};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite:///home/me/.local/share/melodex/index.db").await?;
//! init_schema(&pool).await?;
//!
//! let tracks = melodex_storage::tracks::query(&pool, &melodex_core::QueryParams::new()).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod schema;

// Vertical slices
pub mod albums;
pub mod artists;
pub mod artwork;
pub mod genres;
pub mod playlists;
pub mod tracks;

// Derived-table rebuild
pub mod aggregate;

pub use error::{Result, StorageError};
pub use schema::init_schema;

use sqlx::sqlite::SqlitePool;

/// Create a new `SQLite` pool
///
/// The pool is limited to a single connection: the index has exactly one
/// writer at a time and `SQLite` serializes writes anyway, so one shared
/// connection keeps transactions and prepared-statement reuse simple.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://melodex.db`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
    use std::str::FromStr;

    tracing::debug!("Creating pool with URL: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30))
        .pragma("cache_size", "10000")
        .pragma("temp_store", "MEMORY");

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    tracing::debug!("Pool created");

    Ok(pool)
}

//! Artwork cache
//!
//! Extracted artwork blobs keyed by (owner id, kind, format). Entries live
//! independently of the track rows they were extracted from; a track being
//! re-indexed or deleted does not invalidate its cached artwork.

use crate::Result;
use melodex_core::types::ArtworkKind;
use sqlx::{Row, SqlitePool};

/// Store (or replace) an artwork blob
pub async fn cache(
    pool: &SqlitePool,
    id: i64,
    kind: ArtworkKind,
    format: &str,
    data: &[u8],
) -> Result<()> {
    sqlx::query(
        "INSERT OR REPLACE INTO artwork_cache (id, type, format, data, cached_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(kind.as_i64())
    .bind(format)
    .bind(data)
    .bind(chrono::Utc::now().timestamp())
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a cached artwork blob, if present and non-empty
pub async fn get(
    pool: &SqlitePool,
    id: i64,
    kind: ArtworkKind,
    format: &str,
) -> Result<Option<Vec<u8>>> {
    let row = sqlx::query("SELECT data FROM artwork_cache WHERE id = ? AND type = ? AND format = ?")
        .bind(id)
        .bind(kind.as_i64())
        .bind(format)
        .fetch_optional(pool)
        .await?;

    Ok(row
        .map(|row| row.get::<Vec<u8>, _>("data"))
        .filter(|data| !data.is_empty()))
}

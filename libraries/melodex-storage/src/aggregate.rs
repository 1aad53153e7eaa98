//! Derived-table rebuild
//!
//! Albums, genres, and artists are views over the tracks table that are
//! materialized for cheap listing. They are replaced wholesale after every
//! scan inside one transaction, so readers only ever see a complete
//! generation.

use crate::artists::split::{self, ArtistResolver};
use crate::Result;
use sqlx::SqlitePool;

/// Rebuild albums, genres, and artists from the current tracks table
///
/// Album year bounds only consider strictly-positive years, so files with
/// an unknown year (stored as 0) never drag `first_year` down. Returns the
/// [`ArtistResolver`] for the freshly built artist generation.
pub async fn recompute(pool: &SqlitePool) -> Result<ArtistResolver> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM albums").execute(&mut *tx).await?;
    sqlx::query(
        r#"
        INSERT INTO albums (id, name, artist, artist_id, num_tracks, first_year, last_year)
        SELECT
            album_id,
            album,
            artist,
            artist_id,
            COUNT(*),
            COALESCE(MIN(CASE WHEN year > 0 THEN year END), 0),
            COALESCE(MAX(CASE WHEN year > 0 THEN year END), 0)
        FROM tracks
        GROUP BY album_id
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM genres").execute(&mut *tx).await?;
    sqlx::query(
        r#"
        INSERT INTO genres (id, name, num_tracks)
        SELECT genre_id, genre, COUNT(*)
        FROM tracks
        GROUP BY genre_id
        "#,
    )
    .execute(&mut *tx)
    .await?;

    let resolver = split::rebuild(&mut tx).await?;

    tx.commit().await?;

    tracing::info!("Aggregated tables rebuilt");
    Ok(resolver)
}

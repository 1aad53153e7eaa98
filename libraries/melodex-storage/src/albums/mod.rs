//! Album queries
//!
//! Albums are derived rows: the scanner rebuilds them from the tracks table
//! after every scan, so this module is read-only.

use crate::{tracks, Result};
use melodex_core::types::*;
use melodex_core::SortOrder;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// All albums, sorted by name
pub async fn all(pool: &SqlitePool, order: SortOrder) -> Result<Vec<Album>> {
    let sql = match order {
        SortOrder::Asc => {
            "SELECT id, name, artist, artist_id, num_tracks, first_year, last_year \
             FROM albums ORDER BY name COLLATE NOCASE ASC"
        }
        SortOrder::Desc => {
            "SELECT id, name, artist, artist_id, num_tracks, first_year, last_year \
             FROM albums ORDER BY name COLLATE NOCASE DESC"
        }
    };

    let rows = sqlx::query(sql).fetch_all(pool).await?;

    Ok(rows.iter().map(album_from_row).collect())
}

/// Get an album by id
pub async fn get_by_id(pool: &SqlitePool, id: AlbumId) -> Result<Option<Album>> {
    let row = sqlx::query(
        "SELECT id, name, artist, artist_id, num_tracks, first_year, last_year \
         FROM albums WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| album_from_row(&row)))
}

/// Albums whose derived artist id matches (raw credits only)
pub async fn for_artist(
    pool: &SqlitePool,
    artist_id: ArtistId,
    order: SortOrder,
) -> Result<Vec<Album>> {
    let sql = match order {
        SortOrder::Asc => {
            "SELECT id, name, artist, artist_id, num_tracks, first_year, last_year \
             FROM albums WHERE artist_id = ? ORDER BY name COLLATE NOCASE ASC"
        }
        SortOrder::Desc => {
            "SELECT id, name, artist, artist_id, num_tracks, first_year, last_year \
             FROM albums WHERE artist_id = ? ORDER BY name COLLATE NOCASE DESC"
        }
    };

    let rows = sqlx::query(sql).bind(artist_id).fetch_all(pool).await?;

    Ok(rows.iter().map(album_from_row).collect())
}

/// Albums containing any track with one of the given artist credits
///
/// This is the split-identity path: the album table itself only knows the
/// raw credit, so the lookup goes through the tracks table first.
pub async fn for_credits(
    pool: &SqlitePool,
    credits: &[String],
    order: SortOrder,
) -> Result<Vec<Album>> {
    let album_ids = tracks::album_ids_for_credits(pool, credits).await?;

    let mut results = Vec::with_capacity(album_ids.len());
    for album_id in album_ids {
        if let Some(album) = get_by_id(pool, album_id).await? {
            results.push(album);
        }
    }

    results.sort_by(|a, b| {
        let cmp = a.name.to_lowercase().cmp(&b.name.to_lowercase());
        match order {
            SortOrder::Asc => cmp,
            SortOrder::Desc => cmp.reverse(),
        }
    });

    Ok(results)
}

fn album_from_row(row: &SqliteRow) -> Album {
    Album {
        id: row.get("id"),
        name: row.get("name"),
        artist: row.get::<Option<String>, _>("artist").unwrap_or_default(),
        artist_id: row.get::<Option<i64>, _>("artist_id").unwrap_or_default(),
        num_tracks: row.get("num_tracks"),
        first_year: row.get::<Option<i32>, _>("first_year").unwrap_or_default(),
        last_year: row.get::<Option<i32>, _>("last_year").unwrap_or_default(),
    }
}

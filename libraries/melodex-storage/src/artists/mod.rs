//! Artist queries
//!
//! The artists table holds both raw-credit identities (positive ids) and
//! split identities extracted from multi-artist credits (negative ids).
//! Rows are rebuilt wholesale by [`split::rebuild`] after every scan.

pub mod split;

use crate::Result;
use melodex_core::types::*;
use melodex_core::SortOrder;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// All artists, sorted by name
pub async fn all(pool: &SqlitePool, order: SortOrder) -> Result<Vec<Artist>> {
    let sql = match order {
        SortOrder::Asc => {
            "SELECT id, name, num_albums, num_tracks FROM artists ORDER BY name COLLATE NOCASE ASC"
        }
        SortOrder::Desc => {
            "SELECT id, name, num_albums, num_tracks FROM artists ORDER BY name COLLATE NOCASE DESC"
        }
    };

    let rows = sqlx::query(sql).fetch_all(pool).await?;

    Ok(rows.iter().map(artist_from_row).collect())
}

/// Get an artist by id (works for both raw and split identities)
pub async fn get_by_id(pool: &SqlitePool, id: ArtistId) -> Result<Option<Artist>> {
    let row = sqlx::query("SELECT id, name, num_albums, num_tracks FROM artists WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| artist_from_row(&row)))
}

fn artist_from_row(row: &SqliteRow) -> Artist {
    Artist {
        id: row.get("id"),
        name: row.get("name"),
        num_albums: row.get("num_albums"),
        num_tracks: row.get("num_tracks"),
    }
}

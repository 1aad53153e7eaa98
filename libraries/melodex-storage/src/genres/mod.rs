//! Genre queries (derived rows, read-only)

use crate::Result;
use melodex_core::types::*;
use melodex_core::SortOrder;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// All genres, sorted by name
pub async fn all(pool: &SqlitePool, order: SortOrder) -> Result<Vec<Genre>> {
    let sql = match order {
        SortOrder::Asc => "SELECT id, name, num_tracks FROM genres ORDER BY name COLLATE NOCASE ASC",
        SortOrder::Desc => "SELECT id, name, num_tracks FROM genres ORDER BY name COLLATE NOCASE DESC",
    };

    let rows = sqlx::query(sql).fetch_all(pool).await?;

    Ok(rows.iter().map(genre_from_row).collect())
}

/// Get a genre by id
pub async fn get_by_id(pool: &SqlitePool, id: GenreId) -> Result<Option<Genre>> {
    let row = sqlx::query("SELECT id, name, num_tracks FROM genres WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| genre_from_row(&row)))
}

fn genre_from_row(row: &SqliteRow) -> Genre {
    Genre {
        id: row.get("id"),
        name: row.get("name"),
        num_tracks: row.get("num_tracks"),
    }
}

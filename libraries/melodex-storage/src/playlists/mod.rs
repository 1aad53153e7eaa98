//! Playlist queries
//!
//! Positions within a playlist are contiguous `0..n-1`. Every multi-step
//! mutation runs in a transaction so a failure can never leave a gap or a
//! duplicate position behind.

use crate::{tracks, Result, StorageError};
use melodex_core::types::*;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Create a playlist, returning `None` if the name is already taken
pub async fn create(pool: &SqlitePool, name: &str) -> Result<Option<PlaylistId>> {
    let now = now_ms();
    let result = sqlx::query(
        "INSERT INTO playlists (name, date_added, date_modified, num_tracks) VALUES (?, ?, ?, 0)",
    )
    .bind(name)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await;

    match result {
        Ok(done) => Ok(Some(done.last_insert_rowid())),
        Err(sqlx::Error::Database(e)) if e.kind() == sqlx::error::ErrorKind::UniqueViolation => {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Rename a playlist; returns false if the playlist does not exist
pub async fn rename(pool: &SqlitePool, id: PlaylistId, new_name: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE playlists SET name = ?, date_modified = ? WHERE id = ?")
        .bind(new_name)
        .bind(now_ms())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a playlist and all of its items (FK cascade)
pub async fn delete(pool: &SqlitePool, id: PlaylistId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// All playlists, sorted by name
pub async fn all(pool: &SqlitePool) -> Result<Vec<Playlist>> {
    let rows = sqlx::query(
        "SELECT id, name, data, date_added, date_modified, num_tracks FROM playlists ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(playlist_from_row).collect())
}

/// Get a playlist by id
pub async fn get_by_id(pool: &SqlitePool, id: PlaylistId) -> Result<Option<Playlist>> {
    let row = sqlx::query(
        "SELECT id, name, data, date_added, date_modified, num_tracks FROM playlists WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| playlist_from_row(&row)))
}

/// Append a track to the end of a playlist
///
/// Returns true if the track was added, false if it was already present.
/// The denormalized track count and modification time are only touched on
/// an actual insert.
pub async fn add_track(pool: &SqlitePool, playlist_id: PlaylistId, track_id: TrackId) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let next_position: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position), -1) + 1 FROM playlist_items WHERE playlist_id = ?",
    )
    .bind(playlist_id)
    .fetch_one(&mut *tx)
    .await?;

    let now = now_ms();
    let inserted = sqlx::query(
        "INSERT OR IGNORE INTO playlist_items (playlist_id, track_id, position, date_added) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(playlist_id)
    .bind(track_id)
    .bind(next_position)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let added = inserted.rows_affected() > 0;
    if added {
        sqlx::query(
            "UPDATE playlists SET num_tracks = num_tracks + 1, date_modified = ? WHERE id = ?",
        )
        .bind(now)
        .bind(playlist_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(added)
}

/// Remove a track from a playlist and close the position gap
pub async fn remove_track(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    track_id: TrackId,
) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM playlist_items WHERE playlist_id = ? AND track_id = ?")
        .bind(playlist_id)
        .bind(track_id)
        .execute(&mut *tx)
        .await?;

    let removed = removed.rows_affected() > 0;
    if removed {
        // Renumber so positions stay contiguous
        sqlx::query(
            r#"
            UPDATE playlist_items
            SET position = (
                SELECT COUNT(*)
                FROM playlist_items other
                WHERE other.playlist_id = playlist_items.playlist_id
                  AND other.position < playlist_items.position
            )
            WHERE playlist_id = ?
            "#,
        )
        .bind(playlist_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE playlists SET num_tracks = num_tracks - 1, date_modified = ? WHERE id = ?",
        )
        .bind(now_ms())
        .bind(playlist_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(removed)
}

/// Move the item at `from` to position `to`, shifting everything between
///
/// The moved row is parked at position -1 while the range shifts, so the
/// unique (playlist, position) ordering never has two rows colliding even
/// transiently. Rolls back entirely on any failure. Moving an item onto
/// its own position is accepted as a no-op rather than rejected.
pub async fn move_track(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    from: i64,
    to: i64,
) -> Result<()> {
    if from == to {
        return Ok(());
    }
    if from < 0 || to < 0 {
        return Err(StorageError::invalid_input(format!(
            "playlist positions must be non-negative (from={from}, to={to})"
        )));
    }

    let mut tx = pool.begin().await?;

    // A target past the end would land the row beyond n-1 and leave a gap
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM playlist_items WHERE playlist_id = ?")
            .bind(playlist_id)
            .fetch_one(&mut *tx)
            .await?;
    if to >= count {
        return Err(StorageError::invalid_input(format!(
            "target position {to} is out of range for a playlist of {count} items"
        )));
    }

    let parked = sqlx::query(
        "UPDATE playlist_items SET position = -1 WHERE playlist_id = ? AND position = ?",
    )
    .bind(playlist_id)
    .bind(from)
    .execute(&mut *tx)
    .await?;

    if parked.rows_affected() == 0 {
        return Err(StorageError::not_found(
            "playlist item",
            format!("playlist {playlist_id} position {from}"),
        ));
    }

    if from < to {
        // Moving down: pull the range up by one
        sqlx::query(
            "UPDATE playlist_items SET position = position - 1 \
             WHERE playlist_id = ? AND position > ? AND position <= ?",
        )
        .bind(playlist_id)
        .bind(from)
        .bind(to)
        .execute(&mut *tx)
        .await?;
    } else {
        // Moving up: push the range down by one
        sqlx::query(
            "UPDATE playlist_items SET position = position + 1 \
             WHERE playlist_id = ? AND position >= ? AND position < ?",
        )
        .bind(playlist_id)
        .bind(to)
        .bind(from)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("UPDATE playlist_items SET position = ? WHERE playlist_id = ? AND position = -1")
        .bind(to)
        .bind(playlist_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE playlists SET date_modified = ? WHERE id = ?")
        .bind(now_ms())
        .bind(playlist_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Tracks in a playlist, in position order
pub async fn tracks_of(pool: &SqlitePool, playlist_id: PlaylistId) -> Result<Vec<Track>> {
    let rows = sqlx::query(
        r#"
        SELECT t.* FROM tracks t
        JOIN playlist_items pi ON t.id = pi.track_id
        WHERE pi.playlist_id = ?
        ORDER BY pi.position
        "#,
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(tracks::track_from_row).collect())
}

fn playlist_from_row(row: &SqliteRow) -> Playlist {
    Playlist {
        id: row.get("id"),
        name: row.get("name"),
        data: row.get::<Option<String>, _>("data").unwrap_or_default(),
        date_added: row.get("date_added"),
        date_modified: row.get("date_modified"),
        num_tracks: row.get("num_tracks"),
    }
}

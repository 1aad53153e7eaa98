//! Track queries
//!
//! Write operations take any `SQLite` executor so scan batches can run all
//! their upserts and deletes inside a single transaction.

use crate::Result;
use melodex_core::types::*;
use melodex_core::{QueryParams, SortKey, SortOrder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

/// Insert a track or update the existing row with the same id
///
/// The id is a pure function of the path, so this doubles as
/// upsert-by-path. `ON CONFLICT DO UPDATE` keeps the rowid stable, which
/// keeps playlist membership intact across rescans.
pub async fn upsert<'e, E>(executor: E, track: &Track) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO tracks (
            id, path, mtime, size, display_name, display_name_no_ext,
            extension, uri, title, artist, album, genre, year, track_no,
            duration_ms, album_id, artist_id, genre_id, date_added,
            date_modified, is_music
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            path = excluded.path,
            mtime = excluded.mtime,
            size = excluded.size,
            display_name = excluded.display_name,
            display_name_no_ext = excluded.display_name_no_ext,
            extension = excluded.extension,
            uri = excluded.uri,
            title = excluded.title,
            artist = excluded.artist,
            album = excluded.album,
            genre = excluded.genre,
            year = excluded.year,
            track_no = excluded.track_no,
            duration_ms = excluded.duration_ms,
            album_id = excluded.album_id,
            artist_id = excluded.artist_id,
            genre_id = excluded.genre_id,
            date_added = excluded.date_added,
            date_modified = excluded.date_modified,
            is_music = excluded.is_music
        "#,
    )
    .bind(track.id)
    .bind(&track.path)
    .bind(track.mtime)
    .bind(track.size)
    .bind(&track.display_name)
    .bind(&track.display_name_no_ext)
    .bind(&track.extension)
    .bind(&track.uri)
    .bind(&track.title)
    .bind(&track.artist)
    .bind(&track.album)
    .bind(&track.genre)
    .bind(track.year)
    .bind(track.track_no)
    .bind(track.duration_ms)
    .bind(track.album_id)
    .bind(track.artist_id)
    .bind(track.genre_id)
    .bind(track.date_added)
    .bind(track.date_modified)
    .bind(i64::from(track.is_music))
    .execute(executor)
    .await?;

    Ok(())
}

/// Delete a track by id
pub async fn delete<'e, E>(executor: E, id: TrackId) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a track by path
pub async fn delete_by_path<'e, E>(executor: E, path: &str) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM tracks WHERE path = ?")
        .bind(path)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Get a track by id
pub async fn get_by_id(pool: &SqlitePool, id: TrackId) -> Result<Option<Track>> {
    let row = sqlx::query("SELECT * FROM tracks WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| track_from_row(&row)))
}

/// Get a track by path
pub async fn get_by_path(pool: &SqlitePool, path: &str) -> Result<Option<Track>> {
    let row = sqlx::query("SELECT * FROM tracks WHERE path = ?")
        .bind(path)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| track_from_row(&row)))
}

/// All indexed paths, sorted
pub async fn all_paths(pool: &SqlitePool) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT path FROM tracks ORDER BY path")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|row| row.get("path")).collect())
}

/// Per-file records for change detection, optionally restricted to a prefix
pub async fn file_entries(pool: &SqlitePool, prefix: Option<&str>) -> Result<Vec<FileEntry>> {
    let rows = match prefix {
        Some(prefix) => {
            sqlx::query("SELECT id, path, mtime FROM tracks WHERE path LIKE ?")
                .bind(format!("{prefix}%"))
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query("SELECT id, path, mtime FROM tracks")
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows
        .into_iter()
        .map(|row| FileEntry {
            id: row.get("id"),
            path: row.get("path"),
            mtime: row.get("mtime"),
        })
        .collect())
}

/// Number of indexed tracks
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Query tracks with optional filters, sorting, and paging
///
/// All filter values are bound parameters; only column names and sort
/// direction are interpolated, and those come from closed enums.
pub async fn query(pool: &SqlitePool, params: &QueryParams) -> Result<Vec<Track>> {
    enum Bind {
        Int(i64),
        Text(String),
    }

    let mut conditions: Vec<&str> = Vec::new();
    let mut binds: Vec<Bind> = Vec::new();

    if let Some(prefix) = &params.path_prefix {
        conditions.push("path LIKE ?");
        binds.push(Bind::Text(format!("{prefix}%")));
    }
    if let Some(artist_id) = params.artist_id {
        conditions.push("artist_id = ?");
        binds.push(Bind::Int(artist_id));
    }
    if let Some(album_id) = params.album_id {
        conditions.push("album_id = ?");
        binds.push(Bind::Int(album_id));
    }
    if let Some(genre_id) = params.genre_id {
        conditions.push("genre_id = ?");
        binds.push(Bind::Int(genre_id));
    }
    if let Some(search) = &params.search {
        conditions.push("(title LIKE ? OR artist LIKE ? OR album LIKE ?)");
        let pattern = format!("%{search}%");
        binds.push(Bind::Text(pattern.clone()));
        binds.push(Bind::Text(pattern.clone()));
        binds.push(Bind::Text(pattern));
    }

    let mut sql = String::from("SELECT * FROM tracks");
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    sql.push_str(" ORDER BY ");
    sql.push_str(sort_column(params.sort));
    if params.ignore_case && params.sort.is_text() {
        sql.push_str(" COLLATE NOCASE");
    }
    sql.push_str(match params.order {
        SortOrder::Asc => " ASC",
        SortOrder::Desc => " DESC",
    });

    match (params.limit, params.offset) {
        (Some(limit), Some(offset)) => {
            sql.push_str(" LIMIT ? OFFSET ?");
            binds.push(Bind::Int(limit));
            binds.push(Bind::Int(offset));
        }
        (Some(limit), None) => {
            sql.push_str(" LIMIT ?");
            binds.push(Bind::Int(limit));
        }
        (None, Some(offset)) => {
            // SQLite needs a LIMIT clause to accept OFFSET; -1 is unbounded
            sql.push_str(" LIMIT -1 OFFSET ?");
            binds.push(Bind::Int(offset));
        }
        (None, None) => {}
    }

    let mut query = sqlx::query(&sql);
    for bind in binds {
        query = match bind {
            Bind::Int(value) => query.bind(value),
            Bind::Text(value) => query.bind(value),
        };
    }

    let rows = query.fetch_all(pool).await?;

    Ok(rows.iter().map(track_from_row).collect())
}

/// Tracks whose raw artist credit matches any of the given strings
///
/// Used for split-identity lookups: the caller passes the artist's own name
/// plus every combined credit that mentions them.
pub async fn by_artist_credits(pool: &SqlitePool, credits: &[String]) -> Result<Vec<Track>> {
    if credits.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; credits.len()].join(", ");
    let sql = format!(
        "SELECT * FROM tracks WHERE artist IN ({placeholders}) ORDER BY title COLLATE NOCASE"
    );

    let mut query = sqlx::query(&sql);
    for credit in credits {
        query = query.bind(credit);
    }

    let rows = query.fetch_all(pool).await?;

    Ok(rows.iter().map(track_from_row).collect())
}

/// Distinct album ids among tracks with any of the given artist credits
pub async fn album_ids_for_credits(pool: &SqlitePool, credits: &[String]) -> Result<Vec<AlbumId>> {
    if credits.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; credits.len()].join(", ");
    let sql = format!("SELECT DISTINCT album_id FROM tracks WHERE artist IN ({placeholders})");

    let mut query = sqlx::query(&sql);
    for credit in credits {
        query = query.bind(credit);
    }

    let rows = query.fetch_all(pool).await?;

    Ok(rows.into_iter().map(|row| row.get("album_id")).collect())
}

fn sort_column(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Title => "title",
        SortKey::Artist => "artist",
        SortKey::Album => "album",
        SortKey::Duration => "duration_ms",
        SortKey::DateAdded => "date_added",
        SortKey::Size => "size",
        SortKey::DisplayName => "display_name",
    }
}

pub(crate) fn track_from_row(row: &SqliteRow) -> Track {
    Track {
        id: row.get("id"),
        path: row.get("path"),
        mtime: row.get("mtime"),
        size: row.get("size"),
        display_name: row.get("display_name"),
        display_name_no_ext: row.get("display_name_no_ext"),
        extension: row.get("extension"),
        uri: row.get("uri"),
        title: row.get("title"),
        artist: row.get("artist"),
        album: row.get("album"),
        genre: row.get("genre"),
        year: row.get("year"),
        track_no: row.get("track_no"),
        duration_ms: row.get("duration_ms"),
        album_id: row.get("album_id"),
        artist_id: row.get("artist_id"),
        genre_id: row.get("genre_id"),
        date_added: row.get("date_added"),
        date_modified: row.get("date_modified"),
        is_music: row.get::<i64, _>("is_music") != 0,
    }
}

//! Embedded schema
//!
//! Every statement is `IF NOT EXISTS`, so [`init_schema`] is safe to run on
//! every startup against both fresh and existing index files.

use crate::Result;
use sqlx::SqlitePool;

const CREATE_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS tracks (
        id INTEGER PRIMARY KEY,
        path TEXT NOT NULL UNIQUE,
        mtime INTEGER NOT NULL,
        size INTEGER NOT NULL,
        display_name TEXT NOT NULL,
        display_name_no_ext TEXT NOT NULL,
        extension TEXT NOT NULL,
        uri TEXT NOT NULL,
        title TEXT,
        artist TEXT,
        album TEXT,
        genre TEXT,
        year INTEGER,
        track_no INTEGER,
        duration_ms INTEGER,
        album_id INTEGER,
        artist_id INTEGER,
        genre_id INTEGER,
        date_added INTEGER,
        date_modified INTEGER,
        is_music INTEGER DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS albums (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        artist TEXT,
        artist_id INTEGER,
        num_tracks INTEGER DEFAULT 0,
        first_year INTEGER,
        last_year INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS artists (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        num_albums INTEGER DEFAULT 0,
        num_tracks INTEGER DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS genres (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        num_tracks INTEGER DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS playlists (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        data TEXT,
        date_added INTEGER,
        date_modified INTEGER,
        num_tracks INTEGER DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS playlist_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        playlist_id INTEGER NOT NULL,
        track_id INTEGER NOT NULL,
        position INTEGER NOT NULL,
        date_added INTEGER,
        FOREIGN KEY (playlist_id) REFERENCES playlists(id) ON DELETE CASCADE,
        UNIQUE (playlist_id, track_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS artwork_cache (
        id INTEGER NOT NULL,
        type INTEGER NOT NULL,
        format TEXT NOT NULL,
        data BLOB,
        cached_at INTEGER,
        PRIMARY KEY (id, type, format)
    )
    "#,
];

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_tracks_artist ON tracks(artist_id)",
    "CREATE INDEX IF NOT EXISTS idx_tracks_album ON tracks(album_id)",
    "CREATE INDEX IF NOT EXISTS idx_tracks_genre ON tracks(genre_id)",
    "CREATE INDEX IF NOT EXISTS idx_tracks_mtime ON tracks(mtime)",
    "CREATE INDEX IF NOT EXISTS idx_tracks_date_added ON tracks(date_added)",
    "CREATE INDEX IF NOT EXISTS idx_tracks_title ON tracks(title COLLATE NOCASE)",
    "CREATE INDEX IF NOT EXISTS idx_playlist_items_playlist ON playlist_items(playlist_id, position)",
    "CREATE INDEX IF NOT EXISTS idx_playlist_items_track ON playlist_items(track_id)",
];

/// Create all tables and indexes if they do not exist yet
///
/// This should be called once when the application starts, right after
/// [`crate::create_pool`]. A failure here means the index is unusable and
/// must be treated as fatal by the caller.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in CREATE_TABLES.iter().chain(CREATE_INDEXES) {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::debug!("Schema initialized");
    Ok(())
}

//! Test helpers and fixtures for storage integration tests
//!
//! These helpers create test databases using REAL SQLite files (NOT in-memory)
//! to match production behavior and properly test the schema, constraints,
//! and indexes.

use melodex_core::ids;
use melodex_core::types::Track;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Test database wrapper that cleans up on drop
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    /// Create a new test database with the schema applied
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let pool = melodex_storage::create_pool(&db_url)
            .await
            .expect("Failed to create pool");

        melodex_storage::init_schema(&pool)
            .await
            .expect("Failed to initialize schema");

        Self {
            pool,
            _temp_dir: temp_dir,
        }
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Test fixture: build a track record the way the extractor would
pub fn make_track(path: &str, title: &str, artist: &str, album: &str, genre: &str, year: i32) -> Track {
    let display_name = path.rsplit('/').next().unwrap_or(path).to_string();
    let display_name_no_ext = display_name
        .rsplit_once('.')
        .map(|(stem, _)| stem.to_string())
        .unwrap_or_else(|| display_name.clone());
    let extension = path.rsplit_once('.').map(|(_, ext)| ext.to_string()).unwrap_or_default();

    Track {
        id: ids::track_id(path),
        path: path.to_string(),
        mtime: 1_700_000_000,
        size: 1024,
        display_name,
        display_name_no_ext,
        extension,
        uri: format!("file://{path}"),
        title: title.to_string(),
        artist: artist.to_string(),
        album: album.to_string(),
        genre: genre.to_string(),
        year,
        track_no: 1,
        duration_ms: 180_000,
        album_id: ids::name_id(album),
        artist_id: ids::name_id(artist),
        genre_id: ids::name_id(genre),
        date_added: 1_700_000_000_000,
        date_modified: 1_700_000_000_000,
        is_music: true,
    }
}

/// Test fixture: insert a track and return its id
pub async fn insert_track(
    pool: &SqlitePool,
    path: &str,
    title: &str,
    artist: &str,
    album: &str,
    genre: &str,
    year: i32,
) -> i64 {
    let track = make_track(path, title, artist, album, genre, year);
    melodex_storage::tracks::upsert(pool, &track)
        .await
        .expect("Failed to insert test track");
    track.id
}

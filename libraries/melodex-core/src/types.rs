//! Core data types shared across Melodex crates

use serde::{Deserialize, Serialize};

/// Track ID type (deterministic hash of the file path)
pub type TrackId = i64;

/// Album ID type (deterministic hash of the album name)
pub type AlbumId = i64;

/// Artist ID type (positive for raw credits, negative for split identities)
pub type ArtistId = i64;

/// Genre ID type
pub type GenreId = i64;

/// Playlist ID type (database rowid)
pub type PlaylistId = i64;

/// A single indexed audio file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    /// Absolute path to the file on disk
    pub path: String,
    /// File modification time in seconds since the epoch
    pub mtime: i64,
    /// File size in bytes
    pub size: i64,
    pub display_name: String,
    pub display_name_no_ext: String,
    pub extension: String,
    /// `file://` URI for the path
    pub uri: String,
    pub title: String,
    /// Raw artist credit exactly as tagged ("A feat. B" stays combined here)
    pub artist: String,
    pub album: String,
    pub genre: String,
    /// Release year, 0 when unknown
    pub year: i32,
    /// Track number, 0 when unknown
    pub track_no: i32,
    /// Duration in milliseconds, 0 when unknown
    pub duration_ms: i64,
    pub album_id: AlbumId,
    pub artist_id: ArtistId,
    pub genre_id: GenreId,
    /// Milliseconds since the epoch
    pub date_added: i64,
    /// Milliseconds since the epoch
    pub date_modified: i64,
    pub is_music: bool,
}

/// An album derived from indexed tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    /// Representative artist credit for the album
    pub artist: String,
    pub artist_id: ArtistId,
    pub num_tracks: i64,
    /// Earliest strictly-positive release year, 0 when unknown
    pub first_year: i32,
    /// Latest strictly-positive release year, 0 when unknown
    pub last_year: i32,
}

/// An artist identity, either a raw credit or a split identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub num_albums: i64,
    pub num_tracks: i64,
}

/// A genre derived from indexed tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
    pub num_tracks: i64,
}

/// A user-created playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    /// Free-form application data attached to the playlist
    pub data: String,
    pub date_added: i64,
    pub date_modified: i64,
    pub num_tracks: i64,
}

/// Minimal per-file record used for change detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub id: TrackId,
    pub path: String,
    /// Modification time in seconds as recorded at last index
    pub mtime: i64,
}

/// What an artwork cache entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i64)]
pub enum ArtworkKind {
    Track = 0,
    Album = 1,
}

impl ArtworkKind {
    /// Stable integer used as part of the artwork cache key
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

//! Melodex Core
//!
//! Shared types for the Melodex audio indexer.
//!
//! This crate defines the records produced by scanning (tracks, albums,
//! artists, genres, playlists), the parameter types used by library queries,
//! and the deterministic id scheme that ties a file path or a display name
//! to a stable 64-bit identifier.

pub mod ids;
pub mod query;
pub mod types;

pub use query::{QueryParams, SortKey, SortOrder};
pub use types::*;

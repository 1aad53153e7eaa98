//! Metadata extraction with caching and fallback
//!
//! Extraction is infallible by design: a file the tool chokes on still gets
//! an index entry built from the filename and filesystem metadata, because
//! a library listing with holes is worse than one with "Unknown Artist"
//! entries.

use crate::parse::{self, FormatInfo};
use crate::tool::ProbeTool;
use lru::LruCache;
use melodex_core::ids;
use melodex_core::types::Track;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::UNIX_EPOCH;

/// Default number of probed files kept in the LRU cache
pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// Extracts track metadata with an LRU cache in front of the probe tool
pub struct MetadataExtractor {
    tool: Arc<dyn ProbeTool>,
    cache: Mutex<LruCache<PathBuf, Track>>,
}

impl MetadataExtractor {
    /// Create an extractor with the default cache size
    pub fn new(tool: Arc<dyn ProbeTool>) -> Self {
        Self::with_cache_size(tool, DEFAULT_CACHE_SIZE)
    }

    /// Create an extractor with an explicit cache size
    pub fn with_cache_size(tool: Arc<dyn ProbeTool>, cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size.max(1)).unwrap();
        Self {
            tool,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Extract metadata for one file
    ///
    /// Never fails: tool errors are logged and replaced with fallback
    /// metadata. Fallback results are cached like real ones, so a broken
    /// file is only probed once per cache generation.
    pub async fn extract(&self, path: &Path) -> Track {
        if let Some(track) = self.cache.lock().unwrap().get(path) {
            return track.clone();
        }

        let track = match self.tool.probe(path).await {
            Ok(info) => build_track(path, &info),
            Err(e) => {
                tracing::warn!("Metadata extraction failed for {}: {}", path.display(), e);
                build_track(path, &FormatInfo::default())
            }
        };

        self.cache
            .lock()
            .unwrap()
            .put(path.to_path_buf(), track.clone());
        track
    }

    /// Extract metadata for a list of files sequentially
    ///
    /// The progress callback fires every 10 files and once at the end.
    pub async fn extract_batch(
        &self,
        paths: &[PathBuf],
        progress: Option<&(dyn Fn(usize, usize) + Send + Sync)>,
    ) -> Vec<Track> {
        let total = paths.len();
        let mut results = Vec::with_capacity(total);

        for (i, path) in paths.iter().enumerate() {
            results.push(self.extract(path).await);

            let processed = i + 1;
            if processed % 10 == 0 {
                if let Some(callback) = progress {
                    callback(processed, total);
                }
            }
        }

        if let Some(callback) = progress {
            callback(total, total);
        }

        results
    }

    /// Extract embedded artwork; `None` both for files without artwork and
    /// for tool failures
    pub async fn extract_artwork(&self, path: &Path, format: &str) -> Option<Vec<u8>> {
        match self.tool.extract_artwork(path, format).await {
            Ok(artwork) => artwork,
            Err(e) => {
                tracing::warn!("Artwork extraction failed for {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Drop all cached entries
    pub fn clear_cache(&self) {
        self.cache.lock().unwrap().clear();
    }
}

struct FileFacts {
    size: i64,
    mtime: i64,
    date_added: i64,
    date_modified: i64,
}

fn file_facts(path: &Path) -> FileFacts {
    let meta = std::fs::metadata(path).ok();

    let modified = meta
        .as_ref()
        .and_then(|m| m.modified().ok())
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    let created = meta
        .as_ref()
        .and_then(|m| m.created().ok())
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(modified);

    FileFacts {
        size: meta.map(|m| m.len() as i64).unwrap_or(0),
        mtime: modified,
        date_added: created * 1000,
        date_modified: modified * 1000,
    }
}

/// Build a track record from probe output (or from an empty `FormatInfo`
/// for the fallback path; the defaults below cover both)
fn build_track(path: &Path, info: &FormatInfo) -> Track {
    let facts = file_facts(path);

    let display_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| display_name.clone());
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    let path_str = path.to_string_lossy().into_owned();

    let title = info.tag("title").unwrap_or(stem.as_str()).to_string();
    let artist = info.tag("artist").unwrap_or("Unknown Artist").to_string();
    let album = info.tag("album").unwrap_or("Unknown Album").to_string();
    let genre = info.tag("genre").unwrap_or("Unknown").to_string();
    let year = info.tag("date").map(parse::extract_year).unwrap_or(0);
    let track_no = info.tag("track").map(parse::parse_track_number).unwrap_or(0);

    Track {
        id: ids::track_id(&path_str),
        uri: format!("file://{path_str}"),
        path: path_str,
        mtime: facts.mtime,
        size: info.size_bytes().unwrap_or(facts.size),
        display_name,
        display_name_no_ext: stem,
        extension,
        album_id: ids::name_id(&album),
        artist_id: ids::name_id(&artist),
        genre_id: ids::name_id(&genre),
        title,
        artist,
        album,
        genre,
        year,
        track_no,
        duration_ms: info.duration_ms(),
        date_added: facts.date_added,
        date_modified: facts.date_modified,
        is_music: true,
    }
}

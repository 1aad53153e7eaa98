//! Change detection between a directory listing and the stored index
//!
//! A file whose mtime moved backwards, or was restored with the exact
//! stored timestamp, reads as unchanged. Accepted limitation: only a
//! strictly newer mtime marks a file modified.

use melodex_core::types::FileEntry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// The delta between the filesystem and the store
#[derive(Debug, Default)]
pub struct ChangeSet {
    /// On disk but not in the store
    pub new: Vec<PathBuf>,
    /// In the store with a strictly older mtime
    pub modified: Vec<PathBuf>,
    /// In the store but gone from disk
    pub deleted: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// All paths that need (re-)extraction, new files first
    pub fn paths_to_extract(self) -> Vec<PathBuf> {
        let mut paths = self.new;
        paths.extend(self.modified);
        paths
    }
}

/// Diff a current listing against stored file entries
pub fn detect(listing: &[PathBuf], stored: &[FileEntry]) -> ChangeSet {
    let stored_by_path: HashMap<&str, &FileEntry> =
        stored.iter().map(|e| (e.path.as_str(), e)).collect();

    let mut delta = ChangeSet::default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(listing.len());

    for path in listing {
        let key = path.to_string_lossy();
        match stored_by_path.get(key.as_ref()) {
            None => delta.new.push(path.clone()),
            Some(entry) => {
                seen.insert(entry.path.as_str());
                if fs_mtime(path) > entry.mtime {
                    delta.modified.push(path.clone());
                }
            }
        }
    }

    delta.deleted = stored
        .iter()
        .filter(|e| !seen.contains(e.path.as_str()))
        .map(|e| e.path.clone())
        .collect();

    delta
}

/// Filesystem mtime in whole seconds, 0 when unreadable
fn fs_mtime(path: &Path) -> i64 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn entry(path: &Path, mtime: i64) -> FileEntry {
        FileEntry {
            id: 1,
            path: path.to_string_lossy().into_owned(),
            mtime,
        }
    }

    #[test]
    fn unknown_paths_are_new() {
        let temp = TempDir::new().unwrap();
        let song = temp.path().join("song.mp3");
        fs::write(&song, b"x").unwrap();

        let delta = detect(&[song.clone()], &[]);
        assert_eq!(delta.new, vec![song]);
        assert!(delta.modified.is_empty());
        assert!(delta.deleted.is_empty());
    }

    #[test]
    fn newer_mtime_is_modified_equal_is_not() {
        let temp = TempDir::new().unwrap();
        let song = temp.path().join("song.mp3");
        fs::write(&song, b"x").unwrap();
        let mtime = fs_mtime(&song);

        // Stored mtime older than the file on disk
        let delta = detect(&[song.clone()], &[entry(&song, mtime - 10)]);
        assert_eq!(delta.modified, vec![song.clone()]);
        assert!(delta.new.is_empty());

        // Exactly the stored mtime reads as unchanged
        let delta = detect(&[song.clone()], &[entry(&song, mtime)]);
        assert!(delta.is_empty());

        // So does an mtime that moved backwards
        let delta = detect(&[song.clone()], &[entry(&song, mtime + 10)]);
        assert!(delta.is_empty());
    }

    #[test]
    fn missing_files_are_deleted() {
        let temp = TempDir::new().unwrap();
        let kept = temp.path().join("kept.mp3");
        fs::write(&kept, b"x").unwrap();
        let gone = temp.path().join("gone.mp3");

        let stored = vec![entry(&kept, fs_mtime(&kept)), entry(&gone, 100)];
        let delta = detect(&[kept], &stored);
        assert_eq!(delta.deleted, vec![gone.to_string_lossy().into_owned()]);
        assert!(delta.new.is_empty());
        assert!(delta.modified.is_empty());
    }

    #[test]
    fn extraction_order_is_new_then_modified() {
        let delta = ChangeSet {
            new: vec![PathBuf::from("/a.mp3")],
            modified: vec![PathBuf::from("/b.mp3")],
            deleted: vec![],
        };
        assert_eq!(
            delta.paths_to_extract(),
            vec![PathBuf::from("/a.mp3"), PathBuf::from("/b.mp3")]
        );
    }
}

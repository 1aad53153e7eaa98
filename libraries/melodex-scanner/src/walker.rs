//! Directory walking for audio files

use crate::{Result, ScanError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported audio file extensions
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "m4a", "wav", "aac", "wma", "opus", "ape", "wv", "oga", "mpc",
];

/// Recursive audio file lister
pub struct FileWalker {
    /// Whether to follow symbolic links
    follow_links: bool,

    /// Maximum depth to traverse (None for unlimited)
    max_depth: Option<usize>,
}

impl Default for FileWalker {
    fn default() -> Self {
        Self {
            follow_links: false,
            max_depth: None,
        }
    }
}

impl FileWalker {
    /// Create a new walker
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to follow symbolic links
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Set maximum directory depth to traverse
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// List all audio files under a directory
    ///
    /// Unreadable entries are skipped, not errors: a single bad permission
    /// bit should not abort a library scan.
    pub fn walk(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.exists() {
            return Err(ScanError::DirectoryNotFound(root.display().to_string()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.display().to_string()));
        }

        let mut walker = WalkDir::new(root).follow_links(self.follow_links);
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut files = Vec::new();
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if entry.file_type().is_file() && is_audio_file(path) {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }
}

/// Whether a path has a supported audio extension
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// The user's music directory: XDG_MUSIC_DIR from user-dirs.dirs when
/// configured, ~/Music otherwise; `None` when neither exists on disk
pub fn default_music_dir() -> Option<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from)?;

    if let Ok(contents) = std::fs::read_to_string(home.join(".config/user-dirs.dirs")) {
        for line in contents.lines() {
            let Some(value) = line.trim().strip_prefix("XDG_MUSIC_DIR=") else {
                continue;
            };
            let value = value.trim_matches('"');
            let path = match value.strip_prefix("$HOME/") {
                Some(rest) => home.join(rest),
                None => PathBuf::from(value),
            };
            if path.is_dir() {
                return Some(path);
            }
        }
    }

    let fallback = home.join("Music");
    fallback.is_dir().then_some(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn extension_allow_list() {
        assert!(is_audio_file(Path::new("song.mp3")));
        assert!(is_audio_file(Path::new("song.FLAC")));
        assert!(is_audio_file(Path::new("song.opus")));
        assert!(is_audio_file(Path::new("song.wv")));
        assert!(!is_audio_file(Path::new("cover.jpg")));
        assert!(!is_audio_file(Path::new("notes.txt")));
        assert!(!is_audio_file(Path::new("noextension")));
    }

    #[test]
    fn walk_finds_audio_files_recursively() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();

        fs::write(base.join("song1.mp3"), b"x").unwrap();
        fs::write(base.join("song2.flac"), b"x").unwrap();
        fs::write(base.join("cover.png"), b"x").unwrap();

        let subdir = base.join("album");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("song3.ogg"), b"x").unwrap();

        let files = FileWalker::new().walk(base).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.iter().any(|p| p.ends_with("song1.mp3")));
        assert!(files.iter().any(|p| p.ends_with("song3.ogg")));
        assert!(!files.iter().any(|p| p.ends_with("cover.png")));
    }

    #[test]
    fn walk_respects_max_depth() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();

        fs::write(base.join("top.mp3"), b"x").unwrap();
        let subdir = base.join("deep");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("nested.mp3"), b"x").unwrap();

        let files = FileWalker::new().max_depth(1).walk(base).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("top.mp3"));
    }

    #[test]
    fn walk_rejects_bad_roots() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.mp3");
        fs::write(&file, b"x").unwrap();

        assert!(matches!(
            FileWalker::new().walk(&temp.path().join("missing")),
            Err(ScanError::DirectoryNotFound(_))
        ));
        assert!(matches!(
            FileWalker::new().walk(&file),
            Err(ScanError::NotADirectory(_))
        ));
    }
}

//! Melodex Scanner
//!
//! Library scanning: walks directories for audio files, diffs them against
//! the stored index, extracts metadata on a bounded worker pool, and writes
//! each scan as a single transaction before rebuilding the derived tables.
//!
//! [`ScanCoordinator`] is the entry point; [`FileWalker`] and
//! [`changes::detect`] are usable on their own.

pub mod changes;

mod coordinator;
mod error;
mod pool;
mod walker;

pub use coordinator::{ProgressCallback, ScanCoordinator, ScanProgress, ScanSummary};
pub use error::{Result, ScanError};
pub use pool::WorkerPool;
pub use walker::{default_music_dir, is_audio_file, FileWalker};

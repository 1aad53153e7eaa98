/// Scanner-specific errors
use thiserror::Error;

/// Result type alias using `ScanError`
pub type Result<T> = std::result::Result<T, ScanError>;

/// Scanner error types
#[derive(Error, Debug)]
pub enum ScanError {
    /// The scan root does not exist
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    /// The scan root exists but is not a directory
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Task submitted after the worker pool shut down
    #[error("worker pool is shut down")]
    PoolShutDown,

    /// Storage layer failure
    #[error(transparent)]
    Storage(#[from] melodex_storage::StorageError),

    /// An extraction task panicked or was aborted
    #[error("scan task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

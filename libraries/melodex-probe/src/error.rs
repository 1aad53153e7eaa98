/// Probe-specific errors
use thiserror::Error;

/// Result type alias using `ProbeError`
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Probe error types
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The external tool exited with a non-zero status
    #[error("probe tool exited with status {code:?}")]
    ToolFailed { code: Option<i32> },

    /// The tool's output was not valid probe JSON
    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    /// Failed to spawn the tool or read its output
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

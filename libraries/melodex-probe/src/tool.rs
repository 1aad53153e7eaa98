//! External probe tool
//!
//! Everything that spawns a process lives here, behind the [`ProbeTool`]
//! trait. Arguments are always passed as a vector, never through a shell.

use crate::parse::{self, FormatInfo};
use crate::{ProbeError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Capability trait for metadata probing
///
/// Production uses [`FfprobeTool`]; tests provide fakes so extraction and
/// scanning can be exercised without ffprobe installed.
#[async_trait]
pub trait ProbeTool: Send + Sync {
    /// Probe a file for format data and tags
    async fn probe(&self, path: &Path) -> Result<FormatInfo>;

    /// Extract embedded artwork as raw image bytes in the given format
    ///
    /// `Ok(None)` means the file has no artwork stream; errors are reserved
    /// for failures to run the tool at all.
    async fn extract_artwork(&self, path: &Path, format: &str) -> Result<Option<Vec<u8>>>;
}

/// The real tool: shells out to `ffprobe` for metadata and `ffmpeg` for
/// artwork extraction
#[derive(Debug, Default)]
pub struct FfprobeTool;

impl FfprobeTool {
    pub fn new() -> Self {
        Self
    }

    /// Whether ffprobe can be spawned on this system
    pub async fn is_available() -> bool {
        Command::new("ffprobe")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl ProbeTool for FfprobeTool {
    async fn probe(&self, path: &Path) -> Result<FormatInfo> {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_entries",
                "format=duration,size",
                "-show_entries",
                "format_tags=artist,album,title,genre,date,track,disc,composer",
            ])
            .arg(path)
            .stderr(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(ProbeError::ToolFailed {
                code: output.status.code(),
            });
        }

        parse::parse_output(&output.stdout)
    }

    async fn extract_artwork(&self, path: &Path, format: &str) -> Result<Option<Vec<u8>>> {
        // ffmpeg picks the output codec from the extension, so the temp
        // file needs the right suffix. The file is removed on drop on
        // every exit path.
        let temp = tempfile::Builder::new()
            .prefix("melodex-artwork-")
            .suffix(&format!(".{format}"))
            .tempfile()?;

        let status = Command::new("ffmpeg")
            .args(["-v", "quiet", "-y", "-i"])
            .arg(path)
            .args(["-an", "-vcodec", "copy"])
            .arg(temp.path())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        if !status.success() {
            return Ok(None);
        }

        let data = tokio::fs::read(temp.path()).await?;
        if data.is_empty() {
            Ok(None)
        } else {
            Ok(Some(data))
        }
    }
}

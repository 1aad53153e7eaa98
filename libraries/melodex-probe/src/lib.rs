//! Melodex Probe
//!
//! Metadata extraction for audio files via `ffprobe`.
//!
//! The [`ProbeTool`] trait is the seam to the external tool: production
//! code uses [`FfprobeTool`] (spawns `ffprobe`/`ffmpeg` processes), tests
//! substitute fakes. [`MetadataExtractor`] wraps a tool with an LRU cache
//! and guarantees a usable [`melodex_core::Track`] for every file, falling
//! back to filesystem-derived metadata when the tool fails.

mod error;
mod extractor;
mod parse;
mod tool;

pub use error::{ProbeError, Result};
pub use extractor::MetadataExtractor;
pub use parse::FormatInfo;
pub use tool::{FfprobeTool, ProbeTool};

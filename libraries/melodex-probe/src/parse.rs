//! ffprobe JSON output parsing

use crate::Result;
use serde::Deserialize;
use std::collections::HashMap;

/// The `format` section of ffprobe's JSON output
///
/// ffprobe reports numbers as strings; the accessors below do the
/// conversions and never fail, because tag data in the wild is garbage
/// often enough that "unparseable" has to mean "unknown", not "error".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatInfo {
    pub duration: Option<String>,
    pub size: Option<String>,
    pub tags: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct ProbeJson {
    format: Option<FormatInfo>,
}

/// Parse raw ffprobe stdout
pub fn parse_output(bytes: &[u8]) -> Result<FormatInfo> {
    let parsed: ProbeJson = serde_json::from_slice(bytes)?;
    Ok(parsed.format.unwrap_or_default())
}

impl FormatInfo {
    /// Look up a tag by exact key first, then case-insensitively
    /// (taggers disagree on "artist" vs "ARTIST" vs "Artist")
    pub fn tag(&self, key: &str) -> Option<&str> {
        let tags = self.tags.as_ref()?;
        if let Some(value) = tags.get(key) {
            return Some(value);
        }
        tags.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Whether any tags were present at all
    pub fn has_tags(&self) -> bool {
        self.tags.is_some()
    }

    /// Duration in milliseconds, 0 when absent or unparseable
    pub fn duration_ms(&self) -> i64 {
        self.duration
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .map(|secs| (secs * 1000.0) as i64)
            .unwrap_or(0)
    }

    /// File size in bytes as reported by the tool
    pub fn size_bytes(&self) -> Option<i64> {
        self.size.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Parse a track number tag, handling the "5/12" style
pub fn parse_track_number(value: &str) -> i32 {
    let trimmed = value.trim();
    let number = trimmed.split('/').next().unwrap_or(trimmed);
    number.trim().parse().unwrap_or(0)
}

/// First standalone 4-digit run in a date tag, 0 when there is none
pub fn extract_year(date: &str) -> i32 {
    date.split(|c: char| !c.is_ascii_digit())
        .find(|run| run.len() == 4)
        .and_then(|run| run.parse().ok())
        .unwrap_or(0)
}

use std::fmt;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::error::Result;

/// One entry of a search result page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Numeric subtitle id taken from the result link
    pub id: Option<String>,
    /// Visible text of the result link
    pub title: Option<String>,
    /// Subtitle format, e.g. "srt" or "ass"
    pub format: Option<String>,
    /// Free-text label of the matching video release
    pub version: Option<String>,
}

impl SearchCandidate {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.title.is_none() && self.format.is_none() && self.version.is_none()
    }

    pub fn numeric_id(&self) -> Option<u64> {
        self.id.as_deref().and_then(|id| id.parse().ok())
    }
}

/// Container format of a downloaded subtitle payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveType {
    Rar,
    Zip,
    Srt,
    Unknown,
}

impl ArchiveType {
    /// Classify a payload by its leading bytes.
    ///
    /// Anything shorter than `min_size` is `Unknown` whatever it starts with;
    /// plain text is the fallback once no archive signature matches.
    pub fn sniff(payload: &[u8], min_size: usize) -> Self {
        if payload.len() < min_size {
            Self::Unknown
        } else if payload.starts_with(b"Rar!") {
            Self::Rar
        } else if payload.starts_with(b"PK") {
            Self::Zip
        } else {
            Self::Srt
        }
    }

    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::Rar => Some("rar"),
            Self::Zip => Some("zip"),
            Self::Srt => Some("srt"),
            Self::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rar => "rar",
            Self::Zip => "zip",
            Self::Srt => "srt",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub archive_type: ArchiveType,
    pub payload: Vec<u8>,
}

/// Subtitle file path next to a video: `<dir>/<video stem>.<ext>`
pub fn subtitle_path_for<P: AsRef<Path>>(video_path: P, output_dir: Option<&Path>, archive_type: ArchiveType) -> PathBuf {
    let video_path = video_path.as_ref();
    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "subtitle".to_string());
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| video_path.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    dir.join(format!("{}.{}", stem, archive_type.extension().unwrap_or("bin")))
}

/// Extensions `save_archive` leaves alone
const SUBTITLE_EXTENSIONS: &[&str] = &["rar", "zip", "7z", "srt", "ass", "ssa", "sub", "bin"];

/// Write a downloaded payload to disk.
///
/// Unless `output_path` already ends in an archive or subtitle extension, the
/// archive type's one is appended (`Show.Name` becomes `Show.Name.rar`).
pub async fn save_archive<P: AsRef<Path>>(result: &DownloadResult, output_path: P) -> Result<PathBuf> {
    let mut output_path = output_path.as_ref().to_path_buf();
    let has_known_extension = output_path
        .extension()
        .map(|ext| SUBTITLE_EXTENSIONS.contains(&ext.to_string_lossy().to_lowercase().as_str()))
        .unwrap_or(false);
    if !has_known_extension {
        let mut file_name = output_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        file_name.push(".");
        file_name.push(result.archive_type.extension().unwrap_or("bin"));
        output_path.set_file_name(file_name);
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    info!("Writing {} archive ({} bytes): {}", result.archive_type, result.payload.len(), output_path.display());
    fs::write(&output_path, &result.payload).await?;

    Ok(output_path)
}

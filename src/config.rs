use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, SubhdError};

/// Payloads shorter than this are treated as error pages rather than archives
pub const DEFAULT_MIN_ARCHIVE_SIZE: usize = 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub parser: ParserConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Search endpoint; the escaped keyword is appended verbatim
    pub search_url: String,
    /// Endpoint answering `sub_id` lookups with the real archive URL
    pub lookup_url: String,
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// CSS class of the element holding the result list
    pub container_class: String,
    /// Regex matched against anchor hrefs; group 1 is the subtitle id
    pub subtitle_href_pattern: String,
    /// Label preceding the subtitle format in a result block
    pub format_label: String,
    /// Label preceding the video release description in a result block
    pub version_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Minimum payload size before the signature is trusted
    pub min_archive_size: usize,
    /// Where `download` writes archives when no output path is given
    pub output_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            search_url: "http://subhd.com/search/".to_string(),
            lookup_url: "http://subhd.com/ajax/down_ajax".to_string(),
            user_agent: "subhd/0.1.0".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            container_class: "col-md-9".to_string(),
            subtitle_href_pattern: r"^/a/(\d+)$".to_string(),
            format_label: "格式：".to_string(),
            version_label: "版本：".to_string(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            min_archive_size: DEFAULT_MIN_ARCHIVE_SIZE,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubhdError::Config(format!("Failed to read config file: {}", e)))?;

        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubhdError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubhdError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subhd.toml");

        let mut config = Config::default();
        config.download.min_archive_size = 2048;
        config.parser.format_label = "Format:".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.download.min_archive_size, 2048);
        assert_eq!(loaded.parser.format_label, "Format:");
        assert_eq!(loaded.parser.version_label, "版本：");
        assert_eq!(loaded.site.lookup_url, "http://subhd.com/ajax/down_ajax");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subhd.toml");
        std::fs::write(&path, "[site]\nsearch_url = \"http://localhost:8080/search/\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.site.search_url, "http://localhost:8080/search/");
        assert_eq!(config.site.timeout_secs, 30);
        assert_eq!(config.parser.container_class, "col-md-9");
        assert_eq!(config.download.min_archive_size, DEFAULT_MIN_ARCHIVE_SIZE);
    }

    #[test]
    fn test_invalid_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subhd.toml");
        std::fs::write(&path, "site = 3").unwrap();

        assert!(matches!(Config::from_file(&path), Err(SubhdError::Toml(_))));
        assert!(matches!(
            Config::from_file(dir.path().join("missing.toml")),
            Err(SubhdError::Config(_))
        ));
    }
}

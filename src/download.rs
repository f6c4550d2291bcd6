use std::sync::Arc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_MIN_ARCHIVE_SIZE, DownloadConfig, SiteConfig};
use crate::error::{Result, SubhdError};
use crate::http::HttpTransport;
use crate::subtitle::{ArchiveType, DownloadResult, SearchCandidate};

/// Body of the lookup endpoint's answer
#[derive(Debug, Deserialize)]
struct LookupResponse {
    url: Option<String>,
}

/// Resolves a subtitle id to its archive: lookup call for the real URL, then the fetch
pub struct DownloadResolver {
    transport: Arc<dyn HttpTransport>,
    lookup_url: String,
    min_archive_size: usize,
}

impl DownloadResolver {
    pub fn new(transport: Arc<dyn HttpTransport>, lookup_url: impl Into<String>) -> Self {
        Self {
            transport,
            lookup_url: lookup_url.into(),
            min_archive_size: DEFAULT_MIN_ARCHIVE_SIZE,
        }
    }

    pub fn from_config(transport: Arc<dyn HttpTransport>, site: &SiteConfig, download: &DownloadConfig) -> Self {
        Self::new(transport, site.lookup_url.clone()).with_min_archive_size(download.min_archive_size)
    }

    pub fn with_min_archive_size(mut self, min_archive_size: usize) -> Self {
        self.min_archive_size = min_archive_size;
        self
    }

    /// Ask the lookup endpoint where the archive of `subtitle_id` lives
    pub async fn resolve_url(&self, subtitle_id: u64) -> Result<String> {
        let form = [("sub_id".to_string(), subtitle_id.to_string())];
        let body = self.transport.post_form(&self.lookup_url, &form).await?;

        let response: LookupResponse = serde_json::from_str(&body).map_err(|e| {
            warn!("Lookup for subtitle {} returned a non-JSON body", subtitle_id);
            SubhdError::Resolution(format!("Lookup response for {} is not valid JSON: {}", subtitle_id, e))
        })?;

        match response.url {
            Some(url) if !url.is_empty() => {
                debug!("Subtitle {} resolved to {}", subtitle_id, url);
                Ok(url)
            }
            _ => Err(SubhdError::Resolution(format!(
                "Lookup response for {} has no download url",
                subtitle_id
            ))),
        }
    }

    /// Download the archive of a subtitle and detect its container format
    pub async fn download(&self, subtitle_id: u64) -> Result<DownloadResult> {
        info!("Downloading subtitle {}", subtitle_id);
        let url = self.resolve_url(subtitle_id).await?;

        let payload = self.transport.get_bytes(&url).await?;
        let archive_type = ArchiveType::sniff(&payload, self.min_archive_size);
        if archive_type == ArchiveType::Unknown {
            warn!(
                "Subtitle {} payload is only {} bytes, format undetermined",
                subtitle_id,
                payload.len()
            );
        }

        info!("Subtitle {} downloaded: {} ({} bytes)", subtitle_id, archive_type, payload.len());
        Ok(DownloadResult { archive_type, payload })
    }

    pub async fn download_candidate(&self, candidate: &SearchCandidate) -> Result<DownloadResult> {
        let subtitle_id = candidate.numeric_id().ok_or_else(|| {
            SubhdError::Resolution(format!(
                "Candidate {:?} has no numeric subtitle id",
                candidate.title.as_deref().unwrap_or("<untitled>")
            ))
        })?;
        self.download(subtitle_id).await
    }
}

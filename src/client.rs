use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::download::DownloadResolver;
use crate::error::Result;
use crate::http::{HttpTransport, ReqwestTransport};
use crate::query::QueryNormalizer;
use crate::search::SearchClient;
use crate::subtitle::{DownloadResult, SearchCandidate};

/// Seeks and downloads subtitles from subhd.com
pub struct SubhdClient {
    normalizer: QueryNormalizer,
    search: SearchClient,
    resolver: DownloadResolver,
}

impl SubhdClient {
    pub fn new(config: &Config) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config.site)?);
        Self::with_transport(config, transport)
    }

    /// Build the client on top of any transport
    pub fn with_transport(config: &Config, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        Ok(Self {
            normalizer: QueryNormalizer::default(),
            search: SearchClient::from_config(transport.clone(), &config.site, &config.parser)?,
            resolver: DownloadResolver::from_config(transport, &config.site, &config.download),
        })
    }

    pub fn with_normalizer(mut self, normalizer: QueryNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Search subtitle candidates.
    ///
    /// With `is_filename` the keyword is first reduced to the guessed series
    /// or title of the release.
    pub async fn search(&self, keyword: &str, is_filename: bool) -> Result<Vec<SearchCandidate>> {
        let query = self.normalizer.normalize(keyword, is_filename);
        if is_filename {
            info!("Search keyword for '{}': '{}'", keyword, query);
        }
        self.search.search(&query).await
    }

    /// Download the archive of a subtitle along with its detected format
    pub async fn download(&self, subtitle_id: u64) -> Result<DownloadResult> {
        self.resolver.download(subtitle_id).await
    }

    pub async fn download_candidate(&self, candidate: &SearchCandidate) -> Result<DownloadResult> {
        self.resolver.download_candidate(candidate).await
    }
}

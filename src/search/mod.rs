// Subtitle search
//
// The search client only knows how to fetch a result page; turning the page
// into candidates is delegated to a ResultBlockParser so the site-specific
// selectors stay in one place:
// - SubhdResultParser: scraper-based parser for the subhd.com markup

pub mod parser;

use std::sync::Arc;
use tracing::{debug, info};

pub use parser::SubhdResultParser;
use crate::config::{ParserConfig, SiteConfig};
use crate::error::Result;
use crate::http::HttpTransport;
use crate::subtitle::SearchCandidate;

/// Turns a search result page into candidates, in document order
#[cfg_attr(test, mockall::automock)]
pub trait ResultBlockParser: Send + Sync {
    /// Malformed or unexpected markup yields fewer (or no) candidates, never an error
    fn parse_results(&self, html: &str) -> Vec<SearchCandidate>;
}

pub struct SearchClient {
    transport: Arc<dyn HttpTransport>,
    parser: Box<dyn ResultBlockParser>,
    search_url: String,
}

impl SearchClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        parser: Box<dyn ResultBlockParser>,
        search_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            parser,
            search_url: search_url.into(),
        }
    }

    /// Search client using the subhd.com result parser
    pub fn from_config(
        transport: Arc<dyn HttpTransport>,
        site: &SiteConfig,
        parser: &ParserConfig,
    ) -> Result<Self> {
        let parser = SubhdResultParser::new(parser)?;
        Ok(Self::new(transport, Box::new(parser), site.search_url.clone()))
    }

    pub fn search_url_for(&self, keyword: &str) -> String {
        format!("{}{}", self.search_url, urlencoding::encode(keyword))
    }

    /// Search subtitle candidates for a keyword
    pub async fn search(&self, keyword: &str) -> Result<Vec<SearchCandidate>> {
        let url = self.search_url_for(keyword);
        info!("Searching subtitles for '{}'", keyword);
        debug!("Search URL: {}", url);

        let page = self.transport.get_text(&url).await?;
        let candidates = self.parser.parse_results(&page);

        info!("Found {} candidates for '{}'", candidates.len(), keyword);
        Ok(candidates)
    }
}

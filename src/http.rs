use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;

use crate::config::SiteConfig;
use crate::error::{Result, SubhdError};

/// The three kinds of outbound call the client makes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET a page and return its body as text
    async fn get_text(&self, url: &str) -> Result<String>;

    /// POST an urlencoded form and return the response body as text
    async fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<String>;

    /// GET a resource and return its raw body
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// reqwest-backed transport; every non-2xx status is an error
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SubhdError::Http)?;

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn check_status(url: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            return Err(SubhdError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = Self::check_status(url, response)?;
        Ok(response.text().await?)
    }

    async fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<String> {
        debug!("POST {} ({} fields)", url, form.len());
        let response = self.client.post(url).form(form).send().await?;
        let response = Self::check_status(url, response)?;
        Ok(response.text().await?)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {} (binary)", url);
        let response = self.client.get(url).send().await?;
        let response = Self::check_status(url, response)?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

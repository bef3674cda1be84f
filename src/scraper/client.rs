//! Blocking HTTP fetch client. One GET per call; no retries, no cookies.

use crate::scraper::error::ScraperError;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; sekaiscrape/0.1; +https://github.com/sekaiscrape)";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Blocking HTTP client returning page bodies as text.
#[derive(Debug, Clone)]
pub struct FetchClient {
    inner: reqwest::blocking::Client,
}

impl FetchClient {
    /// Build a client with default User-Agent and timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    /// Builder for custom User-Agent and/or timeout.
    pub fn builder() -> FetchClientBuilder {
        FetchClientBuilder::default()
    }

    /// GET `url` and return the body.
    ///
    /// Transport failures map to [ScraperError::Network], non-2xx responses to
    /// [ScraperError::HttpStatus]. The caller decides whether a 404 means "not found".
    pub fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        log::debug!("GET {}", url);
        let response = self
            .inner
            .get(url)
            .send()
            .map_err(|e| ScraperError::Network {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            log::debug!("GET {} -> HTTP {}", url, status.as_u16());
            return Err(ScraperError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response.text().map_err(|e| ScraperError::BodyRead {
            url: url.to_string(),
            source: e,
        })
    }
}

/// Builder for FetchClient with optional User-Agent and timeout.
#[derive(Debug)]
pub struct FetchClientBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
}

impl Default for FetchClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FetchClientBuilder {
    /// Set a custom User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<FetchClient, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let inner = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()?;
        Ok(FetchClient { inner })
    }
}

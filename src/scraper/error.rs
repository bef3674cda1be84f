//! Shared error type for fetching and scraping.

use thiserror::Error;

/// Errors from the fetch client and novel sources.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead { url: String, source: reqwest::Error },

    #[error("Invalid {kind} '{value}': must be a single URL path segment.")]
    InvalidIdentifier { kind: &'static str, value: String },

    #[error("Invalid base URL '{input}': {reason}")]
    InvalidBaseUrl { input: String, reason: String },

    #[error("Invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl ScraperError {
    /// True when the server answered 404, which sources report as "not found" rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScraperError::HttpStatus { status: 404, .. })
    }
}

//! Page fetcher boundary and HTTP implementation
//!
//! The pipeline only knows the `PageFetcher` trait: one identifier in, the
//! page's raw content and outbound links out. Implementations must be safe
//! to call from many fetch workers at once and must not touch shared crawl
//! state. Timeouts are the fetcher's concern, not the pipeline's.

use crate::config::FetcherConfig;
use crate::crawler::parser::extract_links;
use crate::{ConfigError, CrawlError};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// One outbound hyperlink found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    pub href: String,
    pub title: String,
}

impl DiscoveredLink {
    pub fn new(href: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            title: title.into(),
        }
    }
}

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub content: String,
    pub links: Vec<DiscoveredLink>,
}

/// Reasons a fetch produced no links
///
/// None of these are fatal to the crawl; the page is still marked fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Not an internal identifier: {0}")]
    NotInternal(String),

    #[error("Cannot build a URL for {identifier}: {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Empty content for {0}")]
    EmptyContent(String),
}

/// Resolves a page identifier to its outbound links
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    async fn fetch(&self, identifier: &str) -> Result<FetchedPage, FetchError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, identifier: &str) -> Result<FetchedPage, FetchError> {
        (**self).fetch(identifier).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches internal pages over HTTP
///
/// An internal identifier `./Name` is requested from `base_url + Name`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
    internal_prefix: String,
}

impl HttpFetcher {
    /// Creates a fetcher from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The fetcher configuration
    /// * `internal_prefix` - Prefix marking identifiers this fetcher may resolve
    pub fn new(config: &FetcherConfig, internal_prefix: &str) -> Result<Self, CrawlError> {
        Url::parse(&config.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.base_url.clone(),
            internal_prefix: internal_prefix.to_string(),
        })
    }

    /// Maps an internal identifier to the URL it is fetched from
    pub fn resolve(&self, identifier: &str) -> Result<Url, FetchError> {
        let name = identifier
            .strip_prefix(&self.internal_prefix)
            .ok_or_else(|| FetchError::NotInternal(identifier.to_string()))?;

        // Concatenate rather than join: names such as "Category:Logic" would
        // otherwise parse as a URL scheme.
        Url::parse(&format!("{}{}", self.base_url, name)).map_err(|e| {
            FetchError::InvalidIdentifier {
                identifier: identifier.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, identifier: &str) -> Result<FetchedPage, FetchError> {
        let url = self.resolve(identifier)?;
        tracing::trace!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content = response.text().await?;
        if content.trim().is_empty() {
            return Err(FetchError::EmptyContent(identifier.to_string()));
        }

        let links = extract_links(&content);
        Ok(FetchedPage { content, links })
    }
}

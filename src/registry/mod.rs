//! HTTP client for the npm registry.
//!
//! Two read-only endpoints are used:
//! - `GET /-/v1/search?text=<query>&size=<n>` for free-text search
//! - `GET /<name>` for the full package document (README, links, license)
//!
//! Failures are not retried; callers report them once and stop.

mod types;

pub use types::*;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Public npm registry.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Number of hits requested per search.
pub const DEFAULT_SEARCH_SIZE: u32 = 20;

/// Registry client errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Search query is empty")]
    EmptyQuery,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Registry returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse registry response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RegistryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// HTTP client for the npm registry.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base_url: String,
    search_size: u32,
    client: Client,
}

impl Default for RegistryClient {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL)
    }
}

impl RegistryClient {
    /// Create a client for the registry at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            search_size: DEFAULT_SEARCH_SIZE,
            client: Client::new(),
        }
    }

    pub fn with_search_size(mut self, size: u32) -> Self {
        self.search_size = size;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read a successful body as JSON, or turn an error status into
    /// `RegistryError::Status`.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, RegistryError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Status { status, body });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Search packages by free text.
    pub async fn search(&self, query: &str) -> Result<Vec<PackageSummary>, RegistryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RegistryError::EmptyQuery);
        }

        let url = format!("{}/-/v1/search", self.base_url);
        tracing::debug!(%url, query, size = self.search_size, "Searching registry");

        let response = self
            .client
            .get(&url)
            .query(&[("text", query.to_string()), ("size", self.search_size.to_string())])
            .send()
            .await?;
        let results: SearchResponse = self.handle_response(response).await?;

        Ok(results
            .objects
            .into_iter()
            .map(|object| PackageSummary::from(object.package))
            .collect())
    }

    /// Fetch the package document for an exact name. Scoped names have their
    /// `/` percent-encoded.
    pub async fn package(&self, name: &str) -> Result<PackageMetadata, RegistryError> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(name));
        tracing::debug!(%url, "Fetching package metadata");

        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }
}

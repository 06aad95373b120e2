//! HTTP client for a remote hazard catalog.
//!
//! Talks to two search endpoints:
//!
//! - `GET {base}/locations/?q=<name>&limit=<n>`
//! - `GET {base}/hazards/search/?q=<name>&limit=<n>`
//!
//! Both return a JSON array of records. Any other body shape is treated
//! as "no results".

use std::time::Duration;

use async_trait::async_trait;

use crate::{CatalogError, CatalogRecord, CatalogSearch, parse_records};

/// Search client for a catalog reachable over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// Creates a client for the catalog at `base_url` with a per-request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The catalog root all requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn search(
        &self,
        path: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        let url = format!("{}/{path}", self.base_url);
        log::debug!("Searching catalog {url} for '{query}'");
        let limit = limit.to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body: serde_json::Value = resp.json().await?;
        Ok(parse_records(&body))
    }
}

#[async_trait]
impl CatalogSearch for HttpCatalogClient {
    async fn search_locations(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        self.search("locations/", query, limit).await
    }

    async fn search_hazards(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        self.search("hazards/search/", query, limit).await
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hazard catalog access.
//!
//! The catalog is the system of record for canonical hazards and
//! locations. This crate provides both sides of it:
//!
//! - [`client::HttpCatalogClient`], the search collaborator the
//!   consolidation pipeline uses to resolve names to catalog ids.
//! - [`store::CatalogStore`], an in-memory catalog that ingests
//!   consolidated payloads and answers name searches and point
//!   containment queries with the shared geometry and matching engines.
//!
//! Both implement [`CatalogSearch`], so the pipeline can resolve against
//! a remote catalog or an in-process one.

pub mod client;
pub mod store;

use async_trait::async_trait;
use elk_matching::Named;
use thiserror::Error;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("Catalog returned status {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// A search request was rejected before running.
    #[error("Invalid query: {message}")]
    InvalidQuery {
        /// Why the query was rejected.
        message: String,
    },

    /// Geometry parameters were rejected.
    #[error("Geometry error: {0}")]
    Geometry(#[from] elk_geometry::GeometryError),

    /// A referenced hazard does not exist.
    #[error("Unknown hazard: {id}")]
    UnknownHazard {
        /// The missing hazard id.
        id: String,
    },
}

/// A search hit as returned by the catalog: identifier, name, and every
/// other field the catalog holds for the entity.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    /// Catalog identifier rendered as a string (numeric ids included).
    pub id: Option<String>,
    /// Entity name.
    pub name: String,
    /// The complete record as received.
    pub fields: serde_json::Value,
}

impl CatalogRecord {
    /// Builds a record from one JSON search hit.
    ///
    /// Returns `None` for non-objects and for objects without a string
    /// `name`.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let name = object.get("name")?.as_str()?.to_string();
        let id = match object.get("id") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Some(Self {
            id,
            name,
            fields: value.clone(),
        })
    }
}

impl Named for CatalogRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Parses a search response body into records.
///
/// Anything other than a JSON array is treated as "no results"; entries
/// that are not usable records are skipped.
#[must_use]
pub fn parse_records(body: &serde_json::Value) -> Vec<CatalogRecord> {
    body.as_array()
        .map(|items| items.iter().filter_map(CatalogRecord::from_value).collect())
        .unwrap_or_default()
}

/// Name search over catalog locations and hazards.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Returns up to `limit` locations whose names resemble `query`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the catalog cannot be reached or
    /// rejects the request.
    async fn search_locations(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CatalogRecord>, CatalogError>;

    /// Returns up to `limit` hazards whose names resemble `query`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the catalog cannot be reached or
    /// rejects the request.
    async fn search_hazards(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CatalogRecord>, CatalogError>;
}

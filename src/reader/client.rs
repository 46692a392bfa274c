use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const API_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur talking to the feed-reader API.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The configured endpoint is not a valid URL.
    #[error("invalid reader endpoint '{0}'")]
    InvalidEndpoint(String),
    /// Network-level failure (DNS, connection, TLS, body decode).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The request exceeded the 10-second timeout.
    #[error("request timed out")]
    Timeout,
    /// The reader answered with a non-success status.
    #[error("{operation} returned status {status}")]
    Status {
        operation: &'static str,
        status: u16,
    },
    /// No category with the requested title exists in the reader.
    #[error("category '{0}' not found in reader")]
    CategoryNotFound(String),
}

/// A category as returned by the reader API.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: i64,
    pub title: String,
}

/// A subscribed feed as returned by the reader API.
#[derive(Debug, Clone, Deserialize)]
pub struct ReaderFeed {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub feed_url: String,
}

/// Client for a Miniflux-style feed-reader REST API.
///
/// Authenticates every call with an `X-Auth-Token` header against the
/// configured base endpoint. All methods return errors as values; no call
/// ever panics on a failed request.
pub struct ReaderClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

impl ReaderClient {
    /// Creates a client for the reader at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::InvalidEndpoint`] when the endpoint does not
    /// parse as a URL, or [`ReaderError::Network`] when the HTTP client
    /// cannot be constructed.
    pub fn new(endpoint: &str, api_key: SecretString) -> Result<Self, ReaderError> {
        if Url::parse(endpoint).is_err() {
            return Err(ReaderError::InvalidEndpoint(endpoint.to_owned()));
        }
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            api_key,
        })
    }

    /// Resolves a category name to its ID by exact title match.
    pub async fn resolve_category(&self, name: &str) -> Result<i64, ReaderError> {
        let url = format!("{}/v1/categories", self.endpoint);
        let response = self
            .execute("category lookup", self.http.get(&url))
            .await?;
        let categories: Vec<Category> = response.json().await?;

        categories
            .iter()
            .find(|c| c.title == name)
            .map(|c| c.id)
            .ok_or_else(|| ReaderError::CategoryNotFound(name.to_owned()))
    }

    /// Lists the feeds currently subscribed within a category.
    pub async fn category_feeds(&self, category_id: i64) -> Result<Vec<ReaderFeed>, ReaderError> {
        let url = format!("{}/v1/categories/{category_id}/feeds", self.endpoint);
        let response = self
            .execute("category feed listing", self.http.get(&url))
            .await?;
        Ok(response.json().await?)
    }

    /// Deletes a feed subscription.
    pub async fn delete_feed(&self, feed_id: i64) -> Result<(), ReaderError> {
        let url = format!("{}/v1/feeds/{feed_id}", self.endpoint);
        self.execute("feed deletion", self.http.delete(&url))
            .await?;
        Ok(())
    }

    /// Subscribes a feed URL into a category.
    pub async fn subscribe(&self, category_id: i64, feed_url: &str) -> Result<(), ReaderError> {
        let url = format!("{}/v1/feeds", self.endpoint);
        let body = serde_json::json!({
            "feed_url": feed_url,
            "category_id": category_id,
        });
        self.execute("feed subscription", self.http.post(&url).json(&body))
            .await?;
        Ok(())
    }

    /// Adds authentication, applies the timeout, and turns non-success
    /// statuses into [`ReaderError::Status`].
    async fn execute(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ReaderError> {
        let request = request.header("X-Auth-Token", self.api_key.expose_secret());
        let response = tokio::time::timeout(API_TIMEOUT, request.send())
            .await
            .map_err(|_| ReaderError::Timeout)?
            .map_err(ReaderError::Network)?;

        if !response.status().is_success() {
            return Err(ReaderError::Status {
                operation,
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

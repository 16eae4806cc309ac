//! Mastodon REST API client.
//!
//! Requests go through the [`Transport`] trait so the fetch layer can run
//! against a scripted transport in tests. [`MastodonClient`] is the `reqwest`
//! implementation with bearer auth and base URL resolution.

mod request;

use std::future::Future;
use std::time::Duration;

use entity_store::PageInfo;
use serde_json::Value;
use soapbox_schema::{Instance, Normalize};
use url::Url;

use crate::ApiError;
use crate::endpoints;
use crate::links;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Status, pagination headers and body of a successful response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Raw `Link` header.
    pub link: Option<String>,
    /// `X-Total-Count` header.
    pub total_count: Option<u64>,
    pub body: String,
}

impl ApiResponse {
    pub fn json(&self) -> Result<Value, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Cursors from the `Link` header plus the total count.
    pub fn page_info(&self) -> PageInfo {
        links::page_info(self.link.as_deref(), self.total_count)
    }
}

/// Issues GET requests. `url` is either a path relative to the server or an
/// absolute URL taken from a `Link` header.
///
/// Implementations return `ApiError::Status` for non-2xx responses.
pub trait Transport: Send + Sync + 'static {
    fn get(&self, url: &str) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send;
}

/// HTTP client bound to one server and, optionally, one user token.
pub struct MastodonClient {
    pub(super) http: reqwest::Client,
    pub(super) base_url: Url,
    pub(super) access_token: Option<String>,
    pub(super) bearer: Option<reqwest::header::HeaderValue>,
}

impl MastodonClient {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Resolve a server path or an absolute cursor URL.
    pub fn resolve(&self, url: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(url)?)
    }

    /// Fetch `/api/v1/instance`, used for dialect and feature detection.
    pub async fn instance(&self) -> Result<Instance, ApiError> {
        let response = self.get(endpoints::INSTANCE).await?;
        Ok(Instance::parse(&response.json()?)?)
    }
}

impl Transport for MastodonClient {
    async fn get(&self, url: &str) -> Result<ApiResponse, ApiError> {
        self.authenticated_get(url).await
    }
}

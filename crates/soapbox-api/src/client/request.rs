use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK};
use url::Url;

use super::*;

const TOTAL_COUNT: &str = "x-total-count";

impl MastodonClient {
    pub fn new(
        base_url: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let access_token = access_token.filter(|token| !token.is_empty());
        let bearer = access_token
            .as_deref()
            .map(|token| HeaderValue::from_str(&format!("Bearer {token}")))
            .transpose()
            .map_err(|_| ApiError::InvalidToken)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            access_token,
            bearer,
        })
    }

    /// Build auth headers. Logged-out clients send no `Authorization`.
    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(bearer) = &self.bearer {
            headers.insert(AUTHORIZATION, bearer.clone());
        }
        headers
    }

    /// Execute a GET request with auth headers and collect the pagination
    /// headers alongside the body.
    pub(super) async fn authenticated_get(&self, url: &str) -> Result<ApiResponse, ApiError> {
        let url = self.resolve(url)?;
        let headers = self.auth_headers();
        tracing::debug!(%url, "GET");
        let resp = self
            .http
            .get(url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(timeout_or_http)?;

        let status = resp.status();
        let link = header_str(resp.headers(), LINK.as_str());
        let total_count = header_str(resp.headers(), TOTAL_COUNT).and_then(|v| v.parse().ok());
        let body = resp.text().await.map_err(timeout_or_http)?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(%url, "Got 401, access token is invalid or revoked");
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            link,
            total_count,
            body,
        })
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn timeout_or_http(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Http(e)
    }
}

//! HTTP client shared by every backend.

use log::debug;
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::BackendError;

/// User agent sent with every outbound request.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Clonable handle over one `reqwest::Client`.
///
/// Build a single instance at startup and clone it into each backend:
/// clones share the underlying connection pool, so the process never
/// opens a second pool. Headers travel per request, not as client
/// defaults, so credentials for one upstream are never sent to another.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client this crate uses in production: identifying user
    /// agent, no default headers.
    pub fn with_defaults() -> Result<Self, BackendError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Performs a GET request with the given headers and returns the raw
    /// response. The body is left unread; callers pick JSON or bytes.
    #[tracing::instrument(skip(self, headers))]
    pub async fn get(&self, url: &str, headers: HeaderMap) -> Result<Response, BackendError> {
        debug!("GET {}...", url);

        let response = self.client.get(url).headers(headers).send().await?;
        Ok(response)
    }

    /// Performs a GET request with query parameters and the given headers.
    #[tracing::instrument(skip(self, headers, query))]
    pub async fn get_with_query(
        &self,
        url: &str,
        headers: HeaderMap,
        query: &[(&str, &str)],
    ) -> Result<Response, BackendError> {
        debug!("GET {} with query {:?}...", url, query);

        let response = self
            .client
            .get(url)
            .headers(headers)
            .query(query)
            .send()
            .await?;
        Ok(response)
    }

    /// Performs a GET request and deserializes the JSON response after
    /// status validation.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<T, BackendError> {
        let response = check_status(self.get(url, headers).await?).await?;
        decode_json(response).await
    }

    /// Performs a GET request with query parameters and deserializes the
    /// JSON response after status validation.
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: HeaderMap,
        query: &[(&str, &str)],
    ) -> Result<T, BackendError> {
        let response = check_status(self.get_with_query(url, headers, query).await?).await?;
        decode_json(response).await
    }
}

/// Validates an upstream outcome: 2xx passes the response through
/// untouched, 404 becomes [`BackendError::NotFound`], and every other
/// status drains the body into [`BackendError::UpstreamRejected`].
/// No status is ever retried.
pub async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(BackendError::NotFound(format!(
            "upstream has no resource at {}",
            response.url()
        )));
    }

    let body = response.text().await.unwrap_or_default();
    Err(BackendError::UpstreamRejected { status, body })
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

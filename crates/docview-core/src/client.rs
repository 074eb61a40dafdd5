use crate::config::ApiConfig;
use crate::query::SearchBackend;
use crate::types::{Document, HealthStatus, SearchRequest, SearchResponse, Stats};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// HTTP client for the search backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Self::with_timeout(&config.base_url, config.timeout())
    }

    /// Create a client for `base_url` with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(format!("'{base_url}' cannot be used as a base URL")));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("docview/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client, base_url })
    }

    /// Base URL endpoints are resolved against.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /search`.
    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        let url = self.endpoint(&["search"])?;
        debug!("searching {url} for '{query}'");
        let request = self.client.post(url).json(&SearchRequest {
            query: query.to_string(),
        });
        let response: SearchResponse = self.send_json(request).await?;
        debug!("search returned {} of {} results", response.results.len(), response.total);
        Ok(response)
    }

    /// `GET /stats`.
    pub async fn stats(&self) -> Result<Stats> {
        let url = self.endpoint(&["stats"])?;
        self.send_json(self.client.get(url)).await
    }

    /// `GET /api/document/{filename}`.
    ///
    /// A 404 becomes [`Error::DocumentNotFound`].
    pub async fn document(&self, filename: &str) -> Result<Document> {
        let url = self.endpoint(&["api", "document", filename])?;
        match self.send_json::<Document>(self.client.get(url)).await {
            Err(Error::HttpStatus { status: 404, .. }) => {
                Err(Error::DocumentNotFound(filename.to_string()))
            },
            other => {
                if let Ok(doc) = &other {
                    info!("Fetched {} ({} bytes)", doc.filename, doc.content.len());
                }
                other
            },
        }
    }

    /// `GET /health`. A 503 still carries a status body and is returned as
    /// an unhealthy [`HealthStatus`].
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint(&["health"])?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() || status == StatusCode::SERVICE_UNAVAILABLE {
            return decode(&body);
        }
        Err(status_error(status, &body))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(format!("'{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        decode(&body)
    }
}

#[async_trait]
impl SearchBackend for ApiClient {
    async fn search(&self, query: &str) -> Result<SearchResponse> {
        Self::search(self, query).await
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::MalformedResponse(e.to_string()))
}

/// Prefer the server's `{"error": {"message": …}}`, fall back to the reason
/// phrase.
fn status_error(status: StatusCode, body: &[u8]) -> Error {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
    Error::HttpStatus {
        status: status.as_u16(),
        message,
    }
}

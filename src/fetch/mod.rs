//! Outbound reads of the live GTFS-RT feed.
//!
//! One request per call: no retry and no caching at this layer.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CACHE_CONTROL, HeaderValue};
use tracing::{debug, error};

use crate::error::FeedError;

/// Media type requested from the feed endpoint.
pub const PROTOBUF_MEDIA_TYPE: &str = "application/x-protobuf";

/// Anything that can produce one raw feed payload per call.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Bytes, FeedError>;
}

/// Issues a single GET for `url`, asking for protobuf and bypassing any
/// intermediate HTTP caches.
///
/// # Errors
///
/// [`FeedError::InvalidUrl`] if `url` does not parse, [`FeedError::Http`] on
/// transport failure, [`FeedError::Status`] on a non-2xx response.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Bytes, FeedError> {
    let parsed = url.parse::<reqwest::Url>().map_err(|e| FeedError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let mut req = reqwest::Request::new(reqwest::Method::GET, parsed);
    let headers = req.headers_mut();
    headers.insert(ACCEPT, HeaderValue::from_static(PROTOBUF_MEDIA_TYPE));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FeedError::Status {
            status: status.as_u16(),
        });
    }

    Ok(resp.bytes().await?)
}

/// HTTP-backed [`FeedSource`] pointed at a fixed endpoint.
#[derive(Debug, Clone)]
pub struct FeedFetcher<C = BasicClient> {
    client: C,
    url: String,
}

impl FeedFetcher<BasicClient> {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(BasicClient::new(), url)
    }
}

impl<C: HttpClient> FeedFetcher<C> {
    pub fn with_client(client: C, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl<C: HttpClient> FeedSource for FeedFetcher<C> {
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Bytes, FeedError> {
        match fetch_bytes(&self.client, &self.url).await {
            Ok(bytes) => {
                debug!(bytes = bytes.len(), "Feed bytes received");
                Ok(bytes)
            }
            Err(e) => {
                error!(error = %e, "Feed fetch failed");
                Err(e)
            }
        }
    }
}

//! Fetching remote resources.
//!
//! The engine never talks to the network directly; it asks a [`Fetcher`] for
//! a [`Fetched`] response. [`HttpFetcher`] is the production implementation.
//! Callers of [`Preloader::preload_fetch`](crate::Preloader::preload_fetch)
//! can bypass the trait entirely and hand in any future that produces a
//! [`Fetched`] (a POST to a thumbnail service, a local transform, ...).

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use bytes::Bytes;
use exn::ResultExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub type FetcherHandle = Arc<dyn Fetcher>;

/// A response, reduced to what the cache needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fetched {
    /// [`None`] when the response carried no body at all.
    pub body: Option<Bytes>,
    pub content_type: Option<String>,
}
impl Fetched {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: Some(body.into()), content_type: None }
    }

    /// A response without a body.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Materialize the payload, rejecting responses that carry nothing to
    /// persist.
    pub fn into_payload(self) -> Result<Bytes> {
        let Some(body) = self.body else {
            exn::bail!(ErrorKind::EmptyResponseBody);
        };
        if body.is_empty() {
            exn::bail!(ErrorKind::EmptyPayload);
        }
        Ok(body)
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve the resource behind `url`. No retries are expected; a failure
    /// is reported once.
    async fn fetch(&self, url: &Url) -> Result<Fetched>;
}

/// Plain `GET` over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}
impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(None)
    }

    /// Build a fetcher whose requests give up after `timeout`. A timed-out
    /// request is reported as [`Fetch`](ErrorKind::Fetch) like any other
    /// transport failure.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().or_raise(|| ErrorKind::Fetch)?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[tracing::instrument(level = "debug", skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<Fetched> {
        let response = self.client.get(url.clone()).send().await.or_raise(|| ErrorKind::Fetch)?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::HttpStatus(status.as_u16()));
        }
        let content_type =
            response.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()).map(String::from);
        if status == StatusCode::NO_CONTENT {
            return Ok(Fetched { body: None, content_type });
        }
        let body = response.bytes().await.or_raise(|| ErrorKind::Fetch)?;
        tracing::trace!(status = status.as_u16(), bytes = body.len(), "Received response");
        Ok(Fetched { body: Some(body), content_type })
    }
}

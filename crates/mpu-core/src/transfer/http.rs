//! Part transport over HTTP PUT (pre-signed URLs).
//!
//! Uses reqwest with rustls. Each `put_part` is one request; the shared
//! client keeps a connection pool across parts.

use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_LENGTH, ETAG};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::retry::TransferError;

use super::PartTransport;

/// Client-level timeouts for part requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    /// Whole-request timeout (send body and read response). `None` disables it.
    pub request_timeout: Option<Duration>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Some(Duration::from_secs(3600)),
        }
    }
}

/// Sends parts as `PUT <url>` with the part bytes as body.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(opts: HttpOptions) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .connect_timeout(opts.connect_timeout)
            .user_agent(concat!("mpu/", env!("CARGO_PKG_VERSION")));
        if let Some(t) = opts.request_timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Use a preconfigured client (custom TLS roots, proxies).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl PartTransport for HttpTransport {
    type Target = Url;

    async fn put_part(
        &self,
        target: &Url,
        part_number: u32,
        body: Bytes,
    ) -> Result<String, TransferError> {
        let len = body.len();
        // Pre-signed URLs carry credentials in the query; log host and path only.
        tracing::debug!(
            part_number,
            bytes = len,
            host = target.host_str().unwrap_or(""),
            path = target.path(),
            "PUT part"
        );
        let response = self
            .client
            .put(target.clone())
            .header(CONTENT_LENGTH, len as u64)
            .body(body)
            .send()
            .await
            .map_err(TransferError::Transport)?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(TransferError::Http { status });
        }
        etag_from_headers(response.headers(), status)
    }
}

/// ETag of a successful part response, quotes preserved.
fn etag_from_headers(headers: &HeaderMap, status: u16) -> Result<String, TransferError> {
    let value = headers
        .get(ETAG)
        .ok_or(TransferError::MissingIdentifier { status })?;
    let etag = value
        .to_str()
        .map_err(|_| TransferError::InvalidIdentifier)?;
    Ok(etag.to_string())
}

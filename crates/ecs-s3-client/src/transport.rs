//! The seam between the request pipeline and the network.
//!
//! A [`Transport`] sends one fully built and signed request and returns the
//! response with its body still streaming. [`ReqwestTransport`] is the default.

use std::fmt;
use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use ecs_s3_model::ByteStream;
use futures::TryStreamExt;

use crate::body::ResponseBody;
use crate::error::TransportError;

/// A response as returned by a transport.
pub type TransportResponse = http::Response<ResponseBody>;

/// Sends HTTP requests.
///
/// # Object Safety
///
/// Uses `async-trait` boxing so the client can hold `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug + 'static {
    /// Send the request and return the response head with a streaming body.
    ///
    /// Non-success statuses are responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the request cannot be sent.
    async fn send(&self, request: http::Request<Bytes>)
    -> Result<TransportResponse, TransportError>;
}

/// A [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default `reqwest::Client`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport around an existing client (proxies, TLS roots, pools).
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> Result<TransportResponse, TransportError> {
        let request = reqwest::Request::try_from(request)?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let stream = response.bytes_stream().map_err(io::Error::other);

        let mut out = http::Response::new(ResponseBody::Streaming(ByteStream::new(stream)));
        *out.status_mut() = status;
        *out.headers_mut() = headers;
        Ok(out)
    }
}

//! HTTP transport abstraction.
//!
//! The client never talks to the network directly; it hands a fully built
//! [`HttpRequest`] to an injected [`Transport`]. The default implementation
//! is backed by `reqwest`, tests substitute a recording mock.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use serde_json::Value;

use crate::error::{DriveError, Result};

/// Header map for an outgoing request.
pub type Headers = BTreeMap<String, String>;

/// Query parameters for an outgoing request.
pub type QueryParams = BTreeMap<String, String>;

/// Transport-level options passed through to [`Transport::send`].
///
/// The reqwest transport honors `timeout_ms` (number of milliseconds);
/// unknown keys are delivered untouched so custom transports can define
/// their own.
pub type RequestOptions = BTreeMap<String, Value>;

/// HTTP method for an outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// A fully constructed request, built fresh per call and never reused.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub query: QueryParams,
    pub body: Option<Vec<u8>>,
}

/// Readable response body stream.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Response returned by a [`Transport`].
pub struct HttpResponse {
    pub status: u16,
    pub body: BodyStream,
}

impl HttpResponse {
    /// Build a response from an in-memory body.
    pub fn from_bytes(status: u16, body: impl Into<Bytes>) -> Self {
        let bytes = body.into();
        Self {
            status,
            body: Box::pin(futures::stream::once(futures::future::ready(Ok(bytes)))),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Drain the body stream into a single buffer.
    pub async fn bytes(self) -> Result<Bytes> {
        let mut body = self.body;
        let mut buf = BytesMut::new();
        while let Some(chunk) = body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    /// Drain the body and decode it as UTF-8, lossily.
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Drain the body and parse it as JSON.
    pub async fn json(self) -> Result<Value> {
        let bytes = self.bytes().await?;
        let value = serde_json::from_slice(&bytes)?;
        Ok(value)
    }
}

/// One capability: send a request, get a response or a failure.
pub trait Transport {
    fn send(
        &self,
        request: HttpRequest,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// Default transport backed by a shared `reqwest` client.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest, options: &RequestOptions) -> Result<HttpResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.http.request(method, &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        if let Some(ms) = options.get("timeout_ms").and_then(Value::as_u64) {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(DriveError::from));

        Ok(HttpResponse {
            status,
            body: Box::pin(body),
        })
    }
}

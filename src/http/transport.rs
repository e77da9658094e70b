//! The network primitive shared by the REST client and the object cache.

use futures::future::BoxFuture;
use reqwest::header::{HeaderName, HeaderValue, CACHE_CONTROL, PRAGMA};
use tracing::debug;

use super::error::TransportError;
use super::request::{CachePolicy, HttpMethod, RequestDescriptor};

/// Status and payload of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
  pub status: u16,
  pub body: Vec<u8>,
}

/// Executes one request descriptor against the network.
///
/// Implementations must not inspect the status code; classification is the
/// caller's job.
pub trait Transport: Send + Sync {
  fn execute(&self, request: RequestDescriptor) -> BoxFuture<'static, Result<RawResponse, TransportError>>;
}

/// Transport backed by a shared `reqwest` connection pool.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
  client: reqwest::Client,
}

impl ReqwestTransport {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_client(client: reqwest::Client) -> Self {
    Self { client }
  }
}

impl Transport for ReqwestTransport {
  fn execute(&self, request: RequestDescriptor) -> BoxFuture<'static, Result<RawResponse, TransportError>> {
    let client = self.client.clone();
    Box::pin(async move {
      let method = match request.method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
      };

      debug!(method = %request.method, url = %request.url, "sending request");

      let mut builder = client
        .request(method, request.url.clone())
        .timeout(request.timeout);

      for field in &request.headers {
        let name = HeaderName::from_bytes(field.key.as_bytes())
          .map_err(|e| TransportError::Request(format!("invalid header name {}: {}", field.key, e)))?;
        let value = HeaderValue::from_str(&field.value)
          .map_err(|e| TransportError::Request(format!("invalid header value for {}: {}", field.key, e)))?;
        builder = builder.header(name, value);
      }

      for (name, value) in cache_headers(request.cache_policy) {
        builder = builder.header(name, value);
      }

      if let Some(body) = request.body {
        builder = builder.body(body);
      }

      let response = builder.send().await?;
      let status = response.status().as_u16();
      let body = response.bytes().await.map_err(|e| TransportError::Body(e.to_string()))?;

      Ok::<_, TransportError>(RawResponse {
        status,
        body: body.to_vec(),
      })
    })
  }
}

/// Request headers that express a cache policy.
fn cache_headers(policy: Option<CachePolicy>) -> Vec<(HeaderName, HeaderValue)> {
  match policy {
    None | Some(CachePolicy::UseProtocolDefault) => Vec::new(),
    Some(CachePolicy::ReloadIgnoringCache) => vec![
      (CACHE_CONTROL, HeaderValue::from_static("no-cache")),
      (PRAGMA, HeaderValue::from_static("no-cache")),
    ],
    Some(CachePolicy::ReturnCacheElseLoad) => {
      vec![(CACHE_CONTROL, HeaderValue::from_static("max-stale"))]
    }
  }
}

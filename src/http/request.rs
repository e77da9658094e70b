//! Pure construction of HTTP request descriptors.
//!
//! Nothing here touches the network. A `RequestDescriptor` is plain data that
//! a `Transport` executes later, so building one is deterministic and cheap
//! to test.

use std::fmt;
use std::time::Duration;

use url::Url;

/// Content type applied whenever body fields are present.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
  Get,
  Post,
}

impl HttpMethod {
  pub fn as_str(&self) -> &'static str {
    match self {
      HttpMethod::Get => "GET",
      HttpMethod::Post => "POST",
    }
  }
}

impl fmt::Display for HttpMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// How the transport should treat intermediate HTTP caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
  /// Whatever the protocol headers of the response dictate
  UseProtocolDefault,
  /// Always go to the origin server
  ReloadIgnoringCache,
  /// Accept stale cached data when it exists
  ReturnCacheElseLoad,
}

/// A key/value pair used for both header and body fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPair {
  pub key: String,
  pub value: String,
}

impl FieldPair {
  pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      value: value.into(),
    }
  }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
  pub url: Url,
  pub method: HttpMethod,
  pub timeout: Duration,
  pub cache_policy: Option<CachePolicy>,
  /// Ordered, at most one entry per header name (case-insensitive)
  pub headers: Vec<FieldPair>,
  pub body: Option<Vec<u8>>,
}

impl RequestDescriptor {
  /// Look up a header value by case-insensitive name.
  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|field| field.key.eq_ignore_ascii_case(name))
      .map(|field| field.value.as_str())
  }
}

/// Build a request descriptor.
///
/// Header fields overwrite an existing header of the same name and are
/// appended otherwise. Body fields are joined as `key=value` pairs separated
/// by `&` in the order given and set the form content type and the exact
/// byte length. Body fields are applied for any method; sending them with GET
/// is left to the caller's judgement.
///
/// Keys and values are used verbatim. Callers must pre-encode anything that
/// is not safe inside a raw form body.
pub fn build_request(
  url: Url,
  method: HttpMethod,
  timeout: Duration,
  cache_policy: Option<CachePolicy>,
  headers: Option<&[FieldPair]>,
  body_fields: Option<&[FieldPair]>,
) -> RequestDescriptor {
  let mut merged = Vec::new();
  for field in headers.unwrap_or_default() {
    merge_header(&mut merged, &field.key, &field.value);
  }

  let body = body_fields.map(|fields| {
    let payload = encode_form(fields);
    merge_header(&mut merged, "content-type", FORM_CONTENT_TYPE);
    merge_header(&mut merged, "content-length", &payload.len().to_string());
    payload.into_bytes()
  });

  RequestDescriptor {
    url,
    method,
    timeout,
    cache_policy,
    headers: merged,
    body,
  }
}

/// Join body fields into the form wire format.
pub fn encode_form(fields: &[FieldPair]) -> String {
  fields
    .iter()
    .map(|field| format!("{}={}", field.key, field.value))
    .collect::<Vec<_>>()
    .join("&")
}

fn merge_header(headers: &mut Vec<FieldPair>, key: &str, value: &str) {
  match headers
    .iter_mut()
    .find(|field| field.key.eq_ignore_ascii_case(key))
  {
    Some(existing) => existing.value = value.to_string(),
    None => headers.push(FieldPair::new(key, value)),
  }
}

use std::fmt;

/// Status code reported when no response was obtained at all.
pub const NO_RESPONSE_STATUS: u16 = 500;

/// Classification of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  /// The exchange failed or produced no usable response
  Transport,
  /// A response arrived without a payload
  EmptyBody,
  /// The payload does not match the expected schema
  Decode,
  /// Reserved
  Unknown,
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      ErrorKind::Transport => "transport failure",
      ErrorKind::EmptyBody => "empty response body",
      ErrorKind::Decode => "undecodable payload",
      ErrorKind::Unknown => "unknown error",
    };
    f.write_str(label)
  }
}

/// Error half of a fetch outcome.
///
/// `status_code` is best effort: transport failures carry
/// [`NO_RESPONSE_STATUS`] because no real status exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} (HTTP {status_code})")]
pub struct HttpError {
  pub status_code: u16,
  pub kind: ErrorKind,
}

impl HttpError {
  pub fn transport() -> Self {
    Self {
      status_code: NO_RESPONSE_STATUS,
      kind: ErrorKind::Transport,
    }
  }

  pub fn empty_body(status_code: u16) -> Self {
    Self {
      status_code,
      kind: ErrorKind::EmptyBody,
    }
  }

  pub fn decode(status_code: u16) -> Self {
    Self {
      status_code,
      kind: ErrorKind::Decode,
    }
  }
}

/// Why the transport could not produce a response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
  #[error("request timed out")]
  Timeout,

  #[error("connection failed: {0}")]
  Connect(String),

  #[error("request failed: {0}")]
  Request(String),

  #[error("failed to read response body: {0}")]
  Body(String),
}

impl From<reqwest::Error> for TransportError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_timeout() {
      TransportError::Timeout
    } else if e.is_connect() {
      TransportError::Connect(e.to_string())
    } else if e.is_body() || e.is_decode() {
      TransportError::Body(e.to_string())
    } else {
      TransportError::Request(e.to_string())
    }
  }
}

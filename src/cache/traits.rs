//! Core traits and types for the object cache.

use crate::http::HttpError;

/// Trait for objects that can be decoded from a fetched payload and cached.
pub trait CacheObject: Send + Sync + Sized + 'static {
  /// Decode raw response bytes into the cached object.
  fn decode(bytes: Vec<u8>) -> Result<Self, DecodeError>;
}

/// A payload that could not be turned into the cached object type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot decode {expected}: {reason}")]
pub struct DecodeError {
  pub expected: &'static str,
  pub reason: String,
}

/// Notifications sent after asynchronous population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
  /// The entry for `key` is ready; a `get` will now return it
  Populated { key: String },
}

/// Why a population attempt was dropped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CacheError {
  #[error("cache key is not a valid URL: {key}")]
  InvalidKey { key: String },

  #[error("fetch failed: {0}")]
  Fetch(HttpError),

  #[error(transparent)]
  Decode(DecodeError),
}

//! Session-lifetime object cache.
//!
//! This module provides a keyed cache that:
//! - Answers lookups synchronously from memory
//! - Populates misses in the background over the shared transport
//! - Shares one fetch between concurrent misses for the same key
//! - Never caches failures and never evicts

mod image;
mod layer;
mod storage;
mod traits;

pub use image::{ImageAsset, ImageFormat};
pub use layer::{FailureHook, ObjectCache};
pub use traits::{CacheError, CacheEvent, CacheObject, DecodeError};

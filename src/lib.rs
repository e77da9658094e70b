//! Paginated delivery-order browsing over a small REST layer.
//!
//! The library holds the networking core: request construction
//! ([`http::build_request`]), a fetch client that reduces every failure to an
//! [`http::HttpError`], a shared [`cache::ObjectCache`] for order pictures, and
//! the [`pagination::PaginationController`] state machine. The `deliverable`
//! binary wraps them in a terminal UI.

pub mod cache;
pub mod config;
pub mod db;
pub mod delivery;
pub mod http;
pub mod pagination;

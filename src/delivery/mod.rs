//! Delivery orders: the wire records, the list endpoint, and price display.

mod endpoint;
mod pricing;
mod types;

pub use endpoint::{DeliveryEndpoint, DEFAULT_BASE_URL, DEFAULT_PATH};
pub use pricing::{parse_amount, total_price};
pub use types::{pretty_timestamp, Record, Route, Sender};

#[cfg(test)]
pub(crate) use types::tests as tests_support;

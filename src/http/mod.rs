//! HTTP plumbing: request construction, the transport seam, and the REST
//! client that classifies and decodes responses.

mod client;
mod error;
#[cfg(test)]
pub(crate) mod mock;
mod request;
mod transport;

pub use client::{FetchOutcome, PendingFetch, RestClient};
pub use error::{ErrorKind, HttpError, TransportError, NO_RESPONSE_STATUS};
pub use request::{
  build_request, encode_form, CachePolicy, FieldPair, HttpMethod, RequestDescriptor,
  FORM_CONTENT_TYPE,
};
pub use transport::{RawResponse, ReqwestTransport, Transport};

use std::time::Duration;

use url::Url;

use crate::http::{build_request, FieldPair, HttpMethod, RequestDescriptor};
use crate::pagination::PageSource;

pub const DEFAULT_BASE_URL: &str = "https://mock-api-mobile.dev.lalamove.com";
pub const DEFAULT_PATH: &str = "/v2/deliveries";

/// The delivery list endpoint: `GET <base><path>?offset=<n>&limit=<n>`.
#[derive(Debug, Clone)]
pub struct DeliveryEndpoint {
  url: Url,
  timeout: Duration,
}

impl DeliveryEndpoint {
  pub fn new(base_url: &str, path: &str, timeout: Duration) -> Result<Self, url::ParseError> {
    let url = Url::parse(base_url)?.join(path)?;
    Ok(Self { url, timeout })
  }

  pub fn url(&self) -> &Url {
    &self.url
  }

  pub fn host(&self) -> &str {
    self.url.host_str().unwrap_or_default()
  }
}

impl PageSource for DeliveryEndpoint {
  fn page_request(&self, offset: u32, limit: u32) -> RequestDescriptor {
    let mut url = self.url.clone();
    url
      .query_pairs_mut()
      .clear()
      .append_pair("offset", &offset.to_string())
      .append_pair("limit", &limit.to_string());

    let headers = [FieldPair::new("accept", "application/json")];
    build_request(url, HttpMethod::Get, self.timeout, None, Some(&headers), None)
  }
}

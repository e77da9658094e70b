//! Generic REST client: one exchange per call, classified and decoded.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::error::HttpError;
use super::request::RequestDescriptor;
use super::transport::Transport;

/// Success or error of a single fetch, never both.
pub type FetchOutcome<T> = Result<T, HttpError>;

/// REST client decoding JSON payloads into caller-chosen types.
#[derive(Clone)]
pub struct RestClient {
  transport: Arc<dyn Transport>,
}

impl RestClient {
  pub fn new(transport: Arc<dyn Transport>) -> Self {
    Self { transport }
  }

  pub fn transport(&self) -> &Arc<dyn Transport> {
    &self.transport
  }

  /// Perform the exchange described by `request` and decode the body as `T`.
  ///
  /// Status codes are not inspected beyond being reported: any response whose
  /// body decodes is a success. A failed attempt is final.
  pub async fn fetch<T: DeserializeOwned>(&self, request: RequestDescriptor) -> FetchOutcome<T> {
    let url = request.url.clone();

    let response = match self.transport.execute(request).await {
      Ok(response) => response,
      Err(e) => {
        warn!(%url, error = %e, "transport failure");
        return Err(HttpError::transport());
      }
    };

    if response.body.is_empty() {
      warn!(%url, status = response.status, "response had no body");
      return Err(HttpError::empty_body(response.status));
    }

    match serde_json::from_slice(&response.body) {
      Ok(value) => {
        debug!(%url, status = response.status, bytes = response.body.len(), "decoded response");
        Ok(value)
      }
      Err(e) => {
        warn!(%url, status = response.status, error = %e, "failed to decode response");
        Err(HttpError::decode(response.status))
      }
    }
  }

  /// Spawn `fetch` on the runtime and hand back a handle to its outcome.
  ///
  /// The outcome is delivered exactly once to the handle. If the handle is
  /// dropped first, the completion is discarded.
  pub fn dispatch<T>(&self, request: RequestDescriptor) -> PendingFetch<T>
  where
    T: DeserializeOwned + Send + 'static,
  {
    let (tx, rx) = oneshot::channel();
    let client = self.clone();

    tokio::spawn(async move {
      let outcome = client.fetch::<T>(request).await;
      // Receiver may have been dropped
      let _ = tx.send(outcome);
    });

    PendingFetch { receiver: rx }
  }
}

/// Handle to a dispatched fetch, owned by whoever consumes the outcome.
#[derive(Debug)]
pub struct PendingFetch<T> {
  receiver: oneshot::Receiver<FetchOutcome<T>>,
}

impl<T> PendingFetch<T> {
  /// Take the outcome if it has arrived, without blocking.
  ///
  /// Returns `None` while the exchange is still running. A task that died
  /// without reporting is surfaced as an `Unknown` error.
  pub fn poll(&mut self) -> Option<FetchOutcome<T>> {
    match self.receiver.try_recv() {
      Ok(outcome) => Some(outcome),
      Err(oneshot::error::TryRecvError::Empty) => None,
      Err(oneshot::error::TryRecvError::Closed) => Some(Err(abandoned())),
    }
  }

  /// Wait for the outcome.
  pub async fn wait(self) -> FetchOutcome<T> {
    self.receiver.await.unwrap_or_else(|_| Err(abandoned()))
  }
}

fn abandoned() -> HttpError {
  HttpError {
    status_code: super::error::NO_RESPONSE_STATUS,
    kind: super::error::ErrorKind::Unknown,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http::error::ErrorKind;
  use crate::http::mock::MockTransport;
  use crate::http::request::{build_request, HttpMethod};
  use serde::Deserialize;
  use std::time::Duration;
  use url::Url;

  #[derive(Debug, Deserialize, PartialEq)]
  struct Item {
    id: String,
    count: u32,
  }

  fn get(path: &str) -> RequestDescriptor {
    let url = Url::parse("http://api.test").unwrap().join(path).unwrap();
    build_request(url, HttpMethod::Get, Duration::from_secs(5), None, None, None)
  }

  fn client(transport: &MockTransport) -> RestClient {
    RestClient::new(Arc::new(transport.clone()))
  }

  #[tokio::test]
  async fn test_transport_failure_is_500() {
    let transport = MockTransport::new();
    transport.fail("/items");

    let outcome = client(&transport).fetch::<Vec<Item>>(get("/items")).await;
    assert_eq!(outcome, Err(HttpError::transport()));
  }

  #[tokio::test]
  async fn test_schema_mismatch_is_decode_error_with_status() {
    let transport = MockTransport::new();
    transport.respond("/items", 200, r#"[{"id": "a"}]"#);

    let err = client(&transport)
      .fetch::<Vec<Item>>(get("/items"))
      .await
      .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Decode);
    assert_eq!(err.status_code, 200);
  }

  #[tokio::test]
  async fn test_empty_body_reports_actual_status() {
    let transport = MockTransport::new();
    transport.respond("/items", 204, Vec::new());

    let err = client(&transport)
      .fetch::<Vec<Item>>(get("/items"))
      .await
      .unwrap_err();
    assert_eq!(err, HttpError::empty_body(204));
  }

  #[tokio::test]
  async fn test_valid_payload_decodes() {
    let transport = MockTransport::new();
    transport.respond(
      "/items",
      200,
      r#"[{"id": "a", "count": 1}, {"id": "b", "count": 2}]"#,
    );

    let items = client(&transport)
      .fetch::<Vec<Item>>(get("/items"))
      .await
      .unwrap();
    assert_eq!(
      items,
      vec![
        Item {
          id: "a".to_string(),
          count: 1
        },
        Item {
          id: "b".to_string(),
          count: 2
        },
      ]
    );
  }

  #[tokio::test]
  async fn test_error_status_with_decodable_body_is_success() {
    let transport = MockTransport::new();
    transport.respond("/item", 404, r#"{"id": "x", "count": 0}"#);

    let item = client(&transport).fetch::<Item>(get("/item")).await.unwrap();
    assert_eq!(item.id, "x");
  }

  #[tokio::test]
  async fn test_error_status_with_html_body_is_decode_error() {
    let transport = MockTransport::new();
    transport.respond("/item", 502, "<html>bad gateway</html>");

    let err = client(&transport).fetch::<Item>(get("/item")).await.unwrap_err();
    assert_eq!(err, HttpError::decode(502));
  }

  #[tokio::test]
  async fn test_no_retry_after_failure() {
    let transport = MockTransport::new();
    transport.fail_all();

    let _ = client(&transport).fetch::<Item>(get("/item")).await;
    assert_eq!(transport.calls(), 1);
  }

  #[tokio::test]
  async fn test_dispatch_delivers_once() {
    let transport = MockTransport::new().with_delay(Duration::from_millis(20));
    transport.respond("/item", 200, r#"{"id": "x", "count": 3}"#);

    let mut pending = client(&transport).dispatch::<Item>(get("/item"));
    assert!(pending.poll().is_none());

    tokio::time::sleep(Duration::from_millis(60)).await;
    let item = pending.poll().unwrap().unwrap();
    assert_eq!(item.count, 3);
  }

  #[tokio::test]
  async fn test_completion_after_handle_dropped_is_discarded() {
    let transport = MockTransport::new().with_delay(Duration::from_millis(20));
    transport.respond("/item", 200, r#"{"id": "x", "count": 3}"#);
    let client = client(&transport);

    let pending = client.dispatch::<Item>(get("/item"));
    drop(pending);
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(transport.calls(), 1);
    assert_eq!(transport.finished(), 1);

    // The runtime is still healthy afterwards
    let item = client.dispatch::<Item>(get("/item")).wait().await.unwrap();
    assert_eq!(item.count, 3);
  }

  #[tokio::test]
  async fn test_dead_task_surfaces_as_unknown() {
    let (tx, rx) = oneshot::channel::<FetchOutcome<Item>>();
    let mut pending = PendingFetch { receiver: rx };

    assert!(pending.poll().is_none());
    drop(tx);

    let err = pending.poll().unwrap().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unknown);
    assert_eq!(err.status_code, 500);
  }

  #[tokio::test]
  async fn test_dispatch_wait() {
    let transport = MockTransport::new();
    transport.fail_all();

    let outcome = client(&transport).dispatch::<Item>(get("/item")).wait().await;
    assert_eq!(outcome, Err(HttpError::transport()));
  }
}

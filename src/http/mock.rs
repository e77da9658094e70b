//! In-process transport double for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;

use super::error::TransportError;
use super::request::RequestDescriptor;
use super::transport::{RawResponse, Transport};

#[derive(Clone)]
enum Canned {
  Respond(RawResponse),
  Fail,
}

/// Serves canned responses keyed by URL path, counting every request.
///
/// Requests for unknown paths fall back to the default response, or fail
/// with a connection error when there is none.
#[derive(Clone, Default)]
pub struct MockTransport {
  routes: Arc<Mutex<HashMap<String, Canned>>>,
  fallback: Arc<Mutex<Option<Canned>>>,
  requests: Arc<Mutex<Vec<RequestDescriptor>>>,
  calls: Arc<AtomicUsize>,
  finished: Arc<AtomicUsize>,
  delay: Duration,
}

impl MockTransport {
  pub fn new() -> Self {
    Self::default()
  }

  /// Hold every response for `delay` before completing.
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }

  pub fn respond(&self, path: &str, status: u16, body: impl Into<Vec<u8>>) {
    let canned = Canned::Respond(RawResponse {
      status,
      body: body.into(),
    });
    self.routes.lock().unwrap().insert(path.to_string(), canned);
  }

  pub fn fail(&self, path: &str) {
    self.routes.lock().unwrap().insert(path.to_string(), Canned::Fail);
  }

  pub fn respond_to_all(&self, status: u16, body: impl Into<Vec<u8>>) {
    *self.fallback.lock().unwrap() = Some(Canned::Respond(RawResponse {
      status,
      body: body.into(),
    }));
  }

  pub fn fail_all(&self) {
    *self.fallback.lock().unwrap() = Some(Canned::Fail);
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  /// Exchanges that ran to completion, successful or not.
  pub fn finished(&self) -> usize {
    self.finished.load(Ordering::SeqCst)
  }

  pub fn requests(&self) -> Vec<RequestDescriptor> {
    self.requests.lock().unwrap().clone()
  }
}

impl Transport for MockTransport {
  fn execute(&self, request: RequestDescriptor) -> BoxFuture<'static, Result<RawResponse, TransportError>> {
    self.calls.fetch_add(1, Ordering::SeqCst);

    let canned = self
      .routes
      .lock()
      .unwrap()
      .get(request.url.path())
      .cloned()
      .or_else(|| self.fallback.lock().unwrap().clone());
    self.requests.lock().unwrap().push(request);

    let delay = self.delay;
    let finished = Arc::clone(&self.finished);
    Box::pin(async move {
      if !delay.is_zero() {
        tokio::time::sleep(delay).await;
      }
      finished.fetch_add(1, Ordering::SeqCst);
      match canned {
        Some(Canned::Respond(response)) => Ok(response),
        Some(Canned::Fail) | None => Err(TransportError::Connect("connection refused".to_string())),
      }
    })
  }
}

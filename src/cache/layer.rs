//! Object cache that populates itself from the network on a miss.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};
use url::Url;

use super::storage::{EntryTable, Lookup};
use super::traits::{CacheError, CacheEvent, CacheObject};
use crate::http::{build_request, CachePolicy, HttpError, HttpMethod, Transport};

/// Callback invoked when a population attempt is dropped.
pub type FailureHook = Arc<dyn Fn(&str, &CacheError) + Send + Sync>;

/// Keyed object cache shared across the session.
///
/// Keys are URLs. `get` answers synchronously from memory; a miss starts a
/// background fetch and returns `None`, and the populated value is observed
/// through a later `get` (plus a `CacheEvent` when a notifier is set).
/// Concurrent misses for the same key share one fetch. Failures are logged
/// and forgotten, so the next `get` retries.
pub struct ObjectCache<T: CacheObject> {
  table: Arc<EntryTable<T>>,
  transport: Arc<dyn Transport>,
  timeout: Duration,
  notifier: Option<mpsc::UnboundedSender<CacheEvent>>,
  on_failure: Option<FailureHook>,
}

impl<T: CacheObject> ObjectCache<T> {
  pub fn new(transport: Arc<dyn Transport>) -> Self {
    Self {
      table: Arc::new(EntryTable::default()),
      transport,
      timeout: Duration::from_secs(30),
      notifier: None,
      on_failure: None,
    }
  }

  /// Set the timeout for population fetches.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// Send a `CacheEvent` to `notifier` whenever an entry becomes ready.
  pub fn with_notifier(mut self, notifier: mpsc::UnboundedSender<CacheEvent>) -> Self {
    self.notifier = Some(notifier);
    self
  }

  /// Observe dropped population attempts in addition to the log.
  pub fn with_failure_hook(mut self, hook: FailureHook) -> Self {
    self.on_failure = Some(hook);
    self
  }

  /// Return the object for `key` if it is ready.
  ///
  /// On a miss this schedules population on the tokio runtime and returns
  /// `None`; it must be called from within a runtime context.
  pub fn get(&self, key: &str) -> Option<Arc<T>> {
    match self.table.lookup_or_claim(key) {
      Lookup::Hit(value) => Some(value),
      Lookup::InFlight => None,
      Lookup::Claimed => {
        self.populate(key.to_string());
        None
      }
    }
  }

  /// Return the object for `key` if it is ready, never fetching.
  pub fn peek(&self, key: &str) -> Option<Arc<T>> {
    self.table.peek(key)
  }

  pub fn contains(&self, key: &str) -> bool {
    self.table.peek(key).is_some()
  }

  pub fn is_populating(&self, key: &str) -> bool {
    self.table.is_populating(key)
  }

  /// Number of ready entries.
  pub fn len(&self) -> usize {
    self.table.ready_count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn populate(&self, key: String) {
    let url = match Url::parse(&key) {
      Ok(url) => url,
      Err(_) => {
        self.table.abandon(&key);
        report_failure(&self.on_failure, &key, CacheError::InvalidKey { key: key.clone() });
        return;
      }
    };

    let request = build_request(
      url,
      HttpMethod::Get,
      self.timeout,
      Some(CachePolicy::UseProtocolDefault),
      None,
      None,
    );
    let table = Arc::clone(&self.table);
    let transport = Arc::clone(&self.transport);
    let notifier = self.notifier.clone();
    let on_failure = self.on_failure.clone();

    debug!(%key, "populating cache entry");

    tokio::spawn(async move {
      let result = match transport.execute(request).await {
        Err(e) => {
          debug!(%key, error = %e, "cache fetch transport error");
          Err(CacheError::Fetch(HttpError::transport()))
        }
        Ok(response) if response.body.is_empty() => {
          Err(CacheError::Fetch(HttpError::empty_body(response.status)))
        }
        Ok(response) => T::decode(response.body).map_err(CacheError::Decode),
      };

      match result {
        Ok(value) => {
          table.fulfil(&key, value);
          debug!(%key, "cache entry ready");
          if let Some(notifier) = notifier {
            // Nobody listening is fine
            let _ = notifier.send(CacheEvent::Populated { key });
          }
        }
        Err(error) => {
          table.abandon(&key);
          report_failure(&on_failure, &key, error);
        }
      }
    });
  }
}

fn report_failure(hook: &Option<FailureHook>, key: &str, error: CacheError) {
  warn!(%key, %error, "dropping cache population");
  if let Some(hook) = hook {
    hook(key, &error);
  }
}

impl<T: CacheObject> Clone for ObjectCache<T> {
  fn clone(&self) -> Self {
    Self {
      table: Arc::clone(&self.table),
      transport: Arc::clone(&self.transport),
      timeout: self.timeout,
      notifier: self.notifier.clone(),
      on_failure: self.on_failure.clone(),
    }
  }
}

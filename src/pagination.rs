//! Page-by-page loading with at most one fetch in flight.
//!
//! `PaginationController<T>` owns the current page, the records of the last
//! successful fetch, and the handle of the outstanding fetch, if any. Page
//! changes are rejected while a fetch is outstanding, so results can never
//! arrive out of order.
//!
//! # Example
//!
//! ```ignore
//! let mut pages = PaginationController::new(client, endpoint, 20);
//! pages.refresh();
//!
//! // In event loop tick
//! if pages.poll() {
//!     // Fetch finished, trigger re-render
//! }
//!
//! // In key handler
//! pages.advance(); // ignored while loading
//! ```

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::http::{HttpError, PendingFetch, RequestDescriptor, RestClient};

/// Builds the request for one page of results.
pub trait PageSource: Send + Sync {
  fn page_request(&self, offset: u32, limit: u32) -> RequestDescriptor;
}

/// Current page and the query offset derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
  page_index: u32,
  items_per_page: u32,
}

impl PageState {
  /// Start on page 1. `items_per_page` is clamped to at least 1.
  pub fn new(items_per_page: u32) -> Self {
    Self {
      page_index: 1,
      items_per_page: items_per_page.max(1),
    }
  }

  pub fn page_index(&self) -> u32 {
    self.page_index
  }

  pub fn items_per_page(&self) -> u32 {
    self.items_per_page
  }

  /// Offset sent to the endpoint.
  ///
  /// Page 1 starts at 0; later pages start at `items_per_page * page + 1`,
  /// which does not line up with `items_per_page * (page - 1)`. The backend
  /// this talks to is queried with exactly these offsets.
  pub fn start_offset(&self) -> u32 {
    if self.page_index == 1 {
      0
    } else {
      self
        .items_per_page
        .saturating_mul(self.page_index)
        .saturating_add(1)
    }
  }

  fn next(self) -> Self {
    Self {
      page_index: self.page_index.saturating_add(1),
      ..self
    }
  }

  fn previous(self) -> Option<Self> {
    (self.page_index > 1).then(|| Self {
      page_index: self.page_index - 1,
      ..self
    })
  }
}

/// Whether a fetch is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
  Idle,
  Loading,
}

/// Pagination state machine over a `PageSource`.
pub struct PaginationController<T> {
  client: RestClient,
  source: Box<dyn PageSource>,
  page: PageState,
  load: LoadState,
  records: Vec<T>,
  pending: Option<PendingFetch<Vec<T>>>,
  last_error: Option<HttpError>,
  dispatched: u64,
}

impl<T> PaginationController<T>
where
  T: DeserializeOwned + Send + 'static,
{
  pub fn new(client: RestClient, source: impl PageSource + 'static, items_per_page: u32) -> Self {
    Self {
      client,
      source: Box::new(source),
      page: PageState::new(items_per_page),
      load: LoadState::Idle,
      records: Vec::new(),
      pending: None,
      last_error: None,
      dispatched: 0,
    }
  }

  pub fn page(&self) -> PageState {
    self.page
  }

  pub fn load_state(&self) -> LoadState {
    self.load
  }

  pub fn is_loading(&self) -> bool {
    self.load == LoadState::Loading
  }

  /// Records of the last successful fetch.
  pub fn records(&self) -> &[T] {
    &self.records
  }

  /// Error of the most recent fetch, cleared by the next success.
  pub fn last_error(&self) -> Option<&HttpError> {
    self.last_error.as_ref()
  }

  /// Number of fetches issued so far.
  pub fn dispatch_count(&self) -> u64 {
    self.dispatched
  }

  /// Move to the next page and fetch it.
  ///
  /// Returns `false` without changing anything while a fetch is outstanding.
  pub fn advance(&mut self) -> bool {
    if self.is_loading() {
      debug!("ignoring next page while loading");
      return false;
    }
    self.page = self.page.next();
    info!(page = self.page.page_index(), "advancing page");
    self.dispatch();
    true
  }

  /// Move to the previous page and fetch it.
  ///
  /// Returns `false` without changing anything on page 1 or while a fetch is
  /// outstanding.
  pub fn retreat(&mut self) -> bool {
    if self.is_loading() {
      debug!("ignoring previous page while loading");
      return false;
    }
    let Some(previous) = self.page.previous() else {
      return false;
    };
    self.page = previous;
    info!(page = self.page.page_index(), "retreating page");
    self.dispatch();
    true
  }

  /// Fetch the current page again.
  ///
  /// Returns `false` while a fetch is outstanding.
  pub fn refresh(&mut self) -> bool {
    if self.is_loading() {
      debug!("ignoring refresh while loading");
      return false;
    }
    self.dispatch();
    true
  }

  /// Collect the outstanding fetch if it has finished.
  ///
  /// Returns `true` if the state changed. Call this in your event loop tick.
  pub fn poll(&mut self) -> bool {
    let Some(pending) = self.pending.as_mut() else {
      return false;
    };
    match pending.poll() {
      Some(outcome) => {
        self.complete(outcome);
        true
      }
      None => false,
    }
  }

  /// Wait for the outstanding fetch, if any, and apply its outcome.
  pub async fn settle(&mut self) {
    if let Some(pending) = self.pending.take() {
      let outcome = pending.wait().await;
      self.complete(outcome);
    }
  }

  fn dispatch(&mut self) {
    let request = self
      .source
      .page_request(self.page.start_offset(), self.page.items_per_page());
    debug!(url = %request.url, "dispatching page fetch");

    self.pending = Some(self.client.dispatch(request));
    self.load = LoadState::Loading;
    self.dispatched += 1;
  }

  fn complete(&mut self, outcome: Result<Vec<T>, HttpError>) {
    self.pending = None;
    self.load = LoadState::Idle;
    match outcome {
      Ok(records) => {
        debug!(count = records.len(), "page loaded");
        self.records = records;
        self.last_error = None;
      }
      Err(e) => {
        // Keep showing the previous records
        warn!(page = self.page.page_index(), error = %e, "page fetch failed");
        self.last_error = Some(e);
      }
    }
  }
}

impl<T> std::fmt::Debug for PaginationController<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PaginationController")
      .field("page", &self.page)
      .field("load", &self.load)
      .field("records", &self.records.len())
      .field("last_error", &self.last_error)
      .field("dispatched", &self.dispatched)
      .finish_non_exhaustive()
  }
}

use crate::event::{Event, EventHandler};
use crate::ui;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::DeliveryListView;
use color_eyre::{eyre::eyre, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use deliverable::cache::{CacheEvent, ImageAsset, ObjectCache};
use deliverable::config::Config;
use deliverable::db::{FavoriteStore, SqliteFavorites};
use deliverable::http::{ReqwestTransport, RestClient, Transport};
use deliverable::pagination::PaginationController;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Host of the delivery API, shown in the header
  host: String,

  /// Favorite flags, purged of unflagged rows at exit
  favorites: Arc<dyn FavoriteStore>,

  /// Cache notifications, forwarded to the event loop once it starts
  cache_rx: Option<mpsc::UnboundedReceiver<CacheEvent>>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  /// Wire the shared HTTP stack, picture cache, and favorite store into the
  /// root view.
  pub fn new(config: Config) -> Result<Self> {
    let endpoint = config.endpoint()?;
    let host = endpoint.host().to_string();

    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new());
    let client = RestClient::new(Arc::clone(&transport));

    let (cache_tx, cache_rx) = mpsc::unbounded_channel();
    let images = ObjectCache::<ImageAsset>::new(transport)
      .with_timeout(config.image_timeout())
      .with_notifier(cache_tx);

    let favorites: Arc<dyn FavoriteStore> = match &config.favorites_path {
      Some(path) => Arc::new(SqliteFavorites::open_at(path)?),
      None => Arc::new(SqliteFavorites::open()?),
    };

    let pages = PaginationController::new(client, endpoint, config.pagination.items_per_page);
    let root = DeliveryListView::new(pages, images, Arc::clone(&favorites));

    info!(%host, items_per_page = config.pagination.items_per_page, "app initialised");

    Ok(Self {
      view_stack: vec![Box::new(root)],
      host,
      favorites,
      cache_rx: Some(cache_rx),
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(250));
    if let Some(cache_rx) = self.cache_rx.take() {
      events.forward_cache(cache_rx);
    }

    let result = self.main_loop(&mut terminal, &mut events).await;
    self.shutdown(result, restore_terminal)
  }

  /// Purge favorites, then restore the terminal, whatever failed before.
  ///
  /// The loop's error wins over a restore error.
  fn shutdown(&self, result: Result<()>, restore: impl FnOnce() -> Result<()>) -> Result<()> {
    self.end_session();
    let restored = restore();
    result.and(restored)
  }

  async fn main_loop(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal
        .draw(|frame| ui::draw(frame, self))
        .map_err(|e| eyre!("Failed to draw frame: {}", e))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {
        if let Some(view) = self.current_view_mut() {
          view.tick();
        }
      }
      // The next draw picks the picture up
      Event::Cache(CacheEvent::Populated { key }) => debug!(%key, "picture ready"),
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let action = match self.current_view_mut() {
      Some(view) => view.handle_key(key),
      None => return,
    };

    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  /// Drop favorites rows that were unflagged during the session.
  fn end_session(&self) {
    if let Err(e) = self.favorites.purge_non_favorites() {
      warn!(error = %e, "failed to purge unflagged favorites");
    }
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|view| view.breadcrumb_label())
      .collect()
  }

  pub fn host(&self) -> &str {
    &self.host
  }
}

/// Leave raw mode and the alternate screen, attempting both even if one fails.
fn restore_terminal() -> Result<()> {
  let raw = disable_raw_mode();
  let screen = stdout().execute(LeaveAlternateScreen).map(|_| ());
  raw
    .and(screen)
    .map_err(|e| eyre!("Failed to restore terminal: {}", e))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn app(favorites: Arc<dyn FavoriteStore>) -> App {
    App {
      view_stack: Vec::new(),
      host: "api.test".to_string(),
      favorites,
      cache_rx: None,
      should_quit: false,
    }
  }

  #[test]
  fn test_shutdown_purges_when_restore_fails() {
    let store = Arc::new(SqliteFavorites::in_memory().unwrap());
    store.set_favorite("keep").unwrap();
    store.set_favorite("drop").unwrap();
    store.remove_favorite("drop").unwrap();

    let app = app(store.clone());
    let err = app
      .shutdown(Ok(()), || Err(eyre!("terminal gone")))
      .unwrap_err();

    assert!(err.to_string().contains("terminal gone"));
    assert!(store.is_favorite("keep").unwrap());
    // Nothing unflagged is left to purge
    assert_eq!(store.purge_non_favorites().unwrap(), 0);
  }

  #[test]
  fn test_shutdown_keeps_loop_error() {
    let store = Arc::new(SqliteFavorites::in_memory().unwrap());
    let app = app(store);

    let err = app
      .shutdown(Err(eyre!("draw failed")), || Err(eyre!("terminal gone")))
      .unwrap_err();
    assert!(err.to_string().contains("draw failed"));
  }
}

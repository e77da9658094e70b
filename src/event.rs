use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use deliverable::cache::CacheEvent;
use std::time::Duration;
use tokio::sync::mpsc;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Periodic tick for UI refresh and page polling
  Tick,
  /// A cached object finished populating
  Cache(CacheEvent),
}

/// Event handler that produces events from terminal input and a tick timer
pub struct EventHandler {
  tx: mpsc::UnboundedSender<Event>,
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // crossterm's poll blocks, so read the terminal off the async workers
    let input_tx = tx.clone();
    tokio::task::spawn_blocking(move || loop {
      let sent = match event::poll(tick_rate) {
        Ok(true) => match event::read() {
          Ok(CrosstermEvent::Key(key)) => input_tx.send(Event::Key(key)),
          _ => Ok(()),
        },
        _ => input_tx.send(Event::Tick),
      };
      if sent.is_err() {
        break;
      }
    });

    Self { tx, rx }
  }

  /// Sender for events produced outside the terminal
  pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
    self.tx.clone()
  }

  /// Forward cache notifications into the event stream.
  pub fn forward_cache(&self, mut cache_rx: mpsc::UnboundedReceiver<CacheEvent>) {
    let tx = self.sender();
    tokio::spawn(async move {
      while let Some(evt) = cache_rx.recv().await {
        if tx.send(Event::Cache(evt)).is_err() {
          break;
        }
      }
    });
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}

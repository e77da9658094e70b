//! In-memory entry table backing the object cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Population state of a present entry. Absent keys have no entry.
#[derive(Debug)]
enum Entry<T> {
  Populating,
  Ready(Arc<T>),
}

/// Result of looking a key up.
#[derive(Debug)]
pub enum Lookup<T> {
  /// The entry is ready
  Hit(Arc<T>),
  /// The key was absent and is now marked populating; the caller must
  /// either fulfil or abandon it
  Claimed,
  /// Another caller is already populating the key
  InFlight,
}

/// Shared map from key to entry. Lives for the whole session; nothing is
/// evicted.
#[derive(Debug)]
pub struct EntryTable<T> {
  entries: Mutex<HashMap<String, Entry<T>>>,
}

impl<T> Default for EntryTable<T> {
  fn default() -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
    }
  }
}

impl<T> EntryTable<T> {
  // A panic while holding the lock cannot leave an entry half-written
  fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry<T>>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Look up `key`, claiming it for population when absent.
  pub fn lookup_or_claim(&self, key: &str) -> Lookup<T> {
    let mut entries = self.lock();
    match entries.get(key) {
      Some(Entry::Ready(value)) => Lookup::Hit(Arc::clone(value)),
      Some(Entry::Populating) => Lookup::InFlight,
      None => {
        entries.insert(key.to_string(), Entry::Populating);
        Lookup::Claimed
      }
    }
  }

  /// Look up a ready entry without claiming anything.
  pub fn peek(&self, key: &str) -> Option<Arc<T>> {
    match self.lock().get(key) {
      Some(Entry::Ready(value)) => Some(Arc::clone(value)),
      _ => None,
    }
  }

  pub fn fulfil(&self, key: &str, value: T) {
    self.lock().insert(key.to_string(), Entry::Ready(Arc::new(value)));
  }

  /// Drop a failed population so the next lookup starts over.
  pub fn abandon(&self, key: &str) {
    let mut entries = self.lock();
    if matches!(entries.get(key), Some(Entry::Populating)) {
      entries.remove(key);
    }
  }

  /// Number of ready entries.
  pub fn ready_count(&self) -> usize {
    self
      .lock()
      .values()
      .filter(|entry| matches!(entry, Entry::Ready(_)))
      .count()
  }

  pub fn is_populating(&self, key: &str) -> bool {
    matches!(self.lock().get(key), Some(Entry::Populating))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_claim_then_fulfil() {
    let table = EntryTable::default();

    assert!(matches!(table.lookup_or_claim("a"), Lookup::Claimed));
    assert!(matches!(table.lookup_or_claim("a"), Lookup::InFlight));
    assert!(table.peek("a").is_none());
    assert_eq!(table.ready_count(), 0);

    table.fulfil("a", 7);
    match table.lookup_or_claim("a") {
      Lookup::Hit(value) => assert_eq!(*value, 7),
      other => panic!("expected hit, got {:?}", other),
    }
    assert_eq!(table.ready_count(), 1);
  }

  #[test]
  fn test_abandon_allows_new_claim() {
    let table: EntryTable<u8> = EntryTable::default();

    assert!(matches!(table.lookup_or_claim("a"), Lookup::Claimed));
    table.abandon("a");
    assert!(!table.is_populating("a"));
    assert!(matches!(table.lookup_or_claim("a"), Lookup::Claimed));
  }

  #[test]
  fn test_abandon_keeps_ready_entries() {
    let table = EntryTable::default();
    table.fulfil("a", 1);
    table.abandon("a");
    assert_eq!(table.peek("a").as_deref(), Some(&1));
  }
}

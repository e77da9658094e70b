//! Local persistence of per-order favorite flags.

pub mod schema;

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Key-value store of favorite flags by order id.
pub trait FavoriteStore: Send + Sync {
  /// Whether the order is flagged. Unknown ids are not favorites.
  fn is_favorite(&self, order_id: &str) -> Result<bool>;

  /// Flag the order, creating its row if needed.
  fn set_favorite(&self, order_id: &str) -> Result<()>;

  /// Clear the flag. The row stays until the next purge.
  fn remove_favorite(&self, order_id: &str) -> Result<()>;

  /// Delete every row that is not flagged. Returns the number removed.
  fn purge_non_favorites(&self) -> Result<usize>;
}

/// SQLite-backed favorite store.
pub struct SqliteFavorites {
  conn: Mutex<Connection>,
}

impl SqliteFavorites {
  /// Open or create the store at the default location.
  pub fn open() -> Result<Self> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open or create the store at `path`.
  pub fn open_at(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create database directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// A store that lives only as long as the process.
  pub fn in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory database: {}", e))?;
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;
    Ok(store)
  }

  /// Get the default database path
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("deliverable").join("favorites.db"))
  }

  /// Run database migrations
  fn run_migrations(&self) -> Result<()> {
    self
      .lock()?
      .execute_batch(schema::SCHEMA)
      .map_err(|e| eyre!("Failed to run migrations: {}", e))?;
    Ok(())
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl FavoriteStore for SqliteFavorites {
  fn is_favorite(&self, order_id: &str) -> Result<bool> {
    let conn = self.lock()?;
    let flag: Option<bool> = conn
      .query_row(
        "SELECT is_favorite FROM favorite_orders WHERE order_id = ?",
        params![order_id],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read favorite {}: {}", order_id, e))?;

    Ok(flag.unwrap_or(false))
  }

  fn set_favorite(&self, order_id: &str) -> Result<()> {
    let conn = self.lock()?;
    conn
      .execute(
        "INSERT INTO favorite_orders (order_id, is_favorite, updated_at)
         VALUES (?, 1, datetime('now'))
         ON CONFLICT(order_id) DO UPDATE SET is_favorite = 1, updated_at = datetime('now')",
        params![order_id],
      )
      .map_err(|e| eyre!("Failed to set favorite {}: {}", order_id, e))?;

    debug!(%order_id, "favorite set");
    Ok(())
  }

  fn remove_favorite(&self, order_id: &str) -> Result<()> {
    let conn = self.lock()?;
    let updated = conn
      .execute(
        "UPDATE favorite_orders SET is_favorite = 0, updated_at = datetime('now')
         WHERE order_id = ?",
        params![order_id],
      )
      .map_err(|e| eyre!("Failed to remove favorite {}: {}", order_id, e))?;

    if updated == 0 {
      debug!(%order_id, "no favorite entry to remove");
    }
    Ok(())
  }

  fn purge_non_favorites(&self) -> Result<usize> {
    let conn = self.lock()?;
    let removed = conn
      .execute("DELETE FROM favorite_orders WHERE is_favorite = 0", [])
      .map_err(|e| eyre!("Failed to purge favorites: {}", e))?;

    info!(removed, "purged unflagged orders");
    Ok(removed)
  }
}

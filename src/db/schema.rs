/// Schema for the favorite-flag store.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS favorite_orders (
    order_id TEXT PRIMARY KEY,
    is_favorite INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_favorite_orders_flag
    ON favorite_orders(is_favorite);
"#;

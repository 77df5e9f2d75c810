/// Schema for the key-value store and the cache worker's buckets.
pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- String-keyed JSON values (categories, task lists, colors, theme)
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Named cache buckets, ordered by creation
CREATE TABLE IF NOT EXISTS cache_buckets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Response snapshots keyed by request
CREATE TABLE IF NOT EXISTS cache_entries (
    bucket_id INTEGER NOT NULL,
    request_hash TEXT NOT NULL,
    method TEXT NOT NULL,
    url TEXT NOT NULL,
    status INTEGER NOT NULL,
    headers TEXT NOT NULL,
    body BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (bucket_id, request_hash),
    FOREIGN KEY (bucket_id) REFERENCES cache_buckets(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_cache_entries_hash ON cache_entries(request_hash);
"#;

//! Cache bucket storage trait and SQLite / in-memory implementations.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use super::http::{Request, Response};

/// Trait for cache bucket backends.
///
/// Buckets are named collections of request → response snapshots.
/// Individual operations are atomic; nothing orders concurrent writers.
pub trait CacheStorage: Send + Sync {
  /// Create the bucket if it does not exist yet.
  fn open(&self, name: &str) -> Result<()>;

  fn has(&self, name: &str) -> Result<bool>;

  /// Bucket names in creation order.
  fn keys(&self) -> Result<Vec<String>>;

  /// Delete a bucket and everything in it. Returns whether it existed.
  fn delete(&self, name: &str) -> Result<bool>;

  /// Store a response for `request`, creating the bucket if needed.
  fn put(&self, name: &str, request: &Request, response: &Response) -> Result<()>;

  /// Look `request` up in one bucket.
  fn match_in(&self, name: &str, request: &Request) -> Result<Option<Response>>;

  /// Look `request` up in every bucket, oldest first.
  fn match_any(&self, request: &Request) -> Result<Option<Response>>;

  /// URLs cached in a bucket, sorted.
  fn urls(&self, name: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone)]
struct CachedEntry {
  url: String,
  response: Response,
}

#[derive(Debug, Clone)]
struct Bucket {
  name: String,
  entries: BTreeMap<String, CachedEntry>,
}

/// In-memory bucket storage.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
  buckets: Mutex<Vec<Bucket>>,
}

impl MemoryCacheStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn with_buckets<T>(&self, f: impl FnOnce(&mut Vec<Bucket>) -> T) -> Result<T> {
    let mut buckets = self
      .buckets
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(f(&mut buckets))
  }
}

fn open_bucket<'a>(buckets: &'a mut Vec<Bucket>, name: &str) -> &'a mut Bucket {
  let index = match buckets.iter().position(|b| b.name == name) {
    Some(index) => index,
    None => {
      buckets.push(Bucket {
        name: name.to_string(),
        entries: BTreeMap::new(),
      });
      buckets.len() - 1
    }
  };
  &mut buckets[index]
}

impl CacheStorage for MemoryCacheStorage {
  fn open(&self, name: &str) -> Result<()> {
    self.with_buckets(|buckets| {
      open_bucket(buckets, name);
    })
  }

  fn has(&self, name: &str) -> Result<bool> {
    self.with_buckets(|buckets| buckets.iter().any(|b| b.name == name))
  }

  fn keys(&self) -> Result<Vec<String>> {
    self.with_buckets(|buckets| buckets.iter().map(|b| b.name.clone()).collect())
  }

  fn delete(&self, name: &str) -> Result<bool> {
    self.with_buckets(|buckets| {
      let before = buckets.len();
      buckets.retain(|b| b.name != name);
      buckets.len() != before
    })
  }

  fn put(&self, name: &str, request: &Request, response: &Response) -> Result<()> {
    check_cacheable(request)?;
    self.with_buckets(|buckets| {
      open_bucket(buckets, name).entries.insert(
        request.cache_key(),
        CachedEntry {
          url: request.url.to_string(),
          response: response.clone(),
        },
      );
    })
  }

  fn match_in(&self, name: &str, request: &Request) -> Result<Option<Response>> {
    let key = request.cache_key();
    self.with_buckets(|buckets| {
      buckets
        .iter()
        .find(|b| b.name == name)
        .and_then(|b| b.entries.get(&key))
        .map(|e| e.response.clone())
    })
  }

  fn match_any(&self, request: &Request) -> Result<Option<Response>> {
    let key = request.cache_key();
    self.with_buckets(|buckets| {
      buckets
        .iter()
        .find_map(|b| b.entries.get(&key))
        .map(|e| e.response.clone())
    })
  }

  fn urls(&self, name: &str) -> Result<Vec<String>> {
    self.with_buckets(|buckets| {
      let mut urls: Vec<String> = buckets
        .iter()
        .find(|b| b.name == name)
        .map(|b| b.entries.values().map(|e| e.url.clone()).collect())
        .unwrap_or_default();
      urls.sort();
      urls
    })
  }
}

/// Only GET responses can be cached.
fn check_cacheable(request: &Request) -> Result<()> {
  if !request.is_get() {
    return Err(eyre!(
      "Cannot cache {} request for {}",
      request.method,
      request.url
    ));
  }
  Ok(())
}

/// SQLite-based bucket storage.
pub struct SqliteCacheStorage {
  conn: Mutex<Connection>,
}

impl SqliteCacheStorage {
  /// Open the bucket tables in the database at `path`.
  pub fn open_at(path: &Path) -> Result<Self> {
    Ok(Self {
      conn: Mutex::new(crate::db::open(path)?),
    })
  }

  pub fn open_in_memory() -> Result<Self> {
    Ok(Self {
      conn: Mutex::new(crate::db::open_in_memory()?),
    })
  }
}

fn ensure_bucket(conn: &Connection, name: &str) -> Result<i64> {
  conn
    .execute(
      "INSERT OR IGNORE INTO cache_buckets (name) VALUES (?)",
      params![name],
    )
    .map_err(|e| eyre!("Failed to create bucket {}: {}", name, e))?;

  conn
    .query_row(
      "SELECT id FROM cache_buckets WHERE name = ?",
      params![name],
      |row| row.get(0),
    )
    .map_err(|e| eyre!("Failed to look up bucket {}: {}", name, e))
}

fn row_to_response(status: u16, headers: String, body: Vec<u8>) -> Result<Response> {
  let headers: BTreeMap<String, String> =
    serde_json::from_str(&headers).map_err(|e| eyre!("Failed to parse cached headers: {}", e))?;
  Ok(Response {
    status,
    headers,
    body,
  })
}

impl CacheStorage for SqliteCacheStorage {
  fn open(&self, name: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    ensure_bucket(&conn, name)?;
    Ok(())
  }

  fn has(&self, name: &str) -> Result<bool> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let found: Option<i64> = conn
      .query_row(
        "SELECT id FROM cache_buckets WHERE name = ?",
        params![name],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to look up bucket {}: {}", name, e))?;

    Ok(found.is_some())
  }

  fn keys(&self) -> Result<Vec<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare("SELECT name FROM cache_buckets ORDER BY id")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let names = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| eyre!("Failed to list buckets: {}", e))?
      .collect::<rusqlite::Result<Vec<String>>>()
      .map_err(|e| eyre!("Failed to read bucket name: {}", e))?;

    Ok(names)
  }

  fn delete(&self, name: &str) -> Result<bool> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    // Entries go with the bucket through ON DELETE CASCADE
    let deleted = conn
      .execute("DELETE FROM cache_buckets WHERE name = ?", params![name])
      .map_err(|e| eyre!("Failed to delete bucket {}: {}", name, e))?;

    Ok(deleted > 0)
  }

  fn put(&self, name: &str, request: &Request, response: &Response) -> Result<()> {
    check_cacheable(request)?;
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let bucket_id = ensure_bucket(&conn, name)?;
    let headers = serde_json::to_string(&response.headers)
      .map_err(|e| eyre!("Failed to serialize headers: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO cache_entries (bucket_id, request_hash, method, url, status, headers, body, cached_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, datetime('now'))",
        params![
          bucket_id,
          request.cache_key(),
          request.method.as_str(),
          request.url.as_str(),
          response.status,
          headers,
          response.body,
        ],
      )
      .map_err(|e| eyre!("Failed to store {} in {}: {}", request.url, name, e))?;

    Ok(())
  }

  fn match_in(&self, name: &str, request: &Request) -> Result<Option<Response>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(u16, String, Vec<u8>)> = conn
      .query_row(
        "SELECT ce.status, ce.headers, ce.body FROM cache_entries ce
         INNER JOIN cache_buckets cb ON cb.id = ce.bucket_id
         WHERE cb.name = ? AND ce.request_hash = ?",
        params![name, request.cache_key()],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to match {} in {}: {}", request.url, name, e))?;

    row
      .map(|(status, headers, body)| row_to_response(status, headers, body))
      .transpose()
  }

  fn match_any(&self, request: &Request) -> Result<Option<Response>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(u16, String, Vec<u8>)> = conn
      .query_row(
        "SELECT status, headers, body FROM cache_entries
         WHERE request_hash = ?
         ORDER BY bucket_id
         LIMIT 1",
        params![request.cache_key()],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to match {}: {}", request.url, e))?;

    row
      .map(|(status, headers, body)| row_to_response(status, headers, body))
      .transpose()
  }

  fn urls(&self, name: &str) -> Result<Vec<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare(
        "SELECT ce.url FROM cache_entries ce
         INNER JOIN cache_buckets cb ON cb.id = ce.bucket_id
         WHERE cb.name = ?
         ORDER BY ce.url",
      )
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let urls = stmt
      .query_map(params![name], |row| row.get(0))
      .map_err(|e| eyre!("Failed to list cached urls: {}", e))?
      .collect::<rusqlite::Result<Vec<String>>>()
      .map_err(|e| eyre!("Failed to read cached url: {}", e))?;

    Ok(urls)
  }
}

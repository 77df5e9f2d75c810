//! String-keyed persistence for the to-do lists.
//!
//! Every collection is stored under a well-known key, either as JSON
//! (categories, task lists) or as a plain string (colors, theme flag).
//! Reads that hit missing or malformed data fall back to injected defaults;
//! writes report their failures to the caller.

mod kv;

pub use kv::{KeyValueStore, MemoryKvStore, SqliteKvStore};

/// Key holding the serialized category list.
pub const CATEGORIES_KEY: &str = "todo-categories";

/// Key holding the global theme flag.
pub const THEME_KEY: &str = "theme";

/// Key holding a category's color, derived from its storage key.
pub fn color_key(storage_key: &str) -> String {
  format!("{}-color", storage_key)
}

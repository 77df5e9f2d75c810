use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Color a category gets until the user picks one.
pub const DEFAULT_COLOR: &str = "#ffffff";

/// A named list of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
  pub id: String,
  pub title: String,
  /// Key under which this category's tasks are stored; `<key>-color` holds its color
  pub storage_key: String,
}

impl Category {
  /// Build a category for `title` created at `now`.
  ///
  /// `salt` is mixed into the id the way a random suffix would be.
  pub fn new(title: &str, now: DateTime<Utc>, salt: u32) -> Self {
    let millis = now.timestamp_millis();
    Self {
      id: format!("c{}{}", millis, salt % 1000),
      title: title.to_string(),
      storage_key: storage_key_for(title, millis),
    }
  }
}

/// `todo-<slug>-<millis>`, where the slug is the lowercased title with whitespace runs as `-`.
pub fn storage_key_for(title: &str, millis: i64) -> String {
  let slug = title
    .trim()
    .to_lowercase()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join("-");
  format!("todo-{}-{}", slug, millis)
}

/// Categories used when nothing (or nothing readable) is stored.
pub fn default_categories() -> Vec<Category> {
  vec![
    Category {
      id: "c1".to_string(),
      title: "Personal".to_string(),
      storage_key: "todo-personal".to_string(),
    },
    Category {
      id: "c2".to_string(),
      title: "Work".to_string(),
      storage_key: "todo-work".to_string(),
    },
  ]
}

/// Task identifier: creation time in milliseconds plus a sub-millisecond fraction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub f64);

impl TaskId {
  pub fn from_time(now: DateTime<Utc>) -> Self {
    let fraction = f64::from(now.timestamp_subsec_nanos() % 1000) / 1000.0;
    Self(now.timestamp_millis() as f64 + fraction)
  }
}

impl fmt::Display for TaskId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A single to-do entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
  pub id: TaskId,
  pub text: String,
  pub done: bool,
}

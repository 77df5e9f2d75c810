//! In-memory categories and task lists, written through to a key-value store.

use chrono::Utc;
use color_eyre::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::model::{default_categories, Category, Task, TaskId, DEFAULT_COLOR};
use crate::store::{color_key, KeyValueStore, CATEGORIES_KEY};

pub const DELETE_CATEGORY_PROMPT: &str = "Delete category \"{title}\" and its tasks?";
pub const DELETE_TASK_PROMPT: &str = "Are you sure about deleting this task?";

/// Asks the user to approve a destructive action.
pub trait Confirm {
  fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
  fn confirm(&mut self, prompt: &str) -> bool {
    self(prompt)
  }
}

/// Outcome of a confirmed removal.
#[derive(Debug, Clone, PartialEq)]
pub enum Removal<T> {
  Removed(T),
  /// The user declined the confirmation
  Declined,
  NotFound,
}

impl<T> Removal<T> {
  pub fn is_removed(&self) -> bool {
    matches!(self, Removal::Removed(_))
  }
}

#[derive(Debug, Clone)]
struct TaskList {
  tasks: Vec<Task>,
  color: String,
}

/// Categories plus each category's tasks and color.
///
/// Every mutation updates memory first and then writes the affected
/// collection back. A failed write is returned to the caller, but the
/// in-memory change is kept.
pub struct TodoStore<S: KeyValueStore> {
  kv: Arc<S>,
  categories: Vec<Category>,
  lists: HashMap<String, TaskList>,
}

impl<S: KeyValueStore> TodoStore<S> {
  /// Rehydrate from storage. Never fails: unreadable data becomes defaults.
  pub fn load(kv: Arc<S>) -> Self {
    let categories = kv.load_or(CATEGORIES_KEY, default_categories);

    let lists = categories
      .iter()
      .map(|c| (c.storage_key.clone(), load_list(kv.as_ref(), &c.storage_key)))
      .collect();

    debug!(count = categories.len(), "loaded categories");

    Self {
      kv,
      categories,
      lists,
    }
  }

  /// Discard in-memory state and read everything again.
  pub fn reload(&mut self) {
    *self = Self::load(Arc::clone(&self.kv));
  }

  pub fn kv(&self) -> &Arc<S> {
    &self.kv
  }

  pub fn categories(&self) -> &[Category] {
    &self.categories
  }

  pub fn category(&self, id: &str) -> Option<&Category> {
    self.categories.iter().find(|c| c.id == id)
  }

  pub fn category_by_key(&self, storage_key: &str) -> Option<&Category> {
    self.categories.iter().find(|c| c.storage_key == storage_key)
  }

  /// Tasks of a category in insertion order (empty for unknown keys).
  pub fn tasks(&self, storage_key: &str) -> &[Task] {
    self
      .lists
      .get(storage_key)
      .map(|l| l.tasks.as_slice())
      .unwrap_or(&[])
  }

  pub fn task(&self, storage_key: &str, id: TaskId) -> Option<&Task> {
    self.tasks(storage_key).iter().find(|t| t.id == id)
  }

  /// Stored color of a category, `#ffffff` if never set.
  pub fn color(&self, storage_key: &str) -> &str {
    self
      .lists
      .get(storage_key)
      .map(|l| l.color.as_str())
      .unwrap_or(DEFAULT_COLOR)
  }

  /// Create a category. Blank titles are rejected with `Ok(None)`.
  pub fn add_category(&mut self, title: &str) -> Result<Option<Category>> {
    let title = title.trim();
    if title.is_empty() {
      return Ok(None);
    }

    let now = Utc::now();
    let mut category = Category::new(title, now, now.timestamp_subsec_nanos());

    // Two lists created within the same millisecond must still get distinct keys
    let mut millis = now.timestamp_millis();
    while self.category_by_key(&category.storage_key).is_some() {
      millis += 1;
      category.storage_key = super::model::storage_key_for(title, millis);
    }
    let mut salt = now.timestamp_subsec_nanos();
    while self.category(&category.id).is_some() {
      salt = salt.wrapping_add(1);
      category.id = format!("c{}{}", now.timestamp_millis(), salt % 1000);
    }

    self.lists.insert(
      category.storage_key.clone(),
      TaskList {
        tasks: Vec::new(),
        color: DEFAULT_COLOR.to_string(),
      },
    );
    self.categories.push(category.clone());
    debug!(id = %category.id, key = %category.storage_key, "added category");

    self.persist_categories()?;
    Ok(Some(category))
  }

  /// Prompt shown before deleting the category with `id`.
  pub fn category_delete_prompt(&self, id: &str) -> Option<String> {
    self
      .category(id)
      .map(|c| DELETE_CATEGORY_PROMPT.replace("{title}", &c.title))
  }

  /// Delete a category together with its task list and color.
  pub fn remove_category(
    &mut self,
    id: &str,
    confirm: &mut impl Confirm,
  ) -> Result<Removal<Category>> {
    let Some(prompt) = self.category_delete_prompt(id) else {
      return Ok(Removal::NotFound);
    };
    if !confirm.confirm(&prompt) {
      return Ok(Removal::Declined);
    }

    let Some(index) = self.categories.iter().position(|c| c.id == id) else {
      return Ok(Removal::NotFound);
    };
    let storage_key = self.categories[index].storage_key.clone();

    self.kv.remove(&storage_key)?;
    self.kv.remove(&color_key(&storage_key))?;

    let removed = self.categories.remove(index);
    self.lists.remove(&storage_key);
    debug!(id = %removed.id, "removed category");

    self.persist_categories()?;
    Ok(Removal::Removed(removed))
  }

  /// Append a task. Blank text or an unknown category yields `Ok(None)`.
  pub fn add_task(&mut self, storage_key: &str, text: &str) -> Result<Option<Task>> {
    let text = text.trim();
    if text.is_empty() {
      return Ok(None);
    }
    let Some(list) = self.lists.get_mut(storage_key) else {
      return Ok(None);
    };

    let mut id = TaskId::from_time(Utc::now());
    while list.tasks.iter().any(|t| t.id == id) {
      id = TaskId(id.0 + 1.0);
    }

    let task = Task {
      id,
      text: text.to_string(),
      done: false,
    };
    list.tasks.push(task.clone());

    self.persist_tasks(storage_key)?;
    Ok(Some(task))
  }

  /// Flip a task's done flag. Returns whether a task was found.
  pub fn toggle_task(&mut self, storage_key: &str, id: TaskId) -> Result<bool> {
    let Some(task) = self.task_mut(storage_key, id) else {
      return Ok(false);
    };
    task.done = !task.done;

    self.persist_tasks(storage_key)?;
    Ok(true)
  }

  /// Replace a task's text. Blank text leaves the task unchanged.
  pub fn edit_task(&mut self, storage_key: &str, id: TaskId, text: &str) -> Result<bool> {
    let text = text.trim();
    if text.is_empty() {
      return Ok(false);
    }
    let Some(task) = self.task_mut(storage_key, id) else {
      return Ok(false);
    };
    task.text = text.to_string();

    self.persist_tasks(storage_key)?;
    Ok(true)
  }

  pub fn remove_task(
    &mut self,
    storage_key: &str,
    id: TaskId,
    confirm: &mut impl Confirm,
  ) -> Result<Removal<Task>> {
    if self.task(storage_key, id).is_none() {
      return Ok(Removal::NotFound);
    }
    if !confirm.confirm(DELETE_TASK_PROMPT) {
      return Ok(Removal::Declined);
    }

    let Some(list) = self.lists.get_mut(storage_key) else {
      return Ok(Removal::NotFound);
    };
    let Some(index) = list.tasks.iter().position(|t| t.id == id) else {
      return Ok(Removal::NotFound);
    };
    let removed = list.tasks.remove(index);

    self.persist_tasks(storage_key)?;
    Ok(Removal::Removed(removed))
  }

  /// Set a category's color. Returns whether the category exists.
  pub fn set_color(&mut self, storage_key: &str, color: &str) -> Result<bool> {
    let Some(list) = self.lists.get_mut(storage_key) else {
      return Ok(false);
    };
    list.color = color.to_string();

    self.kv.set(&color_key(storage_key), color)?;
    Ok(true)
  }

  fn task_mut(&mut self, storage_key: &str, id: TaskId) -> Option<&mut Task> {
    self
      .lists
      .get_mut(storage_key)?
      .tasks
      .iter_mut()
      .find(|t| t.id == id)
  }

  fn persist_categories(&self) -> Result<()> {
    self.kv.save_json(CATEGORIES_KEY, &self.categories)
  }

  fn persist_tasks(&self, storage_key: &str) -> Result<()> {
    self.kv.save_json(storage_key, self.tasks(storage_key))
  }
}

fn load_list(kv: &impl KeyValueStore, storage_key: &str) -> TaskList {
  let tasks = kv.load_or(storage_key, Vec::new);
  let color = match kv.get(&color_key(storage_key)) {
    Ok(Some(color)) if !color.is_empty() => color,
    Ok(_) => DEFAULT_COLOR.to_string(),
    Err(e) => {
      warn!(key = storage_key, error = %e, "failed to read list color");
      DEFAULT_COLOR.to_string()
    }
  };
  TaskList { tasks, color }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryKvStore;

  fn yes(_: &str) -> bool {
    true
  }

  fn no(_: &str) -> bool {
    false
  }

  fn fresh() -> (Arc<MemoryKvStore>, TodoStore<MemoryKvStore>) {
    let kv = Arc::new(MemoryKvStore::new());
    let store = TodoStore::load(Arc::clone(&kv));
    (kv, store)
  }

  #[test]
  fn test_load_defaults_when_empty() {
    let (_, store) = fresh();
    let titles: Vec<&str> = store.categories().iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Personal", "Work"]);
    assert!(store.tasks("todo-personal").is_empty());
    assert_eq!(store.color("todo-personal"), "#ffffff");
  }

  #[test]
  fn test_load_defaults_when_malformed() {
    let kv = Arc::new(MemoryKvStore::new());
    kv.set(CATEGORIES_KEY, "[{\"id\": 3").unwrap();
    kv.set("todo-work", "not json").unwrap();

    let store = TodoStore::load(kv);
    assert_eq!(store.categories(), default_categories().as_slice());
    assert!(store.tasks("todo-work").is_empty());
  }

  #[test]
  fn test_add_category_survives_reload() {
    let (kv, mut store) = fresh();
    let added = store.add_category("  Study ").unwrap().unwrap();
    assert_eq!(added.title, "Study");
    assert!(added.storage_key.starts_with("todo-study-"));

    let reloaded = TodoStore::load(kv);
    assert_eq!(reloaded.categories().len(), 3);
    assert_eq!(reloaded.categories()[2], added);
  }

  #[test]
  fn test_add_category_keys_are_unique() {
    let (_, mut store) = fresh();
    let mut keys = Vec::new();
    for _ in 0..5 {
      let c = store.add_category("Same").unwrap().unwrap();
      assert!(!c.storage_key.is_empty());
      keys.push(c.storage_key);
    }
    let mut deduped = keys.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), keys.len());

    let mut ids: Vec<&str> = store.categories().iter().map(|c| c.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), store.categories().len());
  }

  #[test]
  fn test_add_category_rejects_blank() {
    let (kv, mut store) = fresh();
    assert_eq!(store.add_category("   ").unwrap(), None);
    assert_eq!(store.add_category("").unwrap(), None);
    assert_eq!(store.categories().len(), 2);
    assert_eq!(kv.get(CATEGORIES_KEY).unwrap(), None);
  }

  #[test]
  fn test_remove_category_clears_tasks_and_color() {
    let (kv, mut store) = fresh();
    store.add_task("todo-work", "ship it").unwrap();
    store.set_color("todo-work", "#22c55e").unwrap();
    assert!(kv.get("todo-work").unwrap().is_some());
    assert!(kv.get("todo-work-color").unwrap().is_some());

    let mut prompts = Vec::new();
    let removal = store
      .remove_category("c2", &mut |p: &str| {
        prompts.push(p.to_string());
        true
      })
      .unwrap();

    assert!(removal.is_removed());
    assert_eq!(prompts, vec!["Delete category \"Work\" and its tasks?"]);
    assert_eq!(kv.get("todo-work").unwrap(), None);
    assert_eq!(kv.get("todo-work-color").unwrap(), None);

    let reloaded = TodoStore::load(kv);
    assert_eq!(reloaded.categories().len(), 1);
    assert!(reloaded.tasks("todo-work").is_empty());
    assert_eq!(reloaded.color("todo-work"), "#ffffff");
  }

  #[test]
  fn test_remove_category_declined_or_missing() {
    let (_, mut store) = fresh();
    assert_eq!(
      store.remove_category("c1", &mut no).unwrap(),
      Removal::Declined
    );
    assert_eq!(store.categories().len(), 2);

    let mut asked = false;
    let removal = store
      .remove_category("nope", &mut |_: &str| {
        asked = true;
        true
      })
      .unwrap();
    assert_eq!(removal, Removal::NotFound);
    assert!(!asked);
  }

  #[test]
  fn test_task_lifecycle() {
    let (kv, mut store) = fresh();
    let task = store.add_task("todo-personal", " buy milk ").unwrap().unwrap();
    assert_eq!(task.text, "buy milk");
    assert!(!task.done);

    assert!(store.edit_task("todo-personal", task.id, "buy oat milk").unwrap());
    assert!(store.toggle_task("todo-personal", task.id).unwrap());

    let reloaded = TodoStore::load(Arc::clone(&kv));
    let stored = reloaded.task("todo-personal", task.id).unwrap();
    assert_eq!(stored.text, "buy oat milk");
    assert!(stored.done);

    let removal = store.remove_task("todo-personal", task.id, &mut yes).unwrap();
    assert!(removal.is_removed());
    assert!(TodoStore::load(kv).tasks("todo-personal").is_empty());
  }

  #[test]
  fn test_toggle_twice_restores_done() {
    let (_, mut store) = fresh();
    let task = store.add_task("todo-work", "review").unwrap().unwrap();

    store.toggle_task("todo-work", task.id).unwrap();
    store.toggle_task("todo-work", task.id).unwrap();
    assert!(!store.task("todo-work", task.id).unwrap().done);
  }

  #[test]
  fn test_edit_with_blank_text_is_noop() {
    let (_, mut store) = fresh();
    let task = store.add_task("todo-work", "write report").unwrap().unwrap();

    assert!(!store.edit_task("todo-work", task.id, "   ").unwrap());
    assert_eq!(store.task("todo-work", task.id).unwrap().text, "write report");
  }

  #[test]
  fn test_add_task_blank_or_unknown_list() {
    let (_, mut store) = fresh();
    assert_eq!(store.add_task("todo-work", " \t ").unwrap(), None);
    assert_eq!(store.add_task("todo-missing", "x").unwrap(), None);
    assert!(!store.toggle_task("todo-missing", TaskId(1.0)).unwrap());
  }

  #[test]
  fn test_task_ids_are_unique_and_ordered_by_insertion() {
    let (_, mut store) = fresh();
    for text in ["a", "b", "c", "a"] {
      store.add_task("todo-work", text).unwrap();
    }
    let texts: Vec<&str> = store
      .tasks("todo-work")
      .iter()
      .map(|t| t.text.as_str())
      .collect();
    assert_eq!(texts, vec!["a", "b", "c", "a"]);

    let ids: Vec<TaskId> = store.tasks("todo-work").iter().map(|t| t.id).collect();
    for (i, a) in ids.iter().enumerate() {
      assert!(ids[i + 1..].iter().all(|b| b != a));
    }
  }

  #[test]
  fn test_remove_task_declined() {
    let (_, mut store) = fresh();
    let task = store.add_task("todo-work", "keep me").unwrap().unwrap();

    let mut prompts = Vec::new();
    let removal = store
      .remove_task("todo-work", task.id, &mut |p: &str| {
        prompts.push(p.to_string());
        false
      })
      .unwrap();
    assert_eq!(removal, Removal::Declined);
    assert_eq!(prompts, vec![DELETE_TASK_PROMPT]);
    assert_eq!(store.tasks("todo-work").len(), 1);
  }

  #[test]
  fn test_write_failure_keeps_memory_state() {
    let (kv, mut store) = fresh();
    kv.set_fail_writes(true);

    assert!(store.add_task("todo-work", "unsaved").is_err());
    assert_eq!(store.tasks("todo-work").len(), 1);

    kv.set_fail_writes(false);
    assert!(TodoStore::load(kv).tasks("todo-work").is_empty());
  }

  #[test]
  fn test_set_color_persists() {
    let (kv, mut store) = fresh();
    assert!(store.set_color("todo-personal", "#2b6ff7").unwrap());
    assert!(!store.set_color("todo-missing", "#2b6ff7").unwrap());

    assert_eq!(kv.get("todo-personal-color").unwrap().as_deref(), Some("#2b6ff7"));
    assert_eq!(TodoStore::load(kv).color("todo-personal"), "#2b6ff7");
  }
}

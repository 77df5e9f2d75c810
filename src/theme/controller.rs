use color_eyre::Result;
use tracing::{debug, warn};

use super::palette::{canonical, resolve_for_theme};
use crate::store::{KeyValueStore, THEME_KEY};
use crate::todo::TodoStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
  #[default]
  Light,
  Dark,
}

impl ThemeMode {
  pub fn storage_value(self) -> &'static str {
    match self {
      ThemeMode::Light => "light",
      ThemeMode::Dark => "dark",
    }
  }

  /// Anything other than `"dark"` reads as light.
  pub fn from_storage(value: Option<&str>) -> Self {
    match value.map(str::trim) {
      Some("dark") => ThemeMode::Dark,
      _ => ThemeMode::Light,
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      ThemeMode::Light => ThemeMode::Dark,
      ThemeMode::Dark => ThemeMode::Light,
    }
  }

  pub fn is_dark(self) -> bool {
    self == ThemeMode::Dark
  }
}

/// Active theme plus a counter bumped on every theme change.
///
/// Views remember the version they rendered with and recompute list colors when
/// it moves.
#[derive(Debug, Clone, Default)]
pub struct ThemeController {
  mode: ThemeMode,
  version: u64,
}

impl ThemeController {
  /// Read the theme flag. Unreadable storage means light.
  pub fn load(kv: &impl KeyValueStore) -> Self {
    let stored = kv.get(THEME_KEY).unwrap_or_else(|e| {
      warn!(error = %e, "failed to read theme flag");
      None
    });

    Self {
      mode: ThemeMode::from_storage(stored.as_deref()),
      version: 0,
    }
  }

  pub fn mode(&self) -> ThemeMode {
    self.mode
  }

  pub fn is_dark(&self) -> bool {
    self.mode.is_dark()
  }

  pub fn version(&self) -> u64 {
    self.version
  }

  /// On-screen value of a stored list color under the active theme.
  pub fn display_color(&self, stored: &str) -> String {
    resolve_for_theme(stored, self.is_dark())
  }

  pub fn toggle<S: KeyValueStore>(&mut self, todos: &mut TodoStore<S>) -> Result<()> {
    self.set_mode(self.mode.toggled(), todos)
  }

  /// Switch theme, persist the flag and rewrite every list color in canonical form.
  ///
  /// All writes are attempted; the first failure is returned. The version is
  /// bumped either way since memory already reflects the new state.
  pub fn set_mode<S: KeyValueStore>(
    &mut self,
    mode: ThemeMode,
    todos: &mut TodoStore<S>,
  ) -> Result<()> {
    self.mode = mode;
    let mut first_error = todos.kv().set(THEME_KEY, mode.storage_value()).err();

    let keys: Vec<String> = todos
      .categories()
      .iter()
      .map(|c| c.storage_key.clone())
      .collect();

    for key in keys {
      let color = canonical(todos.color(&key));
      if let Err(e) = todos.set_color(&key, &color) {
        warn!(key = %key, error = %e, "failed to rewrite list color");
        first_error.get_or_insert(e);
      }
    }

    self.version += 1;
    debug!(mode = mode.storage_value(), version = self.version, "theme changed");

    match first_error {
      Some(e) => Err(e),
      None => Ok(()),
    }
  }
}

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::worker::CacheName;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Where the database and logs live (defaults to $XDG_DATA_HOME/todolists)
  pub data_dir: Option<PathBuf>,
  /// Log filter used when RUST_LOG is not set
  pub log_level: String,
  /// UI refresh interval in milliseconds
  pub tick_rate_ms: u64,
  pub cache: CacheConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      data_dir: None,
      log_level: "info".to_string(),
      tick_rate_ms: 250,
      cache: CacheConfig::default(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Fixed bucket name. Changing it invalidates every earlier bucket on the next activation.
  pub name: String,
  /// When set, the bucket name is `<prefix>-<install timestamp>` instead of `name`
  pub timestamped_prefix: Option<String>,
  /// Base URL that relative request URLs and offline URLs resolve against
  pub scope: String,
  /// App shell seeded into the bucket on install
  pub offline_urls: Vec<String>,
  /// Served for page requests that fail offline and were never cached
  pub offline_shell: String,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      name: "todo-cache-v1".to_string(),
      timestamped_prefix: None,
      scope: "http://localhost:5173/todo/".to_string(),
      offline_urls: vec!["./".to_string(), "./index.html".to_string()],
      offline_shell: "./index.html".to_string(),
    }
  }
}

impl CacheConfig {
  pub fn cache_name(&self) -> CacheName {
    match &self.timestamped_prefix {
      Some(prefix) => CacheName::Timestamped {
        prefix: prefix.clone(),
      },
      None => CacheName::Fixed(self.name.clone()),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./todolists.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/todolists/config.yaml
  ///
  /// Falls back to defaults when no file is found.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("todolists.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("todolists").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    // An empty file is a valid "all defaults" config
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }

  /// Resolve the data directory, falling back to the platform data dir.
  pub fn data_dir(&self) -> Result<PathBuf> {
    if let Some(dir) = &self.data_dir {
      return Ok(dir.clone());
    }

    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("todolists"))
  }

  pub fn database_path(&self) -> Result<PathBuf> {
    Ok(self.data_dir()?.join("todolists.db"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_config_uses_defaults() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config.log_level, "info");
    assert_eq!(config.cache.name, "todo-cache-v1");
    assert_eq!(config.cache.offline_urls, vec!["./", "./index.html"]);
  }

  #[test]
  fn test_partial_cache_section() {
    let yaml = r#"
log_level: debug
cache:
  name: todo-cache-v2
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.tick_rate_ms, 250);
    assert_eq!(
      config.cache.cache_name(),
      CacheName::Fixed("todo-cache-v2".to_string())
    );
    assert_eq!(config.cache.scope, "http://localhost:5173/todo/");
  }

  #[test]
  fn test_timestamped_prefix_wins() {
    let yaml = r#"
cache:
  timestamped_prefix: todo-cache
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(
      config.cache.cache_name(),
      CacheName::Timestamped {
        prefix: "todo-cache".to_string()
      }
    );
  }

  #[test]
  fn test_explicit_data_dir() {
    let config = Config::from_yaml("data_dir: /tmp/todolists-test").unwrap();
    assert_eq!(
      config.database_path().unwrap(),
      PathBuf::from("/tmp/todolists-test/todolists.db")
    );
  }

  #[test]
  fn test_missing_explicit_path_is_error() {
    let result = Config::load(Some(Path::new("/nonexistent/todolists.yaml")));
    assert!(result.is_err());
  }
}

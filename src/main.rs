use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use todolists::app::App;
use todolists::config::Config;
use todolists::store::{MemoryKvStore, SqliteKvStore};
use todolists::theme::ThemeController;
use todolists::todo::TodoStore;
use todolists::ui::views::EMPTY_LIST_TEXT;
use todolists::worker::{
  CacheStorage, CacheWorker, HttpNetwork, Request, SqliteCacheStorage, WorkerOptions,
};

#[derive(Parser, Debug)]
#[command(name = "todolists")]
#[command(about = "Terminal to-do lists with an offline request cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./todolists.yaml or $XDG_CONFIG_HOME/todolists/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Directory for the database and logs
  #[arg(short, long)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
  /// Open the terminal UI (default)
  Tui,
  /// Print every list and its tasks
  Lists,
  /// Drive the offline cache
  Cache {
    #[command(subcommand)]
    action: CacheAction,
  },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
  /// Seed the current bucket with the offline URLs
  Install,
  /// Delete every bucket except the current one
  Activate,
  /// List buckets and their cached URLs
  Buckets,
  /// Fetch a URL through the cache
  Fetch {
    /// Absolute URL, or relative to the configured scope
    url: String,
    /// Treat as a page load (network-first with offline fallback)
    #[arg(long)]
    html: bool,
  },
  /// Delete every bucket
  Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let mut config = Config::load(args.config.as_deref())?;
  if let Some(dir) = args.data_dir {
    config.data_dir = Some(dir);
  }

  let data_dir = config.data_dir()?;
  let _log_guard = init_tracing(&data_dir, &config.log_level)?;
  info!(data_dir = %data_dir.display(), "starting");

  match args.command.unwrap_or(Cmd::Tui) {
    Cmd::Tui => run_tui(&config).await,
    Cmd::Lists => print_lists(&config),
    Cmd::Cache { action } => run_cache(&config, action).await,
  }
}

/// Log to a daily file under `<data_dir>/logs` so the TUI keeps the terminal.
fn init_tracing(data_dir: &Path, default_level: &str) -> Result<WorkerGuard> {
  let log_dir = data_dir.join("logs");
  std::fs::create_dir_all(&log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

  let (writer, guard) =
    tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, "todolists.log"));

  let filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(default_level))
    .unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_writer(writer).with_ansi(false))
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}

fn open_kv(config: &Config) -> Result<Arc<SqliteKvStore>> {
  Ok(Arc::new(SqliteKvStore::open(&config.database_path()?)?))
}

async fn run_tui(config: &Config) -> Result<()> {
  let tick_rate = Duration::from_millis(config.tick_rate_ms);

  match open_kv(config) {
    Ok(kv) => App::new(kv, tick_rate).run().await,
    Err(e) => {
      // Still usable, just not persistent
      warn!(error = %e, "database unavailable, using in-memory storage");
      let mut app = App::new(Arc::new(MemoryKvStore::new()), tick_rate);
      app
        .workspace_mut()
        .error("Storage unavailable, changes will not be saved", &e);
      app.run().await
    }
  }
}

fn print_lists(config: &Config) -> Result<()> {
  let kv = open_kv(config)?;
  let theme = ThemeController::load(kv.as_ref());
  let todos = TodoStore::load(kv);

  for category in todos.categories() {
    let tasks = todos.tasks(&category.storage_key);
    println!(
      "{} [{}] {}",
      category.title,
      theme.display_color(todos.color(&category.storage_key)),
      category.storage_key
    );
    if tasks.is_empty() {
      println!("  {}", EMPTY_LIST_TEXT);
    }
    for task in tasks {
      let mark = if task.done { "x" } else { " " };
      println!("  [{}] {}", mark, task.text);
    }
  }
  Ok(())
}

async fn run_cache(config: &Config, action: CacheAction) -> Result<()> {
  let storage = Arc::new(SqliteCacheStorage::open_at(&config.database_path()?)?);

  match action {
    CacheAction::Install => {
      let mut worker = build_worker(config, &storage, true)?;
      worker.install().await?;
      println!("installed {}", worker.cache_name());
    }
    CacheAction::Activate => {
      let mut worker = build_worker(config, &storage, false)?;
      worker.resume_installed()?;
      let deleted = worker.activate()?;
      println!("activated {}", worker.cache_name());
      for name in deleted {
        println!("deleted {}", name);
      }
    }
    CacheAction::Fetch { url, html } => {
      let mut worker = build_worker(config, &storage, false)?;
      worker.resume_active()?;

      let url = worker.resolve_url(&url)?;
      let request = if html {
        Request::navigate(url)
      } else {
        Request::get(url)
      };

      let result = worker.fetch(&request).await;
      // Let background cache writes land before the process exits
      worker.settle().await;
      let (response, source) = result?;
      eprintln!("{} ({:?})", response.status, source);
      println!("{}", response.text());
    }
    CacheAction::Buckets => {
      for name in storage.keys()? {
        let urls = storage.urls(&name)?;
        println!("{} ({} entries)", name, urls.len());
        for url in urls {
          println!("  {}", url);
        }
      }
    }
    CacheAction::Clear => {
      for name in storage.keys()? {
        storage.delete(&name)?;
        println!("deleted {}", name);
      }
    }
  }

  Ok(())
}

fn build_worker(
  config: &Config,
  storage: &Arc<SqliteCacheStorage>,
  installing: bool,
) -> Result<CacheWorker<SqliteCacheStorage, HttpNetwork>> {
  let cache_name = config
    .cache
    .cache_name()
    .resolve(&storage.keys()?, installing, Utc::now());
  let scope = Url::parse(&config.cache.scope)
    .map_err(|e| eyre!("Invalid cache scope '{}': {}", config.cache.scope, e))?;

  let options = WorkerOptions {
    cache_name,
    scope,
    offline_urls: config.cache.offline_urls.clone(),
    offline_shell: config.cache.offline_shell.clone(),
  };
  CacheWorker::new(Arc::clone(storage), HttpNetwork::new()?, options)
}

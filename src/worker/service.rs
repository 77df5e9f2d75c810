//! Worker lifecycle and fetch strategies.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use url::Url;

use super::http::{Request, Response};
use super::network::Network;
use super::storage::CacheStorage;

/// How the current bucket is named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheName {
  /// A fixed version string, bumped by hand
  Fixed(String),
  /// `<prefix>-<install time>`; every install rotates the bucket
  Timestamped { prefix: String },
}

impl CacheName {
  /// Pick the bucket name.
  ///
  /// A timestamped name is minted on install; otherwise the newest existing
  /// bucket with the prefix is reused so later runs keep the same bucket.
  pub fn resolve(&self, existing: &[String], installing: bool, now: DateTime<Utc>) -> String {
    match self {
      CacheName::Fixed(name) => name.clone(),
      CacheName::Timestamped { prefix } => {
        let fresh = || format!("{}-{}", prefix, now.format("%Y%m%d%H%M%S%3f"));
        if installing {
          return fresh();
        }
        let marker = format!("{}-", prefix);
        existing
          .iter()
          .rev()
          .find(|name| name.starts_with(&marker))
          .cloned()
          .unwrap_or_else(fresh)
      }
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
  Parsed,
  Installing,
  Installed,
  Activating,
  Activated,
  /// Install failed; this worker will never serve requests
  Redundant,
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
  Network,
  Cache,
  /// Network failed and the exact request was not cached
  OfflineShell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
  /// Not intercepted; the request goes to the network untouched
  Passthrough,
  Respond {
    response: Response,
    source: ResponseSource,
  },
  /// Network failed and nothing usable was cached
  Unavailable,
}

impl FetchOutcome {
  fn respond(response: Response, source: ResponseSource) -> Self {
    FetchOutcome::Respond { response, source }
  }

  pub fn response(&self) -> Option<&Response> {
    match self {
      FetchOutcome::Respond { response, .. } => Some(response),
      _ => None,
    }
  }

  pub fn source(&self) -> Option<ResponseSource> {
    match self {
      FetchOutcome::Respond { source, .. } => Some(*source),
      _ => None,
    }
  }
}

#[derive(Debug, Clone)]
pub struct WorkerOptions {
  pub cache_name: String,
  /// Base URL every relative URL resolves against
  pub scope: Url,
  /// Seeded into the bucket on install
  pub offline_urls: Vec<String>,
  /// Served for HTML requests when offline and not cached themselves
  pub offline_shell: String,
}

/// Offline cache worker.
///
/// Network-first for page loads and HTML, cache-first for every other GET.
/// Successful network responses are copied into the current bucket in the
/// background; those writes are best effort and never delay a response.
pub struct CacheWorker<C: CacheStorage + 'static, N: Network> {
  storage: Arc<C>,
  network: N,
  cache_name: String,
  scope: Url,
  offline_urls: Vec<Url>,
  offline_shell: Url,
  state: WorkerState,
  skip_waiting: bool,
  clients_claimed: bool,
  pending_writes: Mutex<JoinSet<()>>,
}

impl<C: CacheStorage + 'static, N: Network> CacheWorker<C, N> {
  pub fn new(storage: Arc<C>, network: N, options: WorkerOptions) -> Result<Self> {
    let scope = options.scope;
    let resolve = |path: &str| {
      scope
        .join(path)
        .map_err(|e| eyre!("Invalid offline URL '{}': {}", path, e))
    };

    let offline_urls = options
      .offline_urls
      .iter()
      .map(|u| resolve(u))
      .collect::<Result<Vec<_>>>()?;
    let offline_shell = resolve(&options.offline_shell)?;

    Ok(Self {
      storage,
      network,
      cache_name: options.cache_name,
      scope,
      offline_urls,
      offline_shell,
      state: WorkerState::Parsed,
      skip_waiting: false,
      clients_claimed: false,
      pending_writes: Mutex::new(JoinSet::new()),
    })
  }

  pub fn state(&self) -> WorkerState {
    self.state
  }

  pub fn cache_name(&self) -> &str {
    &self.cache_name
  }

  pub fn scope(&self) -> &Url {
    &self.scope
  }

  /// Whether install asked to activate without waiting for older workers.
  pub fn skips_waiting(&self) -> bool {
    self.skip_waiting
  }

  pub fn clients_claimed(&self) -> bool {
    self.clients_claimed
  }

  /// Resolve a possibly relative URL against the scope.
  pub fn resolve_url(&self, url: &str) -> Result<Url> {
    self
      .scope
      .join(url)
      .map_err(|e| eyre!("Invalid URL '{}': {}", url, e))
  }

  /// Open the current bucket and seed it with the offline URLs.
  ///
  /// Every seed must come back OK, otherwise nothing is stored and the
  /// worker becomes redundant.
  pub async fn install(&mut self) -> Result<()> {
    if self.state != WorkerState::Parsed {
      return Err(eyre!("Cannot install worker in state {:?}", self.state));
    }
    self.state = WorkerState::Installing;

    match self.seed_cache().await {
      Ok(count) => {
        self.skip_waiting = true;
        self.state = WorkerState::Installed;
        info!(cache = %self.cache_name, seeded = count, "worker installed");
        Ok(())
      }
      Err(e) => {
        self.state = WorkerState::Redundant;
        warn!(cache = %self.cache_name, error = %e, "worker install failed");
        Err(e)
      }
    }
  }

  async fn seed_cache(&self) -> Result<usize> {
    let requests: Vec<Request> = self
      .offline_urls
      .iter()
      .cloned()
      .map(Request::get)
      .collect();

    let responses =
      futures::future::try_join_all(requests.iter().map(|r| self.fetch_seed(r))).await?;

    if let Err(e) = self.store_seeds(&requests, &responses) {
      if let Err(cleanup) = self.storage.delete(&self.cache_name) {
        warn!(cache = %self.cache_name, error = %cleanup, "failed to drop partial bucket");
      }
      return Err(e);
    }
    Ok(responses.len())
  }

  fn store_seeds(&self, requests: &[Request], responses: &[Response]) -> Result<()> {
    self.storage.open(&self.cache_name)?;
    for (request, response) in requests.iter().zip(responses) {
      self.storage.put(&self.cache_name, request, response)?;
    }
    Ok(())
  }

  async fn fetch_seed(&self, request: &Request) -> Result<Response> {
    let response = self.network.fetch(request).await?;
    if !response.is_ok() {
      return Err(eyre!(
        "Seed request {} returned status {}",
        request.url,
        response.status
      ));
    }
    Ok(response)
  }

  /// Drop every bucket except the current one and take control of clients.
  ///
  /// Returns the names of the deleted buckets.
  pub fn activate(&mut self) -> Result<Vec<String>> {
    if self.state != WorkerState::Installed {
      return Err(eyre!("Cannot activate worker in state {:?}", self.state));
    }
    self.state = WorkerState::Activating;

    match self.delete_stale_buckets() {
      Ok(deleted) => {
        self.clients_claimed = true;
        self.state = WorkerState::Activated;
        info!(cache = %self.cache_name, deleted = ?deleted, "worker activated");
        Ok(deleted)
      }
      Err(e) => {
        self.state = WorkerState::Installed;
        Err(e)
      }
    }
  }

  fn delete_stale_buckets(&self) -> Result<Vec<String>> {
    let stale: Vec<String> = self
      .storage
      .keys()?
      .into_iter()
      .filter(|name| name != &self.cache_name)
      .collect();

    for name in &stale {
      self.storage.delete(name)?;
    }
    Ok(stale)
  }

  /// Pick up a bucket installed by an earlier run, ready for [`activate`](Self::activate).
  pub fn resume_installed(&mut self) -> Result<()> {
    self.require_bucket()?;
    self.state = WorkerState::Installed;
    Ok(())
  }

  /// Take over a worker that was activated by an earlier run.
  pub fn resume_active(&mut self) -> Result<()> {
    self.require_bucket()?;
    self.state = WorkerState::Activated;
    self.clients_claimed = true;
    Ok(())
  }

  fn require_bucket(&self) -> Result<()> {
    if self.state != WorkerState::Parsed {
      return Err(eyre!("Cannot resume worker in state {:?}", self.state));
    }
    if !self.storage.has(&self.cache_name)? {
      return Err(eyre!(
        "Cache {} is not installed; run install first",
        self.cache_name
      ));
    }
    for url in &self.offline_urls {
      let request = Request::get(url.clone());
      if self.storage.match_in(&self.cache_name, &request)?.is_none() {
        return Err(eyre!(
          "Cache {} is missing {}; run install again",
          self.cache_name,
          url
        ));
      }
    }
    Ok(())
  }

  /// Decide how to answer a request.
  ///
  /// Only an activated worker intercepts anything, and only GET requests.
  pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
    if self.state != WorkerState::Activated || !request.is_get() {
      return FetchOutcome::Passthrough;
    }

    if request.wants_html() {
      self.network_first(request).await
    } else {
      self.cache_first(request).await
    }
  }

  /// Like [`handle_fetch`](Self::handle_fetch), but performs the passthrough
  /// fetch and turns `Unavailable` into an error.
  pub async fn fetch(&self, request: &Request) -> Result<(Response, ResponseSource)> {
    match self.handle_fetch(request).await {
      FetchOutcome::Passthrough => {
        let response = self.network.fetch(request).await?;
        Ok((response, ResponseSource::Network))
      }
      FetchOutcome::Respond { response, source } => Ok((response, source)),
      FetchOutcome::Unavailable => Err(eyre!(
        "{} is unavailable: network failed and nothing is cached",
        request.url
      )),
    }
  }

  async fn network_first(&self, request: &Request) -> FetchOutcome {
    match self.network.fetch(request).await {
      Ok(response) if response.is_ok() => {
        self.store_in_background(request, &response);
        FetchOutcome::respond(response, ResponseSource::Network)
      }
      Ok(response) => {
        debug!(url = %request.url, status = response.status, "non-OK page response, trying cache");
        match self.cached(request) {
          Some(cached) => FetchOutcome::respond(cached, ResponseSource::Cache),
          None => FetchOutcome::respond(response, ResponseSource::Network),
        }
      }
      Err(e) => {
        debug!(url = %request.url, error = %e, "network failed, trying cache");
        if let Some(cached) = self.cached(request) {
          return FetchOutcome::respond(cached, ResponseSource::Cache);
        }
        match self.cached(&Request::get(self.offline_shell.clone())) {
          Some(shell) => FetchOutcome::respond(shell, ResponseSource::OfflineShell),
          None => FetchOutcome::Unavailable,
        }
      }
    }
  }

  async fn cache_first(&self, request: &Request) -> FetchOutcome {
    if let Some(cached) = self.cached(request) {
      return FetchOutcome::respond(cached, ResponseSource::Cache);
    }

    match self.network.fetch(request).await {
      Ok(response) => {
        if response.is_ok() {
          self.store_in_background(request, &response);
        }
        FetchOutcome::respond(response, ResponseSource::Network)
      }
      Err(e) => {
        debug!(url = %request.url, error = %e, "network failed and nothing cached");
        FetchOutcome::Unavailable
      }
    }
  }

  /// Cached response from any bucket. Lookup failures count as a miss.
  fn cached(&self, request: &Request) -> Option<Response> {
    self.storage.match_any(request).unwrap_or_else(|e| {
      warn!(url = %request.url, error = %e, "cache lookup failed");
      None
    })
  }

  /// Queue a copy of `response` for the current bucket without waiting for it.
  fn store_in_background(&self, request: &Request, response: &Response) {
    let storage = Arc::clone(&self.storage);
    let name = self.cache_name.clone();
    let request = request.clone();
    let response = response.clone();

    let mut pending = match self.pending_writes.lock() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    };
    // Reap finished writes so the set does not grow without bound
    while pending.try_join_next().is_some() {}

    pending.spawn_blocking(move || {
      if let Err(e) = storage.put(&name, &request, &response) {
        debug!(url = %request.url, error = %e, "background cache write failed");
      }
    });
  }

  /// Wait for every queued cache write to finish.
  pub async fn settle(&self) {
    let mut pending = {
      let mut guard = match self.pending_writes.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
      };
      std::mem::take(&mut *guard)
    };

    while let Some(result) = pending.join_next().await {
      if let Err(e) = result {
        debug!(error = %e, "cache write task did not complete");
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::worker::network::fake::FakeNetwork;
  use crate::worker::storage::MemoryCacheStorage;
  use chrono::TimeZone;
  use reqwest::Method;

  const SCOPE: &str = "http://app.test/todo/";

  fn url(path: &str) -> Url {
    Url::parse(SCOPE).unwrap().join(path).unwrap()
  }

  fn options(cache_name: &str) -> WorkerOptions {
    WorkerOptions {
      cache_name: cache_name.to_string(),
      scope: Url::parse(SCOPE).unwrap(),
      offline_urls: vec!["./".to_string(), "./index.html".to_string()],
      offline_shell: "./index.html".to_string(),
    }
  }

  fn online_network() -> FakeNetwork {
    FakeNetwork::new()
      .route(url("./").as_str(), Response::new(200, "<html>root</html>"))
      .route(url("index.html").as_str(), Response::new(200, "<html>shell</html>"))
      .route(url("about.html").as_str(), Response::new(200, "<html>about</html>"))
      .route(url("app.js").as_str(), Response::new(200, "console.log('app')"))
      .route(url("broken.html").as_str(), Response::new(500, "oops"))
  }

  async fn active_worker(
    storage: Arc<MemoryCacheStorage>,
    network: FakeNetwork,
  ) -> CacheWorker<MemoryCacheStorage, FakeNetwork> {
    let mut worker = CacheWorker::new(storage, network, options("todo-cache-v1")).unwrap();
    worker.install().await.unwrap();
    worker.activate().unwrap();
    worker
  }

  #[tokio::test]
  async fn test_install_seeds_offline_urls() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let mut worker =
      CacheWorker::new(Arc::clone(&storage), online_network(), options("todo-cache-v1")).unwrap();
    assert_eq!(worker.state(), WorkerState::Parsed);

    worker.install().await.unwrap();
    assert_eq!(worker.state(), WorkerState::Installed);
    assert!(worker.skips_waiting());
    assert_eq!(
      storage.urls("todo-cache-v1").unwrap(),
      vec![url("./").to_string(), url("index.html").to_string()]
    );
  }

  #[tokio::test]
  async fn test_install_fails_atomically() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let network = FakeNetwork::new().route(url("./").as_str(), Response::new(200, "root"));
    let mut worker =
      CacheWorker::new(Arc::clone(&storage), network, options("todo-cache-v1")).unwrap();

    assert!(worker.install().await.is_err());
    assert_eq!(worker.state(), WorkerState::Redundant);
    assert!(!storage.has("todo-cache-v1").unwrap());
    assert!(worker.activate().is_err());
  }

  #[tokio::test]
  async fn test_failed_upgrade_keeps_previous_bucket() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let mut v1 =
      CacheWorker::new(Arc::clone(&storage), online_network(), options("todo-cache-v1")).unwrap();
    v1.install().await.unwrap();
    v1.activate().unwrap();

    let mut v2 =
      CacheWorker::new(Arc::clone(&storage), FakeNetwork::new(), options("todo-cache-v2")).unwrap();
    assert!(v2.install().await.is_err());
    assert_eq!(storage.keys().unwrap(), vec!["todo-cache-v1"]);

    let mut resumed =
      CacheWorker::new(Arc::clone(&storage), FakeNetwork::new(), options("todo-cache-v2")).unwrap();
    assert!(resumed.resume_installed().is_err());
    assert_eq!(storage.keys().unwrap(), vec!["todo-cache-v1"]);
  }

  #[tokio::test]
  async fn test_resume_rejects_empty_bucket() {
    let storage = Arc::new(MemoryCacheStorage::new());
    storage.open("todo-cache-v1").unwrap();

    let mut worker =
      CacheWorker::new(Arc::clone(&storage), FakeNetwork::new(), options("todo-cache-v1")).unwrap();
    assert!(worker.resume_installed().is_err());
    assert!(worker.resume_active().is_err());
  }

  #[tokio::test]
  async fn test_activate_removes_other_buckets() {
    let storage = Arc::new(MemoryCacheStorage::new());
    storage.open("todo-cache-v0").unwrap();
    storage.open("unrelated").unwrap();

    let mut worker =
      CacheWorker::new(Arc::clone(&storage), online_network(), options("todo-cache-v1")).unwrap();
    worker.install().await.unwrap();
    let deleted = worker.activate().unwrap();

    assert_eq!(deleted, vec!["todo-cache-v0", "unrelated"]);
    assert_eq!(storage.keys().unwrap(), vec!["todo-cache-v1"]);
    assert_eq!(worker.state(), WorkerState::Activated);
    assert!(worker.clients_claimed());
  }

  #[tokio::test]
  async fn test_version_change_invalidates_previous_bucket() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let v1 = active_worker(Arc::clone(&storage), online_network()).await;
    v1.handle_fetch(&Request::get(url("app.js"))).await;
    v1.settle().await;

    let mut v2 =
      CacheWorker::new(Arc::clone(&storage), online_network(), options("todo-cache-v2")).unwrap();
    v2.install().await.unwrap();
    // Both versions coexist until the new worker activates
    assert_eq!(storage.keys().unwrap(), vec!["todo-cache-v1", "todo-cache-v2"]);

    v2.activate().unwrap();
    assert_eq!(storage.keys().unwrap(), vec!["todo-cache-v2"]);
    assert_eq!(storage.match_any(&Request::get(url("app.js"))).unwrap(), None);
  }

  #[tokio::test]
  async fn test_non_get_is_not_intercepted() {
    let worker = active_worker(Arc::new(MemoryCacheStorage::new()), online_network()).await;
    let post = Request::new(Method::POST, url("api/tasks"));
    assert_eq!(worker.handle_fetch(&post).await, FetchOutcome::Passthrough);
  }

  #[tokio::test]
  async fn test_inactive_worker_passes_through() {
    let worker = CacheWorker::new(
      Arc::new(MemoryCacheStorage::new()),
      online_network(),
      options("todo-cache-v1"),
    )
    .unwrap();
    let outcome = worker.handle_fetch(&Request::get(url("app.js"))).await;
    assert_eq!(outcome, FetchOutcome::Passthrough);
  }

  #[tokio::test]
  async fn test_offline_navigation_serves_cached_page() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let network = online_network();
    let worker = active_worker(Arc::clone(&storage), network).await;

    worker.network.set_offline(true);
    let outcome = worker
      .handle_fetch(&Request::navigate(url("index.html")))
      .await;

    assert_eq!(outcome.source(), Some(ResponseSource::Cache));
    assert_eq!(
      outcome.response().unwrap().text(),
      "<html>shell</html>"
    );
  }

  #[tokio::test]
  async fn test_offline_navigation_falls_back_to_shell() {
    let worker = active_worker(Arc::new(MemoryCacheStorage::new()), online_network()).await;
    worker.network.set_offline(true);

    let outcome = worker
      .handle_fetch(&Request::navigate(url("settings")))
      .await;
    assert_eq!(outcome.source(), Some(ResponseSource::OfflineShell));
    assert_eq!(outcome.response().unwrap().text(), "<html>shell</html>");
  }

  #[tokio::test]
  async fn test_offline_navigation_without_shell_is_unavailable() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let worker = active_worker(Arc::clone(&storage), online_network()).await;
    storage.delete("todo-cache-v1").unwrap();
    worker.network.set_offline(true);

    let outcome = worker
      .handle_fetch(&Request::navigate(url("index.html")))
      .await;
    assert_eq!(outcome, FetchOutcome::Unavailable);
  }

  #[tokio::test]
  async fn test_network_first_refreshes_cache() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let worker = active_worker(Arc::clone(&storage), online_network()).await;

    let request = Request::get(url("about.html")).with_header("accept", "text/html");
    let outcome = worker.handle_fetch(&request).await;
    assert_eq!(outcome.source(), Some(ResponseSource::Network));

    worker.settle().await;
    assert_eq!(
      storage.match_in("todo-cache-v1", &request).unwrap(),
      Some(Response::new(200, "<html>about</html>"))
    );
  }

  #[tokio::test]
  async fn test_network_first_error_status_prefers_cache() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let worker = active_worker(Arc::clone(&storage), online_network()).await;

    // Nothing cached yet: the error response itself is returned and not stored
    let request = Request::navigate(url("broken.html"));
    let outcome = worker.handle_fetch(&request).await;
    assert_eq!(outcome.response().map(|r| r.status), Some(500));
    worker.settle().await;
    assert_eq!(storage.match_any(&request).unwrap(), None);

    storage
      .put("todo-cache-v1", &request, &Response::new(200, "<html>last good</html>"))
      .unwrap();
    let outcome = worker.handle_fetch(&request).await;
    assert_eq!(outcome.source(), Some(ResponseSource::Cache));
    assert_eq!(outcome.response().unwrap().text(), "<html>last good</html>");
  }

  #[tokio::test]
  async fn test_cache_first_stores_successful_get_eventually() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let worker = active_worker(Arc::clone(&storage), online_network()).await;
    let request = Request::get(url("app.js"));

    let outcome = worker.handle_fetch(&request).await;
    assert_eq!(outcome.source(), Some(ResponseSource::Network));

    worker.settle().await;
    assert!(storage.match_in("todo-cache-v1", &request).unwrap().is_some());

    // Second request is served from cache without touching the network
    let calls = worker.network.calls();
    let outcome = worker.handle_fetch(&request).await;
    assert_eq!(outcome.source(), Some(ResponseSource::Cache));
    assert_eq!(worker.network.calls(), calls);
  }

  #[tokio::test]
  async fn test_cache_first_does_not_store_errors() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let worker = active_worker(Arc::clone(&storage), online_network()).await;
    let request = Request::get(url("missing.png"));

    let outcome = worker.handle_fetch(&request).await;
    assert_eq!(outcome.response().map(|r| r.status), Some(404));
    worker.settle().await;
    assert_eq!(storage.match_any(&request).unwrap(), None);
  }

  #[tokio::test]
  async fn test_cache_first_offline_miss_is_unavailable() {
    let worker = active_worker(Arc::new(MemoryCacheStorage::new()), online_network()).await;
    worker.network.set_offline(true);

    let request = Request::get(url("app.js"));
    assert_eq!(worker.handle_fetch(&request).await, FetchOutcome::Unavailable);
    assert!(worker.fetch(&request).await.is_err());
  }

  #[tokio::test]
  async fn test_resume_requires_existing_bucket() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let mut worker =
      CacheWorker::new(Arc::clone(&storage), online_network(), options("todo-cache-v1")).unwrap();
    assert!(worker.resume_active().is_err());

    let mut installer =
      CacheWorker::new(Arc::clone(&storage), online_network(), options("todo-cache-v1")).unwrap();
    installer.install().await.unwrap();
    let mut worker =
      CacheWorker::new(Arc::clone(&storage), online_network(), options("todo-cache-v1")).unwrap();
    worker.resume_active().unwrap();
    assert_eq!(worker.state(), WorkerState::Activated);
  }

  #[tokio::test]
  async fn test_activate_in_later_run() {
    let storage = Arc::new(MemoryCacheStorage::new());
    storage.open("todo-cache-v0").unwrap();
    let mut first =
      CacheWorker::new(Arc::clone(&storage), online_network(), options("todo-cache-v1")).unwrap();
    first.install().await.unwrap();

    let mut second =
      CacheWorker::new(Arc::clone(&storage), online_network(), options("todo-cache-v1")).unwrap();
    second.resume_installed().unwrap();
    assert_eq!(second.activate().unwrap(), vec!["todo-cache-v0"]);
  }

  #[test]
  fn test_cache_name_resolution() {
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 30, 0).unwrap();
    let fixed = CacheName::Fixed("todo-cache-v1".to_string());
    assert_eq!(fixed.resolve(&[], true, now), "todo-cache-v1");

    let stamped = CacheName::Timestamped {
      prefix: "todo-cache".to_string(),
    };
    assert_eq!(
      stamped.resolve(&[], true, now),
      "todo-cache-20261019123000000"
    );

    let existing = vec![
      "todo-cache-20261001000000000".to_string(),
      "other".to_string(),
      "todo-cache-20261018000000000".to_string(),
    ];
    assert_eq!(
      stamped.resolve(&existing, false, now),
      "todo-cache-20261018000000000"
    );
    assert_eq!(
      stamped.resolve(&existing, true, now),
      "todo-cache-20261019123000000"
    );
  }
}

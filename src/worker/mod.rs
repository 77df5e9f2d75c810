//! Offline request cache.
//!
//! A [`CacheWorker`] goes through install (seed the app shell into the
//! current bucket) and activate (drop every other bucket), then answers GET
//! requests: network-first for pages, cache-first for everything else.

pub mod http;
pub mod network;
pub mod service;
pub mod storage;

pub use http::{Request, RequestMode, Response};
pub use network::{HttpNetwork, Network};
pub use service::{
  CacheName, CacheWorker, FetchOutcome, ResponseSource, WorkerOptions, WorkerState,
};
pub use storage::{CacheStorage, MemoryCacheStorage, SqliteCacheStorage};

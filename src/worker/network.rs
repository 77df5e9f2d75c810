//! Outbound fetches.

use color_eyre::{eyre::eyre, Result};
use std::collections::BTreeMap;
use std::future::Future;
use tracing::debug;

use super::http::{Request, Response};

/// Performs live fetches for the worker.
///
/// Transport failures are errors. HTTP error statuses are successful fetches
/// of a non-OK [`Response`].
pub trait Network: Send + Sync {
  fn fetch(&self, request: &Request) -> impl Future<Output = Result<Response>> + Send;
}

/// Network backed by a reqwest client.
#[derive(Clone)]
pub struct HttpNetwork {
  client: reqwest::Client,
}

impl HttpNetwork {
  pub fn new() -> Result<Self> {
    let client = reqwest::Client::builder()
      .user_agent(concat!("todolists/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client })
  }
}

impl Network for HttpNetwork {
  fn fetch(&self, request: &Request) -> impl Future<Output = Result<Response>> + Send {
    let url = request.url.clone();
    let mut builder = self.client.request(request.method.clone(), url.clone());
    for (name, value) in &request.headers {
      builder = builder.header(name.as_str(), value.as_str());
    }

    async move {
      debug!(url = %url, "fetching from network");
      let response = builder
        .send()
        .await
        .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;

      let status = response.status().as_u16();
      let headers: BTreeMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
          value
            .to_str()
            .ok()
            .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
      let body = response
        .bytes()
        .await
        .map_err(|e| eyre!("Failed to read body of {}: {}", url, e))?
        .to_vec();

      Ok(Response {
        status,
        headers,
        body,
      })
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_http_network_builds_without_timeouts() {
    assert!(HttpNetwork::new().is_ok());
  }
}

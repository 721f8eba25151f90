use crate::app::ports::CatalogPort;
use crate::error::Result;
use crate::infra::connection_limiter::ConnectionLimiter;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Catalog access over HTTP with a shared client and a connection ceiling.
pub struct ReqwestCatalog {
    client: reqwest::Client,
    limiter: ConnectionLimiter,
}

impl ReqwestCatalog {
    /// `timeout` bounds each request from send to the last body byte.
    pub fn new(timeout: Duration, max_connections: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(max_connections)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            limiter: ConnectionLimiter::new(max_connections),
        })
    }

    pub fn limiter(&self) -> &ConnectionLimiter {
        &self.limiter
    }
}

#[async_trait]
impl CatalogPort for ReqwestCatalog {
    #[instrument(skip(self), level = "debug")]
    async fn get_json(&self, url: &str) -> Result<Value> {
        // Held until the body is read so the ceiling counts whole requests.
        let _permit = self.limiter.acquire().await?;
        let resp = self.client.get(url).send().await?.error_for_status()?;
        let status = resp.status().as_u16();
        let body = resp.json::<Value>().await?;
        debug!(status, "catalog response decoded");
        Ok(body)
    }
}

use crate::error::Result;
use crate::types::NameMap;
use async_trait::async_trait;
use serde_json::Value;

/// Read access to the remote catalog.
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// GET `url` and decode the body as JSON. Non-2xx responses are errors.
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// Receives one increment per processed job, whatever its outcome.
pub trait ProgressSink: Send + Sync {
    fn inc(&self, delta: u64);
    fn finish(&self) {}
}

/// Persists the finished name table.
pub trait NameMapWriter: Send + Sync {
    fn write(&self, names: &NameMap) -> Result<()>;
}

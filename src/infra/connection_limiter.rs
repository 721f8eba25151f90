use crate::error::{CatalogError, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps the number of requests in flight at once, independent of how many
/// workers are asking.
#[derive(Debug, Clone)]
pub struct ConnectionLimiter {
    sem: Arc<Semaphore>,
    max: usize,
}

impl ConnectionLimiter {
    pub fn new(max_connections: usize) -> Self {
        let max = max_connections.max(1);
        Self {
            sem: Arc::new(Semaphore::new(max)),
            max,
        }
    }

    /// Wait for a free connection slot. The slot is released when the
    /// returned permit is dropped.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        self.sem
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| CatalogError::Config(format!("connection limiter closed: {e}")))
    }

    pub fn max_connections(&self) -> usize {
        self.max
    }

    pub fn in_flight(&self) -> usize {
        self.max - self.sem.available_permits()
    }
}

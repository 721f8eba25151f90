//! Job outcome counters.
//!
//! Workers always record `dex_jobs_total{outcome}` through the `metrics`
//! facade. Nothing is exported unless `DEX_METRICS_ADDR` names a socket
//! address, in which case a Prometheus scrape endpoint is served there for
//! the lifetime of the process.

use std::net::SocketAddr;
use std::sync::Once;
use tracing::{info, warn};

pub const METRICS_ADDR_ENV: &str = "DEX_METRICS_ADDR";

static INIT: Once = Once::new();

/// Install the Prometheus exporter if configured. Idempotent; must be called
/// from inside a Tokio runtime.
pub fn init_metrics() {
    INIT.call_once(|| {
        let Ok(addr_str) = std::env::var(METRICS_ADDR_ENV) else {
            return;
        };
        let addr = match addr_str.parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(e) => {
                warn!("Invalid {} '{}': {}; metrics export disabled", METRICS_ADDR_ENV, addr_str, e);
                return;
            }
        };
        match metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
        {
            Ok(()) => info!("Prometheus exporter listening at http://{}/metrics", addr),
            Err(e) => warn!("Failed to install Prometheus exporter: {}", e),
        }
    });
}

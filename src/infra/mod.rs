// Adapters for the ports in `app::ports`.

pub mod connection_limiter;
pub mod http_client;
pub mod progress;

pub use connection_limiter::ConnectionLimiter;
pub use http_client::ReqwestCatalog;
pub use progress::{BarProgress, CountingProgress};

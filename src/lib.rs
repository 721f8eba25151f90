pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod locale;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod storage;
pub mod types;

// Ports and their adapters
pub mod app;
pub mod infra;

pub use error::{CatalogError, Result};
pub use pipeline::{Pipeline, PipelineSettings, RunReport};
pub use types::{Category, FetchJob, NameMap, NamePair, ReferenceItem};

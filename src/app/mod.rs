// Application boundaries: the traits the pipeline depends on.

pub mod ports;

pub use ports::{CatalogPort, NameMapWriter, ProgressSink};

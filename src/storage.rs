use crate::app::ports::NameMapWriter;
use crate::error::Result;
use crate::types::NameMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes the name table as pretty-printed UTF-8 JSON.
///
/// Non-ASCII characters are written literally, keys keep map order.
pub struct JsonFileWriter {
    path: PathBuf,
}

impl JsonFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NameMapWriter for JsonFileWriter {
    fn write(&self, names: &NameMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json_content = serde_json::to_string_pretty(names)?;
        fs::write(&self.path, json_content)?;
        debug!("Wrote {} entries to {}", names.len(), self.path.display());
        Ok(())
    }
}

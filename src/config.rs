use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CONCURRENCY, DEFAULT_CONFIG_FILE, DEFAULT_LIST_LIMIT, DEFAULT_LOCALE,
    DEFAULT_MAX_CONNECTIONS, DEFAULT_OUTPUT_PATH, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::error::{CatalogError, Result};
use crate::types::Category;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub base_url: String,
    pub locale: String,
    pub categories: Vec<Category>,
    pub list_limit: u32,
    /// Number of workers.
    pub concurrency: usize,
    /// Ceiling on simultaneous HTTP requests, independent of `concurrency`.
    pub max_connections: usize,
    pub request_timeout_secs: u64,
    /// `None` keeps the job queue unbounded.
    pub queue_capacity: Option<usize>,
    pub output_path: PathBuf,
    pub log_dropped_jobs: bool,
    /// Extra add-if-absent names, applied after the built-in ones.
    pub overrides: IndexMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            categories: vec![Category::Species, Category::Form],
            list_limit: DEFAULT_LIST_LIMIT,
            concurrency: DEFAULT_CONCURRENCY,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            queue_capacity: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            log_dropped_jobs: false,
            overrides: IndexMap::new(),
        }
    }
}

impl Config {
    /// Defaults, then the TOML file, then `DEX_*` environment variables.
    ///
    /// An explicit `path` must exist; without one, `dex_locale.toml` in the
    /// working directory is read if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&config_content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Override fields from environment variables, read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DEX_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("DEX_LOCALE") {
            self.locale = v;
        }
        if let Some(v) = lookup("DEX_CONCURRENCY") {
            self.concurrency = parse_env("DEX_CONCURRENCY", &v)?;
        }
        if let Some(v) = lookup("DEX_MAX_CONNECTIONS") {
            self.max_connections = parse_env("DEX_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DEX_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_env("DEX_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("DEX_OUTPUT") {
            self.output_path = PathBuf::from(v);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(CatalogError::Config("concurrency must be at least 1".into()));
        }
        if self.max_connections == 0 {
            return Err(CatalogError::Config("max_connections must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CatalogError::Config("request_timeout_secs must be at least 1".into()));
        }
        if self.queue_capacity == Some(0) {
            return Err(CatalogError::Config("queue_capacity must be at least 1 when set".into()));
        }
        if self.locale.trim().is_empty() {
            return Err(CatalogError::Config("locale must not be empty".into()));
        }
        if self.categories.is_empty() {
            return Err(CatalogError::Config("at least one category is required".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| CatalogError::Config(format!("{key}={value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_reference_run() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://pokeapi.co/api/v2");
        assert_eq!(config.locale, "fr");
        assert_eq!(config.categories, vec![Category::Species, Category::Form]);
        assert_eq!(config.concurrency, 40);
        assert_eq!(config.max_connections, 40);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.output_path, PathBuf::from("public/pokemon-fr.json"));
        assert!(config.queue_capacity.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dex.toml");
        fs::write(
            &path,
            r#"
locale = "de"
categories = ["pokemon-species"]
concurrency = 8
queue_capacity = 100

[overrides]
"porygon-z" = "Porygon-Z"
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.locale, "de");
        assert_eq!(config.categories, vec![Category::Species]);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.queue_capacity, Some(100));
        assert_eq!(config.overrides["porygon-z"], "Porygon-Z");
        // untouched fields keep their defaults
        assert_eq!(config.max_connections, 40);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dex.toml");
        fs::write(&path, "workers = 3\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(CatalogError::Toml(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DEX_LOCALE", "es"),
            ("DEX_CONCURRENCY", " 12 "),
            ("DEX_OUTPUT", "out/es.json"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.locale, "es");
        assert_eq!(config.concurrency, 12);
        assert_eq!(config.output_path, PathBuf::from("out/es.json"));
    }

    #[test]
    fn test_bad_env_number() {
        let mut config = Config::default();
        let err = config
            .apply_env(|k| (k == "DEX_MAX_CONNECTIONS").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("DEX_MAX_CONNECTIONS"));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = Config { concurrency: 0, ..Config::default() };
        assert!(config.validate().is_err());
        let config = Config { queue_capacity: Some(0), ..Config::default() };
        assert!(config.validate().is_err());
        let config = Config { categories: vec![], ..Config::default() };
        assert!(config.validate().is_err());
    }
}

//! Catalog configuration.

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "EOCAT_";

/// Upper bound for streaming page sizes.
pub const MAX_PAGE_SIZE: u32 = 10_000;

/// What `remove` does when the key is not registered.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RemovePolicy {
    /// Removing a missing key is a no-op (default).
    #[default]
    Lenient,
    /// Removing a missing key fails with a not-found error.
    Strict,
}

/// Catalog store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// SQLite database file path (`:memory:` for a transient catalog).
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// How long a writer waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
    /// Rows fetched per page by streaming queries.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Behavior of `remove` on a missing key.
    #[serde(default)]
    pub remove_policy: RemovePolicy,
    /// Page size for searches that do not set a limit.
    #[serde(default = "default_search_limit")]
    pub default_search_limit: u32,
    /// Largest page size a search may request.
    #[serde(default = "default_max_search_limit")]
    pub max_search_limit: u32,
}

fn default_path() -> PathBuf {
    PathBuf::from("./data/catalog.db")
}

fn default_busy_timeout_secs() -> u64 {
    5
}

fn default_page_size() -> u32 {
    500
}

fn default_search_limit() -> u32 {
    50
}

fn default_max_search_limit() -> u32 {
    1000
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            busy_timeout_secs: default_busy_timeout_secs(),
            page_size: default_page_size(),
            remove_policy: RemovePolicy::default(),
            default_search_limit: default_search_limit(),
            max_search_limit: default_max_search_limit(),
        }
    }
}

impl CatalogConfig {
    /// Create a test configuration backed by an in-memory database.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            ..Self::default()
        }
    }

    /// Load configuration from an optional TOML file, overridden by
    /// `EOCAT_`-prefixed environment variables (`__` separates nested keys).
    pub fn load(file: Option<&Path>) -> crate::Result<Self> {
        let mut figment = Figment::new();
        if let Some(file) = file {
            if !file.exists() {
                return Err(crate::Error::Config(format!(
                    "config file {} does not exist",
                    file.display()
                )));
            }
            figment = figment.merge(Toml::file(file));
        }

        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate().map_err(crate::Error::Config)?;
        Ok(config)
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("path cannot be empty".to_string());
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            ));
        }
        if self.max_search_limit == 0 {
            return Err("max_search_limit must be at least 1".to_string());
        }
        if self.default_search_limit == 0 || self.default_search_limit > self.max_search_limit {
            return Err(format!(
                "default_search_limit must be between 1 and max_search_limit ({}), got {}",
                self.max_search_limit, self.default_search_limit
            ));
        }
        Ok(())
    }

    /// Busy timeout as a std Duration.
    pub fn busy_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.busy_timeout_secs)
    }
}

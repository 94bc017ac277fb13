use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::domain::Strategy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// `pretty` or `json`
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            cors_allowed_origins: vec![
                "http://localhost:4000".to_string(),
                "http://127.0.0.1:4000".to_string(),
            ],
        }
    }
}

/// One database per strategy, sharing the pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub views_url: String,

    pub expand_deprecate_url: String,

    pub branches_url: String,

    pub max_connections: u32,

    pub min_connections: u32,

    pub idle_timeout_secs: u64,

    pub acquire_timeout_secs: u64,

    /// Budget for a single repository call, transaction included.
    pub operation_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            views_url: "sqlite:data/views.db".to_string(),
            expand_deprecate_url: "sqlite:data/expand_deprecate.db".to_string(),
            branches_url: "sqlite:data/branches.db".to_string(),
            max_connections: 25,
            min_connections: 1,
            idle_timeout_secs: 900,
            acquire_timeout_secs: 5,
            operation_timeout_ms: 3000,
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn url(&self, strategy: Strategy) -> &str {
        match strategy {
            Strategy::Views => &self.views_url,
            Strategy::ExpandDeprecate => &self.expand_deprecate_url,
            Strategy::Branches => &self.branches_url,
        }
    }

    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Environment variable that overrides the URL of `strategy`.
    #[must_use]
    pub const fn env_key(strategy: Strategy) -> &'static str {
        match strategy {
            Strategy::Views => "VIEWS_DB_DSN",
            Strategy::ExpandDeprecate => "EXPAND_DEPRECATE_DB_DSN",
            Strategy::Branches => "BRANCHES_DB_DSN",
        }
    }

    fn url_mut(&mut self, strategy: Strategy) -> &mut String {
        match strategy {
            Strategy::Views => &mut self.views_url,
            Strategy::ExpandDeprecate => &mut self.expand_deprecate_url,
            Strategy::Branches => &mut self.branches_url,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Replaces database URLs with any DSN found through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for strategy in Strategy::ALL {
            let key = DatabaseConfig::env_key(strategy);
            if let Some(url) = lookup(key).filter(|v| !v.trim().is_empty()) {
                info!("Using {} for the {} store", key, strategy);
                *self.database.url_mut(strategy) = url;
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("reelstrata").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".reelstrata").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !matches!(self.general.log_format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "general.log_format must be 'pretty' or 'json', got '{}'",
                self.general.log_format
            );
        }

        for strategy in Strategy::ALL {
            if self.database.url(strategy).trim().is_empty() {
                anyhow::bail!("Database URL for the {strategy} store cannot be empty");
            }
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be > 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!("database.min_connections cannot exceed max_connections");
        }

        if self.database.operation_timeout_ms == 0 {
            anyhow::bail!("database.operation_timeout_ms must be > 0");
        }

        Ok(())
    }
}

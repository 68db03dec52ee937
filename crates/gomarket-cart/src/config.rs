//! # Cart Configuration
//!
//! Where the cart is persisted and how loudly it logs.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GOMARKET_STORAGE_BACKEND=memory                                    │
//! │     GOMARKET_DB_PATH=/data/cart.db                                     │
//! │     GOMARKET_STORAGE_KEY=@GoMarketPlace:Products                       │
//! │     GOMARKET_LOG=debug                                                 │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gomarket/cart.toml (Linux)                               │
//! │     ~/Library/Application Support/com.gomarket.gomarket/cart.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     SQLite in the platform data dir, legacy storage key                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! backend = "sqlite"        # sqlite | memory
//! database_path = "/data/cart.db"
//! storage_key = "@GoMarketPlace:Products"
//! max_connections = 2
//! connect_timeout_secs = 10
//!
//! [logging]
//! filter = "info,gomarket=debug,sqlx=warn"
//! ```

use std::path::PathBuf;

use gomarket_core::CART_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CartError, CartResult};

// =============================================================================
// Storage Backend
// =============================================================================

/// Which key/value backend holds the persisted cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// SQLite file in the app data directory.
    #[default]
    Sqlite,

    /// Process memory only; the cart is gone on restart.
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sqlite3" | "file" => Ok(StorageBackend::Sqlite),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(CartError::InvalidConfig(format!(
                "Unknown storage backend: '{}'. Valid options: sqlite, memory",
                other
            ))),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,

    /// SQLite file. Defaults to `cart.db` in the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Key the cart snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_storage_key() -> String {
    CART_STORAGE_KEY.to_string()
}

fn default_max_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            backend: StorageBackend::default(),
            database_path: None,
            storage_key: default_storage_key(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl StorageSettings {
    /// The SQLite file to open: the configured one, else the platform default.
    pub fn resolved_database_path(&self) -> CartResult<PathBuf> {
        self.database_path
            .clone()
            .or_else(CartConfig::default_database_path)
            .ok_or_else(|| {
                CartError::InvalidConfig("No database path configured and no data directory".into())
            })
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

/// Tracing settings. `RUST_LOG` still wins when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,gomarket=debug,sqlx=warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl CartConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config for an ephemeral in-memory cart (tests, previews).
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.storage.backend = StorageBackend::Memory;
        config
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CartResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CartError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        if self.storage.storage_key.trim().is_empty() {
            return Err(CartError::InvalidConfig(
                "storage_key must not be empty".into(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(CartError::InvalidConfig(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `GOMARKET_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(backend) = lookup("GOMARKET_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding storage backend from environment");
                    self.storage.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown storage backend in environment"),
            }
        }

        if let Some(path) = lookup("GOMARKET_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(key) = lookup("GOMARKET_STORAGE_KEY") {
            self.storage.storage_key = key;
        }

        if let Some(filter) = lookup("GOMARKET_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "gomarket", "gomarket")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    /// Returns the default SQLite file path.
    pub fn default_database_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "gomarket", "gomarket")
            .map(|dirs| dirs.data_dir().join("cart.db"))
    }
}

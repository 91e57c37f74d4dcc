//! # Console Configuration
//!
//! Where the payment-methods API lives and who is calling it.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CAJA_API_URL=https://backoffice.example/api                        │
//! │     CAJA_API_TOKEN=...   CAJA_OPERATOR=ana   CAJA_TIMEOUT_SECS=15      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/caja-console/caja.toml (Linux)                           │
//! │     ~/Library/Application Support/com.caja.console/caja.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8080, 30s request timeout                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # caja.toml
//! [api]
//! base_url = "http://localhost:8080"
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [session]
//! operator = "ana"
//! token = "eyJhbGciOi..."
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::client::Session;
use crate::error::{CatalogError, CatalogResult};

/// File name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "caja.toml";

// =============================================================================
// API Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Root of the payment-methods API; `/medios-pago` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

// =============================================================================
// Session Settings
// =============================================================================

/// Operator identity forwarded to the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default)]
    pub operator: Option<String>,

    /// Bearer token. Requests go out unauthenticated when absent.
    #[serde(default)]
    pub token: Option<String>,
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

impl CatalogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (caja.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CatalogResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load console config: {}. Using defaults.", e);
            Self::default()
        })
    }

    fn from_file(path: &Path) -> CatalogResult<Self> {
        info!(?path, "Loading console config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> CatalogResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CatalogError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CatalogError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| CatalogError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Console config saved");
        Ok(())
    }

    pub fn validate(&self) -> CatalogResult<()> {
        self.base_url()?;

        if self.api.timeout_secs == 0 {
            return Err(CatalogError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        if self.api.connect_timeout_secs == 0 {
            return Err(CatalogError::InvalidConfig(
                "connect_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Parsed base URL; only http and https are accepted.
    pub fn base_url(&self) -> CatalogResult<Url> {
        let url = Url::parse(self.api.base_url.trim())?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(CatalogError::InvalidUrl(format!(
                "API URL must use http:// or https://, got: {}://",
                other
            ))),
        }
    }

    /// The session descriptor handed to the client.
    pub fn session(&self) -> Session {
        Session {
            operator: self.session.operator.clone(),
            token: self.session.token.clone(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CAJA_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Ok(token) = std::env::var("CAJA_API_TOKEN") {
            debug!("Overriding API token from environment");
            self.session.token = Some(token);
        }

        if let Ok(operator) = std::env::var("CAJA_OPERATOR") {
            self.session.operator = Some(operator);
        }

        if let Ok(timeout) = std::env::var("CAJA_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric CAJA_TIMEOUT_SECS"),
            }
        }
    }

    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "caja", "console")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

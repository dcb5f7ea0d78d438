use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};

use todo_store::SyncMode;

use crate::error::{ServerError, ServerResult};

/// Top-level server configuration, usually read from a TOML file.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Name used in `X-{name}-alert` style response headers.
    pub application_name: String,
    pub storage: StorageConfig,
    pub paging: PagingConfig,
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            application_name: "todoApp".into(),
            storage: StorageConfig::default(),
            paging: PagingConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Record log location. `None` keeps everything in memory.
    pub data_path: Option<PathBuf>,
    pub sync_mode: SyncMode,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 2000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. Empty disables CORS handling altogether.
    pub allowed_origins: Vec<String>,
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_secs: 1800,
        }
    }
}

impl ServerConfig {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.application_name.is_empty()
            || HeaderName::from_bytes(format!("x-{}-alert", self.application_name).as_bytes())
                .is_err()
        {
            return Err(ServerError::Config(format!(
                "application_name {:?} cannot be used in a header name",
                self.application_name
            )));
        }
        if self.paging.default_page_size == 0 || self.paging.max_page_size == 0 {
            return Err(ServerError::Config("page sizes must be at least 1".into()));
        }
        if self.paging.default_page_size > self.paging.max_page_size {
            return Err(ServerError::Config(format!(
                "default_page_size {} exceeds max_page_size {}",
                self.paging.default_page_size, self.paging.max_page_size
            )));
        }
        Ok(())
    }
}

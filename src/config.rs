//! # Controller Configuration
//!
//! Paging, sorting and filter defaults for the controllers, loaded from TOML and then
//! overridden from the environment:
//!
//! ```toml
//! channel_capacity = 32
//!
//! [paging]
//! page_size = 20
//! block_size = 10
//!
//! [sorting]
//! default_column = "ID"
//! default_direction = "Ascending"
//!
//! [filters]
//! only_load_if_filters = false
//! ```
//!
//! `RECORD_PAGING_PAGE_SIZE` and `RECORD_PAGING_BLOCK_SIZE` override the paging table.
//! Missing keys keep their defaults.

use crate::controller::SortDirection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

pub const PAGE_SIZE_ENV: &str = "RECORD_PAGING_PAGE_SIZE";
pub const BLOCK_SIZE_ENV: &str = "RECORD_PAGING_BLOCK_SIZE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    pub page_size: usize,
    pub block_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            block_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortingConfig {
    pub default_column: Option<String>,
    pub default_direction: SortDirection,
}

impl Default for SortingConfig {
    fn default() -> Self {
        Self {
            default_column: Some("ID".to_string()),
            default_direction: SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub only_load_if_filters: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Capacity of the actor's command channel.
    pub channel_capacity: usize,
    pub event_capacity: usize,
    pub paging: PagingConfig,
    pub sorting: SortingConfig,
    pub filters: FilterConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 32,
            event_capacity: 64,
            paging: PagingConfig::default(),
            sorting: SortingConfig::default(),
            filters: FilterConfig::default(),
        }
    }
}

impl ControllerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ControllerConfig = toml::from_str(text)?;
        config.validated()
    }

    /// Reads a TOML file and applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Loading config");
        Self::from_toml_str(&text)?.with_env_overrides()
    }

    /// Defaults plus environment overrides, for when no file is given.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`; unparsable values are ignored with a warning.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup(PAGE_SIZE_ENV) {
            match raw.trim().parse() {
                Ok(size) => self.paging.page_size = size,
                Err(_) => warn!(key = PAGE_SIZE_ENV, value = %raw, "Ignoring override"),
            }
        }
        if let Some(raw) = lookup(BLOCK_SIZE_ENV) {
            match raw.trim().parse() {
                Ok(size) => self.paging.block_size = size,
                Err(_) => warn!(key = BLOCK_SIZE_ENV, value = %raw, "Ignoring override"),
            }
        }
        self.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.paging.page_size == 0 {
            return Err(ConfigError::Invalid("paging.page_size must be at least 1".into()));
        }
        if self.paging.block_size == 0 {
            return Err(ConfigError::Invalid("paging.block_size must be at least 1".into()));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be at least 1".into()));
        }
        Ok(self)
    }
}

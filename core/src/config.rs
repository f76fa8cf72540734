//! TOML configuration for the indexer and the completion server.

use crate::error::GofillError;
use crate::error::Result;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Address the completion server binds when none is configured.
pub const DEFAULT_ADDR: &str = "localhost:6060";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GofillConfig {
    pub index: IndexerConfig,
    pub server: ServerConfig,
}

/// How the package tree is scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Directory whose subdirectories are import paths, e.g. `$GOROOT/src`.
    pub root: Option<PathBuf>,

    /// Worker threads for the build; 0 lets rayon decide.
    pub threads: usize,

    /// Index `_test.go` files as well. External `_test` packages never are.
    pub include_tests: bool,

    /// Target operating system for file selection; the host's when unset.
    pub goos: Option<String>,

    /// Target architecture for file selection; the host's when unset.
    pub goarch: Option<String>,

    /// Extra build tags that hold, e.g. `cgo` or `netgo`.
    pub build_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

impl GofillConfig {
    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| GofillError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.addr.trim().is_empty() {
            return Err(GofillError::InvalidConfig(
                "server address cannot be empty".to_string(),
            ));
        }

        if let Some(root) = &self.index.root {
            if root.as_os_str().is_empty() {
                return Err(GofillError::InvalidConfig(
                    "index root cannot be empty".to_string(),
                ));
            }
        }

        for (field, value) in [("goos", &self.index.goos), ("goarch", &self.index.goarch)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(GofillError::InvalidConfig(format!("index {field} cannot be empty")));
            }
        }

        Ok(())
    }
}

//! Configuration loaded from `sqlbind.toml`.
//!
//! ```toml
//! backend = "postgres"      # or "sqlite"
//! strict_bindings = false   # error on bound names missing from the template
//! log_level = "warn"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::error::{BindError, BindResult};
use crate::executor::ExecOptions;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "sqlbind.toml";

/// Environment variable overriding the configured backend.
pub const BACKEND_ENV: &str = "SQLBIND_BACKEND";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub strict_bindings: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Postgres,
            strict_bindings: false,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> BindResult<Self> {
        toml::from_str(content).map_err(|e| BindError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> BindResult<String> {
        toml::to_string_pretty(self).map_err(|e| BindError::Config(e.to_string()))
    }

    /// Load from an explicit path. A missing file is an error.
    pub fn load(path: &Path) -> BindResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Find and load the configuration.
    ///
    /// Looks for `./sqlbind.toml`, then `<config dir>/sqlbind/config.toml`,
    /// falling back to defaults. `SQLBIND_BACKEND` overrides the backend.
    pub fn discover() -> BindResult<Self> {
        let config = match Self::candidates().into_iter().find(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::load(&path)?
            }
            None => Self::default(),
        };
        config.with_backend_override(std::env::var(BACKEND_ENV).ok().as_deref())
    }

    /// Replace the backend if `value` names one.
    pub fn with_backend_override(mut self, value: Option<&str>) -> BindResult<Self> {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.backend = value.parse()?;
        }
        Ok(self)
    }

    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            backend: self.backend,
            strict_bindings: self.strict_bindings,
        }
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("sqlbind").join("config.toml"));
        }
        paths
    }
}

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Settings shared by every stage of a run.
///
/// Every key is optional in a config file; missing keys take the defaults below.
///
/// ```yaml
/// handler_dir: internal/handler
/// handler_pattern: "*_handler.go"
/// router_file: internal/router/router.go
/// type_sources:
///   - internal/types/*.go
/// security_scheme: BearerAuth
/// api_prefix: /api/v1
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Root directory searched for handler files
    pub handler_dir: PathBuf,
    /// Glob matched against handler file names
    pub handler_pattern: String,
    /// Router source containing the route registrations
    pub router_file: PathBuf,
    /// Globs locating request-type declarations
    pub type_sources: Vec<String>,
    /// Name emitted in `@Security` for authenticated routes
    pub security_scheme: String,
    /// Prepended to every `@Router` path that does not already start with it
    pub api_prefix: String,
    /// Router group of anonymous registrations
    pub public_group: String,
    /// Router group of authenticated registrations
    pub secured_group: String,
    /// Package qualifier of request, response and envelope types
    pub types_package: String,
    /// Number of files processed in parallel
    pub workers: usize,
    /// Synthesize comments without rewriting any file
    pub dry_run: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            handler_dir: PathBuf::from("internal/handler"),
            handler_pattern: "*_handler.go".to_string(),
            router_file: PathBuf::from("internal/router/router.go"),
            type_sources: vec!["internal/types/*.go".to_string()],
            security_scheme: "BearerAuth".to_string(),
            api_prefix: String::new(),
            public_group: "api".to_string(),
            secured_group: "authorized".to_string(),
            types_package: "types".to_string(),
            workers: std::thread::available_parallelism().map_or(4, |n| n.get()),
            dry_run: false,
        }
    }
}

impl GeneratorConfig {
    /// Loads a YAML config file on top of the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: GeneratorConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Checks values that would make a run meaningless.
    pub fn validate(&self) -> std::result::Result<(), Error> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig("workers must be at least 1".to_string()));
        }
        if self.handler_pattern.trim().is_empty() {
            return Err(Error::InvalidConfig("handler_pattern must not be empty".to_string()));
        }
        if self.public_group.is_empty() || self.secured_group.is_empty() {
            return Err(Error::InvalidConfig("router group names must not be empty".to_string()));
        }
        if self.public_group == self.secured_group {
            return Err(Error::InvalidConfig(format!(
                "public_group and secured_group are both '{}'",
                self.public_group
            )));
        }
        if self.types_package.is_empty() {
            return Err(Error::InvalidConfig("types_package must not be empty".to_string()));
        }
        Ok(())
    }
}

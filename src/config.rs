//! Layered configuration.
//!
//! Later layers win:
//! 1. Built-in defaults
//! 2. `<config dir>/npme/config.json`
//! 3. Environment: `NPME_REGISTRY_URL`, `NPME_NPM`
//!
//! Command-line flags are applied on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::npm::DEFAULT_PROGRAM;
use crate::registry::{DEFAULT_REGISTRY_URL, DEFAULT_SEARCH_SIZE};

const APP_NAME: &str = "npme";
const CONFIG_FILE: &str = "config.json";

pub const REGISTRY_URL_ENV: &str = "NPME_REGISTRY_URL";
pub const NPM_PROGRAM_ENV: &str = "NPME_NPM";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the npm registry.
    pub registry_url: String,
    /// Number of results requested per search.
    pub search_size: u32,
    /// Package manager executable.
    pub npm_program: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            search_size: DEFAULT_SEARCH_SIZE,
            npm_program: DEFAULT_PROGRAM.to_string(),
        }
    }
}

impl Config {
    /// Load every layer. A broken config file is reported and skipped.
    pub fn load() -> Self {
        let base = match get_config_path().and_then(|path| Self::from_file(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        base.with_env(|key| std::env::var(key).ok())
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Overlay environment variables looked up through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(REGISTRY_URL_ENV).filter(|v| !v.is_empty()) {
            self.registry_url = url;
        }
        if let Some(program) = lookup(NPM_PROGRAM_ENV).filter(|v| !v.is_empty()) {
            self.npm_program = program;
        }
        self
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

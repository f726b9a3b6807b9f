//! Shared utilities for commands
//!
//! This module contains:
//! - `load_config` - Layered configuration with CLI flag overrides
//! - `open_store` - Open the persisted quota store

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use insurai_core::config::default_state_path;
use insurai_core::{AppConfig, QuotaStore, SqliteQuotaStore};

/// Load configuration, then apply `--api-url` and `--password`
pub fn load_config(
    config_path: Option<&Path>,
    api_url: Option<&str>,
    password: Option<&str>,
) -> Result<AppConfig> {
    let mut config = AppConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(url) = api_url {
        config.set_api_url(url);
    }
    if let Some(password) = password {
        config.set_demo_password(password);
    }
    Ok(config)
}

/// Open the quota store at `--db`, or the default state path
pub fn open_store(db_path: Option<&Path>) -> Result<Arc<dyn QuotaStore>> {
    let path = match db_path {
        Some(path) => path.to_path_buf(),
        None => default_state_path()
            .context("Could not determine a data directory; pass --db explicitly")?,
    };
    let store = SqliteQuotaStore::open(&path)
        .with_context(|| format!("Failed to open quota store at {}", path.display()))?;
    Ok(Arc::new(store))
}

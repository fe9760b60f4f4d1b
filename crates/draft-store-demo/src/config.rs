//! Demo configuration
//!
//! Loaded from `draft-store-demo.toml` in the working directory, or from the
//! file named by `DRAFT_STORE_DEMO_CONFIG` (which may be set in a `.env` file).

use draft_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

const CONFIG_FILE: &str = "draft-store-demo.toml";
const CONFIG_ENV: &str = "DRAFT_STORE_DEMO_CONFIG";

/// Demo configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DemoConfig {
    /// Counter value the store starts with
    #[serde(default)]
    pub initial_count: i64,

    /// Amount added by the bound "increment" callable
    #[serde(default = "default_step")]
    pub step: i64,

    /// Number of interval ticks the "tick" plugin action emits
    #[serde(default = "default_ticks")]
    pub ticks: u32,

    /// Milliseconds between interval ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_store")]
    pub store: StoreConfig,
}

fn default_step() -> i64 {
    1
}

fn default_ticks() -> u32 {
    3
}

fn default_tick_interval_ms() -> u64 {
    250
}

fn default_store() -> StoreConfig {
    StoreConfig::named("counter")
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            initial_count: 0,
            step: default_step(),
            ticks: default_ticks(),
            tick_interval_ms: default_tick_interval_ms(),
            store: default_store(),
        }
    }
}

impl DemoConfig {
    /// Load config from the configured path, or use defaults
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded .env file from: {:?}", path),
            Err(_) => log::debug!(".env file not found, relying on environment variables"),
        }

        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded demo config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                }
            },
            Err(_) => {
                log::debug!("No config file at {}", path.display());
            }
        }

        log::debug!("Using default demo config");
        Self::default()
    }
}

fn config_path() -> PathBuf {
    env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

//! Configuration loaded from `~/.config/hardline/config.toml`.
//!
//! A default file is written on first run so users have something to edit.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::backoff::DEFAULT_DELAYS_MS;
use crate::breaker::DEFAULT_COOLDOWN;
use crate::redirect::DEFAULT_MAX_HOPS;

/// Retry schedule parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Delays in milliseconds, applied in order between attempts.
    pub delays_ms: Vec<u64>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            delays_ms: DEFAULT_DELAYS_MS.to_vec(),
        }
    }
}

/// Global transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardlineConfig {
    /// Cap on simultaneously open connections per engine batch (None = unbounded).
    pub max_concurrency: Option<usize>,
    /// Seconds a tripped circuit stays open per host.
    pub breaker_cooldown_secs: u64,
    /// Maximum redirect hops per top-level attempt.
    pub max_redirect_hops: usize,
    /// Default per-request timeout in milliseconds (None = no timeout).
    #[serde(default)]
    pub default_timeout_ms: Option<u64>,
    /// Optional retry schedule; if missing, built-in defaults are used.
    #[serde(default)]
    pub backoff: Option<BackoffConfig>,
}

impl Default for HardlineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: Some(16),
            breaker_cooldown_secs: DEFAULT_COOLDOWN.as_secs(),
            max_redirect_hops: DEFAULT_MAX_HOPS,
            default_timeout_ms: None,
            backoff: None,
        }
    }
}

impl HardlineConfig {
    /// Effective backoff delays, with the built-in schedule as fallback.
    pub fn backoff_delays_ms(&self) -> Vec<u64> {
        self.backoff
            .as_ref()
            .map(|b| b.delays_ms.clone())
            .unwrap_or_else(|| DEFAULT_DELAYS_MS.to_vec())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("hardline")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<HardlineConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = HardlineConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: HardlineConfig = toml::from_str(&data)?;
    Ok(cfg)
}

// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

/// Env var naming an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "PALLETSCRAPER_CONFIG";

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_UPSTREAM: &str = "https://www.liquidation.com";
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Service configuration.
///
/// Built from defaults, then an optional YAML file, then environment
/// variables (`PORT`, `UPSTREAM_BASE_URL`, `FETCH_TIMEOUT_MS`, `STATIC_DIR`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    /// Scheme and host of the auction site. Listing pages live under
    /// `auction/container` relative to this.
    pub upstream_base: String,
    pub fetch_timeout_ms: u64,
    /// Built UI served for every path that is not an API route.
    pub static_dir: PathBuf,
    pub user_agent: String,
    pub accept: String,
    /// Honour `HTTP_PROXY` and friends for upstream requests.
    pub use_system_proxy: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upstream_base: DEFAULT_UPSTREAM.to_string(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            static_dir: PathBuf::from("dist"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            use_system_proxy: true,
        }
    }
}

impl Config {
    /// Load from `$PALLETSCRAPER_CONFIG` (if set) and the process environment.
    pub fn load() -> Result<Self> {
        let mut cfg = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_overrides(|key| env::var(key).ok())?;
        info!(
            port = cfg.port,
            upstream = %cfg.upstream_base,
            timeout_ms = cfg.fetch_timeout_ms,
            "configuration loaded"
        );
        Ok(cfg)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Apply `KEY=value` overrides, looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got {:?}", port))?;
        }
        if let Some(base) = lookup("UPSTREAM_BASE_URL") {
            self.upstream_base = base;
        }
        if let Some(ms) = lookup("FETCH_TIMEOUT_MS") {
            self.fetch_timeout_ms = ms
                .trim()
                .parse()
                .with_context(|| format!("FETCH_TIMEOUT_MS must be milliseconds, got {:?}", ms))?;
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            self.static_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

//! Router configuration.
//!
//! # Environment Variables
//!
//! - `WATERWAY_BATCH_SIZE`: features per builder batch (default: 200)
//! - `WATERWAY_CORRIDOR_PADDING`: corridor padding in degrees (default: 0.12)
//! - `WATERWAY_TILE_SIZE`: tile edge in degrees for the fallback grid (default: 0.25)
//! - `WATERWAY_OVERPASS_URL`: Overpass interpreter endpoint
//! - `WATERWAY_FETCH_TIMEOUT_SECS`: per-request timeout (default: 60)

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::builder::DEFAULT_BATCH_SIZE;

pub const DEFAULT_CORRIDOR_PADDING_DEG: f64 = 0.12;
pub const DEFAULT_TILE_SIZE_DEG: f64 = 0.25;
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

const BATCH_SIZE_ENV: &str = "WATERWAY_BATCH_SIZE";
const PADDING_ENV: &str = "WATERWAY_CORRIDOR_PADDING";
const TILE_SIZE_ENV: &str = "WATERWAY_TILE_SIZE";
const OVERPASS_URL_ENV: &str = "WATERWAY_OVERPASS_URL";
const FETCH_TIMEOUT_ENV: &str = "WATERWAY_FETCH_TIMEOUT_SECS";

/// Tunables for graph building and corridor fetching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub batch_size: usize,
    pub corridor_padding_deg: f64,
    pub tile_size_deg: f64,
    pub overpass_url: String,
    pub fetch_timeout_secs: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            corridor_padding_deg: DEFAULT_CORRIDOR_PADDING_DEG,
            tile_size_deg: DEFAULT_TILE_SIZE_DEG,
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

impl RouterConfig {
    /// Defaults overridden by any `WATERWAY_*` variables that are set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RouterConfig::from_env`] but reads values through `lookup`,
    /// so tests do not have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = parse_var(&lookup, BATCH_SIZE_ENV) {
            config.batch_size = value;
        }
        if let Some(value) = parse_var(&lookup, PADDING_ENV) {
            config.corridor_padding_deg = value;
        }
        if let Some(value) = parse_var(&lookup, TILE_SIZE_ENV) {
            config.tile_size_deg = value;
        }
        if let Some(value) = lookup(OVERPASS_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.overpass_url = value.trim().to_string();
        }
        if let Some(value) = parse_var(&lookup, FETCH_TIMEOUT_ENV) {
            config.fetch_timeout_secs = value;
        }
        config
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = raw.as_str(), "ignoring unparseable environment value");
            None
        }
    }
}

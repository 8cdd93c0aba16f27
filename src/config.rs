//! Startup configuration resolved from environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use reqwest::Url;

/// Production backend; override with TOHPITOH_API_URL.
pub const DEFAULT_API_URL: &str = "https://tohpitoh-api.onrender.com/api/v1";

/// Relative directory holding the persisted token and display preference;
/// override with TOHPITOH_STATE_DIR.
pub const DEFAULT_STATE_DIR: &str = ".tohpitoh";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub state_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var("TOHPITOH_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&raw).with_context(|| format!("invalid TOHPITOH_API_URL '{}'", raw))?;
        let state_dir = std::env::var("TOHPITOH_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR));
        Ok(Self { api_url, state_dir })
    }
}

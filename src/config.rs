use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub wishlist_url: String,
    /// Relative item links are resolved against this.
    pub base_url: String,
    pub output_dir: PathBuf,
    /// Upper bound for the wishlist item container to appear.
    pub link_wait_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wishlist_url: "https://www.amazon.com.br/hz/wishlist/ls/8RFTJ603L057?ref_=wl_share"
                .to_string(),
            base_url: "https://www.amazon.com.br".to_string(),
            output_dir: PathBuf::from("."),
            link_wait_secs: 30,
            request_timeout_secs: 30,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url).with_context(|| format!("invalid base url {}", self.base_url))
    }

    pub fn link_wait(&self) -> Duration {
        Duration::from_secs(self.link_wait_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord_webhook_url: Option<String>,
    #[serde(default = "default_tag_id")]
    pub tag_id: String,
    #[serde(default = "default_tag_label")]
    pub tag_label: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default = "default_store_url")]
    pub store_url: String,
    #[serde(default = "default_cdn_url")]
    pub cdn_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Leave listings whose notification failed out of the seen-set so the
    /// next run tries them again. Off by default: at most one attempt per item.
    #[serde(default)]
    pub retry_undelivered: bool,
}

fn default_tag_id() -> String {
    "599".to_string()
}

fn default_tag_label() -> String {
    "Simulation".to_string()
}

fn default_language() -> String {
    "turkish".to_string()
}

fn default_state_file() -> PathBuf {
    PathBuf::from("notified_games.json")
}

fn default_store_url() -> String {
    "https://store.steampowered.com".to_string()
}

fn default_cdn_url() -> String {
    "https://cdn.akamai.steamstatic.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_webhook_url: None,
            tag_id: default_tag_id(),
            tag_label: default_tag_label(),
            language: default_language(),
            state_file: default_state_file(),
            store_url: default_store_url(),
            cdn_url: default_cdn_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            retry_undelivered: false,
        }
    }
}

impl Config {
    /// Reads the file named by `CONFIG` (default `config.json`) when it
    /// exists, then applies environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| "config.json".to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&data).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DISCORD_WEBHOOK") {
            self.discord_webhook_url = Some(url);
        }
        if let Some(tag) = get("STEAM_TAG_ID") {
            self.tag_id = tag;
        }
        if let Some(label) = get("STEAM_TAG_LABEL") {
            self.tag_label = label;
        }
        if let Some(path) = get("STATE_FILE") {
            self.state_file = PathBuf::from(path);
        }
    }

    /// The webhook URL, if one is set and not blank.
    pub fn webhook_url(&self) -> Option<&str> {
        self.discord_webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

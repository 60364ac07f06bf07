use crate::config::Config;
use crate::error::{Error, Result};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Fetches the discounted search page for one tag.
pub struct StorefrontClient {
    client: reqwest::Client,
    store_url: String,
    tag_id: String,
    language: String,
}

impl StorefrontClient {
    /// The store rejects reqwest's default identification, so a browser-like
    /// `User-Agent` is always set.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            store_url: config.store_url.trim_end_matches('/').to_string(),
            tag_id: config.tag_id.clone(),
            language: config.language.clone(),
        })
    }

    pub fn search_url(&self) -> String {
        format!("{}/search/", self.store_url)
    }

    pub async fn fetch(&self) -> Result<String> {
        let res = self
            .client
            .get(self.search_url())
            .query(&[
                ("specials", "1"),
                ("tags", self.tag_id.as_str()),
                ("l", self.language.as_str()),
            ])
            .send()
            .await?;

        if res.status() != StatusCode::OK {
            return Err(Error::FetchStatus(res.status()));
        }

        let body = res.text().await?;
        debug!(bytes = body.len(), "Search page received");
        Ok(body)
    }
}

/// Canonical store page for an app.
pub fn app_url(store_url: &str, app_id: &str) -> String {
    format!("{}/app/{}", store_url.trim_end_matches('/'), app_id)
}

/// Capsule image shown as the embed thumbnail.
pub fn header_image_url(cdn_url: &str, app_id: &str) -> String {
    format!(
        "{}/steam/apps/{}/header.jpg",
        cdn_url.trim_end_matches('/'),
        app_id
    )
}

use crate::config::Config;
use crate::error::{Error, Result};
use crate::parser::Listing;
use crate::storefront::{app_url, header_image_url};
use serde::Serialize;
use std::time::Duration;

const EMBED_COLOR: u32 = 0x00FF00;
const FOOTER: &str = "Steam Store Scraper Bot";

/// Outcome of one webhook post. Never persisted.
pub type NotificationResult = Result<()>;

#[derive(Debug, Serialize)]
pub struct WebhookMessage {
    pub content: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub thumbnail: EmbedImage,
    pub footer: EmbedFooter,
}

#[derive(Debug, Serialize)]
pub struct EmbedField {
    pub name: &'static str,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct EmbedFooter {
    pub text: &'static str,
}

/// Posts one Discord embed per listing.
pub struct Notifier {
    client: reqwest::Client,
    webhook_url: String,
    tag_label: String,
    store_url: String,
    cdn_url: String,
}

impl Notifier {
    pub fn new(webhook_url: &str, config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            webhook_url: webhook_url.to_string(),
            tag_label: config.tag_label.clone(),
            store_url: config.store_url.clone(),
            cdn_url: config.cdn_url.clone(),
        })
    }

    pub fn build_message(&self, listing: &Listing) -> WebhookMessage {
        let embed = Embed {
            title: format!("🎮 {}", listing.name),
            url: app_url(&self.store_url, &listing.app_id),
            description: format!(
                "This game from your '{}' tag filter is now **{}%** off!",
                self.tag_label, listing.discount_pct
            ),
            color: EMBED_COLOR,
            fields: vec![
                EmbedField {
                    name: "Old Price",
                    value: format!("~~{}~~", listing.original_price.trim()),
                    inline: true,
                },
                EmbedField {
                    name: "New Price",
                    value: format!("**{}**", listing.final_price.trim()),
                    inline: true,
                },
            ],
            thumbnail: EmbedImage {
                url: header_image_url(&self.cdn_url, &listing.app_id),
            },
            footer: EmbedFooter { text: FOOTER },
        };

        WebhookMessage {
            content: format!("🎉 **'{}' Sale Alert!** 🎉", self.tag_label),
            embeds: vec![embed],
        }
    }

    /// Exactly one POST. Failures come back as `Err`; the caller decides what to log.
    pub async fn notify(&self, listing: &Listing) -> NotificationResult {
        let message = self.build_message(listing);

        let res = self
            .client
            .post(&self.webhook_url)
            .json(&message)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(Error::WebhookStatus(status, body));
        }

        Ok(())
    }
}

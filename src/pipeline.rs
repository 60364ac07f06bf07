use crate::config::Config;
use crate::error::{Error, Result};
use crate::notifier::Notifier;
use crate::parser::parse_listings;
use crate::state::SeenSet;
use crate::storefront::StorefrontClient;
use std::collections::HashSet;
use tracing::{error, info, warn};

/// Counters for one completed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Complete listings on the search page.
    pub listings: usize,
    /// Listings not in the seen-set.
    pub new: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Whether the seen-set file was rewritten.
    pub saved: bool,
}

/// One pass of load, fetch, parse, notify, persist.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns `Err` when the run was aborted: no webhook, fetch failure, or a
    /// failed save. Individual notification failures only show up in the summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let webhook_url = self.config.webhook_url().ok_or(Error::MissingWebhook)?;
        let storefront = StorefrontClient::new(&self.config)?;
        let notifier = Notifier::new(webhook_url, &self.config)?;

        let state_path = self.config.state_file.as_path();
        let mut seen = SeenSet::load(state_path);

        info!(
            tag = %self.config.tag_id,
            seen = seen.len(),
            "Checking discounted listings"
        );

        let markup = storefront.fetch().await.inspect_err(|e| {
            error!(url = %storefront.search_url(), error = %e, "Could not reach the storefront");
        })?;

        let listings = parse_listings(&markup)?;
        let mut summary = RunSummary {
            listings: listings.len(),
            ..Default::default()
        };

        if listings.is_empty() {
            info!(tag = %self.config.tag_id, "No discounted listings for this tag");
            return Ok(summary);
        }

        let mut attempted = HashSet::new();
        let mut dirty = false;

        for listing in &listings {
            if !seen.is_new(&listing.app_id) || !attempted.insert(listing.app_id.as_str()) {
                continue;
            }
            summary.new += 1;

            match notifier.notify(listing).await {
                Ok(()) => {
                    summary.delivered += 1;
                    info!(app_id = %listing.app_id, name = %listing.name, discount = listing.discount_pct, "Notification sent");
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(app_id = %listing.app_id, name = %listing.name, error = %e, "Notification failed");
                    if self.config.retry_undelivered {
                        continue;
                    }
                    warn!(app_id = %listing.app_id, "Marking undelivered listing as seen");
                }
            }

            dirty |= seen.mark_seen(&listing.app_id);
        }

        if dirty {
            seen.save(state_path).inspect_err(|e| {
                error!(path = %state_path.display(), error = %e, "Failed to save seen-set");
            })?;
            summary.saved = true;
        } else {
            info!("No new discounts");
        }

        Ok(summary)
    }
}

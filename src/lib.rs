//! Watches a Steam tag for discounted games and announces new deals on a
//! Discord webhook.
//!
//! A run is one linear pass: load the seen-set, fetch the search page,
//! parse listings, notify the unseen ones, save the set. Repetition is left
//! to an external scheduler.

pub mod config;
pub mod error;
pub mod notifier;
pub mod parser;
pub mod pipeline;
pub mod state;
pub mod storefront;

pub use config::Config;
pub use error::{Error, Result};
pub use parser::Listing;
pub use pipeline::{Pipeline, RunSummary};
pub use state::SeenSet;

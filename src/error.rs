//! Error type shared by every stage of a run.
//!
//! Each variant maps to one entry of the failure taxonomy: configuration,
//! storefront fetch, webhook delivery, markup selectors, and seen-set I/O.
//! The webhook URL is a secret and never appears in any message.

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No webhook URL configured; the run stops before any network activity.
    #[error("webhook URL is not configured (set DISCORD_WEBHOOK)")]
    MissingWebhook,

    /// The config file exists but could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Transport-level HTTP failure (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The storefront answered with anything other than 200.
    #[error("storefront returned {0}")]
    FetchStatus(StatusCode),

    /// The webhook answered with a non-2xx status.
    #[error("webhook returned {0}: {1}")]
    WebhookStatus(StatusCode, String),

    /// A CSS selector failed to compile.
    #[error("invalid selector {0:?}: {1}")]
    Selector(&'static str, String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_webhook() {
        assert_eq!(
            Error::MissingWebhook.to_string(),
            "webhook URL is not configured (set DISCORD_WEBHOOK)"
        );
    }

    #[test]
    fn display_fetch_status() {
        let err = Error::FetchStatus(StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "storefront returned 403 Forbidden");
    }

    #[test]
    fn display_webhook_status_includes_body() {
        let err = Error::WebhookStatus(StatusCode::BAD_REQUEST, "invalid embed".into());
        assert_eq!(err.to_string(), "webhook returned 400 Bad Request: invalid embed");
    }

    #[test]
    fn display_selector() {
        let err = Error::Selector("div..x", "unexpected token".into());
        assert_eq!(err.to_string(), "invalid selector \"div..x\": unexpected token");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}

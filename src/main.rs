use anyhow::Context;
use steam_sale_watch::{Config, Pipeline, RunSummary};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Every failure ends the run here with a normal exit.
    match run_once().await {
        Ok(summary) => info!(
            listings = summary.listings,
            new = summary.new,
            delivered = summary.delivered,
            failed = summary.failed,
            saved = summary.saved,
            "Run finished"
        ),
        Err(e) => error!("{e:#}"),
    }
}

async fn run_once() -> anyhow::Result<RunSummary> {
    let config = Config::load().context("failed to load configuration")?;
    Pipeline::new(config).run().await.context("run aborted")
}

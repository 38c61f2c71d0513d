use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gridscout_common::{Config, GridScoutError};
use gridscout_scraper::browser::BrowserlessBrowser;
use gridscout_scraper::orchestrator::BatchOrchestrator;
use gridscout_scraper::roster::RosterDiscovery;
use gridscout_scraper::writer::CsvAppender;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("gridscout_scraper=info".parse()?),
        )
        .init();

    info!("GridScout starting...");

    let config = Config::from_env();
    config.log_redacted();

    let browser = BrowserlessBrowser::new(
        &config.browserless_url,
        config.browserless_token.as_deref(),
        config.concurrency,
    );

    let roster = RosterDiscovery::new(&browser, config.diagnostic_mode)
        .discover(config.season_year)
        .await;
    if roster.is_empty() {
        warn!(year = config.season_year, "Empty roster for season");
    }

    let mut sink = CsvAppender::for_season(&config.output_dir, config.season_year);
    info!(output = %sink.path().display(), "Writing season output");

    let stats = BatchOrchestrator::new(
        &browser,
        &mut sink,
        config.season_year,
        config.concurrency,
        config.deep_dive_cutoff,
    )
    .run(&roster, config.resume_offset)
    .await?;

    info!(year = config.season_year, "{stats}");

    // Zero records across the whole run must fail the invoking process,
    // distinctly from a successful run that wrote rows.
    if stats.processed == 0 {
        return Err(GridScoutError::EmptyRun.into());
    }

    Ok(())
}

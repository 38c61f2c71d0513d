use std::path::PathBuf;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gridscout_scraper::validate::validate_output_dir;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("gridscout_scraper=info".parse()?),
        )
        .init();

    let dir = std::env::var("OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("output"));

    let report = validate_output_dir(&dir)?;

    for file in &report.files {
        info!(path = %file.path.display(), rows = file.rows, "Valid output file");
    }
    for failure in &report.failures {
        error!("{failure}");
    }

    if !report.passed() {
        std::process::exit(1);
    }
    info!(files = report.files.len(), "Validation passed");
    Ok(())
}

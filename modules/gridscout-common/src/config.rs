use std::env;
use std::path::PathBuf;

use tracing::info;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Recruiting class year the listing page is scoped to.
    pub season_year: i32,

    /// Players scraped concurrently within one group.
    pub concurrency: usize,

    /// Roster prefix to skip when resuming an interrupted run.
    pub resume_offset: usize,

    /// Diagnostic mode: caps listing expansion rounds and roster size
    /// for fast validation runs.
    pub diagnostic_mode: bool,

    /// Players ranked at or below this ordinal get the paginated
    /// full-timeline deep dive; everyone else takes the fast path.
    pub deep_dive_cutoff: usize,

    // Browserless
    pub browserless_url: String,
    pub browserless_token: Option<String>,

    /// Directory the CSV output lands in.
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing or malformed.
    pub fn from_env() -> Self {
        Self {
            season_year: parsed_env("SCRAPE_YEAR", 2024),
            concurrency: parsed_env("MAX_CONCURRENT", 4),
            resume_offset: parsed_env("START_FROM", 0),
            diagnostic_mode: env::var("TEST_MODE")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            deep_dive_cutoff: parsed_env("DEEP_TIMELINE_LIMIT", 1000),
            browserless_url: required_env("BROWSERLESS_URL"),
            browserless_token: env::var("BROWSERLESS_TOKEN").ok(),
            output_dir: env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output")),
        }
    }

    /// Log the effective configuration without the Browserless token.
    pub fn log_redacted(&self) {
        info!(
            season_year = self.season_year,
            concurrency = self.concurrency,
            resume_offset = self.resume_offset,
            diagnostic_mode = self.diagnostic_mode,
            deep_dive_cutoff = self.deep_dive_cutoff,
            browserless_url = self.browserless_url.as_str(),
            output_dir = %self.output_dir.display(),
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a number, got {raw:?}")),
        Err(_) => default,
    }
}

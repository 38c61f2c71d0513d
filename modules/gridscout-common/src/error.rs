use thiserror::Error;

/// Failure taxonomy for the scrape run. Discovery, extraction, and
/// cross-reference failures are swallowed and logged at their component
/// boundaries; only persistence and whole-run failures propagate here.
#[derive(Error, Debug)]
pub enum GridScoutError {
    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Run produced zero records")]
    EmptyRun,

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

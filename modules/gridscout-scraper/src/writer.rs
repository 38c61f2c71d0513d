//! Append-only CSV persistence. The header row is written exactly once,
//! when the file is created; every later flush appends rows, so an
//! interrupted run never loses or duplicates what was already written.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::record::{PlayerRecord, HEADERS};

/// Where a batch of finished records goes. Trait seam so orchestration
/// tests can count flushes without touching the filesystem.
pub trait RecordSink: Send {
    fn append(&mut self, records: &[PlayerRecord]) -> Result<()>;
}

pub struct CsvAppender {
    path: PathBuf,
}

impl CsvAppender {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional output path for a season run:
    /// `<dir>/juco_recruiting_class_<year>_<YYYYMMDD>.csv`.
    pub fn for_season(output_dir: &Path, year: i32) -> Self {
        let stamp = Local::now().format("%Y%m%d");
        Self::new(output_dir.join(format!("juco_recruiting_class_{year}_{stamp}.csv")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn needs_header(&self) -> bool {
        fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true)
    }
}

impl RecordSink for CsvAppender {
    fn append(&mut self, records: &[PlayerRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output dir {}", parent.display()))?;
        }

        let needs_header = self.needs_header();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if needs_header {
            writer.write_record(HEADERS)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush().context("Failed to flush CSV output")?;
        Ok(())
    }
}

//! Structural validation of the CSV output: the header set must match
//! the expected columns exactly. Any drift is a hard failure, not a
//! warning.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::record::HEADERS;

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub rows: usize,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub files: Vec<FileReport>,
    pub failures: Vec<String>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        !self.files.is_empty() && self.failures.is_empty()
    }
}

/// Validate every CSV in `dir`. No files at all is a failure.
pub fn validate_output_dir(dir: &Path) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read output dir {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        report
            .failures
            .push(format!("No CSV files found in {}", dir.display()));
        return Ok(report);
    }

    for path in paths {
        match validate_file(&path) {
            Ok(rows) => report.files.push(FileReport { path, rows }),
            Err(e) => report.failures.push(format!("{}: {e:#}", path.display())),
        }
    }

    Ok(report)
}

/// Check one file's header row and count its data rows.
pub fn validate_file(path: &Path) -> Result<usize> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers != HEADERS {
        let expected: HashSet<&str> = HEADERS.into_iter().collect();
        let actual: HashSet<&str> = headers.iter().map(String::as_str).collect();
        let mut missing: Vec<&str> = expected.difference(&actual).copied().collect();
        let mut extra: Vec<&str> = actual.difference(&expected).copied().collect();
        missing.sort_unstable();
        extra.sort_unstable();
        anyhow::bail!("Header mismatch (missing: {missing:?}, extra: {extra:?})");
    }

    let mut rows = 0;
    for result in reader.records() {
        result.context("Unreadable data row")?;
        rows += 1;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PlayerRecord;
    use crate::writer::{CsvAppender, RecordSink};

    fn write_records(path: &Path, n: usize) {
        let records: Vec<PlayerRecord> = (0..n)
            .map(|i| {
                PlayerRecord::new(&format!("https://247sports.com/player/jo-smith-{i}/"), 2024)
            })
            .collect();
        CsvAppender::new(path).append(&records).unwrap();
    }

    #[test]
    fn well_formed_output_passes_with_row_counts() {
        let dir = tempfile::tempdir().unwrap();
        write_records(&dir.path().join("season.csv"), 4);

        let report = validate_output_dir(dir.path()).unwrap();
        assert!(report.passed());
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].rows, 4);
    }

    #[test]
    fn header_drift_is_a_hard_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "247 ID,Player Name,Bogus Column\n1,Jo,x\n").unwrap();

        let report = validate_output_dir(dir.path()).unwrap();
        assert!(!report.passed());
        assert!(report.failures[0].contains("Bogus Column"));
    }

    #[test]
    fn empty_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let report = validate_output_dir(dir.path()).unwrap();
        assert!(!report.passed());
    }
}

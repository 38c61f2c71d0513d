//! Batch orchestration: the roster is processed in sequential groups of
//! `concurrency` players, players within a group run concurrently, and
//! finished records are flushed to the sink in append-only batches so a
//! crash never loses completed work.

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::info;

use crate::browser::PageBrowser;
use crate::profile::ProfileExtractor;
use crate::record::PlayerRecord;
use crate::writer::RecordSink;

/// Rows buffered before a flush to persistent storage.
const FLUSH_THRESHOLD: usize = 100;

#[derive(Debug, Default)]
pub struct RunStats {
    pub processed: usize,
    pub flushed: usize,
    pub groups: usize,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Run: processed={}, flushed={}, groups={}",
            self.processed, self.flushed, self.groups
        )
    }
}

pub struct BatchOrchestrator<'a> {
    browser: &'a dyn PageBrowser,
    sink: &'a mut dyn RecordSink,
    recruiting_year: i32,
    concurrency: usize,
    deep_dive_cutoff: usize,
    flush_threshold: usize,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(
        browser: &'a dyn PageBrowser,
        sink: &'a mut dyn RecordSink,
        recruiting_year: i32,
        concurrency: usize,
        deep_dive_cutoff: usize,
    ) -> Self {
        Self {
            browser,
            sink,
            recruiting_year,
            concurrency,
            deep_dive_cutoff,
            flush_threshold: FLUSH_THRESHOLD,
        }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn with_flush_threshold(mut self, flush_threshold: usize) -> Self {
        self.flush_threshold = flush_threshold;
        self
    }

    /// Process every roster URL from `resume_offset` onward. Per-player
    /// failures degrade to sentinel-filled records inside the extractor;
    /// only persistence failures propagate, and they are fatal.
    pub async fn run(&mut self, roster: &[String], resume_offset: usize) -> Result<RunStats> {
        let offset = resume_offset.min(roster.len());
        if offset > 0 {
            info!(resume_offset = offset, "Resuming mid-roster");
        }
        let remaining = &roster[offset..];
        let total = remaining.len();

        let extractor =
            ProfileExtractor::new(self.browser, self.recruiting_year, self.deep_dive_cutoff);

        let mut stats = RunStats::default();
        let mut buffer: Vec<PlayerRecord> = Vec::new();
        let group_size = self.concurrency.max(1);

        for (group_index, group) in remaining.chunks(group_size).enumerate() {
            let extractions = group.iter().enumerate().map(|(i, url)| {
                // 1-based position in the full roster decides deep-dive
                // eligibility.
                let ordinal = offset + group_index * group_size + i + 1;
                extractor.extract(url, ordinal)
            });
            let records = join_all(extractions).await;

            stats.processed += records.len();
            stats.groups += 1;
            buffer.extend(records);

            if buffer.len() >= self.flush_threshold {
                self.flush(&mut buffer, &mut stats)?;
            }

            info!(
                group = group_index + 1,
                progress = stats.processed,
                total,
                "Group complete"
            );
        }

        self.flush(&mut buffer, &mut stats)?;
        info!("{stats}");
        Ok(stats)
    }

    fn flush(&mut self, buffer: &mut Vec<PlayerRecord>, stats: &mut RunStats) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        self.sink
            .append(buffer)
            .context("Failed to persist record batch")?;
        stats.flushed += buffer.len();
        info!(rows = buffer.len(), "Flushed batch");
        buffer.clear();
        Ok(())
    }
}

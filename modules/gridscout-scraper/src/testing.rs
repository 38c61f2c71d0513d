//! Test doubles for the two pipeline seams: the browsing capability and
//! the record sink. HashMap-backed, builder-style registration, error on
//! anything unregistered — no browser, no network, no filesystem.

use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::browser::PageBrowser;
use crate::record::PlayerRecord;
use crate::writer::RecordSink;

/// HashMap-based `PageBrowser`. Returns `Err` for unregistered URLs so
/// tests fail loudly on unexpected navigation.
#[derive(Default)]
pub struct MockBrowser {
    pages: HashMap<String, String>,
    expansions: HashMap<String, String>,
    paginations: HashMap<String, Vec<String>>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn on_expansion(mut self, url: &str, html: &str) -> Self {
        self.expansions.insert(url.to_string(), html.to_string());
        self
    }

    pub fn on_pagination(mut self, url: &str, pages: Vec<String>) -> Self {
        self.paginations.insert(url.to_string(), pages);
        self
    }
}

#[async_trait]
impl PageBrowser for MockBrowser {
    async fn content(&self, url: &str, _wait_for: Option<&str>) -> Result<String> {
        match self.pages.get(url) {
            Some(html) => Ok(html.clone()),
            None => bail!("MockBrowser: no page registered for {url}"),
        }
    }

    async fn expand_and_content(
        &self,
        url: &str,
        _item_selector: &str,
        _more_selector: &str,
        _max_rounds: u32,
        _settle_ms: u64,
    ) -> Result<String> {
        match self.expansions.get(url) {
            Some(html) => Ok(html.clone()),
            None => bail!("MockBrowser: no expansion registered for {url}"),
        }
    }

    async fn paged_content(
        &self,
        url: &str,
        _next_selector: &str,
        _max_pages: u32,
        _settle_ms: u64,
    ) -> Result<Vec<String>> {
        match self.paginations.get(url) {
            Some(pages) => Ok(pages.clone()),
            None => bail!("MockBrowser: no pagination registered for {url}"),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// In-memory `RecordSink` that remembers every flush.
#[derive(Default)]
pub struct CountingSink {
    pub rows: Vec<PlayerRecord>,
    pub flush_sizes: Vec<usize>,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flushes(&self) -> usize {
        self.flush_sizes.len()
    }
}

impl RecordSink for CountingSink {
    fn append(&mut self, records: &[PlayerRecord]) -> Result<()> {
        self.flush_sizes.push(records.len());
        self.rows.extend_from_slice(records);
        Ok(())
    }
}

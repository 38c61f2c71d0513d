//! Browsing capability boundary. The pipeline only ever asks for
//! rendered HTML: a single page, a listing expanded to exhaustion, or a
//! sequence of pagination snapshots. Everything interactive (clicking,
//! waiting, settling) happens on the other side of this trait, which is
//! what makes the parsing layer testable without a browser.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::info;

use browserless_client::{BrowserlessClient, ContentOptions};

/// Fixed settle delay after load, for late client-side rendering.
const PAGE_SETTLE_MS: u64 = 2_000;

/// How long to wait for a wait-for selector before capturing anyway.
const WAIT_TIMEOUT_MS: u64 = 10_000;

#[async_trait]
pub trait PageBrowser: Send + Sync {
    /// Rendered HTML for a URL, optionally waiting for a selector first.
    async fn content(&self, url: &str, wait_for: Option<&str>) -> Result<String>;

    /// Load `url`, click `more_selector` until the `item_selector` count
    /// stops growing (or the affordance disappears, or `max_rounds` is
    /// hit), then return the final HTML.
    async fn expand_and_content(
        &self,
        url: &str,
        item_selector: &str,
        more_selector: &str,
        max_rounds: u32,
        settle_ms: u64,
    ) -> Result<String>;

    /// Load `url` and advance through pagination via `next_selector`,
    /// returning one HTML snapshot per page, at most `max_pages`.
    async fn paged_content(
        &self,
        url: &str,
        next_selector: &str,
        max_pages: u32,
        settle_ms: u64,
    ) -> Result<Vec<String>>;

    fn name(&self) -> &str;
}

// --- Browserless implementation ---

/// Page script for load-more expansion. Stops when the affordance is
/// gone/hidden or a click stops changing the item count.
const EXPAND_SCRIPT: &str = r#"
export default async function ({ page, context }) {
  const { url, itemSelector, moreSelector, maxRounds, settleMs } = context;
  await page.goto(url, { waitUntil: 'domcontentloaded', timeout: 60000 });
  try {
    await page.waitForSelector(itemSelector, { timeout: 10000 });
  } catch (e) {}
  for (let round = 0; round < maxRounds; round++) {
    const before = await page.$$eval(itemSelector, (els) => els.length);
    const more = await page.$(moreSelector);
    if (!more) break;
    if (await more.boundingBox() === null) break;
    await more.click();
    await new Promise((resolve) => setTimeout(resolve, settleMs));
    const after = await page.$$eval(itemSelector, (els) => els.length);
    if (after <= before) break;
  }
  return { data: await page.content(), type: 'text/html' };
}
"#;

/// Page script for next-button pagination. Captures each page before
/// advancing.
const PAGINATE_SCRIPT: &str = r#"
export default async function ({ page, context }) {
  const { url, nextSelector, maxPages, settleMs } = context;
  await page.goto(url, { waitUntil: 'domcontentloaded', timeout: 60000 });
  const pages = [];
  while (pages.length < maxPages) {
    pages.push(await page.content());
    const next = await page.$(nextSelector);
    if (!next) break;
    if (await next.boundingBox() === null) break;
    await next.click();
    await new Promise((resolve) => setTimeout(resolve, settleMs));
  }
  return { data: JSON.stringify(pages), type: 'application/json' };
}
"#;

/// `PageBrowser` over a Browserless instance. Every request runs in a
/// fresh browser session, so per-player page state is isolated by
/// construction; the semaphore bounds in-flight sessions.
pub struct BrowserlessBrowser {
    client: BrowserlessClient,
    semaphore: Semaphore,
}

impl BrowserlessBrowser {
    pub fn new(base_url: &str, token: Option<&str>, max_sessions: usize) -> Self {
        info!(base_url, max_sessions, "Using BrowserlessBrowser");
        Self {
            client: BrowserlessClient::new(base_url, token),
            semaphore: Semaphore::new(max_sessions),
        }
    }

    async fn acquire(&self) -> Result<tokio::sync::SemaphorePermit<'_>> {
        self.semaphore
            .acquire()
            .await
            .map_err(|_| anyhow::anyhow!("Browser semaphore closed"))
    }
}

#[async_trait]
impl PageBrowser for BrowserlessBrowser {
    async fn content(&self, url: &str, wait_for: Option<&str>) -> Result<String> {
        let _permit = self.acquire().await?;
        info!(url, browser = "browserless", "Fetching page");

        let options = ContentOptions {
            wait_for_selector: wait_for.map(String::from),
            wait_timeout_ms: Some(WAIT_TIMEOUT_MS),
            settle_ms: Some(PAGE_SETTLE_MS),
        };
        let html = self
            .client
            .content_with(url, &options)
            .await
            .context("Browserless content request failed")?;

        info!(url, bytes = html.len(), "Page fetched");
        Ok(html)
    }

    async fn expand_and_content(
        &self,
        url: &str,
        item_selector: &str,
        more_selector: &str,
        max_rounds: u32,
        settle_ms: u64,
    ) -> Result<String> {
        let _permit = self.acquire().await?;
        info!(url, max_rounds, browser = "browserless", "Expanding listing");

        let context = serde_json::json!({
            "url": url,
            "itemSelector": item_selector,
            "moreSelector": more_selector,
            "maxRounds": max_rounds,
            "settleMs": settle_ms,
        });
        let html = self
            .client
            .function(EXPAND_SCRIPT, context)
            .await
            .context("Browserless expand script failed")?;

        info!(url, bytes = html.len(), "Listing expanded");
        Ok(html)
    }

    async fn paged_content(
        &self,
        url: &str,
        next_selector: &str,
        max_pages: u32,
        settle_ms: u64,
    ) -> Result<Vec<String>> {
        let _permit = self.acquire().await?;
        info!(url, max_pages, browser = "browserless", "Paginating");

        let context = serde_json::json!({
            "url": url,
            "nextSelector": next_selector,
            "maxPages": max_pages,
            "settleMs": settle_ms,
        });
        let payload = self
            .client
            .function_json(PAGINATE_SCRIPT, context)
            .await
            .context("Browserless pagination script failed")?;

        let pages: Vec<String> =
            serde_json::from_value(payload).context("Pagination payload was not a string array")?;

        info!(url, pages = pages.len(), "Pagination complete");
        Ok(pages)
    }

    fn name(&self) -> &str {
        "browserless"
    }
}

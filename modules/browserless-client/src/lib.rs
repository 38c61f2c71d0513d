pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use tracing::debug;

/// Options for a /content request. `wait_for_selector` blocks the capture
/// until the selector appears (or `wait_timeout_ms` elapses); `settle_ms`
/// adds a fixed delay before capture for late client-side rendering.
#[derive(Debug, Clone, Default)]
pub struct ContentOptions {
    pub wait_for_selector: Option<String>,
    pub wait_timeout_ms: Option<u64>,
    pub settle_ms: Option<u64>,
}

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        let mut endpoint = format!("{}/{path}", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }

    async fn post(&self, endpoint: &str, body: serde_json::Value) -> Result<String> {
        let resp = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }

    /// Fetch fully-rendered HTML content for a URL via the /content endpoint.
    pub async fn content(&self, url: &str) -> Result<String> {
        self.content_with(url, &ContentOptions::default()).await
    }

    /// Fetch fully-rendered HTML content with wait/settle options.
    pub async fn content_with(&self, url: &str, options: &ContentOptions) -> Result<String> {
        debug!(url, "Browserless /content request");
        let mut body = serde_json::json!({
            "url": url,
            "gotoOptions": { "waitUntil": "domcontentloaded", "timeout": 60000 },
        });

        if let Some(ref selector) = options.wait_for_selector {
            body["waitForSelector"] = serde_json::json!({
                "selector": selector,
                "timeout": options.wait_timeout_ms.unwrap_or(10_000),
            });
        }
        if let Some(ms) = options.settle_ms {
            body["waitForTimeout"] = serde_json::json!(ms);
        }

        self.post(&self.endpoint("content"), body).await
    }

    /// Run a page script via the /function endpoint. `code` must be an ES
    /// module exporting `default async ({ page, context }) => ...`; `context`
    /// is passed through to the script. Returns the response body as text.
    pub async fn function(&self, code: &str, context: serde_json::Value) -> Result<String> {
        debug!(bytes = code.len(), "Browserless /function request");
        let body = serde_json::json!({
            "code": code,
            "context": context,
        });

        self.post(&self.endpoint("function"), body).await
    }

    /// Run a page script that returns `type: 'application/json'` and decode
    /// the response body.
    pub async fn function_json(
        &self,
        code: &str,
        context: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let body = self.function(code, context).await?;
        serde_json::from_str(&body).map_err(|e| BrowserlessError::ScriptPayload(e.to_string()))
    }
}

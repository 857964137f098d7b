use super::browser::{ChromeSession, LiveSession};
use crate::error::{Result, StatsError};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

pub trait PageFetcher {
    /// Returns the page markup for `url`.
    async fn fetch_rendered(&self, url: &str) -> Result<String>;
}

/// Plain GET; script-built tables will be missing from the result.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch_rendered(&self, url: &str) -> Result<String> {
        info!("Fetching {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Loads `url`, waits up to the table timeout and then the settle time, and
/// returns the rendered markup. Runs on a blocking thread.
pub type Renderer = fn(&str, Duration, Duration) -> Result<String>;

/// Renders the page in headless Chrome and falls back to plain HTTP when the
/// browser cannot deliver.
#[derive(Clone)]
pub struct ChromeFetcher {
    fallback: HttpFetcher,
    table_timeout: Duration,
    settle: Duration,
    render: Renderer,
}

impl ChromeFetcher {
    pub fn new(fallback: HttpFetcher, table_timeout: Duration, settle: Duration) -> Self {
        Self::with_renderer(fallback, table_timeout, settle, render_in_chrome)
    }

    pub fn with_renderer(
        fallback: HttpFetcher,
        table_timeout: Duration,
        settle: Duration,
        render: Renderer,
    ) -> Self {
        Self {
            fallback,
            table_timeout,
            settle,
            render,
        }
    }
}

fn render_in_chrome(url: &str, table_timeout: Duration, settle: Duration) -> Result<String> {
    let mut session = ChromeSession::launch()?;
    session.open(url)?;

    if session.wait_for_table(table_timeout) {
        info!("Table found, waiting for data to load...");
        session.pause(settle);
    } else {
        warn!("No table found or timeout waiting for table");
    }

    session.snapshot()
}

impl PageFetcher for ChromeFetcher {
    async fn fetch_rendered(&self, url: &str) -> Result<String> {
        let target = url.to_string();
        let (table_timeout, settle, render) = (self.table_timeout, self.settle, self.render);

        let rendered = tokio::task::spawn_blocking(move || render(&target, table_timeout, settle))
            .await
            .map_err(|e| StatsError::Other(e.to_string()))
            .and_then(|inner| inner);

        match rendered {
            Ok(markup) => Ok(markup),
            Err(e) => {
                warn!("Error getting rendered page: {}; using plain HTTP", e);
                self.fallback.fetch_rendered(url).await
            }
        }
    }
}

/// Appends the `category` query selector used by the non-browser paths.
pub fn with_category_query(url: &str, category: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}category={category}")
}

/// The URL without any query string.
pub fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

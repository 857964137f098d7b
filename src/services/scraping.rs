use super::classifier::classify;
use super::extractor::extract_records;
use super::orchestrator::CategoryScraper;
use super::pagination::PaginationDriver;
use crate::config::PaginationSettings;
use crate::domain::{Category, FieldRecord};
use crate::error::{Result, StatsError};
use crate::infrastructure::{strip_query, with_category_query, ChromeSession, Page, PageFetcher};
use tracing::{info, warn};

/// Classifies the tables in `markup` and extracts the `category` records.
pub fn records_from_markup(markup: &str, category: Category) -> Vec<FieldRecord> {
    let page = Page::parse(markup);
    let tables = match page.tables() {
        Ok(tables) => tables,
        Err(e) => {
            warn!("Could not read tables: {}", e);
            return Vec::new();
        }
    };

    match classify(&tables, category) {
        Some(table) => extract_records(table),
        None => {
            warn!("No tables found for {}", category);
            Vec::new()
        }
    }
}

/// Opens a fresh headless browser per category and walks every result page.
pub struct BrowserCategoryScraper {
    url: String,
    settings: PaginationSettings,
}

impl BrowserCategoryScraper {
    pub fn new(url: &str, settings: PaginationSettings) -> Self {
        info!("Created new browser scraper for {}", url);
        Self {
            url: strip_query(url).to_string(),
            settings,
        }
    }
}

impl CategoryScraper for BrowserCategoryScraper {
    async fn scrape_category(&self, category: Category) -> Result<Vec<FieldRecord>> {
        let url = self.url.clone();
        let settings = self.settings.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<FieldRecord>> {
            // The session is dropped on every path out of this closure,
            // which shuts the browser process down.
            let mut session = ChromeSession::launch()?;
            session.open(&url)?;

            // Walk the result pages until a stop rule fires
            let outcome = PaginationDriver::new(&mut session, category, settings).run();
            info!(
                "{}: {} records from {} pages, stopped: {:?}",
                category,
                outcome.records.len(),
                outcome.pages_visited,
                outcome.stop_reason
            );
            Ok(outcome.records)
        })
        .await
        .map_err(|e| StatsError::Other(e.to_string()))?
    }
}

/// Fetches one page per category and extracts whatever table it shows.
pub struct SinglePageScraper<F> {
    fetcher: F,
    url: String,
    append_category: bool,
}

impl<F: PageFetcher> SinglePageScraper<F> {
    /// Plain HTTP: the category is selected with a query parameter.
    pub fn with_query(fetcher: F, url: &str) -> Self {
        Self {
            fetcher,
            url: url.to_string(),
            append_category: true,
        }
    }

    /// Browser rendering: the page is loaded without any query.
    pub fn rendered(fetcher: F, url: &str) -> Self {
        Self {
            fetcher,
            url: strip_query(url).to_string(),
            append_category: false,
        }
    }

    fn url_for(&self, category: Category) -> String {
        if self.append_category {
            with_category_query(&self.url, category.as_str())
        } else {
            self.url.clone()
        }
    }
}

impl<F: PageFetcher> CategoryScraper for SinglePageScraper<F> {
    async fn scrape_category(&self, category: Category) -> Result<Vec<FieldRecord>> {
        let url = self.url_for(category);

        // Fetch and pick the stats table out of the markup
        let markup = self.fetcher.fetch_rendered(&url).await?;
        Ok(records_from_markup(&markup, category))
    }
}

use crate::domain::{Category, FieldRecord, StatsReport};
use crate::error::{Result, StatsError};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Produces the records of one statistics category.
pub trait CategoryScraper {
    async fn scrape_category(&self, category: Category) -> Result<Vec<FieldRecord>>;
}

/// True when `candidate` looks like the same table as `reference`: equal,
/// non-zero length and the same first player.
///
/// This is a heuristic. Two small, unrelated tables that happen to start with
/// the same player are treated as one.
pub fn same_dataset(reference: &[FieldRecord], candidate: &[FieldRecord]) -> bool {
    match (reference.first(), candidate.first()) {
        (Some(a), Some(b)) => reference.len() == candidate.len() && a.identity() == b.identity(),
        _ => false,
    }
}

pub struct CategoryOrchestrator<S> {
    scraper: S,
    delay: Duration,
}

impl<S: CategoryScraper> CategoryOrchestrator<S> {
    pub fn new(scraper: S, delay: Duration) -> Self {
        Self { scraper, delay }
    }

    /// Scrapes every category in order. A later category whose table matches the
    /// first one shares the first category's record list.
    pub async fn scrape_all(&self, categories: &[Category]) -> Result<StatsReport> {
        let pb = ProgressBar::new(categories.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .map_err(|e| StatsError::Other(e.to_string()))?,
        );

        let mut report = StatsReport::default();
        let mut first: Option<Arc<Vec<FieldRecord>>> = None;

        for (i, &category) in categories.iter().enumerate() {
            if i > 0 {
                sleep(self.delay).await;
            }
            pb.set_message(format!("Scraping {}", category));
            info!("Scraping {} statistics", category);

            let records = match self.scraper.scrape_category(category).await {
                Ok(records) => records,
                Err(e) if i == 0 && e.is_unreachable() => {
                    pb.abandon_with_message(format!("Failed on {}", category));
                    return Err(e);
                }
                Err(e) => {
                    warn!("Error scraping {}: {}", category, e);
                    Vec::new()
                }
            };

            let records = match &first {
                Some(reference) if same_dataset(reference, &records) => {
                    info!(
                        "{} data is identical to the first category, reusing it",
                        category.title()
                    );
                    Arc::clone(reference)
                }
                _ => Arc::new(records),
            };

            info!("Found {} {} records", records.len(), category);
            if first.is_none() {
                first = Some(Arc::clone(&records));
            }
            report.categories.insert(category, records);
            pb.inc(1);
        }

        pb.finish_with_message("Done scraping categories!");
        Ok(report)
    }
}

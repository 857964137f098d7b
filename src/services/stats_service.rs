use crate::config::{Config, FetchMode, Target};
use crate::domain::storage::Storage;
use crate::domain::{Category, Game, StatsReport, TournamentInfo};
use crate::error::Result;
use crate::infrastructure::{with_category_query, ChromeFetcher, HttpFetcher, PageFetcher};
use crate::services::{
    games::{log_games_summary, GameFilter, GameScraper},
    inspect::DebugReport,
    orchestrator::CategoryOrchestrator,
    publish::{PublishService, WebhookPayload},
    scraping::{BrowserCategoryScraper, SinglePageScraper},
};
use tracing::{error, info, warn};

pub struct StatsService<S: Storage> {
    config: Config,
    store: S,
}

impl<S: Storage> StatsService<S> {
    pub fn new(config: Config, store: S) -> Self {
        Self { config, store }
    }

    pub async fn process(&self) -> Result<()> {
        if self.config.args.debug {
            return self.debug_page_structure().await;
        }
        if self.config.args.target == Target::Games {
            let fetcher = HttpFetcher::new(self.config.context.http_client.clone());
            self.process_games(fetcher).await?;
            return Ok(());
        }

        info!("Starting statistics scraping for {}", self.config.args.url);
        let categories = self.config.args.requested_categories();

        // Scrape every requested category
        let report = self.scrape(&categories).await?;

        // Persist JSON and per-category CSV
        self.save_outputs(&report)?;
        self.log_summary(&categories, &report);

        // Hand the leaders to the webhook, if one is configured
        if let Some(webhook_url) = &self.config.args.webhook_url {
            self.publish(webhook_url, &report).await;
        }

        info!("Statistics scraping completed");
        Ok(())
    }

    async fn scrape(&self, categories: &[Category]) -> Result<StatsReport> {
        let context = &self.config.context;
        let url = &self.config.args.url;
        let http = HttpFetcher::new(context.http_client.clone());

        match self.config.args.mode {
            FetchMode::Paginate => {
                let scraper = BrowserCategoryScraper::new(url, context.pagination.clone());
                CategoryOrchestrator::new(scraper, context.delay)
                    .scrape_all(categories)
                    .await
            }
            FetchMode::Render => {
                let fetcher = ChromeFetcher::new(
                    http,
                    context.pagination.table_timeout,
                    context.pagination.settle,
                );
                CategoryOrchestrator::new(SinglePageScraper::rendered(fetcher, url), context.delay)
                    .scrape_all(categories)
                    .await
            }
            FetchMode::Http => {
                CategoryOrchestrator::new(SinglePageScraper::with_query(http, url), context.delay)
                    .scrape_all(categories)
                    .await
            }
        }
    }

    fn game_filter(&self) -> GameFilter {
        GameFilter {
            status: self.config.args.status.clone(),
            team: self.config.args.team.clone(),
            date: self.config.args.date.clone(),
        }
    }

    async fn process_games<F: PageFetcher>(&self, fetcher: F) -> Result<Vec<Game>> {
        let scraper = GameScraper::new(fetcher, &self.config.args.url);
        let games = scraper.scrape().await?;
        log_games_summary(&games);

        let filter = self.game_filter();
        let games = if filter.is_empty() {
            games
        } else {
            let kept = filter.apply(games);
            info!("{} games match the filter", kept.len());
            kept
        };

        let path = self.store.save_games(&games)?;
        info!("Games saved to {:?}", path);
        Ok(games)
    }

    async fn debug_page_structure(&self) -> Result<()> {
        let category = self.config.args.debug_category;
        let url = with_category_query(&self.config.args.url, category.as_str());
        info!("Debugging page structure for {}", url);

        let markup = HttpFetcher::new(self.config.context.http_client.clone())
            .fetch_rendered(&url)
            .await?;
        let report = DebugReport::analyze(&url, &markup)?;
        report.log_summary();

        let path = self.store.save_debug_report(category, &report)?;
        info!("Debug information saved to {:?}", path);
        Ok(())
    }

    fn save_outputs(&self, report: &StatsReport) -> Result<()> {
        self.store.save_report(report)?;
        for (&category, records) in &report.categories {
            if !records.is_empty() {
                self.store.save_category_csv(category, records)?;
            }
        }
        Ok(())
    }

    fn log_summary(&self, categories: &[Category], report: &StatsReport) {
        info!("Total records collected: {}", report.total_records());
        for &category in categories {
            let players = report.get(category).map_or(0, |records| records.len());
            info!("{}: {} players", category.title(), players);
        }
        if report.is_empty() {
            warn!("No statistics were extracted");
        }
    }

    /// The tournament as presented downstream; a name given on the command line wins.
    fn tournament(&self) -> TournamentInfo {
        let mut tournament = self.config.tournament.clone();
        if let Some(name) = self.config.tournament_name() {
            tournament.name = name.to_string();
        }
        tournament
    }

    async fn publish(&self, webhook_url: &str, report: &StatsReport) {
        let payload = WebhookPayload::from_report(&self.tournament(), report);
        if payload.posts.is_empty() {
            warn!("Nothing to publish");
            return;
        }

        let publisher = PublishService::new(
            self.config.context.http_client.clone(),
            webhook_url.to_string(),
        );
        if let Err(e) = publisher.send(&payload).await {
            error!("Webhook delivery failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::Args;
    use crate::domain::FieldRecord;
    use crate::infrastructure::FileSystemStore;
    use clap::Parser;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn service(dir: &std::path::Path, extra: &[&str]) -> StatsService<FileSystemStore> {
        let mut argv = vec![
            "wbsc_stats",
            "--url",
            "https://www.wbsc.org/en/events/2025-u18-womens-softball-european-championship/stats",
        ];
        argv.extend_from_slice(extra);
        let config = Config::from_args(Args::parse_from(argv)).unwrap();
        StatsService::new(config, FileSystemStore::with_stamp(dir, "101500"))
    }

    #[test]
    fn test_save_outputs_skips_empty_categories() {
        let dir = tempdir().unwrap();
        let service = service(dir.path(), &[]);

        let batting: FieldRecord = [("Player", "DOE Jane"), ("Team", "ESP")].into_iter().collect();
        let mut report = StatsReport::default();
        report.categories.insert(Category::Batting, Arc::new(vec![batting]));
        report.categories.insert(Category::Pitching, Arc::new(Vec::new()));

        service.save_outputs(&report).unwrap();

        assert!(dir.path().join("stats_101500.json").exists());
        assert!(dir.path().join("stats_batting_101500.csv").exists());
        assert!(!dir.path().join("stats_pitching_101500.csv").exists());
    }

    struct SchedulePage;

    impl PageFetcher for SchedulePage {
        async fn fetch_rendered(&self, url: &str) -> Result<String> {
            assert!(url.ends_with("/schedule-and-results"));
            let data = serde_json::json!({
                "props": {
                    "tournament": {"name": "U-18 Euro"},
                    "games": [
                        {"id": 1, "homelabel": "Spain", "awaylabel": "Italy", "gamestatustext": "Final"},
                        {"id": 2, "homelabel": "Czechia", "awaylabel": "Spain", "gamestatustext": "Live"},
                        {"id": 3, "homelabel": "Czechia", "awaylabel": "Hungary", "gamestatustext": "Final"}
                    ]
                }
            });
            let escaped = data.to_string().replace('"', "&quot;");
            Ok(format!(r#"<html><body><div data-page="{escaped}"></div></body></html>"#))
        }
    }

    #[tokio::test]
    async fn test_games_are_filtered_before_saving() {
        let dir = tempdir().unwrap();
        let service = service(dir.path(), &["--target", "games", "--team", "spain", "--status", "final"]);

        let games = service.process_games(SchedulePage).await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].game_id, "1");

        let saved: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("games_101500.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(saved.as_array().unwrap().len(), 1);
        assert_eq!(saved[0]["tournament"], "U-18 Euro");
        assert!(dir.path().join("games_101500.csv").exists());
    }

    #[test]
    fn test_cli_tournament_name_overrides_url() {
        let dir = tempdir().unwrap();
        let from_url = service(dir.path(), &[]);
        assert_eq!(
            from_url.tournament().name,
            "2025-u18-womens-softball-european-championship"
        );

        let named = service(dir.path(), &["--tournament-name", "Prague 2025"]);
        assert_eq!(named.tournament().name, "Prague 2025");
    }
}

use crate::domain::{Category, FieldRecord, StatsReport, TournamentInfo};
use crate::error::{Result, StatsError};
use chrono::Local;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::info;

pub const STATS_LEADERS_POST: &str = "stats_leaders";
const LEADERS_PER_POST: usize = 5;

#[derive(Debug, Serialize)]
pub struct LeadersTemplate {
    pub category: Category,
    pub total_players: usize,
    pub leaders: Vec<FieldRecord>,
}

#[derive(Debug, Serialize)]
pub struct WebhookPost {
    #[serde(rename = "type")]
    pub post_type: &'static str,
    pub template_data: LeadersTemplate,
}

#[derive(Debug, Serialize)]
pub struct PayloadMetadata {
    pub generated_at: String,
    pub scraper_version: &'static str,
    pub total_posts: usize,
    pub post_types: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    pub tournament: TournamentInfo,
    pub posts: Vec<WebhookPost>,
    pub metadata: PayloadMetadata,
}

impl WebhookPayload {
    /// One leaders post per category that produced records.
    pub fn from_report(tournament: &TournamentInfo, report: &StatsReport) -> Self {
        let posts: Vec<WebhookPost> = report
            .categories
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(&category, records)| WebhookPost {
                post_type: STATS_LEADERS_POST,
                template_data: LeadersTemplate {
                    category,
                    total_players: records.len(),
                    leaders: records.iter().take(LEADERS_PER_POST).cloned().collect(),
                },
            })
            .collect();

        let mut post_types: Vec<&'static str> = posts.iter().map(|p| p.post_type).collect();
        post_types.dedup();

        Self {
            tournament: tournament.clone(),
            metadata: PayloadMetadata {
                generated_at: Local::now().to_rfc3339(),
                scraper_version: env!("CARGO_PKG_VERSION"),
                total_posts: posts.len(),
                post_types,
            },
            posts,
        }
    }
}

pub struct PublishService {
    client: Client,
    webhook_url: String,
}

impl PublishService {
    pub fn new(client: Client, webhook_url: String) -> Self {
        info!("Created new Publish service");
        Self {
            client,
            webhook_url,
        }
    }

    pub async fn send(&self, payload: &WebhookPayload) -> Result<()> {
        info!("Sending {} posts to webhook", payload.metadata.total_posts);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(StatsError::Webhook {
                status: status.as_u16(),
                body,
            });
        }

        info!("Webhook accepted the payload");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::canned_http::{client, CannedServer};
    use std::sync::Arc;

    fn record(name: &str) -> FieldRecord {
        [("Player", name), ("Team", "ESP")].into_iter().collect()
    }

    fn report() -> StatsReport {
        let batting: Vec<FieldRecord> = (0..8).map(|i| record(&format!("P{i} Ann"))).collect();
        let mut report = StatsReport::default();
        report.categories.insert(Category::Batting, Arc::new(batting));
        report.categories.insert(Category::Pitching, Arc::new(Vec::new()));
        report
            .categories
            .insert(Category::Fielding, Arc::new(vec![record("DOE Jane")]));
        report
    }

    #[test]
    fn test_payload_has_one_post_per_non_empty_category() {
        let tournament = TournamentInfo::from_url("https://www.wbsc.org/en/events/2025-u18/stats");
        let payload = WebhookPayload::from_report(&tournament, &report());

        assert_eq!(payload.posts.len(), 2);
        assert_eq!(payload.metadata.total_posts, 2);
        assert_eq!(payload.metadata.post_types, vec![STATS_LEADERS_POST]);

        let batting = &payload.posts[0].template_data;
        assert_eq!(batting.category, Category::Batting);
        assert_eq!(batting.total_players, 8);
        assert_eq!(batting.leaders.len(), LEADERS_PER_POST);
    }

    #[test]
    fn test_payload_json_shape() {
        let tournament = TournamentInfo::from_url("https://www.wbsc.org/en/events/2025-u18/stats");
        let payload = WebhookPayload::from_report(&tournament, &report());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["tournament"]["name"], "2025-u18");
        assert_eq!(json["posts"][0]["type"], "stats_leaders");
        assert_eq!(json["posts"][0]["template_data"]["category"], "batting");
        assert_eq!(json["posts"][1]["template_data"]["leaders"][0]["Player"], "DOE Jane");
        assert_eq!(json["metadata"]["scraper_version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_send_posts_json_payload() {
        let server = CannedServer::start(200, "ok").await;
        let tournament = TournamentInfo::from_url("https://www.wbsc.org/en/events/2025-u18/stats");
        let payload = WebhookPayload::from_report(&tournament, &report());

        PublishService::new(client(), server.url.clone())
            .send(&payload)
            .await
            .unwrap();

        let request = server.request().await;
        assert!(request.starts_with("POST / "));
        assert!(request.to_lowercase().contains("content-type: application/json"));
        assert!(request.contains(r#""type":"stats_leaders""#));
    }

    #[tokio::test]
    async fn test_send_reports_rejected_payload() {
        let server = CannedServer::start(500, "template missing").await;
        let tournament = TournamentInfo::from_url("https://www.wbsc.org/en/events/2025-u18/stats");
        let payload = WebhookPayload::from_report(&tournament, &report());

        let result = PublishService::new(client(), server.url.clone())
            .send(&payload)
            .await;

        match result {
            Err(StatsError::Webhook { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "template missing");
            }
            other => panic!("expected webhook error, got {other:?}"),
        }
    }
}

//! Schedule and results: every game of a tournament, read from the page data
//! embedded in the schedule page.

use crate::domain::{Game, Innings, Officials};
use crate::error::{Result, StatsError};
use crate::infrastructure::{strip_query, Page, PageFetcher};
use chrono::Local;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

const SCHEDULE_PATH: &str = "/schedule-and-results";
const UNKNOWN: &str = "Unknown";
const MAX_INNINGS: usize = 20;
const RECENT_FINALS: usize = 5;

/// The schedule page of the tournament at `url`.
pub fn schedule_url(url: &str) -> String {
    let base = strip_query(url).trim_end_matches('/');
    if base.ends_with(SCHEDULE_PATH) {
        base.to_string()
    } else {
        format!("{base}{SCHEDULE_PATH}")
    }
}

/// Text form of a JSON scalar; `null` and missing keys become empty.
fn text(raw: &Value, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn text_or(raw: &Value, key: &str, default: &str) -> String {
    match raw.get(key) {
        Some(Value::Null) | None => default.to_string(),
        Some(_) => text(raw, key),
    }
}

/// First non-empty of `keys`.
fn first_text(raw: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| text(raw, key))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// Counting stats arrive as numbers or numeric strings; anything else is zero.
fn count(raw: &Value, key: &str) -> u32 {
    match raw.get(key) {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn innings(raw: &Value) -> Innings {
    let mut innings = Innings::default();
    for i in 1..=MAX_INNINGS {
        let home = raw.get(format!("runshome{i}")).filter(|v| !v.is_null());
        let away = raw.get(format!("runsaway{i}")).filter(|v| !v.is_null());
        if home.is_none() && away.is_none() {
            break;
        }
        innings.home.push(text(raw, &format!("runshome{i}")));
        innings.away.push(text(raw, &format!("runsaway{i}")));
    }
    innings
}

fn names(raw: &Value, keys: impl Iterator<Item = String>) -> Vec<String> {
    keys.map(|key| text(raw, &key))
        .filter(|name| !name.is_empty())
        .collect()
}

fn officials(raw: &Value) -> Officials {
    Officials {
        umpires: names(raw, (0..7).map(|i| format!("umpire{i}name"))),
        scorers: names(raw, (1..5).map(|i| format!("scorer{i}name"))),
        technical_commissioners: names(raw, (1..4).map(|i| format!("tc{i}name"))),
    }
}

pub fn parse_game(raw: &Value, tournament: &str, scraped_at: &str) -> Option<Game> {
    if !raw.is_object() {
        return None;
    }

    Some(Game {
        game_id: text(raw, "id"),
        game_number: text(raw, "gamenumber"),
        game_code: text(raw, "gamecode"),
        date: text(raw, "start_date"),
        start_time: text(raw, "start"),
        venue: first_text(raw, &["stadium", "location"]),
        home_team: text_or(raw, "homelabel", UNKNOWN),
        away_team: text_or(raw, "awaylabel", UNKNOWN),
        home_ioc: text(raw, "homeioc"),
        away_ioc: text(raw, "awayioc"),
        home_runs: count(raw, "homeruns"),
        away_runs: count(raw, "awayruns"),
        home_hits: count(raw, "homehits"),
        away_hits: count(raw, "awayhits"),
        home_errors: count(raw, "homeerrors"),
        away_errors: count(raw, "awayerrors"),
        innings: innings(raw),
        status: text_or(raw, "gamestatustext", UNKNOWN),
        round: text(raw, "round"),
        group: first_text(raw, &["grouplabel", "group"]),
        officials: officials(raw),
        tournament: tournament.to_string(),
        scraped_at: scraped_at.to_string(),
    })
}

/// Games listed under `props.games` of the embedded page data.
pub fn games_from_page_data(data: &Value, scraped_at: &str) -> Vec<Game> {
    let props = &data["props"];
    let tournament = text(&props["tournament"], "name");
    let raw_games = props["games"].as_array().map(Vec::as_slice).unwrap_or_default();
    info!("Found {} games in tournament", raw_games.len());

    let games: Vec<Game> = raw_games
        .iter()
        .filter_map(|raw| {
            let game = parse_game(raw, &tournament, scraped_at);
            if game.is_none() {
                warn!("Skipping malformed game entry");
            }
            game
        })
        .collect();

    info!("Successfully processed {} games", games.len());
    games
}

/// Optional narrowing of the game list. Every set criterion must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameFilter {
    /// Exact status, any case (`Final`, `Live`, `Preview`).
    pub status: Option<String>,
    /// Substring of either team name, any case.
    pub team: Option<String>,
    /// Date prefix, `YYYY-MM-DD` or shorter.
    pub date: Option<String>,
}

impl GameFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.team.is_none() && self.date.is_none()
    }

    pub fn matches(&self, game: &Game) -> bool {
        let status_ok = self
            .status
            .as_ref()
            .map_or(true, |status| game.status.eq_ignore_ascii_case(status));

        let team_ok = self.team.as_ref().map_or(true, |team| {
            let team = team.to_lowercase();
            game.home_team.to_lowercase().contains(&team)
                || game.away_team.to_lowercase().contains(&team)
        });

        let date_ok = self
            .date
            .as_ref()
            .map_or(true, |date| game.date.starts_with(date.as_str()));

        status_ok && team_ok && date_ok
    }

    pub fn apply(&self, games: Vec<Game>) -> Vec<Game> {
        games.into_iter().filter(|game| self.matches(game)).collect()
    }
}

/// Reads the schedule page of one tournament.
pub struct GameScraper<F> {
    fetcher: F,
    url: String,
}

impl<F: PageFetcher> GameScraper<F> {
    pub fn new(fetcher: F, url: &str) -> Self {
        Self {
            fetcher,
            url: schedule_url(url),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn scrape(&self) -> Result<Vec<Game>> {
        info!("Scraping tournament games from {}", self.url);
        let markup = self.fetcher.fetch_rendered(&self.url).await?;

        let data = Page::parse(&markup)
            .embedded_page_data()
            .ok_or_else(|| StatsError::Parse(format!("no data-page payload at {}", self.url)))?;

        let scraped_at = Local::now().to_rfc3339();
        Ok(games_from_page_data(&data, &scraped_at))
    }
}

/// Counts per status and the most recent finished games.
pub fn log_games_summary(games: &[Game]) {
    if games.is_empty() {
        warn!("No games found");
        return;
    }

    info!("Total games: {}", games.len());
    let mut by_status: BTreeMap<&str, usize> = BTreeMap::new();
    for game in games {
        *by_status.entry(game.status.as_str()).or_default() += 1;
    }
    for (status, total) in &by_status {
        info!("  {}: {}", status, total);
    }

    let finals: Vec<&Game> = games.iter().filter(|game| game.is_final()).collect();
    for game in &finals[finals.len().saturating_sub(RECENT_FINALS)..] {
        info!("  {}", game.scoreline());
    }
}

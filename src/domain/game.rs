use serde::Serialize;

pub const FINAL_STATUS: &str = "final";

/// Runs per inning, one entry per inning played. A side that has not batted
/// in an inning holds an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Innings {
    pub home: Vec<String>,
    pub away: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Officials {
    pub umpires: Vec<String>,
    pub scorers: Vec<String>,
    pub technical_commissioners: Vec<String>,
}

/// One schedule entry as published on the tournament results page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Game {
    pub game_id: String,
    pub game_number: String,
    pub game_code: String,
    pub date: String,
    pub start_time: String,
    pub venue: String,
    pub home_team: String,
    pub away_team: String,
    pub home_ioc: String,
    pub away_ioc: String,
    pub home_runs: u32,
    pub away_runs: u32,
    pub home_hits: u32,
    pub away_hits: u32,
    pub home_errors: u32,
    pub away_errors: u32,
    pub innings: Innings,
    pub status: String,
    pub round: String,
    pub group: String,
    pub officials: Officials,
    pub tournament: String,
    pub scraped_at: String,
}

impl Game {
    pub fn is_final(&self) -> bool {
        self.status.eq_ignore_ascii_case(FINAL_STATUS)
    }

    /// `AWAY 3-5 HOME (2025-07-14)`
    pub fn scoreline(&self) -> String {
        let date = if self.date.is_empty() {
            "Unknown date"
        } else {
            self.date.as_str()
        };
        format!(
            "{} {}-{} {} ({})",
            self.away_team, self.away_runs, self.home_runs, self.home_team, date
        )
    }
}

use crate::domain::storage::{Storage, StorageKeys};
use crate::domain::{Category, FieldRecord, Game, StatsReport};
use crate::error::Result;
use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Clone)]
pub struct FileSystemStore {
    output_dir: PathBuf,
    /// Shared suffix for every file written during one run.
    run_stamp: String,
}

impl FileSystemStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_stamp(output_dir, Local::now().format("%H%M%S").to_string())
    }

    pub fn with_stamp(output_dir: impl Into<PathBuf>, run_stamp: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            run_stamp: run_stamp.into(),
        }
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir)?;
        }
        Ok(())
    }

    fn write_json_file<T: Serialize + ?Sized>(&self, filename: &str, data: &T) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.output_dir.join(filename);
        let content = serde_json::to_string_pretty(data)?;
        fs::write(&path, content)?;
        Ok(path)
    }
}

/// Column labels across all records, in the order they were first seen.
pub fn union_of_labels(records: &[FieldRecord]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for record in records {
        for label in record.labels() {
            if !labels.iter().any(|known| known == label) {
                labels.push(label.to_string());
            }
        }
    }
    labels
}

/// A game flattened to one CSV line; list fields are comma-joined.
#[derive(Serialize)]
struct GameRow<'a> {
    game_id: &'a str,
    game_number: &'a str,
    game_code: &'a str,
    date: &'a str,
    start_time: &'a str,
    venue: &'a str,
    home_team: &'a str,
    away_team: &'a str,
    home_ioc: &'a str,
    away_ioc: &'a str,
    home_runs: u32,
    away_runs: u32,
    home_hits: u32,
    away_hits: u32,
    home_errors: u32,
    away_errors: u32,
    status: &'a str,
    round: &'a str,
    group: &'a str,
    tournament: &'a str,
    scraped_at: &'a str,
    home_innings: String,
    away_innings: String,
    umpires: String,
    scorers: String,
    technical_commissioners: String,
}

impl<'a> From<&'a Game> for GameRow<'a> {
    fn from(game: &'a Game) -> Self {
        Self {
            game_id: &game.game_id,
            game_number: &game.game_number,
            game_code: &game.game_code,
            date: &game.date,
            start_time: &game.start_time,
            venue: &game.venue,
            home_team: &game.home_team,
            away_team: &game.away_team,
            home_ioc: &game.home_ioc,
            away_ioc: &game.away_ioc,
            home_runs: game.home_runs,
            away_runs: game.away_runs,
            home_hits: game.home_hits,
            away_hits: game.away_hits,
            home_errors: game.home_errors,
            away_errors: game.away_errors,
            status: &game.status,
            round: &game.round,
            group: &game.group,
            tournament: &game.tournament,
            scraped_at: &game.scraped_at,
            home_innings: game.innings.home.join(","),
            away_innings: game.innings.away.join(","),
            umpires: game.officials.umpires.join(","),
            scorers: game.officials.scorers.join(","),
            technical_commissioners: game.officials.technical_commissioners.join(","),
        }
    }
}

impl Storage for FileSystemStore {
    fn save_report(&self, report: &StatsReport) -> Result<PathBuf> {
        let filename = format!("{}_{}.json", StorageKeys::STATS_PREFIX, self.run_stamp);
        let path = self.write_json_file(&filename, report)?;
        info!("Saved statistics JSON to {:?}", path);
        Ok(path)
    }

    fn save_category_csv(&self, category: Category, records: &[FieldRecord]) -> Result<PathBuf> {
        self.ensure_dir()?;
        let filename = format!(
            "{}_{}_{}.csv",
            StorageKeys::STATS_PREFIX,
            category,
            self.run_stamp
        );
        let path = self.output_dir.join(filename);

        let columns = union_of_labels(records);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(&columns)?;
        for record in records {
            writer.write_record(
                columns
                    .iter()
                    .map(|column| record.get(column).unwrap_or_default()),
            )?;
        }
        writer.flush()?;

        info!("Saved {} {} records to {:?}", records.len(), category, path);
        Ok(path)
    }

    fn save_games(&self, games: &[Game]) -> Result<PathBuf> {
        let stem = format!("{}_{}", StorageKeys::GAMES_PREFIX, self.run_stamp);
        let json_path = self.write_json_file(&format!("{stem}.json"), games)?;
        info!("Saved {} games to {:?}", games.len(), json_path);

        if !games.is_empty() {
            let csv_path = self.output_dir.join(format!("{stem}.csv"));
            let mut writer = csv::Writer::from_path(&csv_path)?;
            for game in games {
                writer.serialize(GameRow::from(game))?;
            }
            writer.flush()?;
            info!("Saved games CSV to {:?}", csv_path);
        }

        Ok(json_path)
    }

    fn save_debug_report<T: Serialize>(&self, category: Category, report: &T) -> Result<PathBuf> {
        let filename = format!(
            "{}_{}_{}.json",
            StorageKeys::DEBUG_PREFIX,
            category,
            Local::now().format("%Y%m%d_%H%M%S")
        );
        self.write_json_file(&filename, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Innings, Officials};
    use std::sync::Arc;

    fn record(pairs: &[(&str, &str)]) -> FieldRecord {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_union_of_labels_keeps_first_seen_order() {
        let records = vec![
            record(&[("Player", "A"), ("AB", "3")]),
            record(&[("Player", "B"), ("R", "1"), ("AB", "2")]),
        ];
        assert_eq!(union_of_labels(&records), vec!["Player", "AB", "R"]);
    }

    #[test]
    fn test_csv_fills_missing_cells() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemStore::with_stamp(dir.path().join("out"), "120000");
        let records = vec![
            record(&[("Player", "DOE Jane"), ("AB", "3")]),
            record(&[("Player", "ROE Ann"), ("R", "1")]),
        ];

        let path = store.save_category_csv(Category::Batting, &records).unwrap();
        assert_eq!(path.file_name().unwrap(), "stats_batting_120000.csv");

        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["Player,AB,R", "DOE Jane,3,", "ROE Ann,,1"]);
    }

    #[test]
    fn test_report_json_round_trips_headers() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemStore::with_stamp(dir.path(), "093000");
        let mut report = StatsReport::default();
        report.categories.insert(
            Category::Fielding,
            Arc::new(vec![record(&[("Player", "DOE Jane"), ("E", "0")])]),
        );

        let path = store.save_report(&report).unwrap();
        assert_eq!(path.file_name().unwrap(), "stats_093000.json");

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["fielding"][0]["E"], "0");
    }

    #[test]
    fn test_games_csv_flattens_innings_and_officials() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemStore::with_stamp(dir.path(), "180000");
        let game = Game {
            game_id: "101".to_string(),
            home_team: "Spain".to_string(),
            away_team: "Italy".to_string(),
            home_runs: 4,
            innings: Innings {
                home: vec!["1".to_string(), "3".to_string()],
                away: vec!["0".to_string(), String::new()],
            },
            officials: Officials {
                umpires: vec!["A. Umpire".to_string(), "B. Umpire".to_string()],
                ..Officials::default()
            },
            status: "Final".to_string(),
            ..Game::default()
        };

        let json_path = store.save_games(&[game]).unwrap();
        assert_eq!(json_path.file_name().unwrap(), "games_180000.json");
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json[0]["innings"]["home"][1], "3");
        assert_eq!(json[0]["officials"]["umpires"][0], "A. Umpire");

        let mut reader = csv::Reader::from_path(dir.path().join("games_180000.csv")).unwrap();
        let headers = reader.headers().unwrap().clone();
        let row = reader.records().next().unwrap().unwrap();
        let field = |name: &str| {
            let index = headers.iter().position(|h| h == name).unwrap();
            row.get(index).unwrap().to_string()
        };
        assert_eq!(field("home_innings"), "1,3");
        assert_eq!(field("away_innings"), "0,");
        assert_eq!(field("umpires"), "A. Umpire,B. Umpire");
        assert_eq!(field("home_runs"), "4");
        assert!(!headers.iter().any(|h| h == "innings"));
    }

    #[test]
    fn test_no_games_writes_json_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemStore::with_stamp(dir.path(), "180500");
        let path = store.save_games(&[]).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap().trim(), "[]");
        assert!(!dir.path().join("games_180500.csv").exists());
    }

    #[test]
    fn test_debug_report_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemStore::new(dir.path());
        let path = store
            .save_debug_report(Category::Pitching, &serde_json::json!({"tables_found": 2}))
            .unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("debug_stats_pitching_"));
        assert!(name.ends_with(".json"));
    }
}

use super::{Category, FieldRecord, Game, StatsReport};
use crate::error::Result;
use serde::Serialize;
use std::path::PathBuf;

pub trait Storage: Send + Sync {
    fn save_report(&self, report: &StatsReport) -> Result<PathBuf>;
    fn save_category_csv(&self, category: Category, records: &[FieldRecord]) -> Result<PathBuf>;
    /// Writes the games as JSON and, when there are any, as a flat CSV.
    /// Returns the JSON path.
    fn save_games(&self, games: &[Game]) -> Result<PathBuf>;
    fn save_debug_report<T: Serialize>(&self, category: Category, report: &T) -> Result<PathBuf>
    where
        Self: Sized;
}

pub struct StorageKeys;

impl StorageKeys {
    pub const STATS_PREFIX: &'static str = "stats";
    pub const DEBUG_PREFIX: &'static str = "debug_stats";
    pub const GAMES_PREFIX: &'static str = "games";
}

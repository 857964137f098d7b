use crate::config::cli::Args;
use crate::domain::TournamentInfo;
use crate::error::{Result, StatsError};
use chrono::Local;
use clap::Parser;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub(crate) mod cli;

pub use cli::{FetchMode, Target};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Knobs for one paginated category scrape.
#[derive(Debug, Clone)]
pub struct PaginationSettings {
    pub max_pages: usize,
    pub stall_limit: usize,
    pub table_timeout: Duration,
    /// Pause after a table appears or a control is clicked, so rows can populate.
    pub settle: Duration,
    pub page_delay: Duration,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            max_pages: 20,
            stall_limit: 3,
            table_timeout: Duration::from_secs(10),
            settle: Duration::from_secs(2),
            page_delay: Duration::from_secs(1),
        }
    }
}

/// Everything a scrape needs, handed explicitly to each component.
#[derive(Debug, Clone)]
pub struct ScrapeContext {
    pub http_client: Client,
    pub delay: Duration,
    pub pagination: PaginationSettings,
}

pub struct Config {
    pub args: Args,
    pub tournament: TournamentInfo,
    pub context: ScrapeContext,
}

impl Config {
    pub fn new() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        let delay = Duration::try_from_secs_f64(args.delay.max(0.0))
            .map_err(|e| StatsError::Other(format!("invalid --delay {}: {e}", args.delay)))?;
        let pagination = PaginationSettings {
            max_pages: args.max_pages.max(1),
            stall_limit: args.stall_limit.max(1),
            table_timeout: Duration::from_secs(args.table_timeout),
            page_delay: delay,
            ..PaginationSettings::default()
        };

        let tournament = TournamentInfo::from_url(&args.url);

        Ok(Self {
            args,
            tournament,
            context: ScrapeContext {
                http_client,
                delay,
                pagination,
            },
        })
    }

    /// Name used for output naming: the CLI value wins over the one in the URL.
    pub fn tournament_name(&self) -> Option<&str> {
        self.args
            .tournament_name
            .as_deref()
            .or_else(|| self.tournament.known_name())
    }

    pub fn output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.args.output_dir {
            return dir.clone();
        }

        let date = Local::now().format("%Y-%m-%d");
        let folder = match (self.args.target, self.tournament_name()) {
            (Target::Stats, Some(name)) => {
                format!("{}_{}__complete_stats", date, TournamentInfo::slug(name))
            }
            (Target::Stats, None) => format!("{}_tournament_stats", date),
            (Target::Games, Some(name)) => format!("{}_{}", date, TournamentInfo::slug(name)),
            (Target::Games, None) => format!("{}_tournament", date),
        };
        PathBuf::from("outputs").join(folder)
    }

    pub fn ensure_output_dir(&self) -> Result<PathBuf> {
        let dir = self.output_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }

        info!("Output directory ready: {:?}", dir);
        Ok(dir)
    }
}

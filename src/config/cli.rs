use crate::domain::Category;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FetchMode {
    /// Drive a headless browser through every result page
    Paginate,
    /// Render a single page in the browser, falling back to plain HTTP
    Render,
    /// Plain HTTP with a category query parameter
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// Player statistics tables
    Stats,
    /// Schedule and results of every game
    Games,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Scrape WBSC tournament statistics")]
pub struct Args {
    /// Tournament statistics URL
    #[arg(long)]
    pub url: String,

    /// Directory to store output data
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// What to collect
    #[arg(long, value_enum, default_value_t = Target::Stats)]
    pub target: Target,

    /// Keep only games with this status (games target)
    #[arg(long)]
    pub status: Option<String>,

    /// Keep only games involving this team (games target)
    #[arg(long)]
    pub team: Option<String>,

    /// Keep only games on this date, YYYY-MM-DD (games target)
    #[arg(long)]
    pub date: Option<String>,

    /// Tournament name used for output naming
    #[arg(long)]
    pub tournament_name: Option<String>,

    /// Delay between requests in seconds
    #[arg(long, default_value_t = 1.0)]
    pub delay: f64,

    /// Categories to scrape
    #[arg(long, value_enum, num_args = 1.., default_values_t = Category::ALL)]
    pub categories: Vec<Category>,

    /// Only scrape batting statistics
    #[arg(long)]
    pub batting_only: bool,

    /// Analyse the page structure instead of extracting statistics
    #[arg(long)]
    pub debug: bool,

    /// Category inspected in debug mode
    #[arg(long, value_enum, default_value_t = Category::Batting)]
    pub debug_category: Category,

    /// How pages are fetched
    #[arg(long, value_enum, default_value_t = FetchMode::Paginate)]
    pub mode: FetchMode,

    /// Upper bound on result pages visited per category
    #[arg(long, default_value_t = 20)]
    pub max_pages: usize,

    /// Seconds to wait for a table to render
    #[arg(long, default_value_t = 10)]
    pub table_timeout: u64,

    /// Consecutive pages without new players before giving up
    #[arg(long, default_value_t = 3)]
    pub stall_limit: usize,

    /// Webhook receiving the stats payload
    #[clap(long, env = "WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn requested_categories(&self) -> Vec<Category> {
        if self.batting_only {
            return vec![Category::Batting];
        }

        let mut categories = Vec::new();
        for category in &self.categories {
            if !categories.contains(category) {
                categories.push(*category);
            }
        }
        categories
    }
}

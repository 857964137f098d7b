use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Selector error: {0}")]
    Selector(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("Page load failed: {0}")]
    PageLoad(String),
    #[error("Webhook returned {status}: {body}")]
    Webhook { status: u16, body: String },
    #[error("{0}")]
    Other(String),
}

impl StatsError {
    /// Wraps a headless browser failure, which arrives as an opaque error.
    pub fn browser(err: impl std::fmt::Display) -> Self {
        StatsError::Browser(err.to_string())
    }

    pub fn page_load(url: &str, err: impl std::fmt::Display) -> Self {
        StatsError::PageLoad(format!("{url}: {err}"))
    }

    /// The target site could not be reached or loaded at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, StatsError::Network(_) | StatsError::PageLoad(_))
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;

pub mod classifier;
pub mod extractor;
pub mod games;
pub mod inspect;
pub mod normalize;
pub mod orchestrator;
pub mod pagination;
pub mod publish;
pub mod scraping;
pub mod stats_service;

pub use stats_service::StatsService;

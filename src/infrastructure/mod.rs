mod browser;
#[cfg(test)]
pub mod canned_http;
mod dom;
mod fetch;
mod storage;

pub use browser::{ChromeSession, LiveSession};
pub use dom::{NavLink, Page, TableCandidate, TableRow};
pub use fetch::{strip_query, with_category_query, ChromeFetcher, HttpFetcher, PageFetcher};
pub use storage::fs_store::FileSystemStore;

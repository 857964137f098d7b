//! Walks a live result table page by page until it runs dry.
//!
//! The driver is a small state machine:
//! `Init -> FetchingPage -> ExtractingRecords -> CheckingStop -> NavigatingNext`,
//! looping back to `FetchingPage` after every successful click and ending in
//! `Stopped`. The page counter is capped, so every run terminates.

use super::classifier::classify;
use super::extractor::extract_records;
use crate::config::PaginationSettings;
use crate::domain::{Category, FieldRecord, IdentityKey};
use crate::infrastructure::{LiveSession, Page};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, info, warn};

static ENTRIES_SUMMARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Showing\s+(\d+)\s+to\s+(\d+)\s+of\s+(\d+)\s+entries").unwrap());

const SUMMARY_HOLDERS: &str = "div, span, p, li, td";

/// The "Showing 1 to 25 of 269 entries" line under the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntriesSummary {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl EntriesSummary {
    pub fn parse(text: &str) -> Option<Self> {
        let caps = ENTRIES_SUMMARY.captures(text)?;
        let number = |i: usize| caps.get(i)?.as_str().parse::<usize>().ok();
        Some(Self {
            start: number(1)?,
            end: number(2)?,
            total: number(3)?,
        })
    }

    /// Reads the summary from whichever element carries it.
    pub fn locate(page: &Page) -> Option<Self> {
        page.first_text_where(SUMMARY_HOLDERS, |text| ENTRIES_SUMMARY.is_match(text))
            .and_then(|text| Self::parse(&text))
    }

    pub fn has_more(&self) -> bool {
        self.end < self.total
    }
}

/// Ways of reaching the next page, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavStrategy {
    NextControl,
    PageNumber,
}

impl NavStrategy {
    pub const ORDER: [NavStrategy; 2] = [NavStrategy::NextControl, NavStrategy::PageNumber];

    pub fn xpaths(&self, next_page: usize) -> Vec<String> {
        match self {
            NavStrategy::NextControl => vec![
                "//a[contains(text(), 'Next')]".to_string(),
                "//button[contains(text(), 'Next')]".to_string(),
                "//*[contains(@class, 'next') and not(contains(@class, 'disabled'))]".to_string(),
                "//a[contains(@class, 'page-link') and contains(text(), 'Next')]".to_string(),
            ],
            NavStrategy::PageNumber => vec![
                format!("//a[contains(text(), '{next_page}')]"),
                format!("//button[contains(text(), '{next_page}')]"),
                format!("//*[contains(@class, 'page-link') and text()='{next_page}']"),
            ],
        }
    }
}

/// Controls that switch the table to `category`, most specific first.
pub fn category_tab_xpaths(category: Category) -> Vec<String> {
    let title = category.title();
    vec![
        format!("//button[contains(text(), '{title}')]"),
        format!("//a[contains(text(), '{title}')]"),
        format!("//*[contains(@class, 'tab') and contains(text(), '{title}')]"),
        format!("//*[contains(text(), '{title}')]"),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No table rendered within the wait.
    TableTimeout,
    /// The rendered document could not be read.
    SnapshotFailed,
    /// A page produced no records at all.
    NoRecords,
    /// Too many consecutive pages without a new player.
    Stalled,
    /// The displayed entry total has been collected.
    TotalReached,
    /// More entries are announced but no control leads to them.
    NavigationFailed,
    /// No further page exists.
    Exhausted,
    /// The page cap was hit.
    PageCap,
}

#[derive(Debug)]
enum Phase {
    Init,
    FetchingPage,
    ExtractingRecords(String),
    CheckingStop {
        records: Vec<FieldRecord>,
        summary: Option<EntriesSummary>,
    },
    NavigatingNext,
    Stopped(StopReason),
}

/// Accumulator for one category scrape.
#[derive(Debug)]
pub struct PaginationState {
    records: Vec<FieldRecord>,
    seen: HashSet<IdentityKey>,
    page: usize,
    stalls: usize,
    last_summary: Option<EntriesSummary>,
}

impl PaginationState {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
            page: 1,
            stalls: 0,
            last_summary: None,
        }
    }

    /// Keeps the records whose identity is new and returns how many that was.
    fn merge(&mut self, page_records: Vec<FieldRecord>) -> usize {
        let before = self.records.len();
        for record in page_records {
            if self.seen.insert(record.identity()) {
                self.records.push(record);
            }
        }
        self.records.len() - before
    }
}

#[derive(Debug)]
pub struct PaginationOutcome {
    pub records: Vec<FieldRecord>,
    pub pages_visited: usize,
    pub stop_reason: StopReason,
}

pub struct PaginationDriver<'s, S: LiveSession> {
    session: &'s mut S,
    category: Category,
    settings: PaginationSettings,
    state: PaginationState,
}

impl<'s, S: LiveSession> PaginationDriver<'s, S> {
    pub fn new(session: &'s mut S, category: Category, settings: PaginationSettings) -> Self {
        Self {
            session,
            category,
            settings,
            state: PaginationState::new(),
        }
    }

    /// Runs to completion. Consumes the driver; a stopped scrape cannot resume.
    pub fn run(mut self) -> PaginationOutcome {
        info!("Starting paginated scraping for {}", self.category);
        let mut phase = Phase::Init;

        loop {
            phase = match phase {
                Phase::Init => self.init(),
                Phase::FetchingPage => self.fetch_page(),
                Phase::ExtractingRecords(markup) => self.extract(&markup),
                Phase::CheckingStop { records, summary } => self.check_stop(records, summary),
                Phase::NavigatingNext => self.navigate_next(),
                Phase::Stopped(reason) => return self.finish(reason),
            };
        }
    }

    fn init(&mut self) -> Phase {
        let clicked = category_tab_xpaths(self.category)
            .iter()
            .any(|xpath| self.session.click(xpath));

        if clicked {
            info!("Clicked {} tab", self.category);
            self.session.pause(self.settings.settle);
        } else {
            info!("No specific {} tab found - using default view", self.category);
        }
        Phase::FetchingPage
    }

    fn fetch_page(&mut self) -> Phase {
        info!("Scraping {} page {}", self.category, self.state.page);

        if !self.session.wait_for_table(self.settings.table_timeout) {
            warn!("No table found on page {}", self.state.page);
            return Phase::Stopped(StopReason::TableTimeout);
        }
        self.session.pause(self.settings.settle);

        match self.session.snapshot() {
            Ok(markup) => Phase::ExtractingRecords(markup),
            Err(e) => {
                warn!("Could not read page {}: {}", self.state.page, e);
                Phase::Stopped(StopReason::SnapshotFailed)
            }
        }
    }

    fn extract(&mut self, markup: &str) -> Phase {
        let page = Page::parse(markup);
        let tables = page.tables().unwrap_or_else(|e| {
            warn!("Could not read tables: {}", e);
            Vec::new()
        });

        let records = classify(&tables, self.category)
            .map(extract_records)
            .unwrap_or_default();
        let summary = EntriesSummary::locate(&page);

        Phase::CheckingStop { records, summary }
    }

    fn check_stop(&mut self, records: Vec<FieldRecord>, summary: Option<EntriesSummary>) -> Phase {
        let page = self.state.page;
        self.state.last_summary = summary;

        if records.is_empty() {
            info!("No players found on page {}, stopping", page);
            return Phase::Stopped(StopReason::NoRecords);
        }

        let added = self.state.merge(records);
        if added == 0 {
            self.state.stalls += 1;
            warn!(
                "No unique players on page {} (consecutive duplicates: {})",
                page, self.state.stalls
            );
            if self.state.stalls >= self.settings.stall_limit {
                info!("Too many consecutive duplicate pages, stopping");
                return Phase::Stopped(StopReason::Stalled);
            }
            return Phase::NavigatingNext;
        }

        self.state.stalls = 0;
        info!(
            "Found {} unique players on page {} (total: {})",
            added,
            page,
            self.state.records.len()
        );

        if let Some(summary) = summary {
            if self.state.records.len() >= summary.total {
                info!("Reached expected total of {} players", summary.total);
                return Phase::Stopped(StopReason::TotalReached);
            }
        }

        Phase::NavigatingNext
    }

    fn navigate_next(&mut self) -> Phase {
        if self.state.page >= self.settings.max_pages {
            warn!(
                "Stopping {} after {} pages; page cap reached",
                self.category, self.state.page
            );
            return Phase::Stopped(StopReason::PageCap);
        }

        let next_page = self.state.page + 1;
        for strategy in NavStrategy::ORDER {
            for xpath in strategy.xpaths(next_page) {
                if self.session.click(&xpath) {
                    debug!("Navigated with {:?} via {}", strategy, xpath);
                    self.session.pause(self.settings.settle);
                    self.state.page = next_page;
                    self.session.pause(self.settings.page_delay);
                    return Phase::FetchingPage;
                }
            }
        }

        match self.state.last_summary {
            Some(summary) if summary.has_more() => {
                warn!(
                    "More pages available ({}/{}) but navigation failed",
                    summary.end, summary.total
                );
                Phase::Stopped(StopReason::NavigationFailed)
            }
            _ => {
                info!("No more pages available");
                Phase::Stopped(StopReason::Exhausted)
            }
        }
    }

    fn finish(self, reason: StopReason) -> PaginationOutcome {
        info!(
            "Finished scraping {} ({:?}). Total players: {}",
            self.category,
            reason,
            self.state.records.len()
        );
        PaginationOutcome {
            records: self.state.records,
            pages_visited: self.state.page,
            stop_reason: reason,
        }
    }
}

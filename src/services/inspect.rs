use crate::error::Result;
use crate::infrastructure::{NavLink, Page};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

const HEADER_CELLS: usize = 10;

#[derive(Debug, Serialize)]
pub struct TableSummary {
    pub table_index: usize,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Page structure dump used to adjust the extraction heuristics to a new layout.
#[derive(Debug, Serialize)]
pub struct DebugReport {
    pub url: String,
    pub title: String,
    pub has_embedded_data: bool,
    pub tables_found: usize,
    pub forms_found: usize,
    pub navigation_links: Vec<NavLink>,
    pub table_headers: Vec<TableSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedded_data_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedded_props_keys: Option<Vec<String>>,
}

fn object_keys(value: &Value) -> Option<Vec<String>> {
    value.as_object().map(|map| map.keys().cloned().collect())
}

impl DebugReport {
    pub fn analyze(url: &str, markup: &str) -> Result<Self> {
        let page = Page::parse(markup);
        let tables = page.tables()?;
        let embedded = page.embedded_page_data();

        let table_headers = tables
            .iter()
            .map(|table| TableSummary {
                table_index: table.index,
                headers: table
                    .rows
                    .iter()
                    .flat_map(|row| row.cells.iter().cloned())
                    .take(HEADER_CELLS)
                    .collect(),
                row_count: table.row_count(),
            })
            .collect();

        Ok(Self {
            url: url.to_string(),
            title: page.title().unwrap_or_else(|| "No title".to_string()),
            has_embedded_data: embedded.is_some(),
            tables_found: tables.len(),
            forms_found: page.find_by_tag("form")?.len(),
            navigation_links: page.navigation_links()?,
            table_headers,
            embedded_data_keys: embedded.as_ref().and_then(object_keys),
            embedded_props_keys: embedded
                .as_ref()
                .and_then(|data| data.get("props"))
                .and_then(object_keys),
        })
    }

    pub fn log_summary(&self) {
        info!("Page title: {}", self.title);
        info!("Has embedded data: {}", self.has_embedded_data);
        info!("Tables found: {}", self.tables_found);
        info!("Forms found: {}", self.forms_found);
        info!("Navigation links: {}", self.navigation_links.len());
        for table in &self.table_headers {
            info!(
                "Table {} ({} rows): {:?}",
                table.table_index, table.row_count, table.headers
            );
        }
        if let Some(keys) = &self.embedded_props_keys {
            info!("Embedded props keys: {:?}", keys);
        }
    }
}

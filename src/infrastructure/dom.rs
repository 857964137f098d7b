//! Query facade over a parsed page snapshot.
//!
//! Everything above this module sees tables as plain text grids, so the
//! heuristics never touch the HTML library directly.

use crate::error::{Result, StatsError};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use serde_json::Value;

pub struct Page {
    document: Html,
}

/// One `<tr>` flattened to its cell texts.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<String>,
    /// Row sits inside the table's `<thead>`.
    pub in_header: bool,
}

#[cfg(test)]
impl TableRow {
    pub fn body(cells: &[&str]) -> Self {
        Self {
            cells: cells.iter().map(|c| c.to_string()).collect(),
            in_header: false,
        }
    }

    pub fn header(cells: &[&str]) -> Self {
        Self {
            in_header: true,
            ..Self::body(cells)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub text: String,
    pub href: String,
}

/// A table plus the text the classifier looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCandidate {
    pub index: usize,
    pub rows: Vec<TableRow>,
    /// Lower-cased text content of the whole table.
    pub text: String,
}

impl TableCandidate {
    pub fn new(index: usize, rows: Vec<TableRow>) -> Self {
        let text = rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .map(|cell| cell.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self { index, rows, text }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| StatsError::Selector(format!("{css}: {e}")))
}

/// Cell text with every text node trimmed before joining, which is how the
/// site ends up delivering `SURNAMEGiven` names.
pub fn cell_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect::<String>()
}

impl Page {
    pub fn parse(markup: &str) -> Self {
        Self {
            document: Html::parse_document(markup),
        }
    }

    pub fn find_by_tag(&self, tag: &str) -> Result<Vec<ElementRef<'_>>> {
        let sel = selector(tag)?;
        Ok(self.document.select(&sel).collect())
    }

    pub fn find_by_attribute(&self, tag: &str, attribute: &str) -> Result<Vec<ElementRef<'_>>> {
        let sel = selector(&format!("{tag}[{attribute}]"))?;
        Ok(self.document.select(&sel).collect())
    }

    pub fn find_by_text_predicate<F>(&self, tag: &str, predicate: F) -> Result<Vec<ElementRef<'_>>>
    where
        F: Fn(&str) -> bool,
    {
        Ok(self
            .find_by_tag(tag)?
            .into_iter()
            .filter(|el| predicate(&el.text().collect::<String>()))
            .collect())
    }

    pub fn title(&self) -> Option<String> {
        self.find_by_tag("title")
            .ok()?
            .first()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

    /// Text of the first `tag` element whose text satisfies `predicate`.
    pub fn first_text_where<F>(&self, tag: &str, predicate: F) -> Option<String>
    where
        F: Fn(&str) -> bool,
    {
        self.find_by_text_predicate(tag, predicate)
            .ok()?
            .first()
            .map(|el| el.text().collect::<String>())
    }

    pub fn tables(&self) -> Result<Vec<TableCandidate>> {
        let row_sel = selector("tr")?;
        let cell_sel = selector("th, td")?;

        let tables = self
            .find_by_tag("table")?
            .into_iter()
            .enumerate()
            .map(|(index, table)| {
                let rows = table
                    .select(&row_sel)
                    .map(|row| TableRow {
                        cells: row.select(&cell_sel).map(cell_text).collect(),
                        in_header: inside_thead(row, table),
                    })
                    .collect();
                TableCandidate::new(index, rows)
            })
            .collect();

        Ok(tables)
    }

    /// Anchors inside `nav`/`div` containers whose class mentions navigation or
    /// paging (`nav`, `pag`), ignoring case.
    pub fn navigation_links(&self) -> Result<Vec<NavLink>> {
        let anchor_sel = selector("a")?;
        let mut links = Vec::new();

        for container in self.find_by_tag("nav, div")? {
            let class = container
                .value()
                .attr("class")
                .unwrap_or_default()
                .to_lowercase();
            if !(class.contains("nav") || class.contains("pag")) {
                continue;
            }
            for anchor in container.select(&anchor_sel) {
                links.push(NavLink {
                    text: anchor.text().collect::<String>().trim().to_string(),
                    href: anchor.value().attr("href").unwrap_or_default().to_string(),
                });
            }
        }

        Ok(links)
    }

    /// JSON stored in the `data-page` attribute of server-rendered pages.
    pub fn embedded_page_data(&self) -> Option<Value> {
        let holder = self.find_by_attribute("div", "data-page").ok()?;
        let raw = holder.first()?.value().attr("data-page")?;
        serde_json::from_str(raw).ok()
    }
}

fn inside_thead(row: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    for ancestor in row.ancestors().filter_map(ElementRef::wrap) {
        if ancestor.id() == table.id() {
            return false;
        }
        if ancestor.value().name() == "thead" {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS_PAGE: &str = r#"
        <html><head><title>Stats</title></head><body>
        <div data-page="{&quot;component&quot;:&quot;Stats&quot;,&quot;props&quot;:{&quot;stats&quot;:[]}}"></div>
        <table id="standings"><tr><td>Team</td><td>W</td></tr><tr><td>ESP</td><td>3</td></tr></table>
        <table id="players">
          <thead><tr><th>Player</th><th>Team</th><th>AVG</th></tr></thead>
          <tbody>
            <tr><td><a>FEKETE</a> <span>Anna</span></td><td>HUN</td><td>.400</td></tr>
          </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_tables_flatten_rows_and_header() {
        let page = Page::parse(STATS_PAGE);
        let tables = page.tables().unwrap();

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].index, 1);
        assert_eq!(tables[1].rows[0], TableRow::header(&["Player", "Team", "AVG"]));
        assert_eq!(tables[1].rows[1], TableRow::body(&["FEKETEAnna", "HUN", ".400"]));
        assert!(tables[1].text.contains("avg"));
        assert!(!tables[0].rows[0].in_header);
    }

    #[test]
    fn test_embedded_page_data() {
        let page = Page::parse(STATS_PAGE);
        let data = page.embedded_page_data().unwrap();
        assert_eq!(data["component"], "Stats");
        assert!(data["props"]["stats"].is_array());
    }

    #[test]
    fn test_missing_embedded_data() {
        let page = Page::parse("<div data-page='not json'></div>");
        assert!(page.embedded_page_data().is_none());
        assert!(Page::parse("<p>nothing</p>").embedded_page_data().is_none());
    }

    #[test]
    fn test_text_predicate_and_title() {
        let page = Page::parse(STATS_PAGE);
        let hits = page
            .find_by_text_predicate("td", |text| text.contains("ESP"))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(page.title().as_deref(), Some("Stats"));
    }

    #[test]
    fn test_navigation_links() {
        let page = Page::parse(
            r#"<nav class="pagination"><a href="?page=2">2</a><a href="?page=3"> Next </a></nav>
               <div class="footer"><a href="/about">About</a></div>"#,
        );
        let links = page.navigation_links().unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].text, "Next");
        assert_eq!(links[1].href, "?page=3");
    }

    #[test]
    fn test_navigation_links_ignore_class_case() {
        let page = Page::parse(
            r#"<div class="NavBar"><a href="/stats">Stats</a></div>
               <div class="Page-Controls"><a href="?p=2">2</a></div>
               <div class="content"><a href="/x">x</a></div>"#,
        );
        let links = page.navigation_links().unwrap();
        let texts: Vec<&str> = links.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Stats", "2"]);
    }

    #[test]
    fn test_first_text_where() {
        let page = Page::parse(
            "<div><span>Rows</span></div><div class='info'>Showing <b>1</b> to 2 of 2 entries</div>",
        );
        assert_eq!(
            page.first_text_where("div", |text| text.contains("Showing")).as_deref(),
            Some("Showing 1 to 2 of 2 entries")
        );
        assert!(page.first_text_where("p", |_| true).is_none());
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let page = Page::parse(STATS_PAGE);
        assert!(matches!(page.find_by_tag("[["), Err(StatsError::Selector(_))));
    }
}

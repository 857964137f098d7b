use crate::domain::Category;
use crate::infrastructure::TableCandidate;
use tracing::{debug, info};

pub struct CategoryRule {
    pub category: Category,
    pub keywords: &'static [&'static str],
    /// A player/team column alone is enough; the site shows batting by default.
    pub identity_suffices: bool,
}

pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Batting,
        keywords: &[
            "avg",
            "hits",
            "runs",
            "rbi",
            "ab",
            "slg",
            "obp",
            "ops",
            "batting average",
            "home runs",
        ],
        identity_suffices: true,
    },
    CategoryRule {
        category: Category::Pitching,
        keywords: &[
            "era",
            "wins",
            "losses",
            "innings",
            "strikeouts",
            "whip",
            "earned run",
        ],
        identity_suffices: false,
    },
    CategoryRule {
        category: Category::Fielding,
        keywords: &[
            "errors",
            "assists",
            "putouts",
            "fielding%",
            "fielding percentage",
            "fpct",
        ],
        identity_suffices: false,
    },
];

pub const IDENTITY_INDICATORS: &[&str] = &["player", "team", "name"];

fn rule_for(category: Category) -> Option<&'static CategoryRule> {
    CATEGORY_RULES.iter().find(|rule| rule.category == category)
}

pub fn table_qualifies(table: &TableCandidate, category: Category) -> bool {
    let Some(rule) = rule_for(category) else {
        return false;
    };

    let has_identity = IDENTITY_INDICATORS
        .iter()
        .any(|term| table.text.contains(term));
    if rule.identity_suffices && has_identity {
        return true;
    }

    let has_keywords = rule.keywords.iter().any(|kw| table.text.contains(kw));
    has_keywords && has_identity
}

/// Picks the table holding `category` statistics: the first qualifying table in
/// document order, else the table with the most rows.
pub fn classify(tables: &[TableCandidate], category: Category) -> Option<&TableCandidate> {
    info!("Found {} tables on page", tables.len());

    if let Some(table) = tables.iter().find(|t| table_qualifies(t, category)) {
        info!("Table {} appears to contain {} data", table.index, category);
        return Some(table);
    }

    let largest = tables.iter().fold(None::<&TableCandidate>, |best, table| match best {
        Some(b) if b.row_count() >= table.row_count() => Some(b),
        _ => Some(table),
    });

    if let Some(table) = largest {
        debug!(
            "No specific {} table found, using table {} with {} rows",
            category,
            table.index,
            table.row_count()
        );
    }
    largest
}

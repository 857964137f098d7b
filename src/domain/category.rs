use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A statistics view on the source site.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Batting,
    Pitching,
    Fielding,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Batting, Category::Pitching, Category::Fielding];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Batting => "batting",
            Category::Pitching => "pitching",
            Category::Fielding => "fielding",
        }
    }

    /// Label used by the site's category tabs.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Batting => "Batting",
            Category::Pitching => "Pitching",
            Category::Fielding => "Fielding",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

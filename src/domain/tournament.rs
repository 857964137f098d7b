use serde::{Deserialize, Serialize};

const UNKNOWN_TOURNAMENT: &str = "unknown_tournament";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentInfo {
    pub name: String,
    pub url: String,
    pub base_domain: String,
}

impl TournamentInfo {
    /// Reads the tournament identifier out of a stats URL such as
    /// `https://www.wbsc.org/en/events/<tournament>/stats`.
    pub fn from_url(url: &str) -> Self {
        let parts: Vec<&str> = url.split('/').collect();

        let after_events = parts
            .windows(2)
            .find(|pair| pair[0] == "events" && !pair[1].is_empty())
            .map(|pair| pair[1]);

        let dated_segment = || {
            parts
                .iter()
                .copied()
                .find(|part| part.contains("20") && (part.contains('-') || part.contains('_')))
        };

        let name = after_events
            .or_else(dated_segment)
            .unwrap_or(UNKNOWN_TOURNAMENT)
            .to_string();

        let base_domain = if url.contains("://") {
            parts.get(2).copied().unwrap_or("unknown").to_string()
        } else {
            "unknown".to_string()
        };

        Self {
            name,
            url: url.to_string(),
            base_domain,
        }
    }

    pub fn known_name(&self) -> Option<&str> {
        (self.name != UNKNOWN_TOURNAMENT).then_some(self.name.as_str())
    }

    pub fn slug(name: &str) -> String {
        name.to_lowercase().replace([' ', '-'], "_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_follows_events_segment() {
        let info = TournamentInfo::from_url(
            "https://www.wbsc.org/en/events/2025-u18-womens-softball-european-championship/stats",
        );
        assert_eq!(info.name, "2025-u18-womens-softball-european-championship");
        assert_eq!(info.base_domain, "www.wbsc.org");
        assert_eq!(info.known_name(), Some(info.name.as_str()));
    }

    #[test]
    fn test_dated_segment_fallback() {
        let info = TournamentInfo::from_url("https://stats.example.org/euro_2024/stats");
        assert_eq!(info.name, "euro_2024");
    }

    #[test]
    fn test_unknown_without_scheme() {
        let info = TournamentInfo::from_url("localhost/stats");
        assert_eq!(info.name, UNKNOWN_TOURNAMENT);
        assert_eq!(info.base_domain, "unknown");
        assert_eq!(info.known_name(), None);
    }

    #[test]
    fn test_slug() {
        assert_eq!(
            TournamentInfo::slug("2025 U-18 Women Softball"),
            "2025_u_18_women_softball"
        );
    }
}

use super::Category;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const PLAYER_FIELD: &str = "Player";
pub const TEAM_FIELD: &str = "Team";

/// One player row, keyed by the column labels exactly as the site shows them.
///
/// Insertion order is kept so CSV columns follow the table layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord {
    fields: Vec<(String, String)>,
}

impl FieldRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `label` to `value`, replacing an earlier value under the same label.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(key, _)| *key == label) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, value)| value.as_str())
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut String> {
        self.fields
            .iter_mut()
            .find(|(key, _)| key == label)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn player(&self) -> Option<&str> {
        self.get(PLAYER_FIELD).filter(|name| !name.is_empty())
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey {
            name: self.get(PLAYER_FIELD).unwrap_or_default().to_string(),
            team: self.get(TEAM_FIELD).unwrap_or_default().to_string(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = FieldRecord::new();
        for (label, value) in iter {
            record.insert(label, value);
        }
        record
    }
}

impl Serialize for FieldRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (label, value) in &self.fields {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// The (name, team) pair used to deduplicate players across pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub name: String,
    pub team: String,
}

/// Scraped records per category. Categories that render the same table share
/// one record list.
#[derive(Debug, Clone, Default)]
pub struct StatsReport {
    pub categories: BTreeMap<Category, Arc<Vec<FieldRecord>>>,
}

impl StatsReport {
    pub fn get(&self, category: Category) -> Option<&Arc<Vec<FieldRecord>>> {
        self.categories.get(&category)
    }

    pub fn total_records(&self) -> usize {
        self.categories.values().map(|records| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }
}

impl Serialize for StatsReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (category, records) in &self.categories {
            map.serialize_entry(category.as_str(), records.as_slice())?;
        }
        map.end()
    }
}

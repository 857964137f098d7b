use super::normalize::normalize_text;
use crate::domain::{FieldRecord, PLAYER_FIELD, TEAM_FIELD};
use crate::infrastructure::{TableCandidate, TableRow};
use tracing::{debug, info, warn};

/// Cell texts that identify a header row.
pub const HEADER_VOCABULARY: &[&str] = &["player", "team", "g", "ab", "avg", "era", "w", "l"];

/// Cell values that mean "no data" and are left out of records.
pub const EMPTY_MARKERS: &[&str] = &["", "-", "—", "N/A"];

/// Fields whose values are run through the text normalizer.
pub const TEXT_FIELDS: &[&str] = &[PLAYER_FIELD, TEAM_FIELD];

const HEADER_SCAN_ROWS: usize = 5;

fn looks_like_header(row: &TableRow) -> bool {
    row.cells.iter().any(|cell| {
        let cell = cell.trim().to_lowercase();
        HEADER_VOCABULARY.contains(&cell.as_str())
    })
}

/// Index of the single header row: an explicit `<thead>` row, else an early row
/// using header vocabulary, else the first row.
pub fn find_header_row(table: &TableCandidate) -> Option<usize> {
    if table.rows.is_empty() {
        return None;
    }

    let thead_rows: Vec<usize> = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.in_header && !row.cells.is_empty())
        .map(|(i, _)| i)
        .collect();

    if let Some(&first) = thead_rows.first() {
        let labelled = thead_rows
            .iter()
            .copied()
            .find(|&i| looks_like_header(&table.rows[i]));
        return Some(labelled.unwrap_or(first));
    }

    let by_vocabulary = table
        .rows
        .iter()
        .take(HEADER_SCAN_ROWS)
        .position(looks_like_header);

    Some(by_vocabulary.unwrap_or(0))
}

fn record_from_row(headers: &[String], row: &TableRow) -> Option<FieldRecord> {
    let populated = row.cells.iter().filter(|c| !c.trim().is_empty()).count();
    if populated < 2 {
        return None;
    }

    let mut record = FieldRecord::new();
    for (label, value) in headers.iter().zip(&row.cells) {
        let value = value.trim();
        if label.is_empty() || EMPTY_MARKERS.contains(&value) {
            continue;
        }
        record.insert(label.as_str(), value);
    }

    for field in TEXT_FIELDS {
        if let Some(value) = record.get_mut(field) {
            *value = normalize_text(value);
        }
    }

    (record.len() >= 2 && record.player().is_some()).then_some(record)
}

/// Turns a classified table into player records keyed by its own header labels.
pub fn extract_records(table: &TableCandidate) -> Vec<FieldRecord> {
    let Some(header_index) = find_header_row(table) else {
        warn!("No rows found in table {}", table.index);
        return Vec::new();
    };

    let headers: Vec<String> = table.rows[header_index]
        .cells
        .iter()
        .map(|cell| cell.trim().to_string())
        .collect();
    info!("Found headers in row {}: {:?}", header_index, headers);

    let mut records = Vec::new();
    for row in &table.rows[header_index + 1..] {
        let Some(record) = record_from_row(&headers, row) else {
            continue;
        };

        if records.len() < 3 {
            debug!(
                "Processed player {}: {} ({})",
                records.len() + 1,
                record.get(PLAYER_FIELD).unwrap_or("Unknown"),
                record.get(TEAM_FIELD).unwrap_or("Unknown"),
            );
        }
        records.push(record);
    }

    info!("Extracted {} players from table {}", records.len(), table.index);
    records
}

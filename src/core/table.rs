use std::collections::HashSet;

use crate::models::{OutputRow, TableRow};

/// Expand output rows to one table row per email.
///
/// A row with no emails still yields one table row with an empty email.
pub fn expand_rows(rows: &[OutputRow]) -> Vec<TableRow> {
    let mut table = Vec::with_capacity(rows.len());

    for row in rows {
        let base = TableRow {
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            street: row.street.clone(),
            city: row.city.clone(),
            dist: row.dist.clone(),
            zip: row.zip.clone(),
            email: String::new(),
            status: row.status.as_str().to_string(),
        };

        if row.emails.is_empty() {
            table.push(base);
            continue;
        }

        for email in &row.emails {
            table.push(TableRow {
                email: email.clone(),
                ..base.clone()
            });
        }
    }

    table
}

/// Blank the identity columns of every row whose identity was already seen.
///
/// Rows are kept; EMAIL and STATUS are untouched. Rows whose identity is
/// already blank count as one key like any other.
pub fn blank_duplicate_identities(rows: &mut [TableRow]) {
    let mut seen: HashSet<[String; 6]> = HashSet::new();

    for row in rows.iter_mut() {
        let key = row.identity_key().map(str::to_string);
        if !seen.insert(key) {
            row.clear_identity();
        }
    }
}

/// Existing rows first, then the expanded new rows, with duplicate identities blanked
pub fn merge_tables(existing: Vec<TableRow>, new_rows: &[OutputRow]) -> Vec<TableRow> {
    let mut merged = existing;
    merged.extend(expand_rows(new_rows));
    blank_duplicate_identities(&mut merged);
    merged
}

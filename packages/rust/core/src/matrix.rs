//! Tabular rendering of the assignment matrix.
//!
//! Rows come out ready for a slide deck: an optional row of full CR titles,
//! a `NAME` header row of `CR <id>` labels, then one row per roster person
//! with `X` marking presence.

use std::collections::BTreeSet;

use crtrack_shared::{CrId, CrRegistry};

use crate::assignments::AssignmentMatrix;

/// Placeholder title for CRs found only in status files.
pub const DISCOVERED_TITLE: &str = "[Found in status emails]";

const PRESENT_MARK: &str = "X";
const ABSENT_MARK: &str = " ";

/// Build the table rows for the matrix CSV.
pub fn matrix_rows(
    matrix: &AssignmentMatrix,
    registry: &CrRegistry,
    new_crs: &BTreeSet<CrId>,
    titles_row: bool,
) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(matrix.rows().len() + 2);

    if titles_row {
        let mut titles = vec![String::new()];
        titles.extend(
            matrix
                .columns()
                .iter()
                .map(|cr| column_title(cr, registry, new_crs)),
        );
        rows.push(titles);
    }

    let mut header = vec!["NAME".to_string()];
    header.extend(matrix.columns().iter().map(CrId::label));
    rows.push(header);

    for (person, cells) in matrix.rows() {
        let mut row = vec![person.clone()];
        row.extend(matrix.columns().iter().map(|cr| {
            let mark = if cells.get(cr).copied().unwrap_or(false) {
                PRESENT_MARK
            } else {
                ABSENT_MARK
            };
            mark.to_string()
        }));
        rows.push(row);
    }

    rows
}

/// Full title cell for one column.
fn column_title(cr: &CrId, registry: &CrRegistry, new_crs: &BTreeSet<CrId>) -> String {
    if new_crs.contains(cr) {
        return format!("{} {DISCOVERED_TITLE}", cr.label());
    }
    match registry.title(cr) {
        Some(title) => format!("{} {title}", cr.label()),
        None => cr.label(),
    }
}

/// Encode rows as CSV with `\r\n` line endings.
pub fn to_csv(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        let line = row
            .iter()
            .map(|field| escape_field(field))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push_str("\r\n");
    }
    out
}

/// Quote a field when it holds a delimiter, quote, or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

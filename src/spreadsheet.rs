use crate::document::SpreadsheetDoc;
use crate::error::{ReconcileError, Result};
use crate::schema::{ColumnSpec, RawRow};
use log::debug;

/// Extract raw schedule rows from the first worksheet of a spreadsheet
/// document.
///
/// Every header named by the `ColumnSpec` must be present; otherwise the
/// whole document is rejected with a `MissingColumn` error naming each
/// absent column. The optional percent column is looked up but never
/// required. Cells in numeric slots are taken as stated on the sheet.
pub fn extract_rows(doc: &SpreadsheetDoc, spec: &ColumnSpec) -> Result<Vec<RawRow>> {
    let missing: Vec<String> = spec
        .required_headers()
        .into_iter()
        .filter(|h| doc.column_index(h).is_none())
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(ReconcileError::MissingColumn {
            document: doc.name.clone(),
            columns: missing,
        });
    }

    let key_idx = spec.key.as_deref().and_then(|h| doc.column_index(h));
    let previous_idx = doc
        .column_index(&spec.previous)
        .expect("required column verified above");
    let completed_idx = doc
        .column_index(&spec.completed)
        .expect("required column verified above");
    let this_period_idx = spec
        .this_period
        .as_deref()
        .and_then(|h| doc.column_index(h));
    let percent_idx = spec.percent.as_deref().and_then(|h| doc.column_index(h));

    let mut rows = Vec::with_capacity(doc.rows.len());
    for (line_no, cells) in doc.rows.iter().enumerate() {
        let key = key_idx
            .and_then(|idx| cells.get(idx))
            .and_then(|cell| cell.as_text())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| format!("Line {}", line_no + 1));

        rows.push(RawRow {
            key,
            previous_billed: cells.get(previous_idx).and_then(|c| c.as_number()),
            this_period_billed: this_period_idx
                .and_then(|idx| cells.get(idx))
                .and_then(|c| c.as_number()),
            completed_to_date: cells.get(completed_idx).and_then(|c| c.as_number()),
            percent_complete: percent_idx
                .and_then(|idx| cells.get(idx))
                .and_then(|c| c.as_number()),
            section: None,
        });
    }

    debug!(
        "extracted {} raw row(s) from spreadsheet '{}'",
        rows.len(),
        doc.name
    );
    Ok(rows)
}

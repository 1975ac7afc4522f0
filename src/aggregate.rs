use crate::schema::{ScheduleRow, ScheduleTable};
use indexmap::IndexMap;
use log::debug;

#[derive(Default)]
struct SectionAccumulator {
    previous_billed: f64,
    this_period_billed: f64,
    completed_to_date: f64,
    percent_sum: f64,
    percent_count: usize,
}

impl SectionAccumulator {
    fn add(&mut self, row: &ScheduleRow) {
        self.previous_billed += row.previous_billed;
        self.this_period_billed += row.this_period_billed;
        self.completed_to_date += row.completed_to_date;
        if let Some(pct) = row.percent_complete {
            self.percent_sum += pct;
            self.percent_count += 1;
        }
    }

    fn into_row(self, key: String) -> ScheduleRow {
        let percent_complete = (self.percent_count > 0)
            .then(|| self.percent_sum / self.percent_count as f64);
        ScheduleRow {
            key,
            previous_billed: self.previous_billed,
            this_period_billed: self.this_period_billed,
            completed_to_date: self.completed_to_date,
            percent_complete,
        }
    }
}

/// Collapse rows to one per distinct key, preserving first-appearance
/// order. Amounts are summed; percent-complete is averaged over the rows
/// that state one, and stays absent when none do. Running this twice gives
/// the same table back.
pub fn collapse_rows(rows: Vec<ScheduleRow>) -> Vec<ScheduleRow> {
    let mut sections: IndexMap<String, SectionAccumulator> = IndexMap::new();
    for row in &rows {
        sections.entry(row.key.clone()).or_default().add(row);
    }
    sections
        .into_iter()
        .map(|(key, accum)| accum.into_row(key))
        .collect()
}

/// Table-level view of [`collapse_rows`]; period, source, and drop count
/// carry through unchanged.
pub fn collapse_table(table: ScheduleTable) -> ScheduleTable {
    let before = table.rows.len();
    let rows = collapse_rows(table.rows);
    debug!(
        "collapsed '{}': {} row(s) into {} section subtotal(s)",
        table.document_name,
        before,
        rows.len()
    );
    ScheduleTable { rows, ..table }
}

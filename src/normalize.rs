use crate::schema::{RawRow, RequiredFields, ScheduleRow};
use log::{debug, warn};

/// Validate extracted rows into canonical schedule rows.
///
/// A row missing any required numeric field is dropped and counted, never
/// defaulted. Percent-complete absence is always tolerated. This-period
/// normalizes to 0.0 only when the use case declares it optional, in which
/// case no downstream formula reads it.
pub fn normalize(
    document: &str,
    raw_rows: Vec<RawRow>,
    required: RequiredFields,
) -> (Vec<ScheduleRow>, usize) {
    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut dropped = 0usize;

    for raw in raw_rows {
        let missing = missing_fields(&raw, required);
        if !missing.is_empty() {
            warn!(
                "dropping row '{}' from '{}': missing {}",
                raw.key,
                document,
                missing.join(", ")
            );
            dropped += 1;
            continue;
        }

        rows.push(ScheduleRow {
            key: raw.key,
            previous_billed: raw.previous_billed.expect("presence verified above"),
            this_period_billed: raw.this_period_billed.unwrap_or(0.0),
            completed_to_date: raw.completed_to_date.expect("presence verified above"),
            percent_complete: raw.percent_complete,
        });
    }

    debug!(
        "normalized '{}': {} row(s) kept, {} dropped",
        document,
        rows.len(),
        dropped
    );
    (rows, dropped)
}

fn missing_fields(raw: &RawRow, required: RequiredFields) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if raw.previous_billed.is_none() {
        missing.push("previous billed");
    }
    if required.this_period && raw.this_period_billed.is_none() {
        missing.push("this period billed");
    }
    if raw.completed_to_date.is_none() {
        missing.push("completed to date");
    }
    missing
}

use crate::aggregate::collapse_rows;
use crate::schema::{ReconcileMode, ReconciliationRecord, ScheduleRow, ScheduleTable};
use indexmap::IndexMap;
use log::debug;

/// Absolute tolerance, in currency units, for the whole-document total
/// check. Carried-forward totals on real pay applications drift by
/// sub-cent rounding, so anything within a cent is a match.
pub const DOCUMENT_TOTAL_TOLERANCE: f64 = 0.01;

/// Key used for the single record produced in document-total mode.
pub const TOTAL_KEY: &str = "TOTAL";

/// Compare two periods' schedule tables at the requested granularity.
///
/// Document-total mode checks the previous document's completed-to-date
/// total against the current document's previous-billed total within
/// [`DOCUMENT_TOTAL_TOLERANCE`]. Line-item and section-subtotal modes run
/// a full outer join by key; duplicate keys within one table are merged by
/// summation before joining, which in section mode collapses rows into
/// per-section subtotals.
pub fn reconcile(
    previous: &ScheduleTable,
    current: &ScheduleTable,
    mode: ReconcileMode,
) -> Vec<ReconciliationRecord> {
    let records = match mode {
        ReconcileMode::DocumentTotal => vec![reconcile_totals(previous, current)],
        ReconcileMode::LineItem | ReconcileMode::SectionSubtotal => join_rows(
            &collapse_rows(previous.rows.clone()),
            &collapse_rows(current.rows.clone()),
        ),
    };

    debug!(
        "reconciled '{}' against '{}' ({mode:?}): {} record(s), {} mismatch(es)",
        previous.document_name,
        current.document_name,
        records.len(),
        records.iter().filter(|r| r.is_mismatch()).count()
    );
    records
}

fn reconcile_totals(previous: &ScheduleTable, current: &ScheduleTable) -> ReconciliationRecord {
    let prev_total = previous.total_completed_to_date();
    let curr_total = current.total_previous_billed();
    ReconciliationRecord {
        key: TOTAL_KEY.to_string(),
        previous_period_value: Some(prev_total),
        current_period_value: Some(curr_total),
        amount_mismatch: (prev_total - curr_total).abs() > DOCUMENT_TOTAL_TOLERANCE,
        percent_mismatch: false,
    }
}

/// Full outer join on row key. Output preserves previous-table key order,
/// then current-only keys in current-table order.
fn join_rows(previous: &[ScheduleRow], current: &[ScheduleRow]) -> Vec<ReconciliationRecord> {
    let prev_by_key: IndexMap<&str, &ScheduleRow> =
        previous.iter().map(|r| (r.key.as_str(), r)).collect();
    let curr_by_key: IndexMap<&str, &ScheduleRow> =
        current.iter().map(|r| (r.key.as_str(), r)).collect();

    let mut records = Vec::with_capacity(prev_by_key.len() + curr_by_key.len());
    for (key, prev) in &prev_by_key {
        records.push(record_for(key, Some(*prev), curr_by_key.get(key).copied()));
    }
    for (key, curr) in &curr_by_key {
        if !prev_by_key.contains_key(key) {
            records.push(record_for(key, None, Some(*curr)));
        }
    }
    records
}

fn record_for(
    key: &str,
    prev: Option<&ScheduleRow>,
    curr: Option<&ScheduleRow>,
) -> ReconciliationRecord {
    // The amount check validates the current document's own arithmetic
    // against the previous period's billed amount as the carried-forward
    // baseline, exactly as stated on the documents.
    let amount_mismatch = match (prev, curr) {
        (Some(p), Some(c)) => p.previous_billed + c.this_period_billed != c.completed_to_date,
        _ => true,
    };

    let percent_mismatch = match (
        prev.and_then(|p| p.percent_complete),
        curr.and_then(|c| c.percent_complete),
    ) {
        (None, None) => false,
        (Some(a), Some(b)) => a != b,
        _ => true,
    };

    ReconciliationRecord {
        key: key.to_string(),
        previous_period_value: prev.map(|p| p.completed_to_date),
        current_period_value: curr.map(|c| c.previous_billed),
        amount_mismatch,
        percent_mismatch,
    }
}

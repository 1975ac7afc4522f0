use serde::{Deserialize, Serialize};

/// Which billing period a document belongs to within a reconciliation pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    Previous,
    Current,
}

/// How the schedule-of-values table was obtained from the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Spreadsheet,
    PageText,
}

/// Granularity at which two periods' tables are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileMode {
    /// Compare the previous document's total completed-to-date against the
    /// current document's total previous-billed, with a 0.01 tolerance.
    DocumentTotal,
    /// Full outer join of line items by description.
    LineItem,
    /// Line-item algorithm over per-section aggregates.
    SectionSubtotal,
}

/// One extracted line before validation. Numeric slots that were missing or
/// unparseable in the source stay `None`; the normalizer decides whether
/// that drops the row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub key: String,
    pub previous_billed: Option<f64>,
    pub this_period_billed: Option<f64>,
    pub completed_to_date: Option<f64>,
    pub percent_complete: Option<f64>,
    /// Section tag assigned by the page-text section heuristic, when running
    /// in section-subtotal mode.
    pub section: Option<String>,
}

/// One validated line item or section subtotal from a pay application.
///
/// `completed_to_date` is carried verbatim from the source document. It is
/// never recomputed as `previous_billed + this_period_billed`; the stated
/// value is exactly what reconciliation checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub key: String,
    pub previous_billed: f64,
    pub this_period_billed: f64,
    pub completed_to_date: f64,
    pub percent_complete: Option<f64>,
}

/// Ordered schedule-of-values table for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleTable {
    pub period: Period,
    pub source: SourceKind,
    pub document_name: String,
    pub rows: Vec<ScheduleRow>,
    /// Rows discarded during normalization for missing required fields.
    pub dropped_rows: usize,
}

impl ScheduleTable {
    pub fn total_previous_billed(&self) -> f64 {
        self.rows.iter().map(|r| r.previous_billed).sum()
    }

    pub fn total_completed_to_date(&self) -> f64 {
        self.rows.iter().map(|r| r.completed_to_date).sum()
    }
}

/// Outcome of comparing one key across the two periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRecord {
    pub key: String,
    pub previous_period_value: Option<f64>,
    pub current_period_value: Option<f64>,
    pub amount_mismatch: bool,
    pub percent_mismatch: bool,
}

impl ReconciliationRecord {
    pub fn is_mismatch(&self) -> bool {
        self.amount_mismatch || self.percent_mismatch
    }
}

/// Numeric slots the normalizer demands per use case. Previous-billed and
/// completed-to-date are always required; this-period is additionally
/// required whenever a comparison formula will read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredFields {
    pub this_period: bool,
}

impl RequiredFields {
    pub fn for_mode(mode: ReconcileMode) -> Self {
        Self {
            this_period: mode != ReconcileMode::DocumentTotal,
        }
    }
}

/// Required spreadsheet column headers for one extraction use case.
///
/// Header matching is exact. Optional slots (`this_period`, `percent`) are
/// only looked up when declared; a declared column that is absent from the
/// sheet is a hard per-document failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column holding the matching key. `None` synthesizes a key from the
    /// row position (whole-document totals do not match by key).
    pub key: Option<String>,
    pub previous: String,
    pub this_period: Option<String>,
    pub completed: String,
    pub percent: Option<String>,
}

impl ColumnSpec {
    /// Columns for whole-document total checks, matching the G703 header
    /// wording used on exported pay applications.
    pub fn document_total() -> Self {
        Self {
            key: None,
            previous: "Previous Amount Billed".to_string(),
            this_period: None,
            completed: "Total Completed to Date".to_string(),
            percent: None,
        }
    }

    pub fn line_item() -> Self {
        Self {
            key: Some("Description".to_string()),
            previous: "Previous".to_string(),
            this_period: Some("This Period".to_string()),
            completed: "Total".to_string(),
            percent: Some("% Complete".to_string()),
        }
    }

    pub fn section_subtotal() -> Self {
        Self {
            key: Some("Section".to_string()),
            ..Self::line_item()
        }
    }

    pub fn for_mode(mode: ReconcileMode) -> Self {
        match mode {
            ReconcileMode::DocumentTotal => Self::document_total(),
            ReconcileMode::LineItem => Self::line_item(),
            ReconcileMode::SectionSubtotal => Self::section_subtotal(),
        }
    }

    /// Header names that must be present in the sheet for this use case.
    pub fn required_headers(&self) -> Vec<&str> {
        let mut headers = Vec::new();
        if let Some(key) = &self.key {
            headers.push(key.as_str());
        }
        headers.push(self.previous.as_str());
        if let Some(this_period) = &self.this_period {
            headers.push(this_period.as_str());
        }
        headers.push(self.completed.as_str());
        headers
    }
}

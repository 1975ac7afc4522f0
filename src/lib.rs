//! # Pay Application Reconciler
//!
//! A library for reconciling construction pay applications (AIA G702/G703
//! forms) across successive billing periods. Amounts reported as already
//! billed in the current period's document are checked against amounts
//! reported as completed to date in the previous period's document.
//!
//! ## Core Concepts
//!
//! - **Schedule of values**: the line-item breakdown of contract value by
//!   work category, with cumulative billing columns.
//! - **Completed to date**: cumulative amount billed through the current
//!   period, per line item or in total.
//! - **Previous amount billed**: cumulative amount billed through the
//!   prior period, carried forward as this period's starting baseline.
//! - **Reconcile mode**: granularity of the comparison. Whole-document
//!   totals, per-line-item, or per-section subtotals.
//!
//! Documents arrive as named binary blobs with a declared media type.
//! Spreadsheets are read as a header-row grid; PDFs and plain text go
//! through heuristic page-text extraction.
//!
//! ## Example
//!
//! ```rust,ignore
//! use payapp_reconciler::*;
//!
//! let previous = UploadedDocument::from_path("payapp-03.xlsx")?;
//! let current = UploadedDocument::from_path("payapp-04.xlsx")?;
//!
//! let report = ReconciliationProcessor::new(ReconcileMode::DocumentTotal)
//!     .run(vec![previous], vec![current])?;
//!
//! for pair in &report.pairs {
//!     println!("{}", report::format_records(&pair.records));
//! }
//! ```

pub mod aggregate;
pub mod document;
pub mod error;
pub mod normalize;
pub mod page_text;
pub mod readers;
pub mod reconcile;
pub mod report;
pub mod schema;
pub mod spreadsheet;

#[cfg(feature = "advisory")]
pub mod advisory;

#[cfg(feature = "advisory")]
pub use advisory::AdvisoryClient;
pub use document::{Document, UploadedDocument};
pub use error::{ReconcileError, Result};
pub use page_text::PageTextStrategy;
pub use reconcile::{reconcile as reconcile_tables, DOCUMENT_TOTAL_TOLERANCE, TOTAL_KEY};
pub use schema::*;

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Outcome of one previous/current document pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairOutcome {
    pub previous_document: String,
    pub current_document: String,
    pub records: Vec<ReconciliationRecord>,
    /// Present when a document-scoped failure aborted this pair.
    pub error: Option<String>,
}

impl PairOutcome {
    pub fn mismatch_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_mismatch()).count()
    }
}

/// Result of reconciling a whole batch of document pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub mode: ReconcileMode,
    pub pairs: Vec<PairOutcome>,
    /// Free-text advisory commentary on the mismatches, when an advisory
    /// client was configured and reachable.
    pub advisory_summary: Option<String>,
}

impl BatchReport {
    /// All records across pairs, in pair order.
    pub fn records(&self) -> impl Iterator<Item = &ReconciliationRecord> {
        self.pairs.iter().flat_map(|p| p.records.iter())
    }
}

/// Batch driver: decodes each document pair, extracts and normalizes both
/// schedule tables, and reconciles them at the configured granularity.
pub struct ReconciliationProcessor {
    mode: ReconcileMode,
    strategy: PageTextStrategy,
    #[cfg(feature = "advisory")]
    advisory: Option<AdvisoryClient>,
}

impl ReconciliationProcessor {
    pub fn new(mode: ReconcileMode) -> Self {
        Self {
            mode,
            strategy: PageTextStrategy::Positional,
            #[cfg(feature = "advisory")]
            advisory: None,
        }
    }

    /// Choose how page-text documents are parsed. Spreadsheets are
    /// unaffected.
    pub fn with_page_text_strategy(mut self, strategy: PageTextStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Attach an advisory client; mismatch summaries stay best-effort and
    /// never fail the run.
    #[cfg(feature = "advisory")]
    pub fn with_advisory(mut self, client: AdvisoryClient) -> Self {
        self.advisory = Some(client);
        self
    }

    /// Reconcile previous/current document lists pairwise, in order.
    ///
    /// The lists must have equal length; a mismatch fails the whole batch
    /// before any extraction. Document-scoped failures abort only their
    /// own pair and are recorded on its outcome.
    pub fn run(
        &self,
        previous: Vec<UploadedDocument>,
        current: Vec<UploadedDocument>,
    ) -> Result<BatchReport> {
        if previous.len() != current.len() {
            return Err(ReconcileError::BatchCountMismatch {
                previous: previous.len(),
                current: current.len(),
            });
        }

        info!(
            "reconciling {} document pair(s) in {:?} mode",
            previous.len(),
            self.mode
        );

        let mut pairs = Vec::with_capacity(previous.len());
        for (prev_upload, curr_upload) in previous.iter().zip(&current) {
            let outcome = match self.reconcile_pair(prev_upload, curr_upload) {
                Ok(records) => PairOutcome {
                    previous_document: prev_upload.name.clone(),
                    current_document: curr_upload.name.clone(),
                    records,
                    error: None,
                },
                Err(err) if err.is_document_scoped() => {
                    warn!(
                        "skipping pair '{}' / '{}': {err}",
                        prev_upload.name, curr_upload.name
                    );
                    PairOutcome {
                        previous_document: prev_upload.name.clone(),
                        current_document: curr_upload.name.clone(),
                        records: Vec::new(),
                        error: Some(err.to_string()),
                    }
                }
                Err(err) => return Err(err),
            };
            pairs.push(outcome);
        }

        let advisory_summary = self.summarize(&pairs);
        Ok(BatchReport {
            mode: self.mode,
            pairs,
            advisory_summary,
        })
    }

    fn reconcile_pair(
        &self,
        prev_upload: &UploadedDocument,
        curr_upload: &UploadedDocument,
    ) -> Result<Vec<ReconciliationRecord>> {
        let previous = self.extract_table(prev_upload, Period::Previous)?;
        let current = self.extract_table(curr_upload, Period::Current)?;
        Ok(reconcile::reconcile(&previous, &current, self.mode))
    }

    fn extract_table(&self, upload: &UploadedDocument, period: Period) -> Result<ScheduleTable> {
        let document = readers::decode(upload)?;
        let source = document.source_kind();

        let raw_rows = match &document {
            Document::Spreadsheet(doc) => {
                spreadsheet::extract_rows(doc, &ColumnSpec::for_mode(self.mode))?
            }
            Document::PageText(doc) => page_text::extract_rows(
                doc,
                self.strategy,
                self.mode == ReconcileMode::SectionSubtotal,
            ),
        };

        let (rows, dropped_rows) = normalize::normalize(
            document.name(),
            raw_rows,
            RequiredFields::for_mode(self.mode),
        );

        Ok(ScheduleTable {
            period,
            source,
            document_name: document.name().to_string(),
            rows,
            dropped_rows,
        })
    }

    #[cfg(feature = "advisory")]
    fn summarize(&self, pairs: &[PairOutcome]) -> Option<String> {
        let client = self.advisory.as_ref()?;
        let records: Vec<ReconciliationRecord> = pairs
            .iter()
            .flat_map(|p| p.records.iter().cloned())
            .collect();
        match report::advisory_summary(client, &records) {
            Ok(summary) => summary,
            Err(err) => {
                warn!("advisory summary unavailable: {err}");
                None
            }
        }
    }

    #[cfg(not(feature = "advisory"))]
    fn summarize(&self, _pairs: &[PairOutcome]) -> Option<String> {
        None
    }
}

/// Convenience wrapper over [`ReconciliationProcessor`] with default
/// settings.
pub fn reconcile_batch(
    previous: Vec<UploadedDocument>,
    current: Vec<UploadedDocument>,
    mode: ReconcileMode,
) -> Result<BatchReport> {
    ReconciliationProcessor::new(mode).run(previous, current)
}

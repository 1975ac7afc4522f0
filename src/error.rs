use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("document '{document}' is missing required column(s): {}", .columns.join(", "))]
    MissingColumn {
        document: String,
        columns: Vec<String>,
    },

    #[error("unsupported media type '{media_type}' for document '{document}'")]
    UnsupportedMediaType {
        document: String,
        media_type: String,
    },

    #[error("failed to extract document '{document}': {details}")]
    Extraction { document: String, details: String },

    #[error("batch count mismatch: {previous} previous document(s) vs {current} current document(s)")]
    BatchCountMismatch { previous: usize, current: usize },

    #[error("advisory summary unavailable: {0}")]
    AdvisoryUnavailable(String),

    #[error("export error: {0}")]
    Export(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReconcileError {
    /// True for errors that abort a single document's pipeline without
    /// invalidating the rest of a batch.
    pub fn is_document_scoped(&self) -> bool {
        matches!(
            self,
            ReconcileError::MissingColumn { .. }
                | ReconcileError::UnsupportedMediaType { .. }
                | ReconcileError::Extraction { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;

use crate::error::{ReconcileError, Result};
use crate::schema::SourceKind;
use std::path::Path;

/// Declared media types accepted per upload slot.
pub mod media {
    pub const XLSX: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
    pub const PDF: &str = "application/pdf";
    pub const TEXT: &str = "text/plain";
}

/// A named binary blob with a declared media type, as handed over by the
/// upload surface.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a document from disk, inferring the media type from the file
    /// extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        let bytes = std::fs::read(path)?;
        Ok(Self {
            name,
            media_type,
            bytes,
        })
    }
}

/// One cell of a decoded spreadsheet grid.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// Numeric view of the cell. Text cells are parsed after stripping
    /// currency symbols and thousands separators, since exported sheets
    /// sometimes store formatted amounts as strings.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => parse_amount(s),
            Cell::Empty => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// First worksheet of a spreadsheet document: a header row plus data rows.
#[derive(Debug, Clone)]
pub struct SpreadsheetDoc {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SpreadsheetDoc {
    /// Index of a header column by exact name.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.header.iter().position(|h| h == header)
    }
}

/// Text lines per page, as produced by the underlying document reader.
#[derive(Debug, Clone)]
pub struct PageTextDoc {
    pub name: String,
    pub pages: Vec<Vec<String>>,
}

impl PageTextDoc {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flatten().map(String::as_str)
    }
}

/// A decoded document, ready for table extraction.
#[derive(Debug, Clone)]
pub enum Document {
    Spreadsheet(SpreadsheetDoc),
    PageText(PageTextDoc),
}

impl Document {
    pub fn name(&self) -> &str {
        match self {
            Document::Spreadsheet(doc) => &doc.name,
            Document::PageText(doc) => &doc.name,
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        match self {
            Document::Spreadsheet(_) => SourceKind::Spreadsheet,
            Document::PageText(_) => SourceKind::PageText,
        }
    }
}

pub(crate) fn extraction_error(document: &str, details: impl ToString) -> ReconcileError {
    ReconcileError::Extraction {
        document: document.to_string(),
        details: details.to_string(),
    }
}

/// Parse a monetary or percentage amount out of a field substring.
///
/// Thousands separators, currency symbols, and percent signs are stripped
/// before parsing. Returns `None` when nothing numeric remains.
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '%' | ' ' | '\t'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

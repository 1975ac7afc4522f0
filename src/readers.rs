use crate::document::{
    extraction_error, media, Cell, Document, PageTextDoc, SpreadsheetDoc, UploadedDocument,
};
use crate::error::{ReconcileError, Result};
use calamine::{Data, Reader, Xlsx};
use log::debug;
use std::io::Cursor;
use std::path::Path;

/// Decode an uploaded document according to its declared media type.
///
/// Spreadsheets go through the grid reader, PDFs through per-page text
/// extraction, and plain text is treated as pre-extracted page text with
/// pages split on form feeds. Any other media type is rejected.
pub fn decode(upload: &UploadedDocument) -> Result<Document> {
    match upload.media_type.as_str() {
        media::XLSX => decode_spreadsheet(upload).map(Document::Spreadsheet),
        media::PDF => decode_pdf(upload).map(Document::PageText),
        media::TEXT => Ok(Document::PageText(decode_plain_text(upload))),
        other => Err(ReconcileError::UnsupportedMediaType {
            document: upload.name.clone(),
            media_type: other.to_string(),
        }),
    }
}

/// Read and decode a document from disk in one step.
pub fn load_path(path: impl AsRef<Path>) -> Result<Document> {
    decode(&UploadedDocument::from_path(path)?)
}

fn decode_spreadsheet(upload: &UploadedDocument) -> Result<SpreadsheetDoc> {
    let cursor = Cursor::new(upload.bytes.as_slice());
    let mut workbook: Xlsx<_> =
        Xlsx::new(cursor).map_err(|e| extraction_error(&upload.name, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| extraction_error(&upload.name, "workbook has no worksheets"))?
        .map_err(|e| extraction_error(&upload.name, e))?;

    let mut rows_iter = range.rows();
    let header: Vec<String> = rows_iter
        .next()
        .map(|row| row.iter().map(header_text).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<Cell>> = rows_iter
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    debug!(
        "decoded spreadsheet '{}': {} column(s), {} data row(s)",
        upload.name,
        header.len(),
        rows.len()
    );
    Ok(SpreadsheetDoc {
        name: upload.name.clone(),
        header,
        rows,
    })
}

fn header_text(data: &Data) -> String {
    data.to_string().trim().to_string()
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("{e:?}")),
    }
}

fn decode_pdf(upload: &UploadedDocument) -> Result<PageTextDoc> {
    let pdf = lopdf::Document::load_mem(&upload.bytes)
        .map_err(|e| extraction_error(&upload.name, e))?;

    let mut pages = Vec::new();
    for page_number in pdf.get_pages().keys() {
        let text = pdf
            .extract_text(&[*page_number])
            .map_err(|e| extraction_error(&upload.name, e))?;
        pages.push(text.lines().map(str::to_string).collect());
    }

    debug!("decoded PDF '{}': {} page(s)", upload.name, pages.len());
    Ok(PageTextDoc {
        name: upload.name.clone(),
        pages,
    })
}

fn decode_plain_text(upload: &UploadedDocument) -> PageTextDoc {
    let text = String::from_utf8_lossy(&upload.bytes);
    let pages = text
        .split('\u{c}')
        .map(|page| page.lines().map(str::to_string).collect())
        .collect();
    PageTextDoc {
        name: upload.name.clone(),
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SourceKind;

    #[test]
    fn test_plain_text_pages_split_on_form_feed() {
        let upload = UploadedDocument::new(
            "payapp.txt",
            media::TEXT,
            b"Mobilization 500.00 100.00 600.00\nConcrete 1.00 2.00 3.00\x0cSecond page line".to_vec(),
        );

        let document = decode(&upload).unwrap();
        assert_eq!(document.source_kind(), SourceKind::PageText);
        match document {
            Document::PageText(doc) => {
                assert_eq!(doc.pages.len(), 2);
                assert_eq!(doc.pages[0].len(), 2);
                assert_eq!(doc.pages[1], vec!["Second page line".to_string()]);
            }
            other => panic!("expected page text, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_media_type_is_rejected() {
        let upload = UploadedDocument::new("photo.png", "image/png", vec![1, 2, 3]);

        let err = decode(&upload).unwrap_err();
        match err {
            ReconcileError::UnsupportedMediaType {
                document,
                media_type,
            } => {
                assert_eq!(document, "photo.png");
                assert_eq!(media_type, "image/png");
            }
            other => panic!("expected UnsupportedMediaType, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_spreadsheet_is_a_document_scoped_error() {
        let upload = UploadedDocument::new(
            "broken.xlsx",
            media::XLSX,
            b"this is not a zip archive".to_vec(),
        );

        let err = decode(&upload).unwrap_err();
        assert!(err.is_document_scoped());
        assert!(matches!(err, ReconcileError::Extraction { .. }));
    }

    #[test]
    fn test_corrupt_pdf_is_a_document_scoped_error() {
        let upload = UploadedDocument::new("broken.pdf", media::PDF, b"%PDF-????".to_vec());

        let err = decode(&upload).unwrap_err();
        assert!(err.is_document_scoped());
    }
}

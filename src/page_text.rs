use crate::document::{parse_amount, PageTextDoc};
use crate::schema::RawRow;
use log::debug;
use regex::Regex;

/// How numeric fields are located within a page's text lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTextStrategy {
    /// Take every numeric literal on a line in order: previous, this period,
    /// completed to date, then percent complete when a fourth is present.
    Positional,
    /// Locate column header markers on each page and slice every following
    /// line at the markers' character offsets.
    HeaderAnchored,
}

/// Minimum numeric tokens for a line to qualify as a data row under the
/// positional strategy. Fewer means the line is a label or header.
const MIN_DATA_TOKENS: usize = 3;

/// Heuristic description keys are capped at this many characters.
const KEY_PREFIX_LEN: usize = 50;

/// Section tag for data rows seen before any section header.
pub const UNSPECIFIED_SECTION: &str = "Unspecified";

const NUMERIC_PATTERN: &str = r"[-+]?\d+(?:\.\d+)?";

/// Extract raw schedule rows from per-page text lines.
///
/// Lines the heuristics cannot read are skipped, never an error; reader
/// failures are surfaced before this point. When `section_mode` is set,
/// each data row's key is the most recently seen section header so that
/// aggregation collapses rows per section.
pub fn extract_rows(
    doc: &PageTextDoc,
    strategy: PageTextStrategy,
    section_mode: bool,
) -> Vec<RawRow> {
    let rows = match strategy {
        PageTextStrategy::Positional => extract_positional(doc, section_mode),
        PageTextStrategy::HeaderAnchored => extract_header_anchored(doc, section_mode),
    };
    debug!(
        "extracted {} raw row(s) from page text '{}' via {:?}",
        rows.len(),
        doc.name,
        strategy
    );
    rows
}

fn extract_positional(doc: &PageTextDoc, section_mode: bool) -> Vec<RawRow> {
    let numeric = Regex::new(NUMERIC_PATTERN).expect("numeric pattern compiles");
    let mut rows = Vec::new();
    // Section state carries across pages within one document.
    let mut section: Option<String> = None;

    for line in doc.lines() {
        let cleaned = strip_amount_noise(line);
        let tokens: Vec<f64> = numeric
            .find_iter(&cleaned)
            .filter_map(|m| m.as_str().parse::<f64>().ok())
            .collect();

        if tokens.len() >= MIN_DATA_TOKENS {
            let tag = current_section(&section);
            let key = if section_mode {
                tag.clone()
            } else {
                description_key(line)
            };
            rows.push(RawRow {
                key,
                previous_billed: Some(tokens[0]),
                this_period_billed: Some(tokens[1]),
                completed_to_date: Some(tokens[2]),
                percent_complete: tokens.get(3).copied(),
                section: section_mode.then_some(tag),
            });
        } else if section_mode && is_section_header(line) {
            section = Some(line.trim().to_string());
        }
    }

    rows
}

fn extract_header_anchored(doc: &PageTextDoc, section_mode: bool) -> Vec<RawRow> {
    let mut rows = Vec::new();
    let mut section: Option<String> = None;

    for page in &doc.pages {
        let Some((header_idx, markers)) = find_header_markers(page) else {
            continue;
        };

        for line in &page[header_idx + 1..] {
            if section_mode && is_section_header(line) {
                section = Some(line.trim().to_string());
                continue;
            }

            let mut row = RawRow::default();
            let chars: Vec<char> = line.chars().collect();
            for (idx, marker) in markers.iter().enumerate() {
                let start = marker.offset;
                let end = markers
                    .get(idx + 1)
                    .map(|next| next.offset)
                    .unwrap_or(chars.len());
                let field = slice_chars(&chars, start, end);
                let value = parse_amount(&field);
                match marker.field {
                    Field::Previous => row.previous_billed = value,
                    Field::ThisPeriod => row.this_period_billed = value,
                    Field::Completed => row.completed_to_date = value,
                    Field::Percent => row.percent_complete = value,
                }
            }

            // Nothing parsed on any field: a label line, not a data row.
            if row.previous_billed.is_none()
                && row.this_period_billed.is_none()
                && row.completed_to_date.is_none()
                && row.percent_complete.is_none()
            {
                continue;
            }

            let first_offset = markers.first().map(|m| m.offset).unwrap_or(0);
            let tag = current_section(&section);
            row.key = if section_mode {
                tag.clone()
            } else {
                description_key(&slice_chars(&chars, 0, first_offset))
            };
            row.section = section_mode.then_some(tag);
            rows.push(row);
        }
    }

    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Previous,
    ThisPeriod,
    Completed,
    Percent,
}

struct Marker {
    field: Field,
    offset: usize,
}

/// Find the first line of a page containing both a "previous" and a
/// "completed" marker. Returns the line index and the recognized markers
/// ordered by character column offset.
fn find_header_markers(page: &[String]) -> Option<(usize, Vec<Marker>)> {
    for (idx, line) in page.iter().enumerate() {
        let lower = lower_ascii(line);
        let previous = char_offset(&lower, "previous");
        let completed = char_offset(&lower, "completed");
        let (Some(previous), Some(completed)) = (previous, completed) else {
            continue;
        };

        let mut markers = vec![
            Marker {
                field: Field::Previous,
                offset: previous,
            },
            Marker {
                field: Field::Completed,
                offset: completed,
            },
        ];
        if let Some(offset) = char_offset(&lower, "this period") {
            markers.push(Marker {
                field: Field::ThisPeriod,
                offset,
            });
        }
        if let Some(offset) = char_offset(&lower, "%").or_else(|| char_offset(&lower, "percent")) {
            markers.push(Marker {
                field: Field::Percent,
                offset,
            });
        }
        markers.sort_by_key(|m| m.offset);
        return Some((idx, markers));
    }
    None
}

/// A line that is entirely upper-case with at most 5 whitespace-separated
/// tokens is treated as a section header.
fn is_section_header(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.split_whitespace().count() > 5 {
        return false;
    }
    let mut has_alpha = false;
    for c in trimmed.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if c.is_lowercase() {
                return false;
            }
        }
    }
    has_alpha
}

fn current_section(section: &Option<String>) -> String {
    section
        .clone()
        .unwrap_or_else(|| UNSPECIFIED_SECTION.to_string())
}

/// Heuristic description key: the line with all digit characters removed,
/// trimmed and truncated to a bounded prefix.
fn description_key(line: &str) -> String {
    let stripped: String = line.chars().filter(|c| !c.is_ascii_digit()).collect();
    stripped.trim().chars().take(KEY_PREFIX_LEN).collect()
}

fn strip_amount_noise(line: &str) -> String {
    line.chars()
        .filter(|c| !matches!(c, ',' | '$' | '%'))
        .collect()
}

fn lower_ascii(line: &str) -> String {
    line.to_lowercase()
}

fn char_offset(haystack: &str, needle: &str) -> Option<usize> {
    let byte_offset = haystack.find(needle)?;
    Some(haystack[..byte_offset].chars().count())
}

fn slice_chars(chars: &[char], start: usize, end: usize) -> String {
    let start = start.min(chars.len());
    let end = end.min(chars.len());
    chars[start..end].iter().collect()
}

use crate::error::Result;
use crate::schema::ReconciliationRecord;
use std::io::Write;

/// Mismatch records are sent to the advisory collaborator in groups of
/// this size, one call per group.
pub const EXCERPT_CHUNK_SIZE: usize = 50;

/// Format a currency amount for human display: two decimal places with
/// thousands separators.
pub fn format_amount(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{frac:02}")
}

fn display_value(value: Option<f64>) -> String {
    value.map(format_amount).unwrap_or_else(|| "absent".to_string())
}

/// Check or cross for a record's overall outcome.
pub fn match_glyph(record: &ReconciliationRecord) -> &'static str {
    if record.is_mismatch() {
        "✗"
    } else {
        "✓"
    }
}

/// Render records as a padded text table for terminal display.
pub fn format_records(records: &[ReconciliationRecord]) -> String {
    const AMOUNT_WIDTH: usize = 22;
    let key_width = records
        .iter()
        .map(|r| r.key.chars().count())
        .chain(std::iter::once("Key".len()))
        .max()
        .unwrap_or(3);

    let mut out = String::new();
    out.push_str(&format!(
        "{:<key_width$}  {:>AMOUNT_WIDTH$}  {:>AMOUNT_WIDTH$}  Match\n",
        "Key", "Completed (Prev)", "Previous Billed (Curr)",
    ));
    for record in records {
        out.push_str(&format!(
            "{:<key_width$}  {:>AMOUNT_WIDTH$}  {:>AMOUNT_WIDTH$}  {}\n",
            record.key,
            display_value(record.previous_period_value),
            display_value(record.current_period_value),
            match_glyph(record),
        ));
    }
    out
}

/// Records flagged on either the amount or the percent check.
pub fn mismatches(records: &[ReconciliationRecord]) -> Vec<&ReconciliationRecord> {
    records.iter().filter(|r| r.is_mismatch()).collect()
}

/// Write records as delimited text: one header row, fields in record
/// declaration order, raw decimals without separators.
pub fn write_csv<W: Write>(records: &[ReconciliationRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn csv_string(records: &[ReconciliationRecord]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn excerpt_line(record: &ReconciliationRecord) -> String {
    format!(
        "{}: Prev Total = {}, Curr Previous = {}",
        record.key,
        display_value(record.previous_period_value),
        display_value(record.current_period_value),
    )
}

/// Text excerpts of the mismatched records, chunked for the advisory
/// collaborator. Empty when nothing mismatched.
pub fn mismatch_excerpts(records: &[ReconciliationRecord]) -> Vec<String> {
    mismatches(records)
        .chunks(EXCERPT_CHUNK_SIZE)
        .map(|chunk| {
            chunk
                .iter()
                .map(|r| excerpt_line(r))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect()
}

/// One advisory call per excerpt chunk; the returned commentary sections
/// are concatenated in chunk order. `Ok(None)` when nothing mismatched.
#[cfg(feature = "advisory")]
pub fn advisory_summary(
    client: &crate::advisory::AdvisoryClient,
    records: &[ReconciliationRecord],
) -> Result<Option<String>> {
    let excerpts = mismatch_excerpts(records);
    if excerpts.is_empty() {
        return Ok(None);
    }

    let mut sections = Vec::with_capacity(excerpts.len());
    for excerpt in &excerpts {
        sections.push(client.summarize(excerpt)?);
    }
    Ok(Some(sections.join("\n\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, prev: Option<f64>, curr: Option<f64>, mismatch: bool) -> ReconciliationRecord {
        ReconciliationRecord {
            key: key.to_string(),
            previous_period_value: prev,
            current_period_value: curr,
            amount_mismatch: mismatch,
            percent_mismatch: false,
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(100_000.0), "100,000.00");
        assert_eq!(format_amount(1_234_567.891), "1,234,567.89");
        assert_eq!(format_amount(-9_876.54), "-9,876.54");
    }

    #[test]
    fn test_format_records_display() {
        let rendered = format_records(&[
            record("TOTAL", Some(100_000.0), Some(100_000.0), false),
            record("Concrete", Some(1500.0), None, true),
        ]);

        assert!(rendered.contains("100,000.00"));
        assert!(rendered.contains("✓"));
        assert!(rendered.contains("✗"));
        assert!(rendered.contains("absent"));
    }

    #[test]
    fn test_csv_export_raw_decimals() {
        let csv = csv_string(&[record("TOTAL", Some(100_000.0), Some(99_999.98), true)]).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "key,previous_period_value,current_period_value,amount_mismatch,percent_mismatch"
        );
        assert_eq!(lines.next().unwrap(), "TOTAL,100000.0,99999.98,true,false");
    }

    #[test]
    fn test_csv_absent_values_are_empty_fields() {
        let csv = csv_string(&[record("Concrete", Some(1.5), None, true)]).unwrap();
        assert!(csv.lines().nth(1).unwrap().contains("1.5,,true"));
    }

    #[test]
    fn test_mismatch_excerpts_select_and_chunk() {
        let mut records: Vec<ReconciliationRecord> = (0..60)
            .map(|i| record(&format!("Item {i}"), Some(1.0), Some(2.0), true))
            .collect();
        records.push(record("Clean", Some(1.0), Some(1.0), false));

        let excerpts = mismatch_excerpts(&records);
        assert_eq!(excerpts.len(), 2);
        assert_eq!(excerpts[0].lines().count(), 50);
        assert_eq!(excerpts[1].lines().count(), 10);
        assert!(!excerpts.iter().any(|e| e.contains("Clean")));
        assert!(excerpts[0].starts_with("Item 0: Prev Total = 1.00, Curr Previous = 2.00"));
    }

    #[test]
    fn test_no_mismatches_means_no_excerpts() {
        let records = vec![record("TOTAL", Some(1.0), Some(1.0), false)];
        assert!(mismatch_excerpts(&records).is_empty());
    }
}

use payapp_reconciler::document::media;
use payapp_reconciler::page_text::{self, PageTextStrategy};
use payapp_reconciler::{normalize, report, *};

fn text_doc(name: &str, body: &str) -> UploadedDocument {
    UploadedDocument::new(name, media::TEXT, body.as_bytes().to_vec())
}

/// Fixed-width schedule line matching the column layout of
/// [`anchored_header`].
fn anchored_line(item: &str, previous: f64, this_period: f64, completed: f64, pct: f64) -> String {
    format!("{item:<18}{previous:<12}{this_period:<14}{completed:<12}{pct}")
}

fn anchored_header() -> String {
    format!(
        "{:<18}{:<12}{:<14}{:<12}{}",
        "Item", "Previous", "This Period", "Completed", "%"
    )
}

#[test]
fn test_document_total_batch_with_mixed_outcomes() {
    let previous = vec![
        text_doc("job-a-03.txt", "Mobilization 400.00 100.00 500.00\nConcrete 900.00 100.00 99,500.00\n"),
        text_doc("job-b-03.txt", "Earthwork 100.00 0.00 100.00\n"),
    ];
    let current = vec![
        text_doc("job-a-04.txt", "Mobilization 500.00 0.00 500.00\nConcrete 99,500.00 0.00 99,500.00\n"),
        // Carried-forward total off by 0.02.
        text_doc("job-b-04.txt", "Earthwork 99.98 0.00 99.98\n"),
    ];

    let batch = reconcile_batch(previous, current, ReconcileMode::DocumentTotal).unwrap();

    assert_eq!(batch.pairs.len(), 2);

    let job_a = &batch.pairs[0].records[0];
    assert_eq!(job_a.previous_period_value, Some(100_000.0));
    assert_eq!(job_a.current_period_value, Some(100_000.0));
    assert!(!job_a.amount_mismatch);

    let job_b = &batch.pairs[1].records[0];
    assert!(job_b.amount_mismatch);

    let all_records: Vec<ReconciliationRecord> = batch.records().cloned().collect();
    assert_eq!(report::mismatches(&all_records).len(), 1);

    let csv = report::csv_string(&all_records).unwrap();
    assert!(csv.starts_with("key,previous_period_value,current_period_value"));
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn test_line_item_outer_join_covers_union_of_keys() {
    // Integer amounts keep the digit-stripped description keys clean.
    let previous = text_doc("prev.txt", "Concrete 500 0 500\nSteel 250 0 250\n");
    let current = text_doc("curr.txt", "Steel 250 50 300\nEarthwork 0 100 100\n");

    let batch = reconcile_batch(vec![previous], vec![current], ReconcileMode::LineItem).unwrap();

    let records = &batch.pairs[0].records;
    let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["Concrete", "Steel", "Earthwork"]);

    // Concrete only exists in the previous period.
    assert!(records[0].amount_mismatch);
    assert_eq!(records[0].current_period_value, None);

    // Steel: 250 carried forward + 50 this period = stated 300.
    assert!(!records[1].amount_mismatch);

    // Earthwork only exists in the current period.
    assert!(records[2].amount_mismatch);
    assert_eq!(records[2].previous_period_value, None);
}

#[test]
fn test_header_anchored_strategy_end_to_end() {
    let body_prev = format!(
        "{}\n{}\n{}\n",
        anchored_header(),
        anchored_line("Concrete Work", 500.0, 0.0, 500.0, 25.0),
        anchored_line("Steel Erection", 250.0, 0.0, 250.0, 10.0),
    );
    let body_curr = format!(
        "{}\n{}\n{}\n",
        anchored_header(),
        anchored_line("Concrete Work", 500.0, 200.0, 700.0, 35.0),
        anchored_line("Steel Erection", 250.0, 0.0, 250.0, 10.0),
    );

    let batch = ReconciliationProcessor::new(ReconcileMode::LineItem)
        .with_page_text_strategy(PageTextStrategy::HeaderAnchored)
        .run(
            vec![text_doc("prev.txt", &body_prev)],
            vec![text_doc("curr.txt", &body_curr)],
        )
        .unwrap();

    let records = &batch.pairs[0].records;
    let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["Concrete Work", "Steel Erection"]);

    // Concrete: 500 + 200 = stated 700, but percent moved 25 -> 35.
    assert!(!records[0].amount_mismatch);
    assert!(records[0].percent_mismatch);

    assert!(!records[1].amount_mismatch);
    assert!(!records[1].percent_mismatch);
}

#[test]
fn test_section_state_carries_across_pages() {
    // Page break lands mid-section; the rows at the top of page two still
    // belong to SITEWORK.
    let body = "SITEWORK\nClearing 100.00 0.00 100.00\x0cGrading 50.00 0.00 50.00\nCONCRETE\nFootings 200.00 0.00 200.00\n";

    let previous = text_doc("prev.txt", body);
    let current = text_doc("curr.txt", body);

    let batch =
        reconcile_batch(vec![previous], vec![current], ReconcileMode::SectionSubtotal).unwrap();

    let records = &batch.pairs[0].records;
    let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["SITEWORK", "CONCRETE"]);
    assert_eq!(records[0].previous_period_value, Some(150.0));
}

#[test]
fn test_rows_missing_required_fields_never_reach_sums() {
    let doc = document::PageTextDoc {
        name: "prev.txt".to_string(),
        pages: vec![vec![
            "Schedule of Values".to_string(),
            "Concrete 500.00 0.00 500.00".to_string(),
            // Two tokens only, not a data row.
            "Subtotal 500.00 500.00".to_string(),
        ]],
    };

    let raw = page_text::extract_rows(&doc, PageTextStrategy::Positional, false);
    assert_eq!(raw.len(), 1);

    let (rows, dropped) = normalize::normalize(
        "prev.txt",
        raw,
        RequiredFields::for_mode(ReconcileMode::LineItem),
    );
    assert_eq!(dropped, 0);
    assert_eq!(rows.len(), 1);

    let table = ScheduleTable {
        period: Period::Previous,
        source: SourceKind::PageText,
        document_name: "prev.txt".to_string(),
        rows,
        dropped_rows: dropped,
    };
    assert_eq!(table.total_completed_to_date(), 500.0);
}

#[test]
fn test_unequal_batches_produce_no_partial_output() {
    let err = reconcile_batch(
        vec![text_doc("a.txt", "Concrete 1.00 0.00 1.00\n")],
        vec![
            text_doc("b.txt", "Concrete 1.00 0.00 1.00\n"),
            text_doc("c.txt", "Concrete 1.00 0.00 1.00\n"),
        ],
        ReconcileMode::DocumentTotal,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::BatchCountMismatch {
            previous: 1,
            current: 2
        }
    ));
}

#[test]
fn test_mismatch_excerpts_from_batch_records() {
    let previous = text_doc("prev.txt", "Concrete 500 0 1500\n");
    let current = text_doc("curr.txt", "Concrete 1500 200 1700\n");

    let batch = reconcile_batch(vec![previous], vec![current], ReconcileMode::LineItem).unwrap();

    let records: Vec<ReconciliationRecord> = batch.records().cloned().collect();
    let excerpts = report::mismatch_excerpts(&records);
    assert_eq!(excerpts.len(), 1);
    assert!(excerpts[0].contains("Concrete"));
    assert!(excerpts[0].contains("1,500.00"));

    let rendered = report::format_records(&records);
    assert!(rendered.contains("✗"));
}

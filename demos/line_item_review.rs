use payapp_reconciler::document::media;
use payapp_reconciler::page_text::PageTextStrategy;
use payapp_reconciler::*;

/// Fixed-width schedule page in the usual G703 column order.
fn schedule_page(lines: &[(&str, f64, f64, f64, f64)]) -> String {
    let mut body = format!(
        "{:<20}{:<12}{:<14}{:<12}{}\n",
        "Item", "Previous", "This Period", "Completed", "%"
    );
    for (item, previous, this_period, completed, pct) in lines {
        body.push_str(&format!(
            "{item:<20}{previous:<12}{this_period:<14}{completed:<12}{pct}\n"
        ));
    }
    body
}

fn main() {
    println!("Line Item Review (header-anchored extraction)\n");

    let previous_body = schedule_page(&[
        ("Mobilization", 5000.0, 0.0, 5000.0, 100.0),
        ("Concrete Work", 40000.0, 10000.0, 50000.0, 50.0),
        ("Steel Erection", 15000.0, 0.0, 15000.0, 20.0),
    ]);
    let current_body = schedule_page(&[
        ("Mobilization", 5000.0, 0.0, 5000.0, 100.0),
        // Carried forward 48,000 instead of the 50,000 billed last period.
        ("Concrete Work", 48000.0, 5000.0, 53000.0, 53.0),
        ("Steel Erection", 15000.0, 10000.0, 25000.0, 33.0),
        ("Roofing", 0.0, 8000.0, 8000.0, 10.0),
    ]);

    let previous = UploadedDocument::new(
        "payapp-04.txt",
        media::TEXT,
        previous_body.into_bytes(),
    );
    let current = UploadedDocument::new(
        "payapp-05.txt",
        media::TEXT,
        current_body.into_bytes(),
    );

    let result = ReconciliationProcessor::new(ReconcileMode::LineItem)
        .with_page_text_strategy(PageTextStrategy::HeaderAnchored)
        .run(vec![previous], vec![current]);

    match result {
        Ok(batch) => {
            let records: Vec<ReconciliationRecord> = batch.records().cloned().collect();
            println!("{}", report::format_records(&records));

            let flagged = report::mismatches(&records);
            if flagged.is_empty() {
                println!("All line items reconcile.");
            } else {
                println!("{} line item(s) need review:", flagged.len());
                for excerpt in report::mismatch_excerpts(&records) {
                    for line in excerpt.lines() {
                        println!("  {line}");
                    }
                }
            }
        }
        Err(e) => eprintln!("Reconciliation failed: {e}"),
    }
}

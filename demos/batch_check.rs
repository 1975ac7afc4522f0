use payapp_reconciler::document::media;
use payapp_reconciler::*;

fn main() {
    println!("Pay Application Batch Check (document totals)\n");

    let previous = vec![
        UploadedDocument::new(
            "riverside-payapp-03.txt",
            media::TEXT,
            b"Mobilization 5,000.00 0.00 5,000.00\n\
              Sitework 12,500.00 2,500.00 15,000.00\n\
              Concrete 40,000.00 10,000.00 50,000.00\n"
                .to_vec(),
        ),
        UploadedDocument::new(
            "hillcrest-payapp-03.txt",
            media::TEXT,
            b"Demolition 8,000.00 0.00 8,000.00\n\
              Framing 22,000.00 6,000.00 28,000.00\n"
                .to_vec(),
        ),
    ];
    let current = vec![
        UploadedDocument::new(
            "riverside-payapp-04.txt",
            media::TEXT,
            b"Mobilization 5,000.00 0.00 5,000.00\n\
              Sitework 15,000.00 0.00 15,000.00\n\
              Concrete 50,000.00 7,500.00 57,500.00\n"
                .to_vec(),
        ),
        // Previous billed carried forward short by 500.00.
        UploadedDocument::new(
            "hillcrest-payapp-04.txt",
            media::TEXT,
            b"Demolition 8,000.00 0.00 8,000.00\n\
              Framing 27,500.00 1,000.00 28,500.00\n"
                .to_vec(),
        ),
    ];

    match reconcile_batch(previous, current, ReconcileMode::DocumentTotal) {
        Ok(batch) => {
            for pair in &batch.pairs {
                println!("{} -> {}", pair.previous_document, pair.current_document);
                if let Some(error) = &pair.error {
                    println!("  skipped: {error}\n");
                    continue;
                }
                let rendered = report::format_records(&pair.records);
                for line in rendered.lines() {
                    println!("  {line}");
                }
                println!();
            }

            let records: Vec<ReconciliationRecord> = batch.records().cloned().collect();
            println!(
                "{} pair(s) checked, {} mismatch(es)\n",
                batch.pairs.len(),
                report::mismatches(&records).len()
            );

            match report::csv_string(&records) {
                Ok(csv) => {
                    println!("CSV export:");
                    print!("{csv}");
                }
                Err(e) => eprintln!("CSV export failed: {e}"),
            }
        }
        Err(e) => eprintln!("Reconciliation failed: {e}"),
    }
}

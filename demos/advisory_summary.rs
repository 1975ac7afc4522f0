use payapp_reconciler::advisory::AdvisoryClient;
use payapp_reconciler::document::media;
use payapp_reconciler::*;

fn main() {
    println!("Advisory Summary Demo\n");

    let api_key = match std::env::var("OPENAI_API_KEY") {
        Ok(key) => key,
        Err(_) => {
            eprintln!("Set OPENAI_API_KEY to run this demo.");
            std::process::exit(1);
        }
    };

    let client = match AdvisoryClient::new(api_key) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Could not build advisory client: {e}");
            std::process::exit(1);
        }
    };

    // Integer amounts keep the digit-stripped description keys clean.
    let previous = UploadedDocument::new(
        "payapp-06.txt",
        media::TEXT,
        b"Electrical 20000 5000 25000\n\
          Plumbing 18000 0 18000\n"
            .to_vec(),
    );
    // Both items drift from what was billed last period.
    let current = UploadedDocument::new(
        "payapp-07.txt",
        media::TEXT,
        b"Electrical 24000 2000 26000\n\
          Plumbing 17500 500 18000\n"
            .to_vec(),
    );

    let result = ReconciliationProcessor::new(ReconcileMode::LineItem)
        .with_advisory(client)
        .run(vec![previous], vec![current]);

    match result {
        Ok(batch) => {
            let records: Vec<ReconciliationRecord> = batch.records().cloned().collect();
            println!("{}", report::format_records(&records));

            match &batch.advisory_summary {
                Some(summary) => {
                    println!("Advisory commentary:\n{summary}");
                }
                None => println!("No advisory summary available."),
            }
        }
        Err(e) => eprintln!("Reconciliation failed: {e}"),
    }
}

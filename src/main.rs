use anyhow::Result;
use chrono::Utc;
use std::env;
use std::path::Path;
use std::process;

use customer_unify::{run, IssueKind, RunSummary};

const EXAMPLE_LIMIT: usize = 5;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 5 {
        eprintln!("Usage: customer-unify <leads.csv> <orders.csv> <mappings.yml> <output.csv>");
        process::exit(2);
    }

    println!("🧩 Customer Unify - CRM leads + sales orders → unified customers");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let leads_path = Path::new(&args[1]);
    let orders_path = Path::new(&args[2]);
    let mapping_path = Path::new(&args[3]);
    let output_path = Path::new(&args[4]);

    println!("\n📂 Reading {} and {}...", args[1], args[2]);
    let summary = run(leads_path, orders_path, mapping_path, output_path, Utc::now())?;

    println!("✓ Loaded {} leads, {} orders", summary.leads_read, summary.orders_read);
    println!("\n💾 Wrote {} unified customers to {}", summary.customers_written, args[4]);
    println!("✓ Aggregated {} orders", summary.orders_aggregated);

    print_issues(&summary);

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📋 {}", summary.summary());

    Ok(())
}

fn print_issues(summary: &RunSummary) {
    let kinds = [
        IssueKind::FieldInvalid,
        IssueKind::UnresolvableIdentity,
        IssueKind::DuplicateIdentity,
        IssueKind::UnlinkedOrder,
    ];

    for kind in kinds {
        let count = summary.count(kind);
        if count == 0 {
            continue;
        }
        println!("\n⚠️  {} x {}", count, kind.name());
        for issue in summary.examples(kind, EXAMPLE_LIMIT) {
            println!("   - {}", issue.describe());
        }
        if count > EXAMPLE_LIMIT {
            println!("   ... and {} more", count - EXAMPLE_LIMIT);
        }
    }
}

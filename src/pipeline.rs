// 🚚 Pipeline - One batch run, load → normalize → resolve → merge → write
//
// Each stage consumes the previous stage's complete output; there is no
// shared mutable state and no partial output. A structural load failure
// aborts before anything is written.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::loader::{load_leads, load_orders};
use crate::mapping::MappingConfig;
use crate::merger::MergeEngine;
use crate::report::RunSummary;
use crate::resolver::KeyPolicy;
use crate::writer::write_customers;

/// Run the full transform and return the run summary.
///
/// `now` is the processing time used by the future-date rule. It is the
/// only time-dependent input: holding it fixed makes two runs over
/// unchanged inputs byte-identical.
pub fn run(
    leads_path: &Path,
    orders_path: &Path,
    mapping_path: &Path,
    output_path: &Path,
    now: DateTime<Utc>,
) -> Result<RunSummary> {
    run_with_policy(
        leads_path,
        orders_path,
        mapping_path,
        output_path,
        now,
        KeyPolicy::default(),
    )
}

pub fn run_with_policy(
    leads_path: &Path,
    orders_path: &Path,
    mapping_path: &Path,
    output_path: &Path,
    now: DateTime<Utc>,
    policy: KeyPolicy,
) -> Result<RunSummary> {
    let mapping = MappingConfig::load(mapping_path)?;

    // Fatal on structural failure - nothing has been written yet
    let leads = load_leads(leads_path, &mapping.leads)?;
    let orders = load_orders(orders_path, &mapping.orders)?;

    let mut summary = RunSummary {
        leads_read: leads.len(),
        orders_read: orders.len(),
        ..Default::default()
    };

    let engine = MergeEngine::with_policy(now, policy);
    let customers = engine.merge(leads, orders, &mut summary);

    write_customers(output_path, &customers)?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn processing_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn standard_mapping(dir: &TempDir) -> PathBuf {
        let yaml = concat!(
            "leads:\n",
            "  lead_id: [lead_id, id]\n",
            "  name: [name]\n",
            "  email: [email]\n",
            "  signup_date: [signup_date]\n",
            "orders:\n",
            "  order_id: [order_id]\n",
            "  lead_reference: [lead_ref]\n",
            "  amount: [amount]\n",
        );
        write_file(dir, "mappings.yml", yaml)
    }

    #[test]
    fn test_end_to_end_merge() {
        let dir = tempfile::tempdir().unwrap();
        let leads = write_file(
            &dir,
            "leads.csv",
            "lead_id,name,email,signup_date\n\
             L1,Alice,Alice@Example.com,2024-01-15\n\
             L2,Bob,bob@example.com,03/02/2024\n",
        );
        let orders = write_file(
            &dir,
            "orders.csv",
            "order_id,lead_ref,amount\n\
             O1,L1,\"$1,234.50\"\n\
             O2,L1,100\n\
             O3,L404,50\n",
        );
        let mapping = standard_mapping(&dir);
        let output = dir.path().join("unified_customers.csv");

        let summary = run(&leads, &orders, &mapping, &output, processing_time()).unwrap();

        assert_eq!(summary.leads_read, 2);
        assert_eq!(summary.orders_read, 3);
        assert_eq!(summary.customers_written, 2);
        assert_eq!(summary.orders_aggregated, 2);

        let contents = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("L1,Alice,alice@example.com,"));
        assert!(lines[1].contains("1334.50"));
        // Bob has no orders: lifetime_value cell is empty
        assert!(lines[2].contains("bob@example.com"));
        assert!(lines[2].ends_with(",,crm"));
    }

    #[test]
    fn test_two_runs_are_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let leads = write_file(
            &dir,
            "leads.csv",
            "lead_id,name,email,signup_date\nL1,Alice,alice@example.com,2024-01-15\n",
        );
        let orders = write_file(&dir, "orders.csv", "order_id,lead_ref,amount\nO1,L1,10\n");
        let mapping = standard_mapping(&dir);

        let now = processing_time();
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        run(&leads, &orders, &mapping, &first, now).unwrap();
        run(&leads, &orders, &mapping, &second, now).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_load_failure_writes_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let orders = write_file(&dir, "orders.csv", "order_id,lead_ref,amount\n");
        let mapping = standard_mapping(&dir);
        let output = dir.path().join("out.csv");

        let result = run(
            &dir.path().join("missing_leads.csv"),
            &orders,
            &mapping,
            &output,
            processing_time(),
        );

        assert!(result.is_err());
        assert!(!output.exists());
    }
}

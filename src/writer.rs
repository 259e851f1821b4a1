// 📝 Writer - Unified customers → output CSV
//
// Thin I/O layer. Formatting is deterministic: RFC 3339 dates, exact
// decimal display, empty cells for absent values. Running twice on the
// same inputs yields byte-identical files.

use anyhow::{Context, Result};
use csv::Writer;
use std::path::Path;

use crate::merger::UnifiedCustomer;

const OUTPUT_HEADER: [&str; 6] = [
    "id",
    "name",
    "email",
    "signup_date",
    "lifetime_value",
    "source_system",
];

/// Render one customer as output cells. Absent fields become empty cells,
/// never placeholder zeros.
fn render_row(customer: &UnifiedCustomer) -> [String; 6] {
    [
        customer.id.clone(),
        customer.name.clone().unwrap_or_default(),
        customer.email.clone().unwrap_or_default(),
        customer
            .signup_date
            .map(|d| d.to_rfc3339())
            .unwrap_or_default(),
        customer
            .lifetime_value
            .map(|v| v.to_string())
            .unwrap_or_default(),
        customer.source_system.clone(),
    ]
}

/// Write the unified customer table, one row per customer, in the order
/// the merger produced them.
pub fn write_customers(path: &Path, customers: &[UnifiedCustomer]) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    writer
        .write_record(OUTPUT_HEADER)
        .context("Failed to write output header")?;

    for customer in customers {
        writer
            .write_record(render_row(customer))
            .with_context(|| format!("Failed to write output row for customer {}", customer.id))?;
    }

    writer.flush().context("Failed to flush output file")?;
    Ok(())
}

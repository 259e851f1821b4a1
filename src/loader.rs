// 📂 Loader - CSV sources → raw in-memory records
//
// Thin I/O layer: reads the two input tables, applies the declarative
// column mapping, and hands the core untyped records with provenance.
// Structural problems here (missing file, malformed CSV) are fatal;
// field-level problems are the normalizer's business.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use crate::mapping::SourceMapping;

// ============================================================================
// RAW RECORDS
// ============================================================================

/// One CRM lead row, untyped, exactly as loaded.
/// Empty string means the source had no value. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLead {
    pub lead_id: String,
    pub name: String,
    pub email: String,
    pub signup_date: String,

    // Provenance
    pub source_file: String,
    pub line_number: usize,
}

/// One sales order row, untyped, exactly as loaded.
/// `lead_reference` is opaque at this stage: it may hold a lead id or an
/// email, depending on what the source system exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOrder {
    pub order_id: String,
    pub lead_reference: String,
    pub amount: String,

    // Provenance
    pub source_file: String,
    pub line_number: usize,
}

// ============================================================================
// CSV LOADING
// ============================================================================

/// Header name → column index for one CSV file.
fn index_headers(headers: &csv::StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_string(), idx))
        .collect()
}

/// Pick the value for one unified field: first mapped candidate column
/// that exists in this file and is non-empty on this row wins.
fn pick_field(
    record: &csv::StringRecord,
    columns: &HashMap<String, usize>,
    candidates: &[String],
) -> String {
    for candidate in candidates {
        if let Some(&idx) = columns.get(candidate) {
            if let Some(value) = record.get(idx) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }
    }
    String::new()
}

fn read_rows(path: &Path) -> Result<(String, HashMap<String, usize>, Vec<csv::StringRecord>)> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.csv")
        .to_string();

    let columns = index_headers(
        reader
            .headers()
            .with_context(|| format!("Failed to read CSV headers in {}", filename))?,
    );

    let mut rows = Vec::new();
    for (line_num, result) in reader.records().enumerate() {
        let record = result.with_context(|| {
            format!("Failed to parse CSV line {} in {}", line_num + 2, filename)
        })?;
        rows.push(record);
    }

    Ok((filename, columns, rows))
}

/// Load the CRM leads table, resolving columns through the mapping.
pub fn load_leads(path: &Path, mapping: &SourceMapping) -> Result<Vec<RawLead>> {
    let (filename, columns, rows) = read_rows(path)?;

    let leads = rows
        .iter()
        .enumerate()
        .map(|(i, record)| RawLead {
            lead_id: pick_field(record, &columns, mapping.candidates("lead_id")),
            name: pick_field(record, &columns, mapping.candidates("name")),
            email: pick_field(record, &columns, mapping.candidates("email")),
            signup_date: pick_field(record, &columns, mapping.candidates("signup_date")),
            source_file: filename.clone(),
            line_number: i + 2, // 1-indexed + header row
        })
        .collect();

    Ok(leads)
}

/// Load the sales orders table, resolving columns through the mapping.
pub fn load_orders(path: &Path, mapping: &SourceMapping) -> Result<Vec<RawOrder>> {
    let (filename, columns, rows) = read_rows(path)?;

    let orders = rows
        .iter()
        .enumerate()
        .map(|(i, record)| RawOrder {
            order_id: pick_field(record, &columns, mapping.candidates("order_id")),
            lead_reference: pick_field(record, &columns, mapping.candidates("lead_reference")),
            amount: pick_field(record, &columns, mapping.candidates("amount")),
            source_file: filename.clone(),
            line_number: i + 2,
        })
        .collect();

    Ok(orders)
}

// ============================================================================
// TESTS
// ============================================================================

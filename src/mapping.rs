// 🗺️ Mapping Config - Declarative column → unified-field correspondences
//
// The mapping artifact is pure data, loaded once and enumerated up front.
// For each unified field it lists candidate source columns in priority
// order; the loader takes the first present, non-empty one. The core
// stages never see column names, only already-resolved fields.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Column candidates for one source table, keyed by unified field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceMapping {
    fields: BTreeMap<String, Vec<String>>,
}

impl SourceMapping {
    /// Candidate source columns for a unified field, highest priority first.
    pub fn candidates(&self, field: &str) -> &[String] {
        self.fields
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn set(&mut self, field: &str, columns: &[&str]) {
        self.fields.insert(
            field.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
    }
}

/// The full mapping artifact: one section per input source.
///
/// Example YAML:
/// ```yaml
/// leads:
///   lead_id: [lead_id, id]
///   name: [name, full_name]
///   email: [email, contact_email]
///   signup_date: [signup_date, created_at]
/// orders:
///   order_id: [order_id]
///   lead_reference: [lead_ref, lead_reference, customer_email]
///   amount: [amount, total]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    pub leads: SourceMapping,
    pub orders: SourceMapping,
}

impl MappingConfig {
    /// Load the mapping from a YAML file.
    ///
    /// A missing or malformed mapping is a structural failure and aborts
    /// the run.
    pub fn load(path: &Path) -> Result<MappingConfig> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open mapping file: {}", path.display()))?;
        let config: MappingConfig = serde_yaml::from_reader(file)
            .with_context(|| format!("Failed to parse mapping YAML: {}", path.display()))?;
        Ok(config)
    }

    /// Built-in mapping matching the canonical source schemas.
    pub fn standard() -> MappingConfig {
        let mut leads = SourceMapping::default();
        leads.set("lead_id", &["lead_id", "id"]);
        leads.set("name", &["name", "full_name"]);
        leads.set("email", &["email", "contact_email"]);
        leads.set("signup_date", &["signup_date", "created_at"]);

        let mut orders = SourceMapping::default();
        orders.set("order_id", &["order_id", "id"]);
        orders.set(
            "lead_reference",
            &["lead_ref", "lead_reference", "customer_email", "contact_email"],
        );
        orders.set("amount", &["amount", "total", "order_total"]);

        MappingConfig { leads, orders }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_candidates_priority_order_preserved() {
        let config = MappingConfig::standard();
        assert_eq!(config.leads.candidates("lead_id"), &["lead_id", "id"]);
        assert_eq!(config.orders.candidates("amount")[0], "amount");
    }

    #[test]
    fn test_unknown_field_has_no_candidates() {
        let config = MappingConfig::standard();
        assert!(config.leads.candidates("shoe_size").is_empty());
    }

    #[test]
    fn test_load_from_yaml() {
        let yaml = "\
leads:
  lead_id: [id]
  name: [name]
  email: [email]
  signup_date: [signup_date]
orders:
  order_id: [order_id]
  lead_reference: [lead_ref]
  amount: [amount]
";
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mappings.yml");
        let mut file = File::create(&path).unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = MappingConfig::load(&path).unwrap();
        assert_eq!(config.leads.candidates("lead_id"), &["id"]);
        assert_eq!(config.orders.candidates("lead_reference"), &["lead_ref"]);
    }

    #[test]
    fn test_missing_mapping_file_is_fatal() {
        let result = MappingConfig::load(Path::new("/nonexistent/mappings.yml"));
        assert!(result.is_err());
    }
}

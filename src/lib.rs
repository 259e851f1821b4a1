// Customer Unify - Core Library
// Normalizes and joins CRM leads + sales orders into unified customers

pub mod loader;
pub mod mapping;
pub mod merger;
pub mod normalizer;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod writer;

// Re-export commonly used types
pub use loader::{load_leads, load_orders, RawLead, RawOrder};
pub use mapping::{MappingConfig, SourceMapping};
pub use merger::{MergeEngine, NormalizedLead, NormalizedOrder, UnifiedCustomer, SOURCE_SYSTEM_CRM};
pub use normalizer::{normalize_date, normalize_email, normalize_money, NormalizedField};
pub use pipeline::{run, run_with_policy};
pub use report::{Issue, IssueKind, RunSummary};
pub use resolver::{resolve_key, KeyParts, KeyPolicy, KeySource};
pub use writer::write_customers;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

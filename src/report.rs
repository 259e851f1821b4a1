// 📋 Run Report - Non-fatal issue taxonomy + batch summary
//
// Field- and record-level problems are collected here and reported
// alongside best-effort output. Only structural load failures abort a run,
// and those travel as errors, not report entries.

use serde::{Deserialize, Serialize};

// ============================================================================
// ISSUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    /// A single field failed normalization; the record proceeds with the
    /// field absent.
    FieldInvalid,
    /// No usable join key could be derived; the record is excluded.
    UnresolvableIdentity,
    /// Two leads resolved to the same key; first wins, this one is dropped.
    DuplicateIdentity,
    /// An order's key matched no lead; excluded from aggregation.
    UnlinkedOrder,
}

impl IssueKind {
    pub fn name(&self) -> &str {
        match self {
            IssueKind::FieldInvalid => "field_invalid",
            IssueKind::UnresolvableIdentity => "unresolvable_identity",
            IssueKind::DuplicateIdentity => "duplicate_identity",
            IssueKind::UnlinkedOrder => "unlinked_order",
        }
    }
}

/// One reported problem, with enough provenance to find the offending row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub source_file: String,
    pub line_number: usize,
    pub field: Option<String>,
    pub detail: String,
}

impl Issue {
    pub fn new(kind: IssueKind, source_file: &str, line_number: usize, detail: String) -> Self {
        Issue {
            kind,
            source_file: source_file.to_string(),
            line_number,
            field: None,
            detail,
        }
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub fn describe(&self) -> String {
        match &self.field {
            Some(field) => format!(
                "{} ({}:{} field {}): {}",
                self.kind.name(),
                self.source_file,
                self.line_number,
                field,
                self.detail
            ),
            None => format!(
                "{} ({}:{}): {}",
                self.kind.name(),
                self.source_file,
                self.line_number,
                self.detail
            ),
        }
    }
}

// ============================================================================
// RUN SUMMARY
// ============================================================================

/// Outcome of one batch run: totals plus every collected issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub leads_read: usize,
    pub orders_read: usize,
    pub customers_written: usize,
    pub orders_aggregated: usize,
    pub issues: Vec<Issue>,
}

impl RunSummary {
    pub fn record(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    /// Up to `limit` example issues of one kind, for human-readable output.
    pub fn examples(&self, kind: IssueKind, limit: usize) -> Vec<&Issue> {
        self.issues
            .iter()
            .filter(|i| i.kind == kind)
            .take(limit)
            .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} leads, {} orders in; {} customers out, {} orders aggregated; \
             issues: {} invalid fields, {} unresolvable, {} duplicates, {} unlinked orders",
            self.leads_read,
            self.orders_read,
            self.customers_written,
            self.orders_aggregated,
            self.count(IssueKind::FieldInvalid),
            self.count(IssueKind::UnresolvableIdentity),
            self.count(IssueKind::DuplicateIdentity),
            self.count(IssueKind::UnlinkedOrder),
        )
    }
}

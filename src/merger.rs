// 🔗 Merge Engine - Join orders onto leads, emit unified customers
//
// Takes the raw row sets, normalizes record fields, resolves identities,
// folds order value onto matched leads, and emits one UnifiedCustomer per
// surviving lead in first-seen key order. Aggregation happens before
// construction; a customer is never mutated after it exists.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::loader::{RawLead, RawOrder};
use crate::normalizer::{normalize_date, normalize_email, normalize_money, NormalizedField};
use crate::report::{Issue, IssueKind, RunSummary};
use crate::resolver::{resolve_key, KeyParts, KeyPolicy};

/// Source tag carried by every output row. Orders never produce rows of
/// their own, so the only emitting source is the CRM.
pub const SOURCE_SYSTEM_CRM: &str = "crm";

// ============================================================================
// NORMALIZED RECORDS
// ============================================================================

/// A lead after field normalization and key resolution.
#[derive(Debug, Clone)]
pub struct NormalizedLead {
    pub raw: RawLead,
    pub email: NormalizedField<String>,
    pub signup_date: NormalizedField<DateTime<Utc>>,
    pub key: Option<String>,
}

/// An order after field normalization and key resolution.
#[derive(Debug, Clone)]
pub struct NormalizedOrder {
    pub raw: RawOrder,
    pub amount: NormalizedField<Decimal>,
    pub key: Option<String>,
}

// ============================================================================
// UNIFIED CUSTOMER
// ============================================================================

/// The output entity: one per distinct resolved identity.
///
/// `lifetime_value`, when present, is >= 0 (every folded contribution
/// already passed the non-negativity rule). A lead with no matched
/// orders carries `None`, not zero: absence of evidence is not evidence
/// of zero spend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedCustomer {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub signup_date: Option<DateTime<Utc>>,
    pub lifetime_value: Option<Decimal>,
    pub source_system: String,
}

// ============================================================================
// MERGE ENGINE
// ============================================================================

pub struct MergeEngine {
    policy: KeyPolicy,
    /// Processing time, passed in explicitly so the whole run is a pure
    /// function of its inputs (only the future-date check consults it).
    now: DateTime<Utc>,
}

impl MergeEngine {
    pub fn new(now: DateTime<Utc>) -> Self {
        MergeEngine {
            policy: KeyPolicy::default(),
            now,
        }
    }

    pub fn with_policy(now: DateTime<Utc>, policy: KeyPolicy) -> Self {
        MergeEngine { policy, now }
    }

    /// Normalize one lead's fields and resolve its identity.
    /// Field failures are recorded and leave the field absent.
    pub fn prepare_lead(&self, raw: RawLead, summary: &mut RunSummary) -> NormalizedLead {
        let email = normalize_email(&raw.email);
        if let Some(reason) = &email.reason {
            summary.record(
                Issue::new(
                    IssueKind::FieldInvalid,
                    &raw.source_file,
                    raw.line_number,
                    reason.clone(),
                )
                .with_field("email"),
            );
        }

        let signup_date = normalize_date(&raw.signup_date, self.now);
        if let Some(reason) = &signup_date.reason {
            summary.record(
                Issue::new(
                    IssueKind::FieldInvalid,
                    &raw.source_file,
                    raw.line_number,
                    reason.clone(),
                )
                .with_field("signup_date"),
            );
        }

        let parts = KeyParts {
            lead_id: Some(raw.lead_id.clone()),
            email: email.value.clone(),
            order_id: None,
        };
        let key = resolve_key(&parts, &self.policy);

        NormalizedLead {
            raw,
            email,
            signup_date,
            key,
        }
    }

    /// Normalize one order's fields and resolve its identity.
    ///
    /// `lead_reference` is opaque: if it is structurally an email it joins
    /// through the email slot of the chain, otherwise it stands in as the
    /// referenced lead id.
    pub fn prepare_order(&self, raw: RawOrder, summary: &mut RunSummary) -> NormalizedOrder {
        let amount = normalize_money(&raw.amount);
        if let Some(reason) = &amount.reason {
            summary.record(
                Issue::new(
                    IssueKind::FieldInvalid,
                    &raw.source_file,
                    raw.line_number,
                    reason.clone(),
                )
                .with_field("amount"),
            );
        }

        let reference_as_email = normalize_email(&raw.lead_reference);
        let reference_as_id = if raw.lead_reference.contains('@') {
            None
        } else {
            Some(raw.lead_reference.clone())
        };

        let parts = KeyParts {
            lead_id: reference_as_id,
            email: reference_as_email.value,
            order_id: Some(raw.order_id.clone()),
        };
        let key = resolve_key(&parts, &self.policy);

        NormalizedOrder { raw, amount, key }
    }

    /// Join orders onto leads and emit unified customers.
    ///
    /// Lead keys are first-wins: a later lead resolving to an existing key
    /// is a duplicate-identity violation, reported and dropped, never
    /// silently overwritten. Output order is insertion order of
    /// first-seen lead keys.
    pub fn merge(
        &self,
        leads: Vec<RawLead>,
        orders: Vec<RawOrder>,
        summary: &mut RunSummary,
    ) -> Vec<UnifiedCustomer> {
        // Stage 1: key → lead, first wins
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut surviving: Vec<NormalizedLead> = Vec::new();

        for raw in leads {
            let lead = self.prepare_lead(raw, summary);
            let key = match &lead.key {
                Some(key) => key.clone(),
                None => {
                    summary.record(Issue::new(
                        IssueKind::UnresolvableIdentity,
                        &lead.raw.source_file,
                        lead.raw.line_number,
                        "no usable key (lead_id/email both unusable)".to_string(),
                    ));
                    continue;
                }
            };

            if index.contains_key(&key) {
                summary.record(Issue::new(
                    IssueKind::DuplicateIdentity,
                    &lead.raw.source_file,
                    lead.raw.line_number,
                    format!("duplicate key {} (first occurrence wins)", key),
                ));
                continue;
            }

            index.insert(key, surviving.len());
            surviving.push(lead);
        }

        // Stage 2: fold order value onto matched leads (exact decimal sums)
        let mut totals: Vec<Option<Decimal>> = vec![None; surviving.len()];

        for raw in orders {
            let order = self.prepare_order(raw, summary);
            let key = match &order.key {
                Some(key) => key.clone(),
                None => {
                    summary.record(Issue::new(
                        IssueKind::UnresolvableIdentity,
                        &order.raw.source_file,
                        order.raw.line_number,
                        "no usable key (lead_reference/order_id both unusable)".to_string(),
                    ));
                    continue;
                }
            };

            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    summary.record(Issue::new(
                        IssueKind::UnlinkedOrder,
                        &order.raw.source_file,
                        order.raw.line_number,
                        format!("no lead matches key {}", key),
                    ));
                    continue;
                }
            };

            if let Some(amount) = order.amount.value {
                totals[slot] = Some(totals[slot].unwrap_or(Decimal::ZERO) + amount);
                summary.orders_aggregated += 1;
            }
        }

        // Stage 3: emit, in first-seen key order
        let customers: Vec<UnifiedCustomer> = surviving
            .into_iter()
            .zip(totals)
            .map(|(lead, lifetime_value)| {
                let name = lead.raw.name.trim();
                UnifiedCustomer {
                    // key presence was checked in stage 1
                    id: lead.key.unwrap_or_default(),
                    name: (!name.is_empty()).then(|| name.to_string()),
                    email: lead.email.value,
                    signup_date: lead.signup_date.value,
                    lifetime_value,
                    source_system: SOURCE_SYSTEM_CRM.to_string(),
                }
            })
            .collect();

        summary.customers_written = customers.len();
        customers
    }
}

// ============================================================================
// TESTS
// ============================================================================

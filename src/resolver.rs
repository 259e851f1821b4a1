// 🔑 Key Resolver - Stable join identity across sources
//
// Leads and orders share no primary key, so identity comes from a
// priority-ordered fallback chain. The chain is a policy value, not a
// hardcoded assumption: callers construct a KeyPolicy and pass it through.

use serde::{Deserialize, Serialize};

// ============================================================================
// KEY POLICY
// ============================================================================

/// One candidate source for a record's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeySource {
    LeadId,
    Email,
    OrderId,
}

impl KeySource {
    pub fn name(&self) -> &str {
        match self {
            KeySource::LeadId => "lead_id",
            KeySource::Email => "email",
            KeySource::OrderId => "order_id",
        }
    }
}

/// Ordered fallback chain for identity resolution.
///
/// Default order: lead_id → email → order_id. lead_id is the most stable
/// cross-system key when present; a validated email is the next most
/// reliable; order_id is a last resort that only makes the order itself
/// addressable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPolicy {
    chain: Vec<KeySource>,
}

impl KeyPolicy {
    pub fn new(chain: Vec<KeySource>) -> Self {
        KeyPolicy { chain }
    }

    pub fn chain(&self) -> &[KeySource] {
        &self.chain
    }
}

impl Default for KeyPolicy {
    fn default() -> Self {
        KeyPolicy {
            chain: vec![KeySource::LeadId, KeySource::Email, KeySource::OrderId],
        }
    }
}

// ============================================================================
// KEY PARTS
// ============================================================================

/// The identity-bearing fields of one record, already normalized.
///
/// `email` must be a *valid* normalized email or None — an email that
/// failed normalization never becomes a join key.
#[derive(Debug, Clone, Default)]
pub struct KeyParts {
    pub lead_id: Option<String>,
    pub email: Option<String>,
    pub order_id: Option<String>,
}

impl KeyParts {
    fn get(&self, source: KeySource) -> Option<&str> {
        let candidate = match source {
            KeySource::LeadId => self.lead_id.as_deref(),
            KeySource::Email => self.email.as_deref(),
            KeySource::OrderId => self.order_id.as_deref(),
        };
        candidate.map(str::trim).filter(|s| !s.is_empty())
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Resolve a record's stable identity under the given policy.
///
/// Walks the fallback chain in order; the first present, non-empty source
/// wins. Returns None when no source is usable (UnresolvableIdentity —
/// the record is excluded from output and reported, not fatal).
///
/// Pure function of its inputs: same record, same key, every time.
pub fn resolve_key(parts: &KeyParts, policy: &KeyPolicy) -> Option<String> {
    policy
        .chain()
        .iter()
        .find_map(|source| parts.get(*source))
        .map(str::to_string)
}

// ============================================================================
// TESTS
// ============================================================================

// 🧹 Field Normalizer - Raw strings → canonical typed values
//
// Every normalizer is a pure function: (raw string, processing time) → NormalizedField.
// Validity is tracked per field; an invalid field carries a reason, never a
// zero value masquerading as real data.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// NORMALIZED FIELD
// ============================================================================

/// Result of normalizing one raw string into a typed value.
///
/// Invariant: if the field is invalid or absent, `value` is `None`.
/// `reason` is `Some` only for invalid fields — an absent (empty-input)
/// field is not an error and produces no report entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedField<T> {
    pub value: Option<T>,
    pub reason: Option<String>,
}

impl<T> NormalizedField<T> {
    /// A successfully normalized value
    pub fn valid(value: T) -> Self {
        NormalizedField {
            value: Some(value),
            reason: None,
        }
    }

    /// Input was empty/missing - no value, no issue to report
    pub fn absent() -> Self {
        NormalizedField {
            value: None,
            reason: None,
        }
    }

    /// Input was present but failed normalization
    pub fn invalid(reason: &str) -> Self {
        NormalizedField {
            value: None,
            reason: Some(reason.to_string()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_invalid(&self) -> bool {
        self.reason.is_some()
    }
}

// ============================================================================
// DATE NORMALIZATION
// ============================================================================

/// Accepted date formats, tried in fixed priority order.
/// First successful parse wins, so ties are impossible.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Normalize a raw date string to a UTC instant.
///
/// Accepts ISO 8601 (`YYYY-MM-DD`, or a full RFC 3339 timestamp),
/// `MM/DD/YYYY`, and `YYYY/MM/DD`. Date-only inputs canonicalize to
/// midnight UTC. Dates strictly after `now` are rejected: future-dated
/// signups violate the business rule.
pub fn normalize_date(raw: &str, now: DateTime<Utc>) -> NormalizedField<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return NormalizedField::absent();
    }

    // Full RFC 3339 timestamp first (strictest ISO form)
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        let instant = instant.with_timezone(&Utc);
        if instant > now {
            return NormalizedField::invalid("future date");
        }
        return NormalizedField::valid(instant);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            let midnight = match date.and_hms_opt(0, 0, 0) {
                Some(dt) => dt,
                None => continue,
            };
            let instant = Utc.from_utc_datetime(&midnight);
            if instant > now {
                return NormalizedField::invalid("future date");
            }
            return NormalizedField::valid(instant);
        }
    }

    NormalizedField::invalid("unrecognized date format")
}

// ============================================================================
// MONEY NORMALIZATION
// ============================================================================

/// Normalize a raw money string to an exact decimal.
///
/// Strips currency symbols and thousands separators, keeping digits,
/// the decimal point, and a leading sign. Exact decimal arithmetic is
/// required downstream (lifetime-value accumulation), so no floats here.
///
/// Negative amounts are retained as invalid with reason "negative value",
/// never clamped to zero.
pub fn normalize_money(raw: &str) -> NormalizedField<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return NormalizedField::absent();
    }

    // Keep only digits, '.', and '-' (mirrors the tolerant currency strip)
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        return NormalizedField::invalid("no numeric content");
    }

    let amount = match Decimal::from_str(&cleaned) {
        Ok(d) => d,
        Err(_) => return NormalizedField::invalid("not a number"),
    };

    if amount.is_sign_negative() && !amount.is_zero() {
        return NormalizedField::invalid("negative value");
    }

    NormalizedField::valid(amount)
}

// ============================================================================
// EMAIL NORMALIZATION
// ============================================================================

/// Normalize a raw email: trim, lowercase, check structural shape.
///
/// Requires exactly one `@`, a non-empty local part, and a domain with at
/// least one dot separating non-empty labels. No deliverability check.
pub fn normalize_email(raw: &str) -> NormalizedField<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return NormalizedField::absent();
    }

    let lowered = trimmed.to_lowercase();

    let mut parts = lowered.split('@');
    let local = parts.next().unwrap_or("");
    let domain = match (parts.next(), parts.next()) {
        (Some(domain), None) => domain,
        (_, Some(_)) => return NormalizedField::invalid("multiple @ signs"),
        (None, _) => return NormalizedField::invalid("missing @"),
    };

    if local.is_empty() {
        return NormalizedField::invalid("empty local part");
    }

    if domain.is_empty() || !domain.contains('.') {
        return NormalizedField::invalid("invalid domain");
    }

    if domain.split('.').any(|label| label.is_empty()) {
        return NormalizedField::invalid("invalid domain");
    }

    NormalizedField::valid(lowered)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn processing_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_date_formats_agree_on_same_calendar_date() {
        let now = processing_time();

        let iso = normalize_date("2024-03-15", now);
        let mdy = normalize_date("03/15/2024", now);
        let ymd = normalize_date("2024/03/15", now);

        assert!(iso.is_valid());
        assert_eq!(iso.value, mdy.value);
        assert_eq!(iso.value, ymd.value);
        assert_eq!(
            iso.value.unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_date_rfc3339_timestamp() {
        let now = processing_time();
        let result = normalize_date("2024-03-15T08:30:00Z", now);

        assert!(result.is_valid());
        assert_eq!(
            result.value.unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 15, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_future_date_rejected() {
        let now = processing_time();
        let result = normalize_date("2030-01-01", now);

        assert!(!result.is_valid());
        assert_eq!(result.reason.as_deref(), Some("future date"));
    }

    #[test]
    fn test_garbage_date_rejected() {
        let result = normalize_date("15th of March", processing_time());

        assert!(!result.is_valid());
        assert_eq!(result.reason.as_deref(), Some("unrecognized date format"));
    }

    #[test]
    fn test_empty_date_is_absent_not_invalid() {
        let result = normalize_date("  ", processing_time());

        assert!(!result.is_valid());
        assert!(result.reason.is_none());
    }

    #[test]
    fn test_money_variants_agree() {
        let expected = Decimal::new(123450, 2); // 1234.50

        for raw in ["$1,234.50", "1234.50", "1,234.5"] {
            let result = normalize_money(raw);
            assert!(result.is_valid(), "failed on {}", raw);
            assert_eq!(result.value.unwrap(), expected, "mismatch on {}", raw);
        }
    }

    #[test]
    fn test_negative_money_invalid_not_clamped() {
        let result = normalize_money("-5.00");

        assert!(!result.is_valid());
        assert!(result.value.is_none());
        assert_eq!(result.reason.as_deref(), Some("negative value"));
    }

    #[test]
    fn test_money_garbage_rejected() {
        let result = normalize_money("N/A");

        assert!(!result.is_valid());
        assert_eq!(result.reason.as_deref(), Some("no numeric content"));
    }

    #[test]
    fn test_email_lowercased() {
        let result = normalize_email("  Alice@Example.COM ");

        assert!(result.is_valid());
        assert_eq!(result.value.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn test_email_structural_failures() {
        assert_eq!(
            normalize_email("no-at-sign").reason.as_deref(),
            Some("missing @")
        );
        assert_eq!(
            normalize_email("a@b@c.com").reason.as_deref(),
            Some("multiple @ signs")
        );
        assert_eq!(
            normalize_email("@example.com").reason.as_deref(),
            Some("empty local part")
        );
        assert_eq!(
            normalize_email("alice@nodot").reason.as_deref(),
            Some("invalid domain")
        );
        assert_eq!(
            normalize_email("alice@example.").reason.as_deref(),
            Some("invalid domain")
        );
    }

    #[test]
    fn test_empty_email_is_absent() {
        let result = normalize_email("");

        assert!(!result.is_valid());
        assert!(result.reason.is_none());
    }
}

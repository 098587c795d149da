//! Value patterns recognized during schema inference.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Compiled value patterns shared by the basic-type pass and the semantic scorers.
///
/// Digit classes are ASCII-only: `\d` would also match other scripts' digits.
pub struct ValuePatterns {
    pub uuid: Regex,
    pub email: Regex,
    pub url: Regex,
    pub currency: Regex,
    pub percentage: Regex,
    pub numeric: Regex,
    pub date_iso: Regex,
    pub date_us: Regex,
    pub date_eu: Regex,
    pub datetime_iso: Regex,
    pub phone: Regex,
}

fn compile(pattern: &str) -> Regex {
    // Patterns below are literals known to be valid
    #[allow(clippy::expect_used)]
    Regex::new(pattern).expect("Hard-coded regex pattern should be valid")
}

/// Process-wide compiled patterns.
pub static PATTERNS: Lazy<ValuePatterns> = Lazy::new(|| ValuePatterns {
    uuid: compile(
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
    ),
    email: compile(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$"),
    url: compile(r"(?i)^(https?://|www\.)[^\s/$.?#][^\s]*$"),
    currency: compile(
        r"(?i)^(-?[$€£¥]\s?-?[0-9]{1,3}(,[0-9]{3})*(\.[0-9]+)?|-?[$€£¥]\s?-?[0-9]+(\.[0-9]+)?|-?[0-9]+(\.[0-9]{1,2})?\s?(usd|eur|gbp|jpy))$",
    ),
    percentage: compile(r"^[-+]?[0-9]+(\.[0-9]+)?\s?%$"),
    numeric: compile(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?$"),
    date_iso: compile(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$"),
    date_us: compile(r"^[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}$"),
    date_eu: compile(r"^[0-9]{1,2}\.[0-9]{1,2}\.[0-9]{4}$"),
    datetime_iso: compile(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}[T ][0-9]{2}:[0-9]{2}(:[0-9]{2}(\.[0-9]+)?)?(Z|[+-][0-9]{2}:?[0-9]{2})?$"),
    phone: compile(r"^\+?[0-9\s().-]+$"),
});

/// Literals accepted as booleans (case-insensitive).
pub const BOOLEAN_LITERALS: &[&str] = &["true", "false", "yes", "no", "y", "n", "t", "f"];

pub fn is_boolean_literal(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    BOOLEAN_LITERALS.contains(&lower.as_str())
}

pub fn is_numeric_text(value: &str) -> bool {
    PATTERNS.numeric.is_match(value.trim())
}

/// Calendar date without a time component.
///
/// ISO dates must also be valid calendar dates.
pub fn is_date_text(value: &str) -> bool {
    let value = value.trim();
    if PATTERNS.date_iso.is_match(value) {
        return NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    }
    if PATTERNS.date_us.is_match(value) {
        return NaiveDate::parse_from_str(value, "%m/%d/%Y").is_ok();
    }
    if PATTERNS.date_eu.is_match(value) {
        return NaiveDate::parse_from_str(value, "%d.%m.%Y").is_ok();
    }
    false
}

/// ISO date-time, validated as a real calendar instant.
pub fn is_datetime_text(value: &str) -> bool {
    let value = value.trim();
    if !PATTERNS.datetime_iso.is_match(value) {
        return false;
    }
    // The regex pins an ASCII layout; chrono checks the calendar
    let (Some(date_part), Some(time_part)) = (value.get(..10), value.get(11..)) else {
        return false;
    };
    let time_core: String = time_part
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ':')
        .collect();
    let format = if time_core.len() >= 8 { "%Y-%m-%d %H:%M:%S" } else { "%Y-%m-%d %H:%M" };
    let candidate = format!("{date_part} {}", &time_core[..time_core.len().min(8)]);
    NaiveDateTime::parse_from_str(&candidate, format).is_ok()
}

/// Date or date-time.
pub fn is_temporal_text(value: &str) -> bool {
    is_date_text(value) || is_datetime_text(value)
}

pub fn is_uuid(value: &str) -> bool {
    PATTERNS.uuid.is_match(value.trim())
}

pub fn is_email(value: &str) -> bool {
    PATTERNS.email.is_match(value.trim())
}

pub fn is_url(value: &str) -> bool {
    PATTERNS.url.is_match(value.trim())
}

pub fn is_currency(value: &str) -> bool {
    PATTERNS.currency.is_match(value.trim())
}

pub fn is_percentage(value: &str) -> bool {
    PATTERNS.percentage.is_match(value.trim())
}

/// Phone-like text: 7 to 15 digits with at least one `+`, space, dash,
/// dot or parenthesis, and not a plain decimal number.
pub fn is_phone(value: &str) -> bool {
    let value = value.trim();
    if !PATTERNS.phone.is_match(value) || is_numeric_text(value) {
        return false;
    }
    let digits = value.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_literals() {
        for v in ["true", "FALSE", " Yes ", "n", "T"] {
            assert!(is_boolean_literal(v), "{v}");
        }
        assert!(!is_boolean_literal("1"));
        assert!(!is_boolean_literal("maybe"));
    }

    #[test]
    fn test_dates_are_calendar_checked() {
        assert!(is_date_text("2024-02-29"));
        assert!(!is_date_text("2023-02-29"));
        assert!(!is_date_text("2024-13-01"));
        assert!(is_date_text("12/31/2024"));
        assert!(is_date_text("31.12.2024"));
        assert!(!is_date_text("31/12/2024"));
    }

    #[test]
    fn test_datetimes() {
        assert!(is_datetime_text("2024-03-01T12:30:00"));
        assert!(is_datetime_text("2024-03-01 12:30"));
        assert!(is_datetime_text("2024-03-01T12:30:00.123Z"));
        assert!(!is_datetime_text("2024-03-01T25:30:00"));
        assert!(!is_datetime_text("2024-03-01"));
    }

    #[test]
    fn test_non_ascii_digits_are_not_dates() {
        // Arabic-Indic digits are multi-byte; none of these may match or panic
        assert!(!is_datetime_text("٢٠٢٤-٠١-٠١T12:30"));
        assert!(!is_datetime_text("2024-٠١-01 12:30"));
        assert!(!is_date_text("٢٠٢٤-٠١-٠١"));
        assert!(!is_numeric_text("٤٢"));
        assert!(!is_phone("+٩٧١ ٥٠ ١٢٣ ٤٥٦٧"));
    }

    #[test]
    fn test_value_patterns() {
        assert!(is_uuid("123e4567-e89b-12d3-a456-426614174000"));
        assert!(is_email("ada@example.com"));
        assert!(!is_email("ada@example"));
        assert!(is_url("https://example.com/path"));
        assert!(is_currency("$1,234.50"));
        assert!(is_currency("12.99 USD"));
        assert!(is_percentage("45.5%"));
        assert!(is_numeric_text("-3.5e2"));
    }

    #[test]
    fn test_phone_excludes_plain_numbers() {
        assert!(is_phone("+1 (555) 123-4567"));
        assert!(is_phone("555-123-4567"));
        assert!(!is_phone("3.14159265"));
        assert!(!is_phone("5551234567"));
        assert!(!is_phone("12-34"));
    }
}

//! Built-in field patterns.
//!
//! Compiled once and shared by every form validation.

use std::sync::LazyLock;

use regex::Regex;

/// A compiled field-shape pattern.
#[derive(Debug)]
pub struct FieldPattern {
    /// Name of the pattern for identification.
    pub name: &'static str,

    /// Description of what this pattern accepts.
    pub description: &'static str,

    regex: Regex,
}

impl FieldPattern {
    /// Create a new field pattern.
    ///
    /// # Panics
    ///
    /// Panics if the regex pattern is invalid.
    #[must_use]
    pub fn new(name: &'static str, description: &'static str, pattern: &str) -> Self {
        Self {
            name,
            description,
            regex: Regex::new(pattern).expect("Invalid regex pattern"),
        }
    }

    /// Check if the whole value has this shape.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Something shaped like `local@domain.tld`, with no whitespace or extra `@`.
pub static EMAIL: LazyLock<FieldPattern> = LazyLock::new(|| {
    FieldPattern::new(
        "email",
        "local@domain.tld without whitespace",
        r"^[^\s@]+@[^\s@]+\.[^\s@]+$",
    )
});

/// Loose international number: optional `+`, a non-zero digit, up to 15 more digits.
///
/// Apply to the value with whitespace removed; see [`is_phone`].
pub static PHONE: LazyLock<FieldPattern> = LazyLock::new(|| {
    FieldPattern::new(
        "phone",
        "optional +, then 1-16 digits not starting with 0",
        r"^\+?[1-9][0-9]{0,15}$",
    )
});

/// Check an email address shape.
#[must_use]
pub fn is_email(value: &str) -> bool {
    EMAIL.matches(value)
}

/// Check a phone number shape, ignoring any whitespace in it.
#[must_use]
pub fn is_phone(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE.matches(&compact)
}

/// Read the leading integer of `value` the way a browser's `parseInt` does.
///
/// Leading whitespace and a single sign are allowed; parsing stops at the
/// first non-digit. Returns `None` when no digit is found. Values too large
/// for `i64` saturate.
#[must_use]
pub fn leading_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(rest.len(), |(i, _)| i);
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_accepts() {
        assert!(is_email("a@b.com"));
        assert!(is_email("garvita.jain@email.com"));
        assert!(is_email("x+tag@sub.domain.org"));
    }

    #[test]
    fn test_email_rejects() {
        assert!(!is_email("bad"));
        assert!(!is_email("a@b"));
        assert!(!is_email("a b@c.com"));
        assert!(!is_email("a@@b.com"));
        assert!(!is_email("@b.com"));
    }

    #[test]
    fn test_phone_accepts() {
        assert!(is_phone("+919876543210"));
        assert!(is_phone("98765 43210"));
        assert!(is_phone("7"));
        assert!(is_phone("+1 234 567 8901"));
    }

    #[test]
    fn test_phone_rejects() {
        assert!(!is_phone("0123456"));
        assert!(!is_phone("+91-9876543210"));
        assert!(!is_phone("12345678901234567"));
        assert!(!is_phone("phone"));
        assert!(!is_phone(""));
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("42"), Some(42));
        assert_eq!(leading_integer("  17 years"), Some(17));
        assert_eq!(leading_integer("-5"), Some(-5));
        assert_eq!(leading_integer("+8kg"), Some(8));
        assert_eq!(leading_integer("3.9"), Some(3));
        assert_eq!(leading_integer("abc"), None);
        assert_eq!(leading_integer("-"), None);
        assert_eq!(leading_integer(""), None);
        assert_eq!(leading_integer("99999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_pattern_metadata() {
        assert_eq!(EMAIL.name, "email");
        assert_eq!(PHONE.name, "phone");
        assert!(!PHONE.description.is_empty());
    }
}

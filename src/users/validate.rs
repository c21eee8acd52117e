//! Field-format predicates for registration input.
//!
//! Pure functions: string in, bool out, no side effects. Callers treat an
//! absent field as the empty string, which fails every predicate here.

use regex::Regex;
use std::sync::OnceLock;

static ALPHA_TEXT_RE: OnceLock<Regex> = OnceLock::new();
static MOBILE_RE: OnceLock<Regex> = OnceLock::new();
static LOGIN_ID_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

/// Letters and spaces only. Used for names and address fields.
pub fn is_alpha_text(value: &str) -> bool {
    let re = ALPHA_TEXT_RE.get_or_init(|| Regex::new(r"^[A-Za-z ]+$").expect("valid regex"));
    re.is_match(value)
}

/// Exactly 10 decimal digits.
pub fn is_valid_mobile(value: &str) -> bool {
    let re = MOBILE_RE.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("valid regex"));
    re.is_match(value)
}

/// Exactly 8 alphanumeric characters.
pub fn is_valid_login_id(value: &str) -> bool {
    let re = LOGIN_ID_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9]{8}$").expect("valid regex"));
    re.is_match(value)
}

/// local@domain.tld — no whitespace, single @, a dot in the domain part.
pub fn is_valid_email(value: &str) -> bool {
    let re = EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));
    re.is_match(value)
}

/// At least 6 characters with one lowercase letter, one uppercase letter,
/// and one symbol (anything outside [A-Za-z0-9_]). The regex crate has no
/// lookahead, so the classes are checked individually.
pub fn is_strong_password(value: &str) -> bool {
    value.chars().count() >= 6
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| !c.is_ascii_alphanumeric() && c != '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_text_accepts_letters_and_spaces() {
        assert!(is_alpha_text("John"));
        assert!(is_alpha_text("New Delhi"));
        assert!(!is_alpha_text(""));
        assert!(!is_alpha_text("John3"));
        assert!(!is_alpha_text("O'Brien"));
    }

    #[test]
    fn mobile_requires_exactly_ten_digits() {
        assert!(is_valid_mobile("9876543210"));
        assert!(!is_valid_mobile("987654321"));
        assert!(!is_valid_mobile("98765432100"));
        assert!(!is_valid_mobile("987654321a"));
        assert!(!is_valid_mobile(""));
    }

    #[test]
    fn login_id_requires_exactly_eight_alphanumerics() {
        assert!(is_valid_login_id("abcd1234"));
        assert!(is_valid_login_id("ABCDEFGH"));
        assert!(!is_valid_login_id("abcd123"));
        assert!(!is_valid_login_id("abcd12345"));
        assert!(!is_valid_login_id("abcd_123"));
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("a x@y.com"));
        assert!(!is_valid_email("a@@x.com"));
        assert!(!is_valid_email("ax.com"));
    }

    #[test]
    fn password_strength() {
        assert!(!is_strong_password("abc"));
        assert!(is_strong_password("Abcdef!"));
        // No symbol
        assert!(!is_strong_password("Abcdefg1"));
        // Underscore is a word character, not a symbol
        assert!(!is_strong_password("Abcdef_"));
        // No uppercase
        assert!(!is_strong_password("abcdef!"));
        // Length 6 exactly is allowed
        assert!(is_strong_password("Abcde!"));
    }
}

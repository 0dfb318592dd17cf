//! Store-legal identifier derivation
//!
//! Maps arbitrary header and file names onto lowercase identifiers that
//! match `[a-z_][a-z0-9_]*`, capped at the store's maximum length. Same
//! input, same output — except for fully empty input, which gets a fresh
//! unique token on every call so two nameless columns never collide.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Maximum identifier length accepted by the store
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Prefix applied when the sanitized result would be illegal on its own
const FALLBACK_PREFIX: &str = "col_";

/// SQL keywords that may not be used as bare identifiers
const RESERVED_WORDS: &[&str] = &[
    "table", "select", "insert", "update", "delete", "where", "from", "group",
    "order", "index", "key", "primary", "foreign", "user", "values", "column",
];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static ILLEGAL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_]").expect("valid regex"));

/// Derive a store-legal identifier from arbitrary text.
///
/// Lowercases, collapses whitespace runs to `_`, strips everything else,
/// and prefixes the result when it is empty, starts with a digit, or is a
/// reserved word. Pure except for the empty-input case, which embeds a
/// random token.
pub fn sanitize_identifier(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let underscored = WHITESPACE.replace_all(&lowered, "_");
    let mut name = ILLEGAL_CHARS.replace_all(&underscored, "").into_owned();

    if name.is_empty() {
        let token = Uuid::new_v4().simple().to_string();
        name = format!("{}{}", FALLBACK_PREFIX, &token[..8]);
    } else if starts_with_digit(&name) || RESERVED_WORDS.contains(&name.as_str()) {
        name = format!("{}{}", FALLBACK_PREFIX, name);
    }

    name.truncate(MAX_IDENTIFIER_LEN);
    name
}

/// Check whether a name is already a legal identifier as produced by
/// [`sanitize_identifier`].
pub fn is_sanitized(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_IDENTIFIER_LEN
        && !starts_with_digit(name)
        && !ILLEGAL_CHARS.is_match(name)
        && !RESERVED_WORDS.contains(&name)
}

fn starts_with_digit(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize_identifier("Zeit"), "zeit");
        assert_eq!(sanitize_identifier("  kWh  "), "kwh");
        assert_eq!(sanitize_identifier("PV Production (kW)"), "pv_production_kw");
        assert_eq!(sanitize_identifier("a-b.c"), "abc");
    }

    #[test]
    fn test_sanitize_is_deterministic_for_non_empty_input() {
        let first = sanitize_identifier("Messwert #1");
        let second = sanitize_identifier("Messwert #1");
        assert_eq!(first, second);
    }

    #[test]
    fn test_sanitize_digit_start_gets_prefix() {
        assert_eq!(sanitize_identifier("15min"), "col_15min");
    }

    #[test]
    fn test_sanitize_reserved_word_gets_prefix() {
        assert_eq!(sanitize_identifier("Table"), "col_table");
        assert_eq!(sanitize_identifier("values"), "col_values");
        // Not reserved, no prefix
        assert_eq!(sanitize_identifier("tables"), "tables");
    }

    #[test]
    fn test_sanitize_empty_input_is_legal_and_unique() {
        let first = sanitize_identifier("");
        let second = sanitize_identifier("");
        assert!(is_sanitized(&first));
        assert!(is_sanitized(&second));
        assert_ne!(first, second);
        assert!(first.starts_with(FALLBACK_PREFIX));
    }

    #[test]
    fn test_sanitize_symbol_only_input_is_legal() {
        let name = sanitize_identifier("!!!???");
        assert!(is_sanitized(&name));
    }

    #[test]
    fn test_sanitize_truncates_to_max_length() {
        let long = "x".repeat(500);
        let name = sanitize_identifier(&long);
        assert_eq!(name.len(), MAX_IDENTIFIER_LEN);
    }

    #[test]
    fn test_sanitize_output_always_passes_is_sanitized() {
        for raw in ["Zeit", "  a b  ", "7even", "SELECT", "äöü", "x y-z", ""] {
            let name = sanitize_identifier(raw);
            assert!(is_sanitized(&name), "illegal identifier {:?} from {:?}", name, raw);
        }
    }
}

//! Heading text to identifier conversion.

/// Convert heading text into an identifier.
///
/// Lowercases the input, turns every maximal run of characters outside
/// `[a-z0-9]` into a single `-`, then trims leading and trailing hyphens.
///
/// Distinct headings can collide (`"A/B"` and `"a b"` both give `"a-b"`);
/// callers get the same id for both.
///
/// ```rust
/// use docview_core::slug::slug;
///
/// assert_eq!(slug("Getting Started!"), "getting-started");
/// assert_eq!(slug("  --C++ & Rust--  "), "c-rust");
/// ```
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn basic_cases() {
        let cases = [
            ("Introduction", "introduction"),
            ("Getting Started", "getting-started"),
            ("API v2: Overview", "api-v2-overview"),
            ("  padded  ", "padded"),
            ("snake_case_name", "snake-case-name"),
            ("---", ""),
            ("", ""),
            ("Ünïcödé Héading", "n-c-d-h-ading"),
        ];

        for (input, expected) in cases {
            assert_eq!(slug(input), expected, "slug({input:?})");
        }
    }

    #[test]
    fn colliding_headings_share_an_id() {
        assert_eq!(slug("A/B"), slug("a b"));
    }

    #[test]
    fn uppercase_non_ascii_lowercases_before_filtering() {
        // 'İ' lowercases to "i\u{307}"; the ASCII 'i' survives
        assert_eq!(slug("İstanbul"), "i-stanbul");
    }

    proptest! {
        #[test]
        fn slug_is_deterministic(input in ".*") {
            prop_assert_eq!(slug(&input), slug(&input));
        }

        #[test]
        fn slug_is_idempotent(input in ".*") {
            let once = slug(&input);
            prop_assert_eq!(slug(&once), once.clone());
        }

        #[test]
        fn slug_output_alphabet(input in ".*") {
            let out = slug(&input);
            prop_assert!(out.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!out.starts_with('-'));
            prop_assert!(!out.ends_with('-'));
            prop_assert!(!out.contains("--"));
        }
    }
}

//! crates/lectern_core/src/slug.rs
//!
//! Derives the stable lecture identifier from a submitted title.
//!
//! The derivation is pure: no clock, no randomness, no external state.
//! Re-running ingestion with the same title always reproduces the same id,
//! which is what lets the store enforce its duplicate policy.

/// Derives a URL-safe lecture id from a human-readable title.
///
/// Trim, lowercase, collapse internal whitespace runs to single hyphens,
/// then drop every character outside `[a-z0-9-]`.
pub fn lecture_id_from_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            pending_hyphen = !out.is_empty();
            continue;
        }
        if pending_hyphen {
            out.push('-');
            pending_hyphen = false;
        }
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_titles() {
        assert_eq!(lecture_id_from_title("Limits"), "limits");
        assert_eq!(
            lecture_id_from_title("Introduction to Calculus"),
            "introduction-to-calculus"
        );
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(lecture_id_from_title("  Mean   Value\tTheorem "), "mean-value-theorem");
    }

    #[test]
    fn strips_punctuation_and_unicode() {
        assert_eq!(lecture_id_from_title("L'Hôpital's Rule!"), "lhpitals-rule");
        // The ampersand occupies a whitespace-delimited slot of its own, so a
        // double hyphen survives. Still within [a-z0-9-].
        assert_eq!(lecture_id_from_title("Chapter 2: Vectors & Matrices"), "chapter-2-vectors--matrices");
    }

    #[test]
    fn deterministic_across_calls() {
        let title = "Taylor Series (Part 1)";
        assert_eq!(lecture_id_from_title(title), lecture_id_from_title(title));
    }

    #[test]
    fn output_charset_is_restricted() {
        for title in ["Weird  ~~ Title ##", "ünïcode heavy", "a    b", ""] {
            let id = lecture_id_from_title(title);
            assert!(
                id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "bad char in {id:?}"
            );
            assert!(!id.contains(char::is_whitespace));
        }
    }
}

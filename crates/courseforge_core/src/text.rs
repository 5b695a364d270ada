//! Small text helpers shared by generation and export.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const MAX_SLUG_CHARS: usize = 48;

/// Lowercase, hyphen-separated ASCII slug. Never empty.
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    let slug = NON_SLUG_RE.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    let mut truncated = slug.chars().take(MAX_SLUG_CHARS).collect::<String>();
    while truncated.ends_with('-') {
        truncated.pop();
    }
    if truncated.is_empty() {
        "untitled".to_string()
    } else {
        truncated
    }
}

/// Collapses runs of spaces and tabs to one space and trims each line.
/// Line breaks are kept so list content survives.
pub fn collapse_whitespace(value: &str) -> String {
    value
        .lines()
        .map(|line| WHITESPACE_RE.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{collapse_whitespace, slugify};

    #[test]
    fn slugify_normalizes_punctuation_and_case() {
        assert_eq!(slugify("Master React in 30 Days!"), "master-react-in-30-days");
        assert_eq!(slugify("  --  "), "untitled");
    }

    #[test]
    fn slugify_caps_length_without_trailing_hyphen() {
        let slug = slugify(&"ab ".repeat(40));
        assert!(slug.len() <= 48);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn collapse_whitespace_keeps_line_structure() {
        assert_eq!(
            collapse_whitespace("  one   two \n\n\t three  "),
            "one two\nthree"
        );
    }
}
